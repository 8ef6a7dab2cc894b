use crate::domain::repository::StatisticRepository;
use crate::domain::types::Statistic;
use crate::error::ApiError;

/// Dashboard overview: every counter row.
pub struct ListStatisticsUseCase<S: StatisticRepository> {
    pub statistics: S,
}

impl<S: StatisticRepository> ListStatisticsUseCase<S> {
    pub async fn execute(&self) -> Result<Vec<Statistic>, ApiError> {
        self.statistics.list().await
    }
}
