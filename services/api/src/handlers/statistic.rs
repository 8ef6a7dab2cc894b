use axum::{Json, extract::State};
use serde::Serialize;

use peraccess_domain::permission::FIND_STATISTIC;

use crate::error::ApiError;
use crate::extract::AuthSession;
use crate::state::AppState;
use crate::usecase::statistic::ListStatisticsUseCase;

#[derive(Serialize)]
pub struct StatisticResponse {
    pub name: String,
    pub amount: i64,
}

// ── GET /api/statistic/list ──────────────────────────────────────────────────

pub async fn get_statistics(
    session: AuthSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<StatisticResponse>>, ApiError> {
    session.authorize(&[FIND_STATISTIC])?;

    let usecase = ListStatisticsUseCase {
        statistics: state.statistic_repo(),
    };
    let statistics = usecase.execute().await?;
    Ok(Json(
        statistics
            .into_iter()
            .map(|s| StatisticResponse {
                name: s.name,
                amount: s.amount,
            })
            .collect(),
    ))
}
