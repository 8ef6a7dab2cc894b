pub mod auth;
pub mod permission;
pub mod role;
pub mod statistic;
pub mod user;

use serde::Deserialize;

use peraccess_domain::pagination::{PageRequest, Sort};

/// Query shape shared by every `*/pagination` endpoint:
/// `?title=&page=1&pageSize=10&sortField=email&sortOrder=asc`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Search term; matches differ per entity.
    pub title: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size", rename = "pageSize")]
    pub page_size: u32,
    #[serde(rename = "sortField")]
    pub sort_field: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            page_size: self.page_size,
        }
        .clamped()
    }

    /// Unknown or absent `sortOrder` falls back to descending.
    pub fn sort(&self) -> Sort {
        self.sort_order
            .as_deref()
            .and_then(Sort::parse)
            .unwrap_or(Sort::Desc)
    }
}
