pub mod announcements;
pub mod artists;
pub mod charts;
pub mod points;
pub mod qr_codes;
pub mod rewards;
pub mod upload;
pub mod users;
pub mod version;

pub use announcements::*;
pub use artists::*;
pub use charts::*;
pub use points::*;
pub use qr_codes::*;
pub use rewards::*;
pub use upload::*;
pub use users::*;
pub use version::*;

use serde::{Deserialize, Serialize};

/// Every JSON body returned by the api is wrapped in `{ "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

/// A single page of a paginated list together with the total row count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Pagination and filters for list endpoints.
///
/// Filters are passed through as query parameters, the api decides which
/// ones it understands.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            search: None,
            filters: Vec::new(),
        }
    }
}

impl ListQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size,
            ..Default::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];

        if let Some(search) = &self.search {
            params.push(("search".to_string(), search.clone()));
        }

        params.extend(self.filters.iter().cloned());
        params
    }
}
