use serde::Serialize;
use utoipa::ToSchema;

pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u64,
    pub limit: u64,
}

impl PaginationParams {
    /// Page numbers start at 1; zero or missing values fall back to the defaults.
    pub fn new(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(default_limit)
            .min(MAX_PAGE_SIZE);
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<i64>,
}

impl Pagination {
    pub fn new(params: &PaginationParams, total_count: u64) -> Self {
        Self {
            current_page: params.page,
            total_pages: total_count.div_ceil(params.limit),
            total_count,
            total_amount: None,
        }
    }

    pub fn with_total_amount(mut self, total_amount: i64) -> Self {
        self.total_amount = Some(total_amount);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }
}
