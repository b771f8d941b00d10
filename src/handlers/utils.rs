use serde::Deserialize;

use crate::database::page::PageRequest;
use crate::error::ApiError;
use crate::services::validation::validate_page;
use crate::services::ServiceError;
use crate::state::AppState;

/// `?page=&page_size=` on list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    /// Fill defaults from config and check bounds
    pub fn resolve(&self, state: &AppState) -> Result<PageRequest, ApiError> {
        let api = &state.config.api;
        validate_page(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(api.default_page_size),
            api.max_page_size,
        )
        .map_err(|e| ServiceError::from(e).into())
    }
}
