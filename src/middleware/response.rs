use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::database::page::Page;

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None, // Default to 200 OK
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// Create a 204 No Content response (data will be ignored)
    pub fn no_content() -> ApiResponse<()> {
        ApiResponse::with_status((), StatusCode::NO_CONTENT)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        // For 204 No Content, return empty response
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        // Convert data to JSON Value for consistent envelope format
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data"
                    }))
                ).into_response();
            }
        };

        // Wrap in success envelope
        let envelope = json!({
            "success": true,
            "data": data_value
        });

        (status, Json(envelope)).into_response()
    }
}

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";
pub const PAGE_HEADER: &str = "x-page";
pub const PAGE_SIZE_HEADER: &str = "x-page-size";
pub const TOTAL_PAGES_HEADER: &str = "x-total-pages";

/// List response: the page items in the success envelope, pagination in headers
#[derive(Debug)]
pub struct PagedResponse<T: Serialize>(pub Page<T>);

impl<T: Serialize> IntoResponse for PagedResponse<T> {
    fn into_response(self) -> Response {
        let page = self.0;
        let pagination = [
            (TOTAL_COUNT_HEADER, HeaderValue::from(page.total)),
            (PAGE_HEADER, HeaderValue::from(page.page)),
            (PAGE_SIZE_HEADER, HeaderValue::from(page.page_size)),
            (TOTAL_PAGES_HEADER, HeaderValue::from(page.total_pages())),
        ];

        let mut response = ApiResponse::success(page.items).into_response();
        if response.status().is_success() {
            let headers = response.headers_mut();
            for (name, value) in pagination {
                headers.insert(HeaderName::from_static(name), value);
            }
        }
        response
    }
}

// Convenience type aliases
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
pub type PagedResult<T> = Result<PagedResponse<T>, crate::error::ApiError>;
