//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use makaan_common::Paginated;
use serde::Serialize;
use serde_json::json;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(code: impl Into<String>, message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = if self.error.is_some() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        };
        (status, Json(self)).into_response()
    }
}

/// One page of results.
///
/// A page past the end of a non-empty result set is answered with a
/// well-formed 400 body carrying the computed totals and an empty data
/// sequence; it is never a server error.
#[derive(Debug)]
pub struct Paged<T: Serialize>(pub Paginated<T>);

impl<T: Serialize> IntoResponse for Paged<T> {
    fn into_response(self) -> Response {
        let page = self.0;
        if page.is_out_of_range() {
            let body = Json(json!({
                "message": "Page number exceeds total pages.",
                "currentPage": page.current_page,
                "totalPages": page.total_pages,
                "totalResults": page.total_results,
                "data": [],
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        (StatusCode::OK, Json(page)).into_response()
    }
}

/// Empty success response.
#[must_use]
pub fn ok() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use makaan_common::PageWindow;

    #[test]
    fn test_out_of_range_page_is_bad_request() {
        let window = PageWindow::normalize(Some(5), Some(10));
        let page: Paginated<i32> = Paginated::assemble(vec![], window, 25);
        let response = Paged(page).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_in_range_page_is_ok() {
        let window = PageWindow::normalize(Some(3), Some(10));
        let page = Paginated::assemble(vec![1, 2, 3, 4, 5], window, 25);
        let response = Paged(page).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_empty_result_set_any_page_is_ok() {
        let window = PageWindow::normalize(Some(7), Some(10));
        let page: Paginated<i32> = Paginated::assemble(vec![], window, 0);
        let response = Paged(page).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
