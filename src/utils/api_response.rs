use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Envelope returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationErrorDetail {
    pub field: String,
    /// Machine readable key, e.g. "is_required" or "length".
    pub title: String,
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: &str, title: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            title: title.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// 1-based page number and a limit clamped to `1..=MAX_PAGE_SIZE`.
pub fn page_window(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit)
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

pub struct ApiResponseResult<T>(pub StatusCode, pub ApiResponse<T>);

impl<T> IntoResponse for ApiResponseResult<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

pub struct ResponseBuilder;

impl ResponseBuilder {
    fn build<T: Serialize>(
        status_code: StatusCode,
        status: &'static str,
        code: &str,
        message: &str,
        data: Option<T>,
    ) -> ApiResponseResult<T> {
        ApiResponseResult(
            status_code,
            ApiResponse {
                status,
                code: code.to_string(),
                message: message.to_string(),
                data,
            },
        )
    }

    pub fn success<T: Serialize>(code: &str, message: &str, data: T) -> ApiResponseResult<T> {
        Self::build(StatusCode::OK, "success", code, message, Some(data))
    }

    pub fn created<T: Serialize>(code: &str, message: &str, data: T) -> ApiResponseResult<T> {
        Self::build(StatusCode::CREATED, "success", code, message, Some(data))
    }

    /// Success without a payload, used for deletions.
    pub fn ok(code: &str, message: &str) -> ApiResponseResult<()> {
        Self::build(StatusCode::OK, "success", code, message, None)
    }

    pub fn error<T: Serialize>(
        status_code: StatusCode,
        code: &str,
        message: &str,
    ) -> ApiResponseResult<T> {
        Self::build(status_code, "error", code, message, None)
    }

    pub fn fail_with_data<T: Serialize>(
        status_code: StatusCode,
        code: &str,
        message: &str,
        data: T,
    ) -> ApiResponseResult<T> {
        Self::build(status_code, "error", code, message, Some(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_meta_rounds_pages_up() {
        assert_eq!(PaginationMeta::new(21, 1, 10).total_pages, 3);
        assert_eq!(PaginationMeta::new(20, 1, 10).total_pages, 2);
        assert_eq!(PaginationMeta::new(0, 1, 10).total_pages, 0);
    }

    #[test]
    fn page_window_clamps() {
        assert_eq!(page_window(None, None), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(page_window(Some(0), Some(1000)), (1, MAX_PAGE_SIZE));
        assert_eq!(page_window(Some(3), Some(0)), (3, 1));
    }

    #[test]
    fn error_envelope_omits_data() {
        let ApiResponseResult(status, body) =
            ResponseBuilder::error::<()>(StatusCode::NOT_FOUND, "ARTICLE_NOT_FOUND", "Article not found");
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "ARTICLE_NOT_FOUND");
        assert!(json.get("data").is_none());
    }
}
