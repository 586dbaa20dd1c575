use crate::error::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub const NOT_FOUND_MSG: &str = "there is no resource with the specified id";

/// HTTP 边界上的错误, 处理器可以直接用 `?` 返回
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 查询参数校验失败, 返回全部错误
    #[error("invalid query parameters: {0:?}")]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{}", NOT_FOUND_MSG)]
    NotFound,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error(transparent)]
    Internal(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidPage => ApiError::BadRequest(err.to_string()),
            ServiceError::NotFound => ApiError::NotFound,
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": NOT_FOUND_MSG }))).into_response()
            }
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(err) => {
                // 不返回部分结果, 也不暴露内部错误
                tracing::error!("Request failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepositoryError;

    #[test]
    fn maps_service_errors_to_status() {
        let cases = [
            (ServiceError::InvalidPage, StatusCode::BAD_REQUEST),
            (ServiceError::NotFound, StatusCode::NOT_FOUND),
            (
                ServiceError::Repository(RepositoryError::Database(sqlx::Error::PoolClosed)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn invalid_page_message_is_fixed() {
        match ApiError::from(ServiceError::InvalidPage) {
            ApiError::BadRequest(message) => {
                assert_eq!(message, "Invalid page number passed as parameter.")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
