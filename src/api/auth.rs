use crate::api::{error::ApiError, AppState};
use axum::{
    body::Body,
    extract::{Request, State},
    http::header::CONTENT_TYPE,
    middleware::Next,
    response::Response,
};

pub const TOKEN_PARAM: &str = "apiToken";

const MAX_FORM_BYTES: usize = 1024 * 1024;

fn find_token(pairs: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(pairs)
        .find(|(key, _)| key == TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// API token 校验
///
/// 先从查询串取 `apiToken`, 取不到再从表单请求体中取。
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let mut token = request
        .uri()
        .query()
        .and_then(|query| find_token(query.as_bytes()));

    let request = if token.is_none() && is_form(&request) {
        // 缓存请求体, 取出 token 后原样交给后续处理器
        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, MAX_FORM_BYTES)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read request body: {}", e)))?;
        token = find_token(&bytes);
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    match token.as_deref() {
        None | Some("") => Err(ApiError::Unauthorized("API token required")),
        Some(token) if token != state.api_token.as_ref() => {
            tracing::warn!("Rejected request with invalid API token");
            Err(ApiError::Unauthorized("Invalid API token"))
        }
        Some(_) => Ok(next.run(request).await),
    }
}
