use crate::api::error::ApiError;
use crate::api::links;
use crate::api::params::{self, document_length_msg, RawParams};
use crate::api::AppState;
use crate::models::{document_too_long, NewInvoice};
use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{
        header::{HOST, LINK, LOCATION},
        HeaderMap, HeaderName, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use bigdecimal::BigDecimal;
use serde_json::json;
use std::str::FromStr;

pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

fn host(headers: &HeaderMap) -> &str {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("parameter id should be an integer".to_string()))
}

/// 根路径重定向到列表
pub async fn index() -> Response {
    (StatusCode::MOVED_PERMANENTLY, [(LOCATION, "/invoices")]).into_response()
}

/// GET /invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let params = RawParams::parse(query.as_deref().unwrap_or_default());

    let errors = params::validate(&params);
    if !errors.is_empty() {
        tracing::debug!("Rejected list query: {:?}", errors);
        return Err(ApiError::Validation(errors));
    }

    let opts = params::build_options(&params, state.default_pagination);
    let page = state.invoices.list(&opts).await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(page.total_count));
    if let Some(window) = page.window {
        let link = links::link_header(host(&headers), &params, window.page, window.last_page);
        if let Some(value) = link.and_then(|l| HeaderValue::from_str(&l).ok()) {
            response_headers.insert(LINK, value);
        }
    }

    Ok((
        StatusCode::OK,
        response_headers,
        Json(json!({ "items": page.items })),
    )
        .into_response())
}

/// GET /invoices/:id
pub async fn show_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let invoice = state.invoices.get(id).await?;
    Ok((StatusCode::OK, Json(json!({ "item": invoice }))).into_response())
}

/// POST /invoices (表单: document, description, amount)
pub async fn create_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let form = RawParams::from_bytes(&body);

    let amount = form
        .first("amount")
        .and_then(|v| BigDecimal::from_str(v.trim()).ok())
        .ok_or_else(|| {
            ApiError::BadRequest("amount parameter must be specified and must be a number".to_string())
        })?;

    let document = match form.first("document") {
        Some(document) if !document.is_empty() => document.to_string(),
        _ => {
            return Err(ApiError::BadRequest(
                "missing or empty document parameter".to_string(),
            ))
        }
    };
    if document_too_long(&document) {
        return Err(ApiError::BadRequest(document_length_msg()));
    }

    let description = form.first("description").map(str::to_string);
    let id = state
        .invoices
        .create(NewInvoice::issued_now(document, description, amount))
        .await?;

    let location = format!("{}/invoices/{}", host(&headers), id);
    let mut response_headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&location) {
        response_headers.insert(LOCATION, value);
    }
    Ok((StatusCode::CREATED, response_headers).into_response())
}

/// PUT /invoices/:id (表单: description)
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let form = RawParams::from_bytes(&body);
    let description = form.first("description").ok_or_else(|| {
        ApiError::BadRequest("parameter description must be specified".to_string())
    })?;

    state.invoices.update_description(id, description).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// DELETE /invoices/:id
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    state.invoices.delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
