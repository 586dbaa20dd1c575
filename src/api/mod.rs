pub mod auth;
pub mod error;
pub mod handlers;
pub mod links;
pub mod params;

use crate::models::Pagination;
use crate::service::InvoiceService;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use handlers::*;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub invoices: Arc<InvoiceService>,
    pub api_token: Arc<str>,
    /// 请求未指定 page/perPage 时的分页
    pub default_pagination: Pagination,
}

impl AppState {
    pub fn new(invoices: InvoiceService, api_token: &str) -> Self {
        Self {
            invoices: Arc::new(invoices),
            api_token: Arc::from(api_token),
            default_pagination: Pagination::default(),
        }
    }

    pub fn with_default_per_page(mut self, per_page: i64) -> Self {
        self.default_pagination.per_page = per_page.max(1);
        self
    }
}

/// 构建路由, 所有路由都需要 API token
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/:id",
            get(show_invoice)
                .put(update_invoice)
                .delete(delete_invoice),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
