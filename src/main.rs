use invoice_api::config::StorageBackend;
use invoice_api::{
    create_pool, router, AppConfig, AppState, InvoiceRepository, InvoiceService,
    MemoryInvoiceRepository, PgInvoiceRepository,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 创建仓储
    let repo: Arc<dyn InvoiceRepository> = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database).await?;
            info!("Database pool created");
            Arc::new(PgInvoiceRepository::new(pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Arc::new(MemoryInvoiceRepository::new())
        }
    };

    let state = AppState::new(InvoiceService::new(repo), &config.api.token)
        .with_default_per_page(config.pagination.default_per_page);
    let app = router(state);

    // 启动服务器
    let addr = config.bind_address();
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET    /invoices      - list (filter, sort, paginate)");
    info!("  GET    /invoices/:id  - show");
    info!("  POST   /invoices      - create");
    info!("  PUT    /invoices/:id  - update description");
    info!("  DELETE /invoices/:id  - deactivate");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
