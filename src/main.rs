use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use stocktake_recon_rust::{api, AppConfig, ReconciliationEngine};
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // 对账引擎: 摄像头/扫码枪/手工录入共用一个实例
    let engine = Arc::new(ReconciliationEngine::new());

    // 构建路由
    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/catalog", post(api::load_catalog))
        .route("/api/scan", post(api::record_scan))
        .route("/api/report", get(api::get_report))
        .route("/api/session/new", post(api::new_session))
        .with_state(engine)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/catalog      - load expected items (once per session)");
    info!("  POST /api/scan         - record one scanned identifier");
    info!("  GET  /api/report       - current reconciliation report");
    info!("  POST /api/session/new  - start a fresh session");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
