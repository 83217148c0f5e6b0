use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

use crate::config::Config;

pub mod handlers;

/// 进程级共享状态：只读配置 + 复用的 HTTP 客户端
///
/// 请求之间没有可变共享状态，不需要任何锁。
pub struct AppState {
    pub config: Config,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { config, client })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/review", post(handlers::review))
        // 浏览器端仪表盘跨域访问
        .layer(CorsLayer::permissive())
        .with_state(state)
}
