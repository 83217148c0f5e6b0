use ai_review::args::Args;
use ai_review::config::Config;
use ai_review::server::{self, AppState};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_logging(debug: bool) {
    let default_directive = if debug {
        "ai_review=debug,tower_http=debug"
    } else {
        "ai_review=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::new();

    config.update_from_args(&args);
    // 缺少 API key 属于启动期致命错误
    config.validate()?;
    init_logging(config.debug);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let state = Arc::new(AppState::new(config)?);
    let app = server::router(state);

    tracing::info!("ai-review listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
