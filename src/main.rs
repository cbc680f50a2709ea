use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use visadesk::config::Config;
use visadesk::llm::{CompletionBackend, OpenAiClient};
use visadesk::server::{VisadeskState, visadesk_router};
use visadesk::service::{HistoryService, QueryService};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        loglevel = %cfg.basic.loglevel,
        llm.api_url = %cfg.llm.api_url,
        llm.model = %cfg.llm.model,
        llm.timeout_secs = cfg.llm.timeout_secs,
        llm.retry_max_times = cfg.llm.retry_max_times,
        llm.proxy = %cfg.llm.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        history.failure_policy = ?cfg.history.failure_policy,
        history.max_page_size = cfg.history.max_page_size,
    );

    let db = visadesk::db::spawn(&cfg.basic.database_url).await?;

    let llm_cfg = Arc::new(cfg.llm.clone());
    let history_cfg = Arc::new(cfg.history.clone());
    let backend: Arc<dyn CompletionBackend> = Arc::new(OpenAiClient::new(&llm_cfg)?);

    let query = QueryService::new(db.clone(), backend, llm_cfg.clone(), history_cfg.clone());
    let history = HistoryService::new(db.clone(), history_cfg);
    let state = VisadeskState::new(query, history);
    let app = visadesk_router(state, &cfg.basic.cors_origins);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    db.shutdown().await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
