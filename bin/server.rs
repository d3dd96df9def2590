// SuperStore Analytics - Web Server
// JSON API over per-session dashboards

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use superstore_analytics::api::{router, AppState, DEFAULT_MAX_SESSIONS};
use superstore_analytics::{init_logging, DatasetArgs};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "SuperStore analytics JSON API", long_about = None)]
struct ServerArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Address to bind
    #[arg(long, env = "SUPERSTORE_ADDR", default_value = "0.0.0.0:3000")]
    addr: String,

    /// Seconds a session may stay idle before it can be evicted
    #[arg(long, env = "SUPERSTORE_SESSION_TTL", default_value_t = 1800)]
    session_ttl_secs: u64,

    /// Maximum number of live sessions
    #[arg(long, env = "SUPERSTORE_MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    max_sessions: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("info")?;

    let args = ServerArgs::parse();
    let config = args.dataset.into_config().context("invalid dataset configuration")?;

    let state = AppState::new(config.clone())
        .with_session_ttl(Duration::from_secs(args.session_ttl_secs))
        .with_max_sessions(args.max_sessions);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("failed to bind to {}", args.addr))?;

    info!(
        addr = %args.addr,
        rows = config.row_count,
        start = %config.start_date,
        max_sessions = args.max_sessions,
        "server running; POST /api/sessions to start a dashboard"
    );

    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}
