use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;

use coach_apply::apply::terminal::{self, SessionEnd};
use coach_apply::apply::transition::{Instant, Timed, Transition};
use coach_apply::apply::{ApplyState, HttpSubmitter, Wizard, apply_routes};
use coach_apply::config::{ServerConfig, TerminalConfig};
use coach_apply::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().context("reading server configuration")?;
    let terminal_config = TerminalConfig::from_env(&config);

    eprintln!("Coach Apply v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Apply API: http://{}/api/apply", config.addr());
    eprintln!("   Database: {}", config.db_path.display());

    // ── Database ─────────────────────────────────────────────────────────
    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("opening database at {}", config.db_path.display()))?,
    );

    // ── HTTP server ──────────────────────────────────────────────────────
    let app = apply_routes(ApplyState { db }, config.allowed_origin.clone());
    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("binding {}", config.addr()))?;
    tracing::info!(addr = %config.addr(), "Apply server started");

    if !terminal_config.enabled {
        axum::serve(listener, app).await.context("serving HTTP")?;
        return Ok(());
    }

    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    // ── Terminal wizard ──────────────────────────────────────────────────
    eprintln!("   Terminal wizard → {}", terminal_config.endpoint);
    eprintln!("   Commands: :back  :jump <step>  :quit\n");

    let transition: Arc<dyn Transition> = if terminal_config.animate {
        Arc::new(Timed::default())
    } else {
        Arc::new(Instant)
    };
    let wizard = Wizard::new(
        Arc::new(HttpSubmitter::new(terminal_config.endpoint.clone())),
        transition,
    )
    .with_select_delay(terminal_config.select_delay);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    match terminal::run(&wizard, stdin, &mut stdout).await? {
        SessionEnd::Submitted => tracing::info!("Terminal application submitted"),
        SessionEnd::Abandoned => tracing::info!("Terminal session ended without submitting"),
    }

    server.abort();
    Ok(())
}
