//! GymFlow API server
//!
//! Usage:
//!   cargo run
//!
//! Environment:
//!   GYMFLOW_HOST             - Server host (default: 0.0.0.0)
//!   PORT / GYMFLOW_PORT      - Server port (default: 8080)
//!   GYMFLOW_SESSION_TTL_SECS - Login session lifetime (default: 28800)
//!   GYMFLOW_ADMIN_EMAIL      - Seed manager email (default: admin@gymflow.com)
//!   GYMFLOW_ADMIN_PASSWORD   - Seed manager password (default: admin123)
//!   RUST_LOG                 - Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use gymflow::api::{create_router, handlers::AppState, start_cleanup_task};
use gymflow::models::config::AppConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let config = AppConfig::load();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    // Create app state and seed first-boot data
    let state = Arc::new(AppState::new(config.clone()));
    state
        .store
        .seed_defaults(&config.admin_email, &config.admin_password);

    // Background sweep of expired sessions and rate-limit windows
    start_cleanup_task(state.clone());
    info!("🧹 Background cleanup task started");

    let app = create_router(state.clone());

    info!("🚀 GymFlow API starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  POST /api/login           - Authenticate, returns bearer token");
    info!("  GET  /api/members         - Member listing (paginated)");
    info!("  GET  /api/plans/available - Active plans");
    info!("  GET  /api/dashboard       - Manager dashboard metrics");
    info!("  GET  /api/stats           - Service counters");
    info!("  GET  /health              - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");
    info!("");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    // Graceful shutdown sequence
    info!("");
    info!("🛑 Shutdown signal received, cleaning up...");

    let snapshot = state.metrics.snapshot();
    info!("   Requests served: {}", snapshot.requests_total);
    info!("   Auth failures:   {}", snapshot.auth_failures);
    info!("   Avg latency:     {:.2}ms", snapshot.avg_latency_ms);

    match state.metrics.export_json() {
        Ok(path) => info!("   ✅ Stats exported to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export stats: {}", e),
    }

    info!("👋 GymFlow API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════╗
    ║                                              ║
    ║    G Y M F L O W                             ║
    ║    Gym Management API v{}                 ║
    ║                                              ║
    ╚══════════════════════════════════════════════╝
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
