//! Callee service
//!
//! The downstream half of the demo. It rolls dice and answers slowly, and
//! every request it serves joins the trace started by whoever called it.
//!
//! # Routes
//!
//! - `GET /health` - liveness check, never traced
//! - `GET /` - greeting
//! - `GET /rolldice?player=<name>` - rolls the configured dice
//! - `GET /slow` - answers after a random delay
//!
//! # Example
//!
//! ```no_run
//! use callee::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
mod routes;
mod state;

pub use config::Config;
pub use routes::SlowResponse;
pub use state::AppState;

use anyhow::Result;
use axum::Router;
use shared::{IdentityDefaults, Telemetry};

/// Service identity used when `OTEL_*` variables are unset.
pub const IDENTITY: IdentityDefaults = IdentityDefaults::for_service("callee");

/// Paths served without spans, access logs, or metrics.
pub const UNTRACED_PATHS: &[&str] = &["/health"];

/// Runs the callee service.
///
/// Installs telemetry, loads configuration from environment variables, and
/// serves until SIGTERM/SIGINT. Buffered telemetry is flushed on the way out.
///
/// # Errors
///
/// Returns an error if:
/// - Telemetry or configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let (telemetry, guard) = Telemetry::bootstrap(IDENTITY)?;
    let config = Config::from_env()?;

    run_server_with_config(config, &telemetry).await?;

    guard.shutdown()?;
    Ok(())
}

/// Runs the callee service with the provided configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config, telemetry: &Telemetry) -> Result<()> {
    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        dice_sides = config.dice.sides,
        delay_min_secs = config.delay.min_secs,
        delay_max_secs = config.delay.max_secs,
        "Callee service starting"
    );

    let app = create_router(AppState::new(&config, telemetry));
    shared::server::serve(app, &config.server).await
}

/// Creates the service router with all routes and instrumentation.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    let metrics = state.metrics().clone();
    let router = Router::new()
        .merge(routes::health_routes())
        .merge(routes::root_routes())
        .merge(routes::dice_routes())
        .merge(routes::slow_routes())
        .with_state(state);

    shared::middleware::instrument(router, metrics)
}
