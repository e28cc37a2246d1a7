use std::process::ExitCode;

use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    server::telemetry::init_logging();

    let config = server::config::load_config();
    let flags = &config.features;

    if flags.telemetry {
        if let Err(e) = server::telemetry::init_telemetry() {
            tracing::error!(error = %e, "failed to initialise OTLP exporter, continuing without it");
        }
    }
    server::health::record_start_time();

    let Some(database_url) = server::db::database_url() else {
        tracing::error!("DATABASE_URL must be set");
        return ExitCode::FAILURE;
    };
    let pool = match server::db::create_pool(&database_url) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "invalid database configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = server::db::run_migrations(&pool).await {
        tracing::error!(error = %e, "database migrations failed");
        return ExitCode::FAILURE;
    }

    if flags.overdue_sweep {
        server::sweep::spawn_sweep(pool.clone(), config.sweep.clone());
        tracing::info!(
            interval_secs = config.sweep.interval_secs,
            approaching_window_days = config.sweep.approaching_window_days,
            "overdue sweep scheduled"
        );
    }

    let router = server::openapi::app_router(pool);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, %bind_addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("complaint-server listening on {bind_addr}");

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
