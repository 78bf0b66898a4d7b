mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(trendforge_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = trendforge_db::PoolConfig::from_env();
    let pool = trendforge_db::connect_pool(&config.database_url, pool_config).await?;
    trendforge_db::run_migrations(&pool).await?;

    let keywords = trendforge_core::load_keywords(&config.keywords_path)?.keywords;
    let orchestrator = Arc::new(trendforge_pipeline::Orchestrator::from_config(
        pool.clone(),
        &config,
        keywords,
    ));

    let _scheduler =
        scheduler::build_scheduler(Arc::clone(&orchestrator), Arc::clone(&config)).await?;

    let app = build_app(AppState { pool, orchestrator });

    tracing::info!(addr = %config.bind_addr, "trendforge server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
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

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
