use std::sync::Arc;

use taproll_api::app::{build_app, services::AppServices};
use taproll_api::config::Config;
use taproll_infra::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    taproll_observability::init();

    let config = Config::from_env();

    let (services, database) = match &config.database_url {
        Some(url) => {
            let db = Database::connect(url).await?;
            db.migrate().await?;
            (Arc::new(AppServices::postgres(&db)), Some(db))
        }
        None => (Arc::new(AppServices::in_memory()), None),
    };

    let app = build_app(services, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
