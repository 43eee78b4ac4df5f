//! `atrium-sweeper` -- publication sweep daemon.
//!
//! Re-evaluates content whose publish window bounds have elapsed since the
//! last user edit, so scheduled publications and expiries fire without
//! anyone touching the entity. Runs the expiry listener, so content flagged
//! `remove_after_publish_to` is cleaned up here as well.
//!
//! # Environment variables
//!
//! | Variable              | Required | Default | Description                      |
//! |-----------------------|----------|---------|----------------------------------|
//! | `DATABASE_URL`        | yes      | --      | Postgres connection string       |
//! | `SWEEP_INTERVAL_SECS` | no       | `300`   | Seconds between sweep passes     |

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atrium_db::store::{PgContentStore, PgHistoryLog};
use atrium_events::{Dispatcher, ExpiryListener, PublishSweep, SweepConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atrium_sweeper=info,atrium_events=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        tracing::error!("DATABASE_URL environment variable is required");
        std::process::exit(1);
    });

    let pool = match atrium_db::create_pool(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to the database");
            std::process::exit(1);
        }
    };

    if let Err(e) = atrium_db::health_check(&pool).await {
        tracing::error!(error = %e, "Database health check failed");
        std::process::exit(1);
    }

    let history = Arc::new(PgHistoryLog::new(pool.clone()));
    let content = Arc::new(PgContentStore::new(pool.clone()));

    let mut dispatcher = Dispatcher::new(history, content.clone());
    dispatcher.add_listener(Arc::new(ExpiryListener::new(content)));
    let dispatcher = Arc::new(dispatcher);

    let config = SweepConfig::from_env();
    tracing::info!(interval_secs = config.interval.as_secs(), "Starting atrium-sweeper");

    let sweep = PublishSweep::new(pool, dispatcher, config);
    let cancel = CancellationToken::new();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    sweep.run(cancel).await;

    tracing::info!("atrium-sweeper stopped");
}
