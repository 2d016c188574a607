//! Turbo Client daemon.
//!
//! Opens local data, watches connectivity to the workshop API and replays
//! records saved offline whenever the connection comes back.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turbo_client::{
    spawn_probe, Config, Connectivity, HttpRemote, OfflineDb, Reconciler, RemoteApi,
    ReconnectSubscription,
};
use turbo_engine::Partition;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turbo_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!(
        api = %config.api_base_url,
        data_dir = %config.data_dir.display(),
        "Starting Turbo Client"
    );

    let db = Arc::new(OfflineDb::open(config.store_dir(), config.mirror_dir()).await);
    for partition in Partition::OFFLINE {
        let pending = db.all(partition).await.iter().filter(|r| r.unsynced).count();
        tracing::info!(partition = %partition, pending, "Local data loaded");
    }

    let remote = Arc::new(HttpRemote::from_config(&config)?);
    let online = match remote.ping().await {
        Ok(()) => true,
        Err(e) => !e.is_connectivity(),
    };
    let connectivity = Connectivity::new(online);
    if !online {
        tracing::warn!("API unreachable, starting offline");
    }

    let reconciler = Reconciler::new_shared(Arc::clone(&db), Arc::clone(&remote));
    let subscription = ReconnectSubscription::start(&connectivity, reconciler);
    let probe = spawn_probe(remote, connectivity, config.probe_interval);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    probe.abort();
    subscription.stop();
    if let Some(at) = db.last_sync().await {
        tracing::info!(last_sync = at, "Last sync run");
    }

    Ok(())
}
