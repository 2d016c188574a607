//! Turbo Client - offline-first data layer for the turbo workshop desk.
//!
//! Reads go to the workshop REST API and fall back to local data when the
//! network is gone. Records created while offline are saved locally with an
//! unsynced marker and pushed by a sync run once the connection comes back.
//!
//! # Wiring
//!
//! ```no_run
//! use std::sync::Arc;
//! use turbo_client::{
//!     Config, Connectivity, HttpRemote, NetworkInterceptor, OfflineDb, Reconciler,
//!     ReconnectSubscription,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new("http://127.0.0.1:8000", "./turbo-data");
//! let db = Arc::new(OfflineDb::open(config.store_dir(), config.mirror_dir()).await);
//! let remote = Arc::new(HttpRemote::from_config(&config)?);
//!
//! let api = NetworkInterceptor::new(Arc::clone(&remote), Arc::clone(&db));
//! let reconciler = Reconciler::new_shared(db, remote);
//! let connectivity = Connectivity::new(false);
//! let _sync_on_reconnect = ReconnectSubscription::start(&connectivity, reconciler);
//!
//! let clients = api.list(turbo_engine::Resource::Clients).await?;
//! println!("{} clients (cached: {})", clients.data.len(), clients.degraded);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connectivity;
pub mod error;
pub mod intercept;
pub mod reconcile;
pub mod remote;
pub mod storage;
pub mod workshop;

pub use config::{Config, ConfigError};
pub use connectivity::{spawn_probe, Connectivity, ReconnectSubscription};
pub use error::{ClientError, Result};
pub use intercept::{Fetched, NetworkInterceptor};
pub use reconcile::Reconciler;
pub use remote::{HttpRemote, RemoteApi};
pub use storage::{FallbackMirror, LocalRecordStore, OfflineDb};
pub use workshop::{create_client_offline, create_work_order_offline};

use turbo_engine::Timestamp;

/// Wall clock in milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
