//! Connectivity state and the reconnect subscription.
//!
//! [`Connectivity`] holds the current online/offline state and lets any
//! number of listeners watch it. [`ReconnectSubscription`] is the one
//! listener that turns an offline→online transition into a sync run. The
//! probe task feeds the state from periodic pings of the API.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::reconcile::Reconciler;
use crate::remote::RemoteApi;

/// Shared online/offline state.
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Publish the current state. Listeners only wake on a change.
    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });

        if changed {
            if online {
                tracing::info!("Connection restored");
            } else {
                tracing::warn!("Connection lost, working offline");
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Runs sync when the app starts online and every time it comes back
/// online. Dropping the subscription stops listening.
#[derive(Debug)]
pub struct ReconnectSubscription {
    task: JoinHandle<()>,
}

impl ReconnectSubscription {
    pub fn start<R>(connectivity: &Connectivity, reconciler: Arc<Reconciler<R>>) -> Self
    where
        R: RemoteApi + 'static,
    {
        let mut rx = connectivity.subscribe();

        let task = tokio::spawn(async move {
            let mut was_online = *rx.borrow_and_update();
            if was_online {
                spawn_run(&reconciler);
            }

            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                if online && !was_online {
                    spawn_run(&reconciler);
                }
                was_online = online;
            }
        });

        Self { task }
    }

    /// Stop listening.
    pub fn stop(self) {}
}

impl Drop for ReconnectSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn spawn_run<R>(reconciler: &Arc<Reconciler<R>>)
where
    R: RemoteApi + 'static,
{
    let reconciler = Arc::clone(reconciler);
    tokio::spawn(async move {
        reconciler.run().await;
    });
}

/// Ping the API every `interval` and publish the result.
///
/// Any answer from the server, including an error status, counts as online;
/// only a connectivity failure counts as offline.
pub fn spawn_probe<R>(remote: Arc<R>, connectivity: Connectivity, interval: Duration) -> JoinHandle<()>
where
    R: RemoteApi + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let online = match remote.ping().await {
                Ok(()) => true,
                Err(e) => !e.is_connectivity(),
            };
            connectivity.set_online(online);
        }
    })
}
