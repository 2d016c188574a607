//! Network interception layer.
//!
//! Reads go to the remote API first and fall back to local data when the
//! request cannot reach the server. Writes are passed through untouched: the
//! caller has to see a failed write so it can save the record locally and
//! let the next sync run push it.

use std::sync::Arc;

use turbo_engine::{Record, Resource};

use crate::error::Result;
use crate::remote::RemoteApi;
use crate::storage::OfflineDb;

/// A read result, tagged with whether it came from local data.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    /// True when served from the local cache; the data may be stale
    pub degraded: bool,
}

impl<T> Fetched<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            degraded: false,
        }
    }

    pub fn cached(data: T) -> Self {
        Self {
            data,
            degraded: true,
        }
    }
}

/// Wraps a [`RemoteApi`] and serves reads from [`OfflineDb`] when offline.
pub struct NetworkInterceptor<R> {
    remote: Arc<R>,
    db: Arc<OfflineDb>,
}

impl<R> Clone for NetworkInterceptor<R> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            db: Arc::clone(&self.db),
        }
    }
}

impl<R: RemoteApi> NetworkInterceptor<R> {
    pub fn new(remote: Arc<R>, db: Arc<OfflineDb>) -> Self {
        Self { remote, db }
    }

    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    pub fn db(&self) -> &Arc<OfflineDb> {
        &self.db
    }

    /// List a resource, falling back to local data on connectivity failure.
    pub async fn list(&self, resource: Resource) -> Result<Fetched<Vec<Record>>> {
        match self.remote.list(resource).await {
            Ok(records) => {
                if let Some(partition) = resource.offline_partition() {
                    self.db.cache_remote(partition, &records).await;
                }
                Ok(Fetched::live(records))
            }
            Err(e) if e.is_connectivity() => {
                let records = match resource.offline_partition() {
                    Some(partition) => self.db.all(partition).await,
                    None => Vec::new(),
                };
                tracing::info!(
                    resource = %resource,
                    records = records.len(),
                    "Serving cached data: {}",
                    e
                );
                Ok(Fetched::cached(records))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch one record, falling back to local data on connectivity failure.
    ///
    /// A live read always yields `Some`; a cached read yields `None` when the
    /// record is not held locally.
    pub async fn get(&self, resource: Resource, id: &str) -> Result<Fetched<Option<Record>>> {
        match self.remote.fetch(resource, id).await {
            Ok(record) => {
                if let Some(partition) = resource.offline_partition() {
                    self.db
                        .cache_remote(partition, std::slice::from_ref(&record))
                        .await;
                }
                Ok(Fetched::live(Some(record)))
            }
            Err(e) if e.is_connectivity() => {
                let record = match resource.offline_partition() {
                    Some(partition) => self.db.get(partition, id).await,
                    None => None,
                };
                tracing::info!(resource = %resource, id = %id, "Serving cached record: {}", e);
                Ok(Fetched::cached(record))
            }
            Err(e) => Err(e),
        }
    }

    /// Create a record remotely. Failures are returned as-is.
    pub async fn create(&self, resource: Resource, record: &Record) -> Result<Record> {
        self.remote.create(resource, record).await
    }

    /// Update a record remotely. Failures are returned as-is.
    pub async fn update(&self, resource: Resource, record: &Record) -> Result<Record> {
        self.remote.update(resource, record).await
    }

    /// Delete a record remotely, then drop the local copy.
    pub async fn delete(&self, resource: Resource, id: &str) -> Result<()> {
        self.remote.delete(resource, id).await?;
        if let Some(partition) = resource.offline_partition() {
            self.db.delete(partition, id).await?;
        }
        Ok(())
    }
}
