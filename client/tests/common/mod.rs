//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::{Notify, Semaphore};
use turbo_client::{ClientError, OfflineDb, RemoteApi, Result};
use turbo_engine::{Record, Resource};

/// In-memory stand-in for the workshop API.
#[derive(Default)]
pub struct MockRemote {
    offline: AtomicBool,
    rejected_ids: Mutex<HashSet<String>>,
    server: Mutex<HashMap<Resource, Vec<Record>>>,
    created: Mutex<Vec<(Resource, String)>>,
    create_calls: AtomicUsize,
    create_entered: Notify,
    create_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make creates of `id` fail with a 409.
    pub fn reject(&self, id: &str) {
        self.rejected_ids.lock().unwrap().insert(id.to_string());
    }

    /// Seed records the server already holds.
    pub fn seed(&self, resource: Resource, records: Vec<Value>) {
        let records = records
            .into_iter()
            .map(|v| Record::from_value(v).unwrap())
            .collect();
        self.server.lock().unwrap().insert(resource, records);
    }

    /// Ids successfully created, in call order.
    pub fn created_ids(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(_, id)| id.clone())
            .collect()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Hold every create until permits are added to the returned semaphore.
    pub fn gate_creates(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.create_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Resolves once a create call has started.
    pub async fn create_started(&self) {
        self.create_entered.notified().await;
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::ConnectivityFailure(
                "connection refused".into(),
            ));
        }
        Ok(())
    }

    fn not_found() -> ClientError {
        ClientError::RemoteRejected {
            status: 404,
            body: "{\"detail\":\"not found\"}".into(),
        }
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn list(&self, resource: Resource) -> Result<Vec<Record>> {
        self.check_online()?;
        Ok(self
            .server
            .lock()
            .unwrap()
            .get(&resource)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch(&self, resource: Resource, id: &str) -> Result<Record> {
        self.check_online()?;
        self.server
            .lock()
            .unwrap()
            .get(&resource)
            .and_then(|records| records.iter().find(|r| r.id == id).cloned())
            .ok_or_else(Self::not_found)
    }

    async fn create(&self, resource: Resource, record: &Record) -> Result<Record> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.create_entered.notify_one();

        let gate = self.create_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        self.check_online()?;
        if self.rejected_ids.lock().unwrap().contains(&record.id) {
            return Err(ClientError::RemoteRejected {
                status: 409,
                body: "{\"detail\":\"duplicate\"}".into(),
            });
        }

        let stored = Record::from_value(record.to_remote_payload()).unwrap();
        self.server
            .lock()
            .unwrap()
            .entry(resource)
            .or_default()
            .push(stored.clone());
        self.created
            .lock()
            .unwrap()
            .push((resource, record.id.clone()));
        Ok(stored)
    }

    async fn update(&self, resource: Resource, record: &Record) -> Result<Record> {
        self.check_online()?;
        let mut server = self.server.lock().unwrap();
        let records = server.entry(resource).or_default();
        let stored = Record::from_value(record.to_remote_payload()).unwrap();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = stored.clone(),
            None => return Err(Self::not_found()),
        }
        Ok(stored)
    }

    async fn delete(&self, resource: Resource, id: &str) -> Result<()> {
        self.check_online()?;
        if let Some(records) = self.server.lock().unwrap().get_mut(&resource) {
            records.retain(|r| r.id != id);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.check_online()
    }
}

/// A fresh temp directory and an [`OfflineDb`] inside it.
pub async fn open_db() -> (TempDir, Arc<OfflineDb>) {
    let tmp = tempfile::tempdir().unwrap();
    let db = OfflineDb::open(tmp.path().join("store"), tmp.path().join("mirror")).await;
    (tmp, Arc::new(db))
}

pub fn record(value: Value) -> Record {
    Record::from_value(value).unwrap()
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
