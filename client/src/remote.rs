//! Remote REST API client.
//!
//! [`RemoteApi`] is the seam the rest of the crate talks to; [`HttpRemote`]
//! is the reqwest implementation. Transport failures (no route, refused
//! connection, timeout) come back as `ConnectivityFailure`; any answer from
//! the server outside 2xx comes back as `RemoteRejected`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use turbo_engine::{Record, Resource};

use crate::config::Config;
use crate::error::{ClientError, Result};

/// Operations the offline layer needs from the workshop API.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// List every record of a resource.
    async fn list(&self, resource: Resource) -> Result<Vec<Record>>;

    /// Fetch one record.
    async fn fetch(&self, resource: Resource, id: &str) -> Result<Record>;

    /// Create a record, returning the server's copy.
    async fn create(&self, resource: Resource, record: &Record) -> Result<Record>;

    /// Replace a record, returning the server's copy.
    async fn update(&self, resource: Resource, record: &Record) -> Result<Record>;

    /// Delete a record.
    async fn delete(&self, resource: Resource, id: &str) -> Result<()>;

    /// Cheap request used to tell whether the API is reachable.
    async fn ping(&self) -> Result<()>;
}

/// [`RemoteApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRemote {
    /// Build a client for `base_url` with a fixed per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Build a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut remote = Self::new(&config.api_base_url, config.request_timeout)?;
        remote.token = config.api_token.clone();
        Ok(remote)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let req = self.client.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "Request rejected by server");
        Err(ClientError::RemoteRejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn record(response: Response) -> Result<Record> {
        let value: Value = response.json().await?;
        Record::from_value(value).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn list(&self, resource: Resource) -> Result<Vec<Record>> {
        let response = self.send(self.request(Method::GET, resource.path())).await?;
        let values: Vec<Value> = response.json().await?;
        values
            .into_iter()
            .map(|v| Record::from_value(v).map_err(|e| ClientError::InvalidResponse(e.to_string())))
            .collect()
    }

    async fn fetch(&self, resource: Resource, id: &str) -> Result<Record> {
        let path = format!("{}/{}", resource.path(), id);
        let response = self.send(self.request(Method::GET, &path)).await?;
        Self::record(response).await
    }

    async fn create(&self, resource: Resource, record: &Record) -> Result<Record> {
        let req = self
            .request(Method::POST, resource.path())
            .json(&record.to_remote_payload());
        let response = self.send(req).await?;
        Self::record(response).await
    }

    async fn update(&self, resource: Resource, record: &Record) -> Result<Record> {
        let path = format!("{}/{}", resource.path(), record.id);
        let req = self
            .request(Method::PUT, &path)
            .json(&record.to_remote_payload());
        let response = self.send(req).await?;
        Self::record(response).await
    }

    async fn delete(&self, resource: Resource, id: &str) -> Result<()> {
        let path = format!("{}/{}", resource.path(), id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.send(self.request(Method::GET, "/")).await?;
        Ok(())
    }
}
