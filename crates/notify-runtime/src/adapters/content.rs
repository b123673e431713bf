//! IPFS gateway and subgraph GraphQL over HTTP.

use async_trait::async_trait;
use np_03_content_resolution::{ContentStore, ContentStoreError};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

pub struct HttpContentStore {
    client: reqwest::Client,
    ipfs_gateway: String,
}

impl HttpContentStore {
    pub fn new(client: reqwest::Client, ipfs_gateway: impl Into<String>) -> Self {
        Self {
            client,
            ipfs_gateway: ipfs_gateway.into(),
        }
    }

    pub fn ipfs_url(&self, cid: &str) -> String {
        format!("{}/{}", self.ipfs_gateway.trim_end_matches('/'), cid)
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn get_by_pointer(&self, pointer: &str) -> Result<Value, ContentStoreError> {
        let url = self.ipfs_url(pointer);
        debug!(url = %url, "[np-03] Fetching IPFS document");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ContentStoreError::Backend(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ContentStoreError::NotFound(pointer.to_string()));
        }
        response
            .error_for_status()
            .map_err(|e| ContentStoreError::Backend(e.to_string()))?
            .json()
            .await
            .map_err(|e| ContentStoreError::Backend(e.to_string()))
    }

    async fn query(&self, endpoint: &str, query: &str) -> Result<Value, ContentStoreError> {
        debug!(endpoint = %endpoint, "[np-03] Querying subgraph");

        self.client
            .post(endpoint)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| ContentStoreError::Backend(e.to_string()))?
            .error_for_status()
            .map_err(|e| ContentStoreError::Backend(e.to_string()))?
            .json()
            .await
            .map_err(|e| ContentStoreError::Backend(e.to_string()))
    }
}
