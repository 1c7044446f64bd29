//! Fetches content-addressed blobs referenced by `ConfigUpdated` events and the genesis
//! validators dump, trying each configured gateway in order until one succeeds.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IpfsError {
    #[error("no IPFS endpoints configured")]
    NoEndpointsConfigured,
    #[error("all {attempted} configured IPFS endpoints failed for hash {hash}; last error: {last}")]
    AllEndpointsFailed {
        attempted: usize,
        hash: String,
        last: String,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub struct IpfsClient {
    client: Client,
    endpoints: Vec<String>,
}

impl IpfsClient {
    pub fn new(endpoints: Vec<String>, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().expect("failed to build reqwest client");
        Self { client, endpoints }
    }

    fn url_for(endpoint: &str, hash: &str) -> String {
        let endpoint = endpoint.trim_end_matches('/');
        format!("{endpoint}/ipfs/{hash}")
    }

    pub async fn fetch_bytes(&self, hash: &str) -> Result<Vec<u8>, IpfsError> {
        if self.endpoints.is_empty() {
            return Err(IpfsError::NoEndpointsConfigured);
        }

        let mut last_error = String::new();
        for endpoint in &self.endpoints {
            let url = Self::url_for(endpoint, hash);
            match self.client.get(&url).send().await {
                Ok(response) => match response.error_for_status() {
                    Ok(response) => match response.bytes().await {
                        Ok(bytes) => return Ok(bytes.to_vec()),
                        Err(e) => last_error = e.to_string(),
                    },
                    Err(e) => last_error = e.to_string(),
                },
                Err(e) => last_error = e.to_string(),
            }
        }

        Err(IpfsError::AllEndpointsFailed {
            attempted: self.endpoints.len(),
            hash: hash.to_owned(),
            last: last_error,
        })
    }

    pub async fn fetch_json<T: serde::de::DeserializeOwned>(&self, hash: &str) -> Result<T, IpfsError> {
        let bytes = self.fetch_bytes(hash).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_gateway_url_without_double_slash() {
        assert_eq!(
            IpfsClient::url_for("https://gateway.example/", "Qm123"),
            "https://gateway.example/ipfs/Qm123"
        );
    }

    #[tokio::test]
    async fn reports_no_endpoints_configured() {
        let client = IpfsClient::new(vec![], Duration::from_secs(1));
        let result = client.fetch_bytes("Qm123").await;
        assert!(matches!(result, Err(IpfsError::NoEndpointsConfigured)));
    }
}
