//! Minimal consensus-layer REST client (§4.6 step 1): only the one call the scanner needs —
//! the finalized header's associated execution-payload block number.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusClientError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("malformed consensus API response: {0}")]
    Malformed(&'static str),
}

#[derive(Debug, Deserialize)]
struct FinalizedBlockResponse {
    data: FinalizedBlockData,
}

#[derive(Debug, Deserialize)]
struct FinalizedBlockData {
    message: FinalizedBlockMessage,
}

#[derive(Debug, Deserialize)]
struct FinalizedBlockMessage {
    body: FinalizedBlockBody,
}

#[derive(Debug, Deserialize)]
struct FinalizedBlockBody {
    execution_payload: FinalizedExecutionPayload,
}

#[derive(Debug, Deserialize)]
struct FinalizedExecutionPayload {
    block_number: String,
}

pub struct ConsensusClient {
    client: Client,
    endpoint: String,
}

impl ConsensusClient {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().expect("failed to build reqwest client");
        Self { client, endpoint }
    }

    /// The execution-layer block number embedded in the latest finalized beacon block.
    pub async fn finalized_execution_block(&self) -> Result<u64, ConsensusClientError> {
        let url = format!("{}/eth/v2/beacon/blocks/finalized", self.endpoint.trim_end_matches('/'));
        let response: FinalizedBlockResponse = self.client.get(&url).send().await?.error_for_status()?.json().await?;
        response
            .data
            .message
            .body
            .execution_payload
            .block_number
            .parse()
            .map_err(|_| ConsensusClientError::Malformed("execution_payload.block_number"))
    }
}
