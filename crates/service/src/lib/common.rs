//! Shared HTTP plumbing: the `Service` value wrapped for axum's `State` extractor, hex
//! (de)serialization helpers, and the domain-error → status-code mapping from §7.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dvt_relayer_core::service::{BootstrapError, Service, TickError};
use serde::Serialize;

pub struct AppState {
    pub service: Service,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn log_config_full(&self) {
        tracing::info!(
            network = self.service.network.chain_id,
            configured_public_keys = self.service.configured_public_keys.len(),
            "Service bootstrapped",
        );
    }
}

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Internal(String),
    InvalidSignature(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::InvalidSignature(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::Validation(m) | ApiError::Internal(m) | ApiError::InvalidSignature(m) => m,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.message().to_owned(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<TickError> for ApiError {
    fn from(e: TickError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<BootstrapError> for ApiError {
    fn from(e: BootstrapError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<dvt_relayer_core::eth_client::ContractError> for ApiError {
    fn from(e: dvt_relayer_core::eth_client::ContractError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<dvt_relayer_core::manager_signer::ManagerSignerError> for ApiError {
    fn from(e: dvt_relayer_core::manager_signer::ManagerSignerError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<dvt_relayer_core::registry::RegistryError> for ApiError {
    fn from(e: dvt_relayer_core::registry::RegistryError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// Decodes a `0x`-prefixed (or bare) hex string into a fixed-size array, the wire format for
/// every public key / signature field in the HTTP surface (§6).
pub fn parse_hex_fixed<const N: usize>(field: &str, s: &str) -> Result<[u8; N], ApiError> {
    let bytes = hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| ApiError::Validation(format!("{field}: invalid hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| ApiError::Validation(format!("{field}: expected {N} bytes")))
}

pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_fixed_round_trips_with_encode_hex() {
        let bytes: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];
        let encoded = encode_hex(&bytes);
        assert_eq!(encoded, "0xdeadbeef");
        let decoded: [u8; 4] = parse_hex_fixed("field", &encoded).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn parse_hex_fixed_accepts_bare_hex_without_0x_prefix() {
        let decoded: [u8; 2] = parse_hex_fixed("field", "cafe").unwrap();
        assert_eq!(decoded, [0xca, 0xfe]);
    }

    #[test]
    fn parse_hex_fixed_rejects_wrong_length() {
        let err = parse_hex_fixed::<4>("field", "0xcafe").unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m.contains("expected 4 bytes")));
    }

    #[test]
    fn parse_hex_fixed_rejects_invalid_hex() {
        let err = parse_hex_fixed::<2>("field", "0xzz").unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m.contains("invalid hex")));
    }

    #[test]
    fn api_error_status_codes_match_error_kind() {
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Internal("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::InvalidSignature("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
