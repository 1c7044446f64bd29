//! §4.9 endpoint orchestrator: the eight HTTP routes the relayer exposes.

use std::net::SocketAddr;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dvt_relayer_core::env;
use dvt_relayer_core::prometheus_metrics::outcome;
use dvt_relayer_core::registry::ShareKind;
use dvt_relayer_shared::manager_signature::{Consolidate, Fund, FundValidator, Register, RegisterValidator};
use dvt_relayer_shared::signing_root;
use dvt_relayer_shared::util::usize_to_u64;
use dvt_relayer_shared::withdrawal_credentials::ValidatorType;
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::common::{encode_hex, parse_hex_fixed, ApiError, SharedState};

pub async fn launch(state: SharedState) {
    let app = build_router(state);
    let host: String = env::RELAYER_HOST.default("127.0.0.1".to_owned()).value;
    let port: u16 = env::RELAYER_PORT.default(8000u16).value;
    let addr: SocketAddr = format!("{host}:{port}").parse().expect("invalid RELAYER_HOST/RELAYER_PORT");

    let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind HTTP listener");
    tracing::info!(%addr, "Starting HTTP server");
    axum::serve(listener, app).await.expect("HTTP server exited unexpectedly");
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/fund", post(fund))
        .route("/withdraw", post(withdraw))
        .route("/consolidate", post(consolidate))
        .route("/exit-signature", post(exit_signature))
        .route("/exits", get(exits))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<SharedState>) -> StatusCode {
    if state.service.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(State(state): State<SharedState>) -> Response {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let families = state.service.prometheus_registry.gather();
    if let Err(e) = encoder.encode(&families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    ([("Content-Type", encoder.format_type().to_owned())], buffer).into_response()
}

fn now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

fn record(state: &SharedState, endpoint: &str, outcome: &str) {
    state.service.metrics.http.requests_total.with_label_values(&[endpoint, outcome]).inc();
}

#[derive(Deserialize)]
struct RegisterRequest {
    vault: String,
    validators_start_index: u64,
    amounts: Vec<u64>,
    validator_type: String,
}

#[derive(Serialize)]
struct ValidatorStatus {
    public_key: String,
    validator_index: u64,
    deposit_signature: Option<String>,
    exit_signature: Option<String>,
    is_signatures_ready: bool,
}

#[derive(Serialize)]
struct RegisterResponse {
    validators: Vec<ValidatorStatus>,
    validators_manager_signature: Option<String>,
}

fn parse_validator_type(raw: &str) -> Result<ValidatorType, ApiError> {
    match raw {
        "0x01" => Ok(ValidatorType::V1),
        "0x02" => Ok(ValidatorType::V2),
        other => Err(ApiError::Validation(format!(
            "validator_type: expected \"0x01\" or \"0x02\", got {other:?}"
        ))),
    }
}

async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let vault: Address = req
        .vault
        .parse()
        .map_err(|_| ApiError::Validation("vault: invalid address".to_owned()))?;
    let validator_type = parse_validator_type(&req.validator_type)?;

    let unregistered = state
        .service
        .unregistered_public_keys()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if unregistered.len() != req.amounts.len() {
        record(&state, "register", outcome::VALIDATION_ERROR);
        return Err(ApiError::Validation(format!(
            "amounts has {} entries but {} unregistered keys are pending",
            req.amounts.len(),
            unregistered.len()
        )));
    }

    let mut validators = Vec::with_capacity(unregistered.len());
    for (i, public_key) in unregistered.iter().enumerate() {
        let validator_index = req.validators_start_index + usize_to_u64(i);
        let validator = state
            .service
            .registry
            .get_or_create(*public_key, validator_index, vault, req.amounts[i], validator_type, now())
            .map_err(ApiError::from)?;
        validators.push(validator);
    }

    let all_ready = !validators.is_empty() && validators.iter().all(|v| v.is_signatures_ready());
    let validators_manager_signature = if all_ready {
        let validators_registry_root = state.service.validators_registry_client.get_deposit_root().await?;
        let sol_validators: Vec<RegisterValidator> = validators
            .iter()
            .map(|v| {
                let deposit_signature = v.deposit_signature.expect("checked all_ready above");
                let wc = v.withdrawal_credentials();
                RegisterValidator {
                    pubkey: v.public_key.to_vec().into(),
                    withdrawalCredentials: wc.to_vec().into(),
                    amount: v.amount,
                    signature: deposit_signature.to_vec().into(),
                    depositDataRoot: signing_root::deposit_data_root(v.public_key, wc, v.amount, deposit_signature),
                }
            })
            .collect();
        let hash = dvt_relayer_shared::manager_signature::register_signing_hash(
            state.service.network.chain_id,
            vault,
            validators_registry_root,
            sol_validators,
        );
        let signature = state.service.manager_signer.sign_hash(hash).await?;
        Some(encode_hex(&signature))
    } else {
        None
    };

    record(&state, "register", outcome::SUCCESS);
    Ok(Json(RegisterResponse {
        validators: validators
            .into_iter()
            .map(|v| ValidatorStatus {
                public_key: encode_hex(&v.public_key),
                validator_index: v.validator_index,
                deposit_signature: v.deposit_signature.map(|s| encode_hex(&s)),
                exit_signature: v.exit_signature.map(|s| encode_hex(&s)),
                is_signatures_ready: v.is_signatures_ready(),
            })
            .collect(),
        validators_manager_signature,
    }))
}

#[derive(Deserialize)]
struct FundRequest {
    vault: String,
    public_keys: Vec<String>,
    amounts: Vec<u64>,
}

#[derive(Serialize)]
struct ManagerSignatureResponse {
    validators_manager_signature: String,
}

async fn fund(
    State(state): State<SharedState>,
    Json(req): Json<FundRequest>,
) -> Result<Json<ManagerSignatureResponse>, ApiError> {
    let vault: Address = req
        .vault
        .parse()
        .map_err(|_| ApiError::Validation("vault: invalid address".to_owned()))?;
    if req.public_keys.is_empty() || req.public_keys.len() != req.amounts.len() {
        record(&state, "fund", outcome::VALIDATION_ERROR);
        return Err(ApiError::Validation("public_keys and amounts must be non-empty and equal length".to_owned()));
    }

    let mut sol_validators = Vec::with_capacity(req.public_keys.len());
    for (pk, amount) in req.public_keys.iter().zip(req.amounts.iter()) {
        let pubkey: [u8; 48] = parse_hex_fixed("public_keys[]", pk)?;
        sol_validators.push(FundValidator {
            pubkey: pubkey.to_vec().into(),
            amount: *amount,
        });
    }

    let nonce = state.service.vault_client.validators_manager_nonce(vault).await?;
    let hash = dvt_relayer_shared::manager_signature::fund_signing_hash(state.service.network.chain_id, vault, nonce, sol_validators);
    let signature = state.service.manager_signer.sign_hash(hash).await?;

    record(&state, "fund", outcome::SUCCESS);
    Ok(Json(ManagerSignatureResponse {
        validators_manager_signature: encode_hex(&signature),
    }))
}

#[derive(Deserialize)]
struct WithdrawRequest {
    vault: String,
    public_keys: Vec<String>,
    amounts: Vec<u64>,
}

async fn withdraw(
    State(state): State<SharedState>,
    Json(req): Json<WithdrawRequest>,
) -> Result<Json<ManagerSignatureResponse>, ApiError> {
    let vault: Address = req
        .vault
        .parse()
        .map_err(|_| ApiError::Validation("vault: invalid address".to_owned()))?;
    if req.public_keys.is_empty() || req.public_keys.len() != req.amounts.len() {
        record(&state, "withdraw", outcome::VALIDATION_ERROR);
        return Err(ApiError::Validation("public_keys and amounts must be non-empty and equal length".to_owned()));
    }

    let mut public_keys = Vec::with_capacity(req.public_keys.len());
    for pk in &req.public_keys {
        let pubkey: [u8; 48] = parse_hex_fixed("public_keys[]", pk)?;
        public_keys.push(pubkey.to_vec());
    }

    let nonce = state.service.vault_client.validators_manager_nonce(vault).await?;
    let hash = dvt_relayer_shared::manager_signature::withdraw_signing_hash(
        state.service.network.chain_id,
        vault,
        nonce,
        public_keys,
        req.amounts.clone(),
    );
    let signature = state.service.manager_signer.sign_hash(hash).await?;

    record(&state, "withdraw", outcome::SUCCESS);
    Ok(Json(ManagerSignatureResponse {
        validators_manager_signature: encode_hex(&signature),
    }))
}

#[derive(Deserialize)]
struct ConsolidateRequest {
    vault: String,
    source_public_keys: Vec<String>,
    target_public_keys: Vec<String>,
}

async fn consolidate(
    State(state): State<SharedState>,
    Json(req): Json<ConsolidateRequest>,
) -> Result<Json<ManagerSignatureResponse>, ApiError> {
    let vault: Address = req
        .vault
        .parse()
        .map_err(|_| ApiError::Validation("vault: invalid address".to_owned()))?;
    if req.source_public_keys.is_empty() || req.source_public_keys.len() != req.target_public_keys.len() {
        record(&state, "consolidate", outcome::VALIDATION_ERROR);
        return Err(ApiError::Validation(
            "source_public_keys and target_public_keys must be non-empty and equal length".to_owned(),
        ));
    }

    let mut sources = Vec::with_capacity(req.source_public_keys.len());
    for pk in &req.source_public_keys {
        let pubkey: [u8; 48] = parse_hex_fixed("source_public_keys[]", pk)?;
        sources.push(pubkey.to_vec());
    }
    let mut targets = Vec::with_capacity(req.target_public_keys.len());
    for pk in &req.target_public_keys {
        let pubkey: [u8; 48] = parse_hex_fixed("target_public_keys[]", pk)?;
        targets.push(pubkey.to_vec());
    }

    let nonce = state.service.vault_client.validators_manager_nonce(vault).await?;
    let hash =
        dvt_relayer_shared::manager_signature::consolidate_signing_hash(state.service.network.chain_id, vault, nonce, sources, targets);
    let signature = state.service.manager_signer.sign_hash(hash).await?;

    record(&state, "consolidate", outcome::SUCCESS);
    Ok(Json(ManagerSignatureResponse {
        validators_manager_signature: encode_hex(&signature),
    }))
}

#[derive(Deserialize)]
struct ExitShareItem {
    public_key: String,
    exit_signature: Option<String>,
    deposit_signature: Option<String>,
}

#[derive(Deserialize)]
struct ExitSignatureRequest {
    share_index: u64,
    shares: Vec<ExitShareItem>,
}

async fn exit_signature(State(state): State<SharedState>, Json(req): Json<ExitSignatureRequest>) -> Result<StatusCode, ApiError> {
    if req.shares.is_empty() {
        record(&state, "exit-signature", outcome::VALIDATION_ERROR);
        return Err(ApiError::Validation("shares must be non-empty".to_owned()));
    }

    let protocol_config = state
        .service
        .protocol_config
        .current()
        .ok_or_else(|| ApiError::Internal("protocol config not yet loaded".to_owned()))?;

    for share in &req.shares {
        let public_key: [u8; 48] = parse_hex_fixed("shares[].public_key", &share.public_key)?;

        if let Some(raw) = &share.exit_signature {
            let value: [u8; 96] = parse_hex_fixed("shares[].exit_signature", raw)?;
            state
                .service
                .registry
                .submit_share(
                    &public_key,
                    req.share_index,
                    value,
                    ShareKind::Exit,
                    state.service.network,
                    &protocol_config,
                    state.service.signature_threshold_override,
                )
                .map_err(ApiError::from)?;
        }
        if let Some(raw) = &share.deposit_signature {
            let value: [u8; 96] = parse_hex_fixed("shares[].deposit_signature", raw)?;
            state
                .service
                .registry
                .submit_share(
                    &public_key,
                    req.share_index,
                    value,
                    ShareKind::Deposit,
                    state.service.network,
                    &protocol_config,
                    state.service.signature_threshold_override,
                )
                .map_err(ApiError::from)?;
        }
    }

    record(&state, "exit-signature", outcome::SUCCESS);
    Ok(StatusCode::OK)
}

#[derive(Serialize)]
struct ExitEntry {
    public_key: String,
    validator_index: u64,
    validator_type: ValidatorType,
    amount: u64,
    vault: String,
    is_signatures_ready: bool,
    share_indexes_ready: Vec<u64>,
    created_at: u64,
}

async fn exits(State(state): State<SharedState>) -> Result<Json<Vec<ExitEntry>>, ApiError> {
    let validators = state.service.registry.list().map_err(ApiError::from)?;
    record(&state, "exits", outcome::SUCCESS);
    Ok(Json(
        validators
            .into_iter()
            .map(|v| ExitEntry {
                public_key: encode_hex(&v.public_key),
                validator_index: v.validator_index,
                validator_type: v.validator_type,
                amount: v.amount,
                vault: v.vault.to_string(),
                is_signatures_ready: v.is_signatures_ready(),
                share_indexes_ready: v.share_indexes_ready(),
                created_at: v.created_at,
            })
            .collect(),
    ))
}
