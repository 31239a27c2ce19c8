//! # Routes
//!
//! The nine read endpoints of the query facade. Identity and hash path
//! parameters are shape-validated before any replica lookup.

use crate::error::ApiError;
use crate::types::{
    BeneficiaryShare, DocumentResponse, StatsResponse, VaultsResponse, WillDetail, WillSummary,
};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use testament_projection::ReplicaReader;
use testament_types::{Address, ContentHash};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lock-free read path into the replica.
    pub reader: Arc<dyn ReplicaReader>,
    /// Whether error responses carry failure detail.
    pub dev_mode: bool,
}

/// Build the facade router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/wills/:testator", get(wills_by_testator))
        .route("/wills/beneficiary/:beneficiary", get(wills_by_beneficiary))
        .route("/will/:id", get(will_detail))
        .route("/beneficiaries/:beneficiary", get(wills_by_beneficiary))
        .route("/vaults/:will_id", get(vaults))
        .route("/documents/:will_id", get(documents))
        .route("/documents/:will_id/:hash", get(document_by_hash))
        .route("/stats", get(stats))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn parse_address(raw: &str) -> Result<Address, ApiError> {
    raw.parse()
        .map_err(|e: testament_types::AddressParseError| ApiError::invalid_identity(e.to_string()))
}

fn parse_hash(raw: &str) -> Result<ContentHash, ApiError> {
    raw.parse()
        .map_err(|e: testament_types::AddressParseError| ApiError::invalid_hash(e.to_string()))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "testament-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn wills_by_testator(
    State(state): State<AppState>,
    Path(testator): Path<String>,
) -> Result<Json<Vec<WillSummary>>, ApiError> {
    let testator = parse_address(&testator)?;
    let wills = state
        .reader
        .wills_of(&testator)
        .map_err(|e| ApiError::internal(state.dev_mode, e))?;
    Ok(Json(wills.into_iter().map(WillSummary::from).collect()))
}

async fn wills_by_beneficiary(
    State(state): State<AppState>,
    Path(beneficiary): Path<String>,
) -> Result<Json<Vec<BeneficiaryShare>>, ApiError> {
    let beneficiary = parse_address(&beneficiary)?;
    let entries = state
        .reader
        .wills_with_beneficiary(&beneficiary)
        .map_err(|e| ApiError::internal(state.dev_mode, e))?;
    Ok(Json(entries.into_iter().map(BeneficiaryShare::from).collect()))
}

async fn will_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WillDetail>, ApiError> {
    let id = parse_address(&id)?;
    let internal = |e| ApiError::internal(state.dev_mode, e);

    let will = state
        .reader
        .will(&id)
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found(format!("will {id}")))?;
    let beneficiaries = state.reader.beneficiaries_of(&id).map_err(internal)?;
    let vaults = state
        .reader
        .vaults_of(&id)
        .map_err(internal)?
        .unwrap_or_default();
    let documents = state.reader.documents_of(&id).map_err(internal)?;

    Ok(Json(WillDetail {
        will: WillSummary::from(will),
        beneficiaries: beneficiaries
            .into_iter()
            .map(BeneficiaryShare::from)
            .collect(),
        vaults: VaultsResponse::from(vaults),
        documents: documents.into_iter().map(DocumentResponse::from).collect(),
    }))
}

async fn vaults(
    State(state): State<AppState>,
    Path(will_id): Path<String>,
) -> Result<Json<VaultsResponse>, ApiError> {
    let will_id = parse_address(&will_id)?;
    let balances = state
        .reader
        .vaults_of(&will_id)
        .map_err(|e| ApiError::internal(state.dev_mode, e))?
        .ok_or_else(|| ApiError::not_found(format!("vaults for will {will_id}")))?;
    Ok(Json(VaultsResponse::from(balances)))
}

async fn documents(
    State(state): State<AppState>,
    Path(will_id): Path<String>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let will_id = parse_address(&will_id)?;
    let documents = state
        .reader
        .documents_of(&will_id)
        .map_err(|e| ApiError::internal(state.dev_mode, e))?;
    Ok(Json(documents.into_iter().map(DocumentResponse::from).collect()))
}

async fn document_by_hash(
    State(state): State<AppState>,
    Path((will_id, hash)): Path<(String, String)>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let will_id = parse_address(&will_id)?;
    let hash = parse_hash(&hash)?;
    let document = state
        .reader
        .document(&will_id, &hash)
        .map_err(|e| ApiError::internal(state.dev_mode, e))?
        .ok_or_else(|| ApiError::not_found(format!("document {hash}")))?;
    Ok(Json(DocumentResponse::from(document)))
}

async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state
        .reader
        .stats()
        .map_err(|e| ApiError::internal(state.dev_mode, e))?;
    Ok(Json(StatsResponse::from(stats)))
}
