//! Loan endpoints
//!
//! Legacy route table (byte-compatible with existing browser clients):
//! - get_loan: `GET /get_loan/:id`
//! - add_loan: `GET /add_loan/:loan` (`id-location-timestamp-lender-vessel`)
//! - get_all_loan: `GET /get_all_loan`
//! - change_lender: `GET /change_lender/:lender` (`id-name`)
//!
//! JSON API:
//! - api_loans: `GET /api/loans`
//! - api_loan_detail: `GET /api/loans/:id`
//! - api_loan_create: `POST /api/loans`
//! - api_loan_change_lender: `PUT /api/loans/:id/lender`

use crate::{ApiError, AppState};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lendweb_core::{
    codec, CoreError, LenderChange, LenderName, LoanInput, LENDER_NOT_FOUND_SENTINEL,
    LOAN_NOT_FOUND_SENTINEL,
};

/// A ledger miss on a legacy route: the sentinel text, or a structured 404
fn legacy_miss(state: &AppState, sentinel: &'static str, error: CoreError) -> Result<Response, ApiError> {
    if state.config.wire.legacy_sentinels {
        Ok(sentinel.into_response())
    } else {
        Err(error.into())
    }
}

// ==================== Legacy route table ====================

pub async fn get_loan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match state.controller.get_loan(&id).await {
        Ok(loan) => Ok(Json(loan).into_response()),
        Err(error @ CoreError::LoanNotFound { .. }) => legacy_miss(&state, LOAN_NOT_FOUND_SENTINEL, error),
        Err(error) => Err(error.into()),
    }
}

pub async fn add_loan(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Response, ApiError> {
    let new_loan = codec::decode_loan_segment(&segment)?;
    let receipt = state.controller.add_loan(new_loan).await?;
    Ok(Json(receipt).into_response())
}

pub async fn get_all_loan(State(state): State<AppState>) -> Result<Response, ApiError> {
    let entries = state.controller.get_all_loan().await?;
    Ok(Json(entries).into_response())
}

pub async fn change_lender(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Response, ApiError> {
    let change = codec::decode_lender_segment(&segment)?;
    match state.controller.change_lender(change).await {
        Ok(receipt) => Ok(Json(receipt).into_response()),
        Err(error @ CoreError::LoanNotFound { .. }) => legacy_miss(&state, LENDER_NOT_FOUND_SENTINEL, error),
        Err(error) => Err(error.into()),
    }
}

// ==================== JSON API ====================

pub async fn api_loans(State(state): State<AppState>) -> Result<Response, ApiError> {
    get_all_loan(State(state)).await
}

pub async fn api_loan_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let loan = state.controller.get_loan(&id).await?;
    Ok(Json(loan).into_response())
}

pub async fn api_loan_create(
    State(state): State<AppState>,
    Json(input): Json<LoanInput>,
) -> Result<Response, ApiError> {
    let receipt = state.controller.add_loan(input.to_new_loan()).await?;
    Ok((StatusCode::CREATED, Json(receipt)).into_response())
}

pub async fn api_loan_change_lender(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<LenderName>,
) -> Result<Response, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest {
            message: "lender name must not be empty".to_string(),
        });
    }
    let receipt = state
        .controller
        .change_lender(LenderChange { id, lender: body.name })
        .await?;
    Ok(Json(receipt).into_response())
}
