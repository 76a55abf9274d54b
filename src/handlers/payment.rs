use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::payment::{
    CreateDepositRequest, CreateDepositResponse, DepositStatusQuery, DepositStatusResponse,
};
use crate::AppState;

const DEPOSIT_TTL_MINUTES: i64 = 15;

/// POST /payment/create - open a QRIS deposit at the gateway. The
/// deposit is not linked to any pending purchase; the client polls the
/// status and decides when to commit.
pub async fn create_deposit(
    State(state): State<AppState>,
    Json(req): Json<CreateDepositRequest>,
) -> Result<Json<CreateDepositResponse>, ApiError> {
    let nominal = req
        .nominal
        .filter(|n| *n > Decimal::ZERO)
        .ok_or_else(|| ApiError::Validation("nominal invalid".into()))?;

    // Short uppercase reference, first segment of a v4 uuid.
    let reff_id = Uuid::new_v4()
        .to_string()
        .split('-')
        .next()
        .unwrap_or_default()
        .to_uppercase();

    let deposit = state.atlantic.create_deposit(&reff_id, nominal).await?;
    let expired_at = Utc::now() + Duration::minutes(DEPOSIT_TTL_MINUTES);

    info!(payment_id = %deposit.id, reff_id = %reff_id, nominal = %nominal, "deposit created");
    Ok(Json(CreateDepositResponse {
        ok: true,
        payment_id: deposit.id,
        reff_id,
        qr_payload: deposit.qr_string,
        expired_at,
    }))
}

/// GET /payment/status?id= - gateway-side deposit state.
pub async fn deposit_status(
    State(state): State<AppState>,
    Query(query): Query<DepositStatusQuery>,
) -> Result<Json<DepositStatusResponse>, ApiError> {
    let id = query
        .id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("id required".into()))?;

    let status = state.atlantic.deposit_status(&id).await?;
    Ok(Json(DepositStatusResponse { ok: true, status }))
}
