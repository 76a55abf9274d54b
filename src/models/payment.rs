use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDepositRequest {
    pub nominal: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepositResponse {
    pub ok: bool,
    pub payment_id: String,
    pub reff_id: String,
    /// Raw QRIS payload string from the gateway; rendering it into an
    /// image is left to the client.
    pub qr_payload: String,
    pub expired_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepositStatusQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DepositStatusResponse {
    pub ok: bool,
    pub status: String,
}
