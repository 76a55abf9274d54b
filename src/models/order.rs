use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Success,
    Failed,
}

impl OrderStatus {
    /// `success` and `failed` are terminal; no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

/// One purchased number. Field names follow the upstream provider's
/// Indonesian vocabulary (negara = country, layanan = service,
/// nomor = assigned number, aplikasi = app label).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub negara: String,
    pub layanan: String,
    pub operator: String,
    pub aplikasi: String,
    pub nomor: String,
    pub price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub otp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Shallow-merge update applied by the poller or the cancel flow.
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub otp: Option<String>,
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub negara: Option<String>,
    pub layanan: Option<String>,
}

impl QuoteRequest {
    pub fn require(self) -> Result<(String, String), ApiError> {
        match (self.negara, self.layanan) {
            (Some(n), Some(l)) if !n.is_empty() && !l.is_empty() => Ok((n, l)),
            _ => Err(ApiError::Validation("negara & layanan wajib".into())),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub ok: bool,
    pub price: Decimal,
    pub saldo: Decimal,
    pub need_topup: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitRequest {
    pub negara: Option<String>,
    pub layanan: Option<String>,
    pub operator: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub ok: bool,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub ok: bool,
    pub data: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub ok: bool,
    pub data: Order,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub ok: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_order() -> Order {
        Order {
            order_id: "123".into(),
            user_id: "demo-user".into(),
            negara: "62".into(),
            layanan: "wa".into(),
            operator: "any".into(),
            aplikasi: "WhatsApp".into(),
            nomor: "6281234567890".into(),
            price: dec!(15000),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            otp: None,
            raw: None,
        }
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Success.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
    }

    #[test]
    fn test_order_wire_field_names() {
        let json = serde_json::to_value(sample_order()).unwrap();
        assert!(json.get("orderId").is_some());
        assert!(json.get("userId").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("nomor").is_some());
        // raw is omitted until the poller fills it in
        assert!(json.get("raw").is_none());
    }

    #[test]
    fn test_quote_request_requires_both_fields() {
        let ok = QuoteRequest {
            negara: Some("62".into()),
            layanan: Some("wa".into()),
        };
        assert!(ok.require().is_ok());

        let missing = QuoteRequest {
            negara: Some("62".into()),
            layanan: None,
        };
        assert!(missing.require().is_err());

        let empty = QuoteRequest {
            negara: Some("".into()),
            layanan: Some("wa".into()),
        };
        assert!(empty.require().is_err());
    }
}
