use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ApiError;
use crate::services::jasaotp::de_string_or_number;

/// Stateless wrapper over the QRIS deposit gateway. Both endpoints take
/// form-encoded bodies with the API key as a field.
#[derive(Clone)]
pub struct AtlanticService {
    client: Client,
    api_key: String,
    base_url: String,
}

/// `deposit/create` success payload.
#[derive(Debug, Clone)]
pub struct DepositCreated {
    pub id: String,
    pub qr_string: String,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<CreateData>,
}

#[derive(Debug, Deserialize)]
struct CreateData {
    #[serde(deserialize_with = "de_string_or_number")]
    id: String,
    qr_string: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    data: Option<StatusData>,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    #[serde(default)]
    status: Option<String>,
}

impl AtlanticService {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client"),
            api_key,
            base_url,
        }
    }

    pub async fn create_deposit(
        &self,
        reff_id: &str,
        nominal: Decimal,
    ) -> Result<DepositCreated, ApiError> {
        let nominal = nominal.to_string();
        let form = [
            ("api_key", self.api_key.as_str()),
            ("reff_id", reff_id),
            ("nominal", nominal.as_str()),
            ("type", "ewallet"),
            ("metode", "qrisfast"),
        ];

        let body: CreateResponse = self
            .client
            .post(format!("{}/deposit/create", self.base_url))
            .form(&form)
            .send()
            .await?
            .json()
            .await?;
        if !body.status {
            return Err(ApiError::Upstream(body.message));
        }
        let data = body
            .data
            .ok_or_else(|| ApiError::Upstream("deposit response missing data".into()))?;
        Ok(DepositCreated {
            id: data.id,
            qr_string: data.qr_string,
        })
    }

    /// Gateway-side deposit state; anything unreadable maps to "unknown".
    pub async fn deposit_status(&self, payment_id: &str) -> Result<String, ApiError> {
        let form = [("api_key", self.api_key.as_str()), ("id", payment_id)];

        let body: StatusResponse = self
            .client
            .post(format!("{}/deposit/status", self.base_url))
            .form(&form)
            .send()
            .await?
            .json()
            .await?;
        Ok(body
            .data
            .and_then(|d| d.status)
            .unwrap_or_else(|| "unknown".into()))
    }
}
