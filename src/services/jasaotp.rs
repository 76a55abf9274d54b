use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ApiError;

const COUNTRIES_CACHE_KEY: &str = "countries";

/// Client for the OTP-rental provider. Catalog prices are always fetched
/// live; only the country list goes through the TTL cache.
#[derive(Clone)]
pub struct JasaOtpService {
    client: Client,
    api_key: String,
    base_url: String,
    cache: Arc<Cache<String, Value>>,
}

/// `layanan.php` body: country code -> service code -> service object.
/// Items are kept as raw maps so unknown provider fields pass through.
pub type ServiceCatalog = HashMap<String, HashMap<String, serde_json::Map<String, Value>>>;

#[derive(Debug, Deserialize)]
struct CountriesResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct PlaceOrderResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<PlacedOrder>,
    #[serde(default)]
    message: String,
}

/// `order.php` success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacedOrder {
    #[serde(deserialize_with = "de_string_or_number")]
    pub order_id: String,
    pub number: String,
    #[serde(default)]
    pub app: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CancelResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<SmsData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmsData {
    #[serde(default)]
    pub otp: Option<String>,
}

impl JasaOtpService {
    pub fn new(api_key: String, base_url: String) -> Self {
        let cache = Cache::builder()
            .max_capacity(4)
            .time_to_live(Duration::from_secs(3600))
            .build();

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client"),
            api_key,
            base_url,
            cache: Arc::new(cache),
        }
    }

    /// Country list from `negara.php`, cached for an hour.
    pub async fn countries(&self) -> Result<Value, ApiError> {
        if let Some(hit) = self.cache.get(COUNTRIES_CACHE_KEY).await {
            tracing::debug!("countries served from cache");
            return Ok(hit);
        }

        let body: CountriesResponse = self
            .client
            .get(format!("{}/negara.php", self.base_url))
            .send()
            .await?
            .json()
            .await?;
        if !body.success {
            return Err(ApiError::Upstream(body.message));
        }

        self.cache
            .insert(COUNTRIES_CACHE_KEY.to_string(), body.data.clone())
            .await;
        Ok(body.data)
    }

    /// Full service catalog for one country from `layanan.php`. Never
    /// cached: quote and commit both re-read the current price.
    pub async fn service_catalog(&self, negara: &str) -> Result<ServiceCatalog, ApiError> {
        let catalog = self
            .client
            .get(format!("{}/layanan.php", self.base_url))
            .query(&[("negara", negara)])
            .send()
            .await?
            .json()
            .await?;
        Ok(catalog)
    }

    /// Current base price for (negara, layanan). Unknown entries price
    /// as zero and are left for `order.php` to reject.
    pub async fn catalog_price(&self, negara: &str, layanan: &str) -> Result<Decimal, ApiError> {
        let catalog = self.service_catalog(negara).await?;
        let price = catalog
            .get(negara)
            .and_then(|services| services.get(layanan))
            .and_then(|item| item.get("harga"))
            .map(decimal_from_value)
            .unwrap_or(Decimal::ZERO);
        Ok(price)
    }

    pub async fn place_order(
        &self,
        negara: &str,
        layanan: &str,
        operator: &str,
    ) -> Result<PlacedOrder, ApiError> {
        let body: PlaceOrderResponse = self
            .client
            .get(format!("{}/order.php", self.base_url))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("negara", negara),
                ("layanan", layanan),
                ("operator", operator),
            ])
            .send()
            .await?
            .json()
            .await?;
        if !body.success {
            return Err(ApiError::Upstream(body.message));
        }
        body.data
            .ok_or_else(|| ApiError::Upstream("order response missing data".into()))
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<(), ApiError> {
        let body: CancelResponse = self
            .client
            .get(format!("{}/cancel.php", self.base_url))
            .query(&[("api_key", self.api_key.as_str()), ("id", order_id)])
            .send()
            .await?
            .json()
            .await?;
        if !body.success {
            return Err(ApiError::Upstream(body.message));
        }
        Ok(())
    }

    /// One `sms.php` probe. Transport and decode failures surface as
    /// `Err` and are the poller's to ignore.
    pub async fn fetch_sms(&self, order_id: &str) -> Result<SmsResponse, reqwest::Error> {
        self.client
            .get(format!("{}/sms.php", self.base_url))
            .query(&[("api_key", self.api_key.as_str()), ("id", order_id)])
            .send()
            .await?
            .json()
            .await
    }
}

/// The provider is loose about numeric types; ids arrive as either
/// strings or numbers.
pub(crate) fn de_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// `harga` shows up as a number or a numeric string depending on the
/// catalog entry.
pub(crate) fn decimal_from_value(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(Decimal::from_f64)
            .unwrap_or(Decimal::ZERO),
        Value::String(s) => s.parse().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}
