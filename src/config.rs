use std::env;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::warn;

use crate::jobs::otp_poll::PollConfig;

const ENV_BIND_ADDR: &str = "BIND_ADDR";
const ENV_JASAOTP_API_KEY: &str = "JASAOTP_API_KEY";
const ENV_JASAOTP_BASE_URL: &str = "JASAOTP_BASE_URL";
const ENV_ATLANTIC_API_KEY: &str = "ATLANTIC_API_KEY";
const ENV_ATLANTIC_BASE_URL: &str = "ATLANTIC_BASE_URL";
const ENV_ORDER_MARGIN: &str = "ORDER_MARGIN";
const ENV_POLL_INTERVAL: &str = "OTP_POLL_INTERVAL_SECS";
const ENV_POLL_MAX_ATTEMPTS: &str = "OTP_POLL_MAX_ATTEMPTS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_JASAOTP_BASE_URL: &str = "https://api.jasaotp.id/v1";
const DEFAULT_ATLANTIC_BASE_URL: &str = "https://atlantich2h.com";

/// Runtime configuration, read once at startup from the environment
/// (`.env` is loaded by `main` before this runs).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub jasaotp_api_key: String,
    pub jasaotp_base_url: String,
    pub atlantic_api_key: String,
    pub atlantic_base_url: String,
    /// Fixed markup added on top of the upstream catalog price.
    pub margin: Decimal,
    pub poll: PollConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let jasaotp_api_key = env::var(ENV_JASAOTP_API_KEY).unwrap_or_default();
        if jasaotp_api_key.is_empty() {
            warn!("JASAOTP_API_KEY not set - upstream OTP calls will be rejected");
        }
        let atlantic_api_key = env::var(ENV_ATLANTIC_API_KEY).unwrap_or_default();
        if atlantic_api_key.is_empty() {
            warn!("ATLANTIC_API_KEY not set - QRIS deposits will be rejected");
        }

        let margin = env::var(ENV_ORDER_MARGIN)
            .ok()
            .and_then(|s| s.parse::<Decimal>().ok())
            .unwrap_or(Decimal::ZERO);

        let defaults = PollConfig::default();
        let poll = PollConfig {
            interval: env::var(ENV_POLL_INTERVAL)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
            max_attempts: env::var(ENV_POLL_MAX_ATTEMPTS)
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(defaults.max_attempts),
        };

        Self {
            bind_addr: env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
            jasaotp_api_key,
            jasaotp_base_url: env::var(ENV_JASAOTP_BASE_URL)
                .unwrap_or_else(|_| DEFAULT_JASAOTP_BASE_URL.into()),
            atlantic_api_key,
            atlantic_base_url: env::var(ENV_ATLANTIC_BASE_URL)
                .unwrap_or_else(|_| DEFAULT_ATLANTIC_BASE_URL.into()),
            margin,
            poll,
        }
    }
}
