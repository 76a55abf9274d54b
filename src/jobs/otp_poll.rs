//! Background OTP poll job.
//!
//! Spawned once per committed order. Probes the provider's `sms.php` at a
//! fixed interval until a definitive SMS arrives, the attempt budget runs
//! out, or the registry's cancellation token fires. Writes exactly one
//! terminal patch to the order store, or none at all when cancelled.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use regex::Regex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::order::{OrderPatch, OrderStatus};
use crate::services::jasaotp::JasaOtpService;
use crate::storage::OrderStore;

/// 36 attempts at 15 seconds, about nine minutes end to end.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
const DEFAULT_MAX_ATTEMPTS: u32 = 36;

lazy_static! {
    /// Provider texts that mean "no SMS yet", e.g. "Menunggu SMS".
    static ref STILL_WAITING: Regex = Regex::new("(?i)menunggu|pending").expect("waiting regex");
    /// First 4-6 digit run is taken as the OTP code.
    static ref OTP_DIGITS: Regex = Regex::new(r"\d{4,6}").expect("digits regex");
}

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Supervised registry of in-flight pollers, keyed by order id. Holds a
/// cancellation token per task so a manual cancel can stop the poller
/// before its next store write.
#[derive(Clone, Default)]
pub struct PollerRegistry {
    inner: Arc<RwLock<HashMap<String, CancellationToken>>>,
}

impl PollerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token for `order_id`. A stale token under the same
    /// id is cancelled and replaced.
    pub fn register(&self, order_id: &str) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(stale) = self
            .inner
            .write()
            .insert(order_id.to_string(), token.clone())
        {
            stale.cancel();
        }
        token
    }

    /// Signals the poller for `order_id` to stop. Returns false when no
    /// poller is registered under that id.
    pub fn cancel(&self, order_id: &str) -> bool {
        match self.inner.write().remove(order_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn deregister(&self, order_id: &str) {
        self.inner.write().remove(order_id);
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.inner.read().contains_key(order_id)
    }
}

enum PollOutcome {
    Sms { otp: String, raw: String },
    Timeout,
    Cancelled,
}

/// Registers `order_id` and spawns the poll task. Fire and return; the
/// caller gets no handle beyond the registry entry.
pub fn start_otp_poll_job(
    jasaotp: JasaOtpService,
    orders: Arc<dyn OrderStore>,
    registry: PollerRegistry,
    order_id: String,
    cfg: PollConfig,
) {
    let token = registry.register(&order_id);
    tokio::spawn(async move {
        info!(order_id = %order_id, max_attempts = cfg.max_attempts, "OTP poll started");

        let patch = match poll_until_done(&jasaotp, &order_id, &token, cfg).await {
            PollOutcome::Sms { otp, raw } => {
                info!(order_id = %order_id, "definitive SMS received");
                OrderPatch {
                    status: Some(OrderStatus::Success),
                    otp: Some(otp),
                    raw: Some(raw),
                }
            }
            PollOutcome::Timeout => {
                warn!(order_id = %order_id, "OTP poll exhausted attempt budget");
                OrderPatch {
                    status: Some(OrderStatus::Failed),
                    otp: None,
                    raw: Some("timeout".into()),
                }
            }
            PollOutcome::Cancelled => {
                // The cancel flow owns the terminal state and already
                // removed the registry entry; touching it here could
                // clobber a replacement poller under the same id.
                info!(order_id = %order_id, "OTP poll cancelled");
                return;
            }
        };

        if let Err(e) = orders.patch(&order_id, patch).await {
            debug!(order_id = %order_id, error = %e, "terminal poll update dropped");
        }
        registry.deregister(&order_id);
    });
}

async fn poll_until_done(
    jasaotp: &JasaOtpService,
    order_id: &str,
    token: &CancellationToken,
    cfg: PollConfig,
) -> PollOutcome {
    for attempt in 1..=cfg.max_attempts {
        match jasaotp.fetch_sms(order_id).await {
            Ok(resp) => {
                let text = resp.data.and_then(|d| d.otp).unwrap_or_default();
                if let Some(otp) = definitive_otp(resp.success, &text) {
                    return PollOutcome::Sms { otp, raw: text };
                }
                debug!(order_id = %order_id, attempt, "no definitive SMS yet");
            }
            // Indistinguishable from "still waiting" as far as the
            // order is concerned; the next attempt retries.
            Err(e) => debug!(order_id = %order_id, attempt, error = %e, "sms probe failed"),
        }

        tokio::select! {
            _ = token.cancelled() => return PollOutcome::Cancelled,
            _ = sleep(cfg.interval) => {}
        }
    }
    PollOutcome::Timeout
}

/// Some(otp) when the provider text is a definitive SMS: a successful
/// reply with non-empty text that is not a "still waiting" marker. Falls
/// back to the full text when no 4-6 digit run is present.
fn definitive_otp(success: bool, text: &str) -> Option<String> {
    if !success || text.is_empty() || STILL_WAITING.is_match(text) {
        return None;
    }
    Some(
        OTP_DIGITS
            .find(text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| text.to_string()),
    )
}
