//! Storage seams for the wallet ledger and the order store.
//!
//! Both are trait objects on `AppState` so the in-memory maps can be
//! swapped for a durable backing store without touching the orchestration
//! flows.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::order::{Order, OrderPatch};

pub mod memory;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Saldo tidak cukup")]
pub struct InsufficientFunds;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("order not found")]
    NotFound,
    /// The order already reached `success` or `failed`; its status can
    /// no longer change.
    #[error("order sudah final")]
    Terminal,
}

/// Per-user balance ledger. Balances are created lazily at zero and
/// never go negative.
#[async_trait]
pub trait WalletLedger: Send + Sync {
    async fn balance(&self, user_id: &str) -> Decimal;
    /// Adds `amount` and returns the new balance. No upper bound.
    async fn credit(&self, user_id: &str, amount: Decimal) -> Decimal;
    /// Subtracts `amount` and returns the new balance. Fails without
    /// touching the balance when `amount` exceeds it.
    async fn debit(&self, user_id: &str, amount: Decimal) -> Result<Decimal, InsufficientFunds>;
    /// Idempotent zero-balance initialization.
    async fn ensure_user(&self, user_id: &str);
}

/// Order records keyed by order id.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Orders owned by `user_id`, most recent first.
    async fn list(&self, user_id: &str) -> Vec<Order>;
    async fn get(&self, order_id: &str) -> Option<Order>;
    /// Full replace keyed by `order_id`.
    async fn upsert(&self, order: Order);
    /// Shallow-merges `patch` onto an existing record. Fails with
    /// `NotFound` for unknown ids and with `Terminal` when the patch
    /// would move the status of an already-final order.
    async fn patch(&self, order_id: &str, patch: OrderPatch) -> Result<Order, StoreError>;
}
