use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::models::order::{Order, OrderPatch};
use crate::storage::{InsufficientFunds, OrderStore, StoreError, WalletLedger};

/// Process-local wallet ledger. Each operation takes the write lock for
/// its whole read-modify-write, so concurrent debits cannot interleave
/// between the check and the subtraction.
pub struct MemoryWallet {
    balances: RwLock<HashMap<String, Decimal>>,
}

impl MemoryWallet {
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletLedger for MemoryWallet {
    async fn balance(&self, user_id: &str) -> Decimal {
        self.balances
            .read()
            .get(user_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    async fn credit(&self, user_id: &str, amount: Decimal) -> Decimal {
        let mut balances = self.balances.write();
        let entry = balances.entry(user_id.to_string()).or_insert(Decimal::ZERO);
        *entry += amount;
        *entry
    }

    async fn debit(&self, user_id: &str, amount: Decimal) -> Result<Decimal, InsufficientFunds> {
        let mut balances = self.balances.write();
        let entry = balances.entry(user_id.to_string()).or_insert(Decimal::ZERO);
        if amount > *entry {
            return Err(InsufficientFunds);
        }
        *entry -= amount;
        Ok(*entry)
    }

    async fn ensure_user(&self, user_id: &str) {
        self.balances
            .write()
            .entry(user_id.to_string())
            .or_insert(Decimal::ZERO);
    }
}

pub struct MemoryOrders {
    orders: RwLock<HashMap<String, Order>>,
}

impl MemoryOrders {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryOrders {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for MemoryOrders {
    async fn list(&self, user_id: &str) -> Vec<Order> {
        let mut owned: Vec<Order> = self
            .orders
            .read()
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        owned
    }

    async fn get(&self, order_id: &str) -> Option<Order> {
        self.orders.read().get(order_id).cloned()
    }

    async fn upsert(&self, order: Order) {
        self.orders.write().insert(order.order_id.clone(), order);
    }

    async fn patch(&self, order_id: &str, patch: OrderPatch) -> Result<Order, StoreError> {
        let mut orders = self.orders.write();
        let order = orders.get_mut(order_id).ok_or(StoreError::NotFound)?;
        if patch.status.is_some() && order.status.is_terminal() {
            return Err(StoreError::Terminal);
        }
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(otp) = patch.otp {
            order.otp = Some(otp);
        }
        if let Some(raw) = patch.raw {
            order.raw = Some(raw);
        }
        Ok(order.clone())
    }
}
