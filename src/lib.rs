// src/lib.rs

use std::sync::Arc;

use crate::config::Config;
use crate::jobs::otp_poll::PollerRegistry;
use crate::services::atlantic::AtlanticService;
use crate::services::jasaotp::JasaOtpService;
use crate::storage::memory::{MemoryOrders, MemoryWallet};
use crate::storage::{OrderStore, WalletLedger};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub wallet: Arc<dyn WalletLedger>,
    pub orders: Arc<dyn OrderStore>,
    pub jasaotp: JasaOtpService,
    pub atlantic: AtlanticService,
    pub pollers: PollerRegistry,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let jasaotp = JasaOtpService::new(
            config.jasaotp_api_key.clone(),
            config.jasaotp_base_url.clone(),
        );
        let atlantic = AtlanticService::new(
            config.atlantic_api_key.clone(),
            config.atlantic_base_url.clone(),
        );
        Self {
            config: Arc::new(config),
            wallet: Arc::new(MemoryWallet::new()),
            orders: Arc::new(MemoryOrders::new()),
            jasaotp,
            atlantic,
            pollers: PollerRegistry::new(),
        }
    }
}

pub mod services {
    pub mod atlantic;
    pub mod jasaotp;
}

pub mod jobs {
    pub mod otp_poll;
}

pub mod handlers {
    pub mod catalog;
    pub mod order;
    pub mod payment;
}

pub mod models {
    pub mod catalog;
    pub mod order;
    pub mod payment;
}

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod storage;
