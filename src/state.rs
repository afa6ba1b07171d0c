use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Duration, Utc};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{Wallet, WalletSnapshot};
use crate::services::api::RentalApi;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub api: Box<dyn RentalApi>,
    pub wallets: Mutex<HashMap<String, WalletSnapshot>>,
    /// One async lock per wizard session; a request holds it from load to save.
    session_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AppState {
    pub fn new(conn: Connection, config: AppConfig, api: Box<dyn RentalApi>) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            config,
            api,
            wallets: Mutex::new(HashMap::new()),
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal("database lock poisoned".to_string()))
    }

    /// The lock guarding session `id`. Locks nobody else holds are dropped
    /// from the map on the way.
    pub fn session_lock(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .session_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(id.to_string()).or_default())
    }

    fn wallet_max_age(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.config.wallet_cache_ttl_ms).unwrap_or(i64::MAX))
    }

    pub fn cached_wallet(&self, token: &str) -> Option<WalletSnapshot> {
        let (now, max_age) = (Utc::now(), self.wallet_max_age());
        self.wallets.lock().ok().and_then(|wallets| {
            wallets
                .get(token)
                .filter(|snapshot| snapshot.is_fresh(now, max_age))
                .cloned()
        })
    }

    /// Caches `snapshot` and evicts every entry that has gone stale.
    pub fn store_wallet(&self, token: &str, snapshot: WalletSnapshot) {
        let (now, max_age) = (Utc::now(), self.wallet_max_age());
        if let Ok(mut wallets) = self.wallets.lock() {
            wallets.retain(|_, cached| cached.is_fresh(now, max_age));
            wallets.insert(token.to_string(), snapshot);
        }
    }

    pub fn update_cached_balance(&self, token: &str, wallet: &Wallet) {
        if let Ok(mut wallets) = self.wallets.lock() {
            if let Some(snapshot) = wallets.get_mut(token) {
                snapshot.wallet = wallet.clone();
            }
        }
    }
}
