use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::models::{TransactionQuery, Wallet, WalletMutation, WalletSnapshot};
use crate::services::api::ApiError;
use crate::state::AppState;

/// Loads balance and the first page of history in one go.
pub async fn load_snapshot(state: &AppState, token: &str) -> Result<WalletSnapshot, ApiError> {
    let wallet = state.api.get_wallet(token).await?;
    let page = state
        .api
        .list_transactions(token, &TransactionQuery::first_page())
        .await?;
    Ok(WalletSnapshot {
        wallet,
        transactions: page.data,
        pagination: Some(page.pagination),
        refreshed_at: Utc::now(),
    })
}

/// Cached snapshot when present, otherwise a fresh one.
pub async fn snapshot(state: &Arc<AppState>, token: &str) -> Result<WalletSnapshot, ApiError> {
    if let Some(cached) = state.cached_wallet(token) {
        return Ok(cached);
    }
    let fresh = load_snapshot(state, token).await?;
    state.store_wallet(token, fresh.clone());
    Ok(fresh)
}

pub async fn apply_mutation(
    state: &Arc<AppState>,
    token: &str,
    mutation: WalletMutation,
    amount: i64,
) -> Result<Wallet, ApiError> {
    if amount <= 0 {
        return Err(ApiError::Rejected {
            status: 400,
            message: "amount must be positive".to_string(),
        });
    }

    let wallet = state.api.mutate_wallet(token, mutation, amount).await?;
    tracing::info!(?mutation, amount, balance = wallet.balance, "wallet updated");

    state.update_cached_balance(token, &wallet);
    schedule_refresh(
        Arc::clone(state),
        token.to_string(),
        Duration::from_millis(state.config.wallet_refresh_delay_ms),
    );
    Ok(wallet)
}

/// Best-effort refetch after a mutation. Runs on a fixed delay rather than
/// waiting on anything, and gives up silently on failure.
pub fn schedule_refresh(state: Arc<AppState>, token: String, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match load_snapshot(&state, &token).await {
            Ok(snapshot) => {
                tracing::debug!(balance = snapshot.wallet.balance, "wallet refreshed");
                state.store_wallet(&token, snapshot);
            }
            Err(e) => {
                tracing::warn!(error = %e, "wallet refresh failed");
            }
        }
    });
}
