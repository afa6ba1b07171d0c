use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use super::bearer_token;
use crate::errors::AppError;
use crate::models::{
    Paged, TransactionQuery, Wallet, WalletAmountRequest, WalletMutation, WalletSnapshot,
    WalletTransaction,
};
use crate::services::wallet;
use crate::state::AppState;

// GET /api/wallet
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<WalletSnapshot>, AppError> {
    let token = bearer_token(&headers)?;
    Ok(Json(wallet::snapshot(&state, &token).await?))
}

// POST /api/wallet
pub async fn create_wallet(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Wallet>), AppError> {
    let token = bearer_token(&headers)?;
    let created = state.api.create_wallet(&token).await?;
    tracing::info!(wallet_id = %created.id, "wallet created");
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/wallet/transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Paged<WalletTransaction>>, AppError> {
    let token = bearer_token(&headers)?;
    let query = query.normalized();
    Ok(Json(state.api.list_transactions(&token, &query).await?))
}

// POST /api/wallet/top-up
pub async fn top_up(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<WalletAmountRequest>,
) -> Result<Json<Wallet>, AppError> {
    let token = bearer_token(&headers)?;
    let updated = wallet::apply_mutation(&state, &token, WalletMutation::TopUp, body.amount).await?;
    Ok(Json(updated))
}

// POST /api/wallet/withdraw
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<WalletAmountRequest>,
) -> Result<Json<Wallet>, AppError> {
    let token = bearer_token(&headers)?;
    let updated =
        wallet::apply_mutation(&state, &token, WalletMutation::Withdraw, body.amount).await?;
    Ok(Json(updated))
}
