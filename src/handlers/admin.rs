use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use super::{bearer_token, require_role};
use crate::errors::AppError;
use crate::models::{Account, CarVerification, DashboardStats, PageRequest, Paged, Role};
use crate::state::AppState;

async fn admin_token(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    let token = bearer_token(headers)?;
    require_role(state, &token, Role::Admin).await?;
    Ok(token)
}

// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, AppError> {
    let token = admin_token(&state, &headers).await?;
    Ok(Json(state.api.dashboard_stats(&token).await?))
}

// GET /api/admin/accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(page): Query<PageRequest>,
) -> Result<Json<Paged<Account>>, AppError> {
    let token = admin_token(&state, &headers).await?;
    Ok(Json(state.api.list_accounts(&token, page.normalized()).await?))
}

// POST /api/admin/accounts/:id/toggle
pub async fn toggle_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Account>, AppError> {
    let token = admin_token(&state, &headers).await?;
    let account = state.api.toggle_account_status(&token, &id).await?;
    tracing::info!(account = %id, active = account.is_active, "account status toggled");
    Ok(Json(account))
}

// GET /api/admin/verifications
pub async fn list_verifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(page): Query<PageRequest>,
) -> Result<Json<Paged<CarVerification>>, AppError> {
    let token = admin_token(&state, &headers).await?;
    Ok(Json(
        state
            .api
            .list_car_verifications(&token, page.normalized())
            .await?,
    ))
}

// POST /api/admin/verifications/:car_id/toggle
pub async fn toggle_verification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(car_id): Path<String>,
) -> Result<Json<CarVerification>, AppError> {
    let token = admin_token(&state, &headers).await?;
    let verification = state.api.toggle_car_verification(&token, &car_id).await?;
    tracing::info!(car = %car_id, verified = verification.is_verified, "car verification toggled");
    Ok(Json(verification))
}
