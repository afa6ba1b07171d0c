pub mod account;
pub mod admin;
pub mod bookings;
pub mod cars;
pub mod health;
pub mod owner;
pub mod wallet;
pub mod wizard;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;

use crate::errors::AppError;
use crate::models::{Role, UserProfile};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/wizard", post(wizard::create_session))
        .route(
            "/api/wizard/:id",
            get(wizard::get_session)
                .patch(wizard::update_session)
                .delete(wizard::discard_session),
        )
        .route("/api/wizard/:id/refresh", post(wizard::refresh_session))
        .route("/api/wizard/:id/next", post(wizard::next_step))
        .route("/api/wizard/:id/prev", post(wizard::prev_step))
        .route("/api/wizard/:id/goto/:step", post(wizard::go_to_step))
        .route("/api/wizard/:id/confirm", post(wizard::confirm))
        .route("/api/cars", get(cars::search_cars))
        .route("/api/cars/:id", get(cars::get_car))
        .route("/api/cars/:id/availability", get(cars::availability))
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route("/api/bookings/:id/cancel", post(bookings::cancel_booking))
        .route(
            "/api/bookings/:id/confirm-pickup",
            post(bookings::confirm_pickup),
        )
        .route("/api/bookings/:id/return", post(bookings::return_car))
        .route(
            "/api/wallet",
            get(wallet::get_wallet).post(wallet::create_wallet),
        )
        .route("/api/wallet/transactions", get(wallet::list_transactions))
        .route("/api/wallet/top-up", post(wallet::top_up))
        .route("/api/wallet/withdraw", post(wallet::withdraw))
        .route(
            "/api/profile",
            get(account::get_profile).put(account::update_profile),
        )
        .route(
            "/api/profile/password",
            axum::routing::put(account::change_password),
        )
        .route("/api/owner/feedback", get(owner::feedback_reports))
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/accounts", get(admin::list_accounts))
        .route(
            "/api/admin/accounts/:id/toggle",
            post(admin::toggle_account),
        )
        .route("/api/admin/verifications", get(admin::list_verifications))
        .route(
            "/api/admin/verifications/:car_id/toggle",
            post(admin::toggle_verification),
        )
        .with_state(state)
}

/// The caller's bearer token, forwarded as-is to the rental API.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(AppError::Unauthorized)
}

/// Loads the caller's profile and checks its role. The rental API enforces
/// the same rule; this only avoids the round trip for the wrong audience.
pub(crate) async fn require_role(
    state: &AppState,
    token: &str,
    role: Role,
) -> Result<UserProfile, AppError> {
    let profile = state.api.get_profile(token).await?;
    if profile.role == Some(role) {
        Ok(profile)
    } else {
        tracing::warn!(user = %profile.id, required = ?role, "role check failed");
        Err(AppError::Forbidden(format!("requires {role:?} role")))
    }
}
