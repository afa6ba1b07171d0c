use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use super::bearer_token;
use crate::errors::AppError;
use crate::models::{ChangePasswordRequest, UpdateProfileRequest, UserProfile};
use crate::services::booking_state::is_plausible_phone;
use crate::services::validation::ValidationErrors;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

// GET /api/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, AppError> {
    let token = bearer_token(&headers)?;
    Ok(Json(state.api.get_profile(&token).await?))
}

// PUT /api/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let token = bearer_token(&headers)?;

    let mut errors = ValidationErrors::new();
    if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        errors.add("name", "Name cannot be blank.");
    }
    if body.phone.as_deref().is_some_and(|p| !is_plausible_phone(p)) {
        errors.add("phone", "Please enter a valid phone number.");
    }
    errors.into_result().map_err(AppError::Validation)?;

    let profile = state.api.update_profile(&token, &body).await?;
    tracing::info!(user = %profile.id, "profile updated");
    Ok(Json(profile))
}

// PUT /api/profile/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers)?;

    let mut errors = ValidationErrors::new();
    if body.current_password.is_empty() {
        errors.add("current_password", "Please enter your current password.");
    }
    if body.new_password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "new_password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters."),
        );
    } else if body.new_password == body.current_password {
        errors.add("new_password", "New password must differ from the current one.");
    }
    errors.into_result().map_err(AppError::Validation)?;

    state.api.change_password(&token, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}
