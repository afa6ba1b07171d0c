use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use super::bearer_token;
use crate::errors::AppError;
use crate::models::Booking;
use crate::state::AppState;

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let token = bearer_token(&headers)?;
    Ok(Json(state.api.get_booking(&token, &id).await?))
}

// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let token = bearer_token(&headers)?;
    let booking = state.api.cancel_booking(&token, &id).await?;
    tracing::info!(booking_id = %id, status = booking.status.as_str(), "booking cancelled");
    Ok(Json(booking))
}

// POST /api/bookings/:id/confirm-pickup
pub async fn confirm_pickup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let token = bearer_token(&headers)?;
    let booking = state.api.confirm_pickup(&token, &id).await?;
    tracing::info!(booking_id = %id, "pickup confirmed");
    Ok(Json(booking))
}

// POST /api/bookings/:id/return
pub async fn return_car(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let token = bearer_token(&headers)?;
    let booking = state.api.return_car(&token, &id).await?;
    tracing::info!(booking_id = %id, "car returned");
    Ok(Json(booking))
}
