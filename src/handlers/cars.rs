use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::bearer_token;
use crate::errors::AppError;
use crate::models::occupancy::{
    is_range_occupied, max_return_date, nearest_occupied_start, rental_days,
};
use crate::models::{CarDetail, CarSearchQuery, CarSummary, OccupiedDateRange, Paged};
use crate::state::AppState;

// GET /api/cars
#[derive(Serialize)]
pub struct SearchResponse {
    /// Normalised filters, for writing back into the page's query string.
    query: CarSearchQuery,
    results: Paged<CarSummary>,
}

pub async fn search_cars(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CarSearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let token = bearer_token(&headers)?;
    let query = query.normalized();
    let results = state.api.search_cars(&token, &query).await?;
    tracing::debug!(
        total = results.pagination.total_records,
        page = results.pagination.page_number,
        "car search"
    );
    Ok(Json(SearchResponse { query, results }))
}

// GET /api/cars/:id
pub async fn get_car(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CarDetail>, AppError> {
    let token = bearer_token(&headers)?;
    Ok(Json(state.api.get_car(&token, &id).await?))
}

// GET /api/cars/:id/availability
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub pickup: Option<DateTime<Utc>>,
    #[serde(rename = "return")]
    pub return_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    occupied: Vec<OccupiedDateRange>,
    nearest_occupied_start: Option<NaiveDate>,
    max_return_date: Option<NaiveDate>,
    requested_range_occupied: Option<bool>,
    rental_days: Option<i64>,
}

pub async fn availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let token = bearer_token(&headers)?;
    let occupied = state.api.get_car_calendar(&token, &id).await?;

    let nearest = query
        .pickup
        .and_then(|pickup| nearest_occupied_start(pickup, &occupied));
    let cap = query
        .pickup
        .and_then(|pickup| max_return_date(pickup, &occupied));
    let (requested_range_occupied, days) = match (query.pickup, query.return_at) {
        (Some(pickup), Some(ret)) => (
            Some(is_range_occupied(pickup, ret, &occupied)),
            Some(rental_days(pickup, ret)),
        ),
        _ => (None, None),
    };

    Ok(Json(AvailabilityResponse {
        occupied,
        nearest_occupied_start: nearest,
        max_return_date: cap,
        requested_range_occupied,
        rental_days: days,
    }))
}
