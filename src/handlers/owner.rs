use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use super::{bearer_token, require_role};
use crate::errors::AppError;
use crate::models::{FeedbackReport, PageRequest, Paged, Role};
use crate::state::AppState;

// GET /api/owner/feedback
pub async fn feedback_reports(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(page): Query<PageRequest>,
) -> Result<Json<Paged<FeedbackReport>>, AppError> {
    let token = bearer_token(&headers)?;
    require_role(&state, &token, Role::CarOwner).await?;
    Ok(Json(
        state
            .api
            .feedback_reports(&token, page.normalized())
            .await?,
    ))
}
