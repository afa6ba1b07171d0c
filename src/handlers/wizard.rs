use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use super::bearer_token;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::Loadable;
use crate::services::booking_state::{BookingUpdate, SeedParams};
use crate::services::session::{today, SessionView, WizardSession};
use crate::services::wizard::Step;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub view: SessionView,
    pub expires_at: Option<String>,
}

/// A session loaded on behalf of its owner. Nobody else can load it until
/// this is dropped.
struct OpenSession {
    token: String,
    session: WizardSession,
    _guard: OwnedMutexGuard<()>,
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("wizard session {id}"))
}

async fn open_session(
    state: &AppState,
    headers: &HeaderMap,
    id: &str,
) -> Result<OpenSession, AppError> {
    let token = bearer_token(headers)?;
    let caller = state.api.get_profile(&token).await?;

    let guard = state.session_lock(id).lock_owned().await;
    let session = {
        let db = state.db()?;
        queries::get_session(&db, id)?.ok_or_else(|| not_found(id))?
    };
    if session.owner_id != caller.id {
        tracing::warn!(session = %id, user = %caller.id, "wizard session requested by another user");
        return Err(not_found(id));
    }

    Ok(OpenSession {
        token,
        session,
        _guard: guard,
    })
}

fn respond(state: &AppState, session: &WizardSession) -> Result<SessionResponse, AppError> {
    let expires_at = {
        let db = state.db()?;
        queries::session_expiry(&db, &session.id)?
    };
    Ok(SessionResponse {
        view: session.view(),
        expires_at: expires_at.map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
    })
}

fn persist(state: &AppState, session: &WizardSession) -> Result<SessionResponse, AppError> {
    {
        let db = state.db()?;
        queries::save_session(&db, session, state.config.session_ttl_minutes)?;
    }
    respond(state, session)
}

// POST /api/wizard
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(seed): Json<SeedParams>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let token = bearer_token(&headers)?;
    if seed.car_id.trim().is_empty() {
        return Err(AppError::BadRequest("car_id is required".to_string()));
    }

    {
        let db = state.db()?;
        let swept = queries::expire_old_sessions(&db)?;
        if swept > 0 {
            tracing::debug!(swept, "expired stale wizard sessions");
        }
    }

    let caller = state.api.get_profile(&token).await?;
    let mut session = WizardSession::new(Uuid::new_v4().to_string(), caller.id.clone(), seed);
    session.user = Loadable::Ready(caller);
    session.hydrate(state.api.as_ref(), &token).await;

    tracing::info!(
        session = %session.id,
        car_id = %session.state.car_id,
        "booking wizard started"
    );

    let response = persist(&state, &session)?;
    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/wizard/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let open = open_session(&state, &headers, &id).await?;
    Ok(Json(respond(&state, &open.session)?))
}

// DELETE /api/wizard/:id
pub async fn discard_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let _open = open_session(&state, &headers, &id).await?;
    let removed = {
        let db = state.db()?;
        queries::delete_session(&db, &id)?
    };
    if removed {
        tracing::info!(session = %id, "booking wizard discarded");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

// POST /api/wizard/:id/refresh
pub async fn refresh_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut open = open_session(&state, &headers, &id).await?;
    open.session.hydrate(state.api.as_ref(), &open.token).await;
    Ok(Json(persist(&state, &open.session)?))
}

// PATCH /api/wizard/:id
pub async fn update_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<BookingUpdate>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut open = open_session(&state, &headers, &id).await?;
    open.session.update(update, today())?;
    Ok(Json(persist(&state, &open.session)?))
}

// POST /api/wizard/:id/next
pub async fn next_step(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut open = open_session(&state, &headers, &id).await?;
    open.session.advance()?;
    tracing::debug!(session = %id, step = open.session.wizard.step.number(), "wizard advanced");
    Ok(Json(persist(&state, &open.session)?))
}

// POST /api/wizard/:id/prev
pub async fn prev_step(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut open = open_session(&state, &headers, &id).await?;
    open.session.back();
    Ok(Json(persist(&state, &open.session)?))
}

// POST /api/wizard/:id/goto/:step
pub async fn go_to_step(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, step)): Path<(String, u8)>,
) -> Result<Json<SessionResponse>, AppError> {
    let target = Step::from_number(step)
        .ok_or_else(|| AppError::BadRequest(format!("no wizard step {step}")))?;
    let mut open = open_session(&state, &headers, &id).await?;
    open.session.jump(target)?;
    Ok(Json(persist(&state, &open.session)?))
}

// POST /api/wizard/:id/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut open = open_session(&state, &headers, &id).await?;

    // The lock stays held across the create call, so a second confirm sees
    // the placed booking instead of submitting again.
    let outcome = open.session.confirm(state.api.as_ref(), &open.token).await;
    // The error string is part of the session, so save either way.
    let response = persist(&state, &open.session)?;
    outcome?;
    Ok(Json(response))
}
