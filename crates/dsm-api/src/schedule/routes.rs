use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use dsm_db::{
    models::{NewSession, Session, SessionChanges, SessionStatus},
    repositories::{candidate, session},
};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::model::{CloseSessionRequest, SessionQuery, session_hours};
use crate::{
    ApiState,
    error::ApiError,
    extract::{ListQuery, ResourceId, ValidatedJson},
    pagination::{Page, Paging},
    response::ApiResponse,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/schedule", get(list_sessions).post(create_session))
        .route(
            "/schedule/{id}",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route("/schedule/{id}/complete", put(complete_session))
        .route("/schedule/{id}/cancel", put(cancel_session))
}

async fn list_sessions(
    State(state): State<ApiState>,
    ListQuery(query): ListQuery<SessionQuery>,
) -> Result<ApiResponse<Page<Session>>, ApiError> {
    let paging = Paging::resolve(query.page, query.limit, state.pagination)?;
    let filter = query.filter()?;

    let items = session::list(&state.pool, &filter, paging.request()).await?;
    let total = session::count(&state.pool, &filter).await?;

    Ok(ApiResponse::ok(paging.into_page(items, total)))
}

async fn get_session(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<Session>, ApiError> {
    let session = session::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session"))?;

    Ok(ApiResponse::ok(session))
}

async fn create_session(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<NewSession>,
) -> Result<ApiResponse<Session>, ApiError> {
    let session = session::create(&state.pool, &payload).await?;
    tracing::info!(
        session_id = %session.id,
        instructor_id = %session.instructor_id,
        date = %session.date,
        time = %session.time,
        "Session scheduled"
    );

    Ok(ApiResponse::created(session).with_message("Session scheduled successfully"))
}

async fn update_session(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<SessionChanges>,
) -> Result<ApiResponse<Session>, ApiError> {
    if let Some(session) = session::update(&state.pool, id, &payload).await? {
        return Ok(ApiResponse::ok(session).with_message("Session updated successfully"));
    }

    // Closed sessions are final
    match session::find_by_id(&state.pool, id).await? {
        None => Err(ApiError::not_found("Session")),
        Some(_) => Err(ApiError::Validation(
            "Only scheduled sessions can be updated".to_string(),
        )),
    }
}

async fn delete_session(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<()>, ApiError> {
    if !session::delete(&state.pool, id).await? {
        return Err(ApiError::not_found("Session"));
    }

    Ok(ApiResponse::message("Session deleted successfully"))
}

/// Close a scheduled session inside `tx`, telling "missing" apart from
/// "already closed"
async fn close_scheduled(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: SessionStatus,
    notes: Option<&str>,
) -> Result<Session, ApiError> {
    if let Some(closed) = session::close(&mut **tx, id, status, notes).await? {
        return Ok(closed);
    }

    match session::find_by_id(&mut **tx, id).await? {
        None => Err(ApiError::not_found("Session")),
        Some(_) => Err(ApiError::Validation(
            "Only scheduled sessions can be completed or cancelled".to_string(),
        )),
    }
}

/// Mark a session completed and credit its duration to the candidate's
/// progress counter for the lesson type
async fn complete_session(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    payload: Option<ValidatedJson<CloseSessionRequest>>,
) -> Result<ApiResponse<Session>, ApiError> {
    let payload = payload.map(|ValidatedJson(p)| p).unwrap_or_default();
    let mut tx = state.pool.begin().await?;

    let session =
        close_scheduled(&mut tx, id, SessionStatus::Completed, payload.notes.as_deref()).await?;

    let hours = session_hours(session.duration_minutes);
    if !candidate::add_hours(&mut *tx, session.candidate_id, session.lesson_type, hours).await? {
        return Err(ApiError::not_found("Candidate"));
    }

    tx.commit().await?;
    tracing::info!(session_id = %id, candidate_id = %session.candidate_id, hours, "Session completed");

    Ok(ApiResponse::ok(session).with_message("Session completed successfully"))
}

async fn cancel_session(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    payload: Option<ValidatedJson<CloseSessionRequest>>,
) -> Result<ApiResponse<Session>, ApiError> {
    let payload = payload.map(|ValidatedJson(p)| p).unwrap_or_default();
    let status = if payload.no_show {
        SessionStatus::NoShow
    } else {
        SessionStatus::Cancelled
    };

    let mut tx = state.pool.begin().await?;
    let session = close_scheduled(&mut tx, id, status, payload.notes.as_deref()).await?;
    tx.commit().await?;

    let message = if payload.no_show {
        "Session marked as no-show"
    } else {
        "Session cancelled successfully"
    };
    Ok(ApiResponse::ok(session).with_message(message))
}
