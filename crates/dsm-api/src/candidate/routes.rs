use axum::{Router, extract::State, routing::get};
use dsm_db::{
    models::{Candidate, CandidateChanges, NewCandidate, ProgressChanges},
    repositories::candidate,
};

use super::model::{CandidateQuery, ProgressView};
use crate::{
    ApiState,
    error::ApiError,
    extract::{ListQuery, ResourceId, ValidatedJson},
    pagination::{Page, Paging},
    response::ApiResponse,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/candidates", get(list_candidates).post(create_candidate))
        .route(
            "/candidates/{id}",
            get(get_candidate)
                .put(update_candidate)
                .delete(delete_candidate),
        )
        .route(
            "/candidates/{id}/progress",
            get(get_progress).put(update_progress),
        )
}

async fn list_candidates(
    State(state): State<ApiState>,
    ListQuery(query): ListQuery<CandidateQuery>,
) -> Result<ApiResponse<Page<Candidate>>, ApiError> {
    let paging = Paging::resolve(query.page, query.limit, state.pagination)?;
    let filter = query.filter();

    let items = candidate::list(&state.pool, &filter, paging.request()).await?;
    let total = candidate::count(&state.pool, &filter).await?;

    Ok(ApiResponse::ok(paging.into_page(items, total)))
}

async fn get_candidate(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<Candidate>, ApiError> {
    let candidate = candidate::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Candidate"))?;

    Ok(ApiResponse::ok(candidate))
}

async fn create_candidate(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<NewCandidate>,
) -> Result<ApiResponse<Candidate>, ApiError> {
    let candidate = candidate::create(&state.pool, &payload).await?;
    tracing::info!(candidate_id = %candidate.id, "Candidate registered");

    Ok(ApiResponse::created(candidate).with_message("Candidate created successfully"))
}

async fn update_candidate(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<CandidateChanges>,
) -> Result<ApiResponse<Candidate>, ApiError> {
    let candidate = candidate::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Candidate"))?;

    Ok(ApiResponse::ok(candidate).with_message("Candidate updated successfully"))
}

async fn delete_candidate(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<()>, ApiError> {
    if !candidate::delete(&state.pool, id).await? {
        return Err(ApiError::not_found("Candidate"));
    }
    tracing::info!(candidate_id = %id, "Candidate deleted");

    Ok(ApiResponse::message("Candidate deleted successfully"))
}

async fn get_progress(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<ProgressView>, ApiError> {
    let candidate = candidate::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Candidate"))?;

    Ok(ApiResponse::ok(ProgressView {
        candidate_id: candidate.id,
        status: candidate.status,
        progress: candidate.progress,
    }))
}

async fn update_progress(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<ProgressChanges>,
) -> Result<ApiResponse<ProgressView>, ApiError> {
    let candidate = candidate::update_progress(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Candidate"))?;

    Ok(ApiResponse::ok(ProgressView {
        candidate_id: candidate.id,
        status: candidate.status,
        progress: candidate.progress,
    })
    .with_message("Progress updated successfully"))
}
