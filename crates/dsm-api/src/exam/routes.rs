use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use dsm_db::{
    models::{Exam, ExamChanges, ExamResult, ExamStatus, LessonType, NewExam, NewExamResult},
    repositories::{candidate, enrollment, exam},
};

use super::model::{ExamQuery, status_after_pass};
use crate::{
    ApiState,
    error::ApiError,
    extract::{ListQuery, ResourceId, ValidatedJson},
    pagination::{Page, Paging},
    response::ApiResponse,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/exams", get(list_exams).post(create_exam))
        .route(
            "/exams/{id}",
            get(get_exam).put(update_exam).delete(delete_exam),
        )
        .route("/exams/{id}/result", post(record_result))
        .route("/exams/{id}/results", get(list_results))
}

async fn list_exams(
    State(state): State<ApiState>,
    ListQuery(query): ListQuery<ExamQuery>,
) -> Result<ApiResponse<Page<Exam>>, ApiError> {
    let paging = Paging::resolve(query.page, query.limit, state.pagination)?;
    let filter = query.filter()?;

    let items = exam::list(&state.pool, &filter, paging.request()).await?;
    let total = exam::count(&state.pool, &filter).await?;

    Ok(ApiResponse::ok(paging.into_page(items, total)))
}

async fn get_exam(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<Exam>, ApiError> {
    let exam = exam::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Exam"))?;

    Ok(ApiResponse::ok(exam))
}

async fn create_exam(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<NewExam>,
) -> Result<ApiResponse<Exam>, ApiError> {
    let exam = exam::create(&state.pool, &payload).await?;
    tracing::info!(exam_id = %exam.id, date = %exam.date, "Exam scheduled");

    Ok(ApiResponse::created(exam).with_message("Exam created successfully"))
}

async fn update_exam(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<ExamChanges>,
) -> Result<ApiResponse<Exam>, ApiError> {
    let exam = exam::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Exam"))?;

    Ok(ApiResponse::ok(exam).with_message("Exam updated successfully"))
}

async fn delete_exam(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<()>, ApiError> {
    if !exam::delete(&state.pool, id).await? {
        return Err(ApiError::not_found("Exam"));
    }

    Ok(ApiResponse::message("Exam deleted successfully"))
}

/// Record a candidate's result and advance their license phase on a pass
async fn record_result(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<NewExamResult>,
) -> Result<ApiResponse<ExamResult>, ApiError> {
    let mut tx = state.pool.begin().await?;

    let exam = exam::lock_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Exam"))?;
    if exam.status == ExamStatus::Cancelled {
        return Err(ApiError::Validation(
            "Cannot record results for a cancelled exam".to_string(),
        ));
    }

    if let Some(max) = exam.max_candidates {
        let recorded = exam::count_results(&mut *tx, id).await?;
        if recorded >= i64::from(max) {
            return Err(ApiError::Validation(
                "Exam has reached its maximum number of candidates".to_string(),
            ));
        }
    }

    let candidate = candidate::find_by_id(&mut *tx, payload.candidate_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Candidate"))?;

    let result = exam::create_result(&mut *tx, id, &payload).await?;

    if let Some(next) = status_after_pass(exam.exam_type, result.passed, candidate.status) {
        candidate::set_status(&mut *tx, candidate.id, next).await?;
        if exam.exam_type == LessonType::Practical {
            enrollment::complete_active(&mut *tx, candidate.id, candidate.license_category)
                .await?;
        }
        tracing::info!(candidate_id = %candidate.id, status = ?next, "Candidate advanced");
    }

    tx.commit().await?;

    Ok(ApiResponse::created(result).with_message("Exam result recorded successfully"))
}

async fn list_results(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<Vec<ExamResult>>, ApiError> {
    if exam::find_by_id(&state.pool, id).await?.is_none() {
        return Err(ApiError::not_found("Exam"));
    }
    let results = exam::list_results(&state.pool, id).await?;

    Ok(ApiResponse::ok(results))
}
