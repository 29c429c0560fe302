use axum::{Router, extract::State, routing::get};
use dsm_db::{
    models::{Course, CourseChanges, NewCourse},
    repositories::exam,
};

use super::model::CourseQuery;
use crate::{
    ApiState,
    error::ApiError,
    extract::{ListQuery, ResourceId, ValidatedJson},
    pagination::{Page, Paging},
    response::ApiResponse,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/exams/courses", get(list_courses).post(create_course))
        .route(
            "/exams/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
}

async fn list_courses(
    State(state): State<ApiState>,
    ListQuery(query): ListQuery<CourseQuery>,
) -> Result<ApiResponse<Page<Course>>, ApiError> {
    let paging = Paging::resolve(query.page, query.limit, state.pagination)?;
    let filter = query.filter();

    let items = exam::list_courses(&state.pool, &filter, paging.request()).await?;
    let total = exam::count_courses(&state.pool, &filter).await?;

    Ok(ApiResponse::ok(paging.into_page(items, total)))
}

async fn get_course(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<Course>, ApiError> {
    let course = exam::find_course(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course"))?;

    Ok(ApiResponse::ok(course))
}

async fn create_course(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<NewCourse>,
) -> Result<ApiResponse<Course>, ApiError> {
    let course = exam::create_course(&state.pool, &payload).await?;

    Ok(ApiResponse::created(course).with_message("Course created successfully"))
}

async fn update_course(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<CourseChanges>,
) -> Result<ApiResponse<Course>, ApiError> {
    let course = exam::update_course(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Course"))?;

    Ok(ApiResponse::ok(course).with_message("Course updated successfully"))
}

async fn delete_course(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<()>, ApiError> {
    if !exam::delete_course(&state.pool, id).await? {
        return Err(ApiError::not_found("Course"));
    }

    Ok(ApiResponse::message("Course deleted successfully"))
}
