use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use dsm_db::{
    models::{Instructor, InstructorChanges, NewInstructor},
    repositories::{instructor, vehicle},
};

use super::model::{AssignVehicleRequest, InstructorQuery, ensure_vehicle_matches};
use crate::{
    ApiState,
    error::ApiError,
    extract::{ListQuery, ResourceId, ValidatedJson},
    pagination::{Page, Paging},
    response::ApiResponse,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/instructors", get(list_instructors).post(create_instructor))
        .route(
            "/instructors/{id}",
            get(get_instructor)
                .put(update_instructor)
                .delete(delete_instructor),
        )
        .route("/instructors/{id}/assign-vehicle", put(assign_vehicle))
}

async fn list_instructors(
    State(state): State<ApiState>,
    ListQuery(query): ListQuery<InstructorQuery>,
) -> Result<ApiResponse<Page<Instructor>>, ApiError> {
    let paging = Paging::resolve(query.page, query.limit, state.pagination)?;
    let filter = query.filter();

    let items = instructor::list(&state.pool, &filter, paging.request()).await?;
    let total = instructor::count(&state.pool, &filter).await?;

    Ok(ApiResponse::ok(paging.into_page(items, total)))
}

async fn get_instructor(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<Instructor>, ApiError> {
    let instructor = instructor::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Instructor"))?;

    Ok(ApiResponse::ok(instructor))
}

async fn create_instructor(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<NewInstructor>,
) -> Result<ApiResponse<Instructor>, ApiError> {
    if let Some(vehicle_id) = payload.vehicle_id {
        let vehicle = vehicle::find_by_id(&state.pool, vehicle_id)
            .await?
            .ok_or_else(|| {
                ApiError::Validation("Invalid reference: vehicle_id does not exist".to_string())
            })?;
        ensure_vehicle_matches(payload.specialization, &vehicle)?;
    }

    let instructor = instructor::create(&state.pool, &payload).await?;
    tracing::info!(instructor_id = %instructor.id, "Instructor created");

    Ok(ApiResponse::created(instructor).with_message("Instructor created successfully"))
}

async fn update_instructor(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<InstructorChanges>,
) -> Result<ApiResponse<Instructor>, ApiError> {
    if let Some(specialization) = payload.specialization {
        let current = instructor::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Instructor"))?;
        if let Some(vehicle_id) = current.vehicle_id {
            if let Some(vehicle) = vehicle::find_by_id(&state.pool, vehicle_id).await? {
                ensure_vehicle_matches(specialization, &vehicle)?;
            }
        }
    }

    let instructor = instructor::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Instructor"))?;

    Ok(ApiResponse::ok(instructor).with_message("Instructor updated successfully"))
}

async fn delete_instructor(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<()>, ApiError> {
    if !instructor::delete(&state.pool, id).await? {
        return Err(ApiError::not_found("Instructor"));
    }
    tracing::info!(instructor_id = %id, "Instructor deleted");

    Ok(ApiResponse::message("Instructor deleted successfully"))
}

async fn assign_vehicle(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<AssignVehicleRequest>,
) -> Result<ApiResponse<Instructor>, ApiError> {
    let current = instructor::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Instructor"))?;

    if let Some(vehicle_id) = payload.vehicle_id {
        let vehicle = vehicle::find_by_id(&state.pool, vehicle_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Vehicle"))?;
        ensure_vehicle_matches(current.specialization, &vehicle)?;
    }

    let instructor = instructor::assign_vehicle(&state.pool, id, payload.vehicle_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Instructor"))?;

    let message = match instructor.vehicle_id {
        Some(_) => "Vehicle assigned successfully",
        None => "Vehicle unassigned successfully",
    };
    Ok(ApiResponse::ok(instructor).with_message(message))
}
