use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use dsm_db::{
    models::{NewMaintenanceRecord, NewVehicle, Vehicle, VehicleChanges, VehicleDetails},
    repositories::vehicle,
};

use super::model::VehicleQuery;
use crate::{
    ApiState,
    error::ApiError,
    extract::{ListQuery, ResourceId, ValidatedJson},
    pagination::{Page, Paging},
    response::ApiResponse,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/vehicles/{id}",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/vehicles/{id}/maintenance", post(add_maintenance))
}

async fn list_vehicles(
    State(state): State<ApiState>,
    ListQuery(query): ListQuery<VehicleQuery>,
) -> Result<ApiResponse<Page<Vehicle>>, ApiError> {
    let paging = Paging::resolve(query.page, query.limit, state.pagination)?;
    let filter = query.filter();

    let items = vehicle::list(&state.pool, &filter, paging.request()).await?;
    let total = vehicle::count(&state.pool, &filter).await?;

    Ok(ApiResponse::ok(paging.into_page(items, total)))
}

async fn get_vehicle(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<VehicleDetails>, ApiError> {
    let vehicle = vehicle::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Vehicle"))?;
    let maintenance_history = vehicle::maintenance_history(&state.pool, id).await?;

    Ok(ApiResponse::ok(VehicleDetails {
        vehicle,
        maintenance_history,
    }))
}

async fn create_vehicle(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<NewVehicle>,
) -> Result<ApiResponse<Vehicle>, ApiError> {
    let vehicle = vehicle::create(&state.pool, &payload).await?;
    tracing::info!(vehicle_id = %vehicle.id, plate = %vehicle.plate_number, "Vehicle created");

    Ok(ApiResponse::created(vehicle).with_message("Vehicle created successfully"))
}

async fn update_vehicle(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<VehicleChanges>,
) -> Result<ApiResponse<Vehicle>, ApiError> {
    let vehicle = vehicle::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Vehicle"))?;

    Ok(ApiResponse::ok(vehicle).with_message("Vehicle updated successfully"))
}

async fn delete_vehicle(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<()>, ApiError> {
    if !vehicle::delete(&state.pool, id).await? {
        return Err(ApiError::not_found("Vehicle"));
    }
    tracing::info!(vehicle_id = %id, "Vehicle deleted");

    Ok(ApiResponse::message("Vehicle deleted successfully"))
}

/// Append a maintenance record, optionally moving the vehicle to a new
/// status and raising its odometer reading
async fn add_maintenance(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<NewMaintenanceRecord>,
) -> Result<ApiResponse<VehicleDetails>, ApiError> {
    let mut tx = state.pool.begin().await?;

    if vehicle::find_by_id(&mut *tx, id).await?.is_none() {
        return Err(ApiError::not_found("Vehicle"));
    }

    let record = vehicle::add_maintenance(&mut *tx, id, &payload).await?;
    if let Some(status) = payload.status {
        vehicle::set_status(&mut *tx, id, status).await?;
    }
    if let Some(mileage) = payload.mileage {
        vehicle::bump_mileage(&mut *tx, id, mileage).await?;
    }

    let vehicle = vehicle::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Vehicle"))?;
    let maintenance_history = vehicle::maintenance_history(&mut *tx, id).await?;

    tx.commit().await?;
    tracing::info!(vehicle_id = %id, record_id = %record.id, "Maintenance recorded");

    Ok(ApiResponse::created(VehicleDetails {
        vehicle,
        maintenance_history,
    })
    .with_message("Maintenance record added successfully"))
}
