use axum::{Router, extract::State, routing::get};
use dsm_db::{
    models::{NewPaymentPlan, PaymentPlan, PaymentPlanChanges},
    repositories::payment,
};

use super::model::PlanQuery;
use crate::{
    ApiState,
    error::ApiError,
    extract::{ListQuery, ResourceId, ValidatedJson},
    pagination::{Page, Paging},
    response::ApiResponse,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/payments/plans", get(list_plans).post(create_plan))
        .route(
            "/payments/plans/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
}

async fn list_plans(
    State(state): State<ApiState>,
    ListQuery(query): ListQuery<PlanQuery>,
) -> Result<ApiResponse<Page<PaymentPlan>>, ApiError> {
    let paging = Paging::resolve(query.page, query.limit, state.pagination)?;
    let filter = query.filter();

    let items = payment::list_plans(&state.pool, &filter, paging.request()).await?;
    let total = payment::count_plans(&state.pool, &filter).await?;

    Ok(ApiResponse::ok(paging.into_page(items, total)))
}

async fn get_plan(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<PaymentPlan>, ApiError> {
    let plan = payment::find_plan(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment plan"))?;

    Ok(ApiResponse::ok(plan))
}

async fn create_plan(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<NewPaymentPlan>,
) -> Result<ApiResponse<PaymentPlan>, ApiError> {
    let plan = payment::create_plan(&state.pool, &payload).await?;

    Ok(ApiResponse::created(plan).with_message("Payment plan created successfully"))
}

async fn update_plan(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<PaymentPlanChanges>,
) -> Result<ApiResponse<PaymentPlan>, ApiError> {
    let plan = payment::update_plan(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment plan"))?;

    Ok(ApiResponse::ok(plan).with_message("Payment plan updated successfully"))
}

async fn delete_plan(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<()>, ApiError> {
    if !payment::delete_plan(&state.pool, id).await? {
        return Err(ApiError::not_found("Payment plan"));
    }

    Ok(ApiResponse::message("Payment plan deleted successfully"))
}
