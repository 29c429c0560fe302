use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use dsm_db::{
    models::{MarkPaid, NewPayment, Payment, PaymentChanges},
    repositories::payment,
};

use super::model::{PaymentQuery, ensure_payable, ensure_status_change};
use crate::{
    ApiState,
    error::ApiError,
    extract::{ListQuery, ResourceId, ValidatedJson},
    pagination::{Page, Paging},
    response::ApiResponse,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        .route(
            "/payments/{id}",
            get(get_payment).put(update_payment).delete(delete_payment),
        )
        .route("/payments/{id}/mark-paid", put(mark_paid))
}

async fn list_payments(
    State(state): State<ApiState>,
    ListQuery(query): ListQuery<PaymentQuery>,
) -> Result<ApiResponse<Page<Payment>>, ApiError> {
    let paging = Paging::resolve(query.page, query.limit, state.pagination)?;
    let filter = query.filter();

    let items = payment::list(&state.pool, &filter, paging.request()).await?;
    let total = payment::count(&state.pool, &filter).await?;

    Ok(ApiResponse::ok(paging.into_page(items, total)))
}

async fn get_payment(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<Payment>, ApiError> {
    let payment = payment::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment"))?;

    Ok(ApiResponse::ok(payment))
}

async fn create_payment(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<NewPayment>,
) -> Result<ApiResponse<Payment>, ApiError> {
    let payment = payment::create(&state.pool, &payload).await?;
    tracing::info!(payment_id = %payment.id, candidate_id = %payment.candidate_id, "Payment recorded");

    Ok(ApiResponse::created(payment).with_message("Payment created successfully"))
}

async fn update_payment(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<PaymentChanges>,
) -> Result<ApiResponse<Payment>, ApiError> {
    let current = payment::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment"))?;
    if let Some(requested) = payload.status {
        ensure_status_change(current.status, requested)?;
    }

    let payment = payment::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::Validation("Payment status changed, please retry".to_string()))?;

    Ok(ApiResponse::ok(payment).with_message("Payment updated successfully"))
}

async fn delete_payment(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<()>, ApiError> {
    if !payment::delete(&state.pool, id).await? {
        return Err(ApiError::not_found("Payment"));
    }

    Ok(ApiResponse::message("Payment deleted successfully"))
}

async fn mark_paid(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    payload: Option<ValidatedJson<MarkPaid>>,
) -> Result<ApiResponse<Payment>, ApiError> {
    let payload = payload.map(|ValidatedJson(p)| p).unwrap_or_default();

    let current = payment::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment"))?;
    ensure_payable(current.status)?;

    // Guarded again in SQL in case the status changed in between
    let payment = payment::mark_paid(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::Validation("Payment can no longer be marked as paid".to_string()))?;
    tracing::info!(payment_id = %id, amount = payment.amount, "Payment marked as paid");

    Ok(ApiResponse::ok(payment).with_message("Payment marked as paid"))
}
