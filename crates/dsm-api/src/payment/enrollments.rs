use axum::{Router, extract::State, routing::get};
use chrono::Utc;
use dsm_db::{
    models::{
        Enrollment, EnrollmentChanges, EnrollmentStatus, EnrollmentWithPayments, NewEnrollment,
    },
    repositories::{enrollment, payment},
};

use super::{installments::installment_schedule, model::EnrollmentQuery};
use crate::{
    ApiState,
    error::ApiError,
    extract::{ListQuery, ResourceId, ValidatedJson},
    pagination::{Page, Paging},
    response::ApiResponse,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/payments/enrollments",
            get(list_enrollments).post(create_enrollment),
        )
        .route(
            "/payments/enrollments/{id}",
            get(get_enrollment)
                .put(update_enrollment)
                .delete(delete_enrollment),
        )
}

async fn list_enrollments(
    State(state): State<ApiState>,
    ListQuery(query): ListQuery<EnrollmentQuery>,
) -> Result<ApiResponse<Page<Enrollment>>, ApiError> {
    let paging = Paging::resolve(query.page, query.limit, state.pagination)?;
    let filter = query.filter();

    let items = enrollment::list(&state.pool, &filter, paging.request()).await?;
    let total = enrollment::count(&state.pool, &filter).await?;

    Ok(ApiResponse::ok(paging.into_page(items, total)))
}

async fn get_enrollment(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<EnrollmentWithPayments>, ApiError> {
    let enrollment = enrollment::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment"))?;
    let payments = payment::find_by_enrollment(&state.pool, id).await?;

    Ok(ApiResponse::ok(EnrollmentWithPayments {
        enrollment,
        payments,
    }))
}

/// Enroll a candidate in a plan and generate its pending installments
async fn create_enrollment(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<NewEnrollment>,
) -> Result<ApiResponse<EnrollmentWithPayments>, ApiError> {
    let mut tx = state.pool.begin().await?;

    let plan = payment::find_plan(&mut *tx, payload.payment_plan_id)
        .await?
        .ok_or_else(|| {
            ApiError::Validation("Invalid reference: payment_plan_id does not exist".to_string())
        })?;
    if !plan.is_active {
        return Err(ApiError::Validation(
            "Payment plan is not active".to_string(),
        ));
    }

    let license_category = payload.license_category.unwrap_or(plan.license_category);
    if license_category != plan.license_category {
        return Err(ApiError::Validation(format!(
            "Payment plan covers license category {:?}, not {:?}",
            plan.license_category, license_category
        )));
    }

    let enrolled_on = payload
        .enrolled_on
        .unwrap_or_else(|| Utc::now().date_naive());
    let schedule = installment_schedule(plan.total_amount, plan.installments, enrolled_on)?;

    let enrollment = enrollment::create(
        &mut *tx,
        payload.candidate_id,
        plan.id,
        license_category,
        enrolled_on,
        payload.notes.as_deref(),
    )
    .await?;

    let mut payments = Vec::with_capacity(schedule.len());
    for installment in schedule {
        let created = payment::create_installment(
            &mut *tx,
            enrollment.candidate_id,
            plan.id,
            enrollment.id,
            installment.number,
            installment.amount,
            installment.due_date,
        )
        .await?;
        payments.push(created);
    }

    tx.commit().await?;
    tracing::info!(
        enrollment_id = %enrollment.id,
        candidate_id = %enrollment.candidate_id,
        installments = payments.len(),
        "Candidate enrolled"
    );

    Ok(ApiResponse::created(EnrollmentWithPayments {
        enrollment,
        payments,
    })
    .with_message("Enrollment created successfully"))
}

async fn update_enrollment(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
    ValidatedJson(payload): ValidatedJson<EnrollmentChanges>,
) -> Result<ApiResponse<EnrollmentWithPayments>, ApiError> {
    let mut tx = state.pool.begin().await?;

    let enrollment = enrollment::update(&mut *tx, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment"))?;

    if enrollment.status == EnrollmentStatus::Cancelled {
        let cancelled = payment::cancel_open_for_enrollment(&mut *tx, id).await?;
        tracing::info!(enrollment_id = %id, cancelled, "Enrollment cancelled");
    }

    let payments = payment::find_by_enrollment(&mut *tx, id).await?;
    tx.commit().await?;

    Ok(ApiResponse::ok(EnrollmentWithPayments {
        enrollment,
        payments,
    })
    .with_message("Enrollment updated successfully"))
}

async fn delete_enrollment(
    State(state): State<ApiState>,
    ResourceId(id): ResourceId,
) -> Result<ApiResponse<()>, ApiError> {
    if !enrollment::delete(&state.pool, id).await? {
        return Err(ApiError::not_found("Enrollment"));
    }

    Ok(ApiResponse::message("Enrollment deleted successfully"))
}
