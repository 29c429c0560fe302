use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{
    MarkPaid, NewPayment, NewPaymentPlan, PageRequest, Payment, PaymentChanges, PaymentFilter,
    PaymentPlan, PaymentPlanChanges, PaymentPlanFilter,
};

// ============================================================================
// Payment plans
// ============================================================================

pub async fn list_plans<'e, E>(
    executor: E,
    filter: &PaymentPlanFilter,
    page: PageRequest,
) -> Result<Vec<PaymentPlan>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT *
            FROM payment_plans
            WHERE ($1::license_category IS NULL OR license_category = $1)
                AND ($2::boolean IS NULL OR is_active = $2)
            ORDER BY license_category, total_amount
            LIMIT $3 OFFSET $4
        "#,
    )
    .bind(filter.license_category)
    .bind(filter.is_active)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_plans<'e, E>(executor: E, filter: &PaymentPlanFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM payment_plans
            WHERE ($1::license_category IS NULL OR license_category = $1)
                AND ($2::boolean IS NULL OR is_active = $2)
        "#,
    )
    .bind(filter.license_category)
    .bind(filter.is_active)
    .fetch_one(executor)
    .await
}

pub async fn find_plan<'e, E>(executor: E, plan_id: Uuid) -> Result<Option<PaymentPlan>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM payment_plans WHERE id = $1
        "#,
    )
    .bind(plan_id)
    .fetch_optional(executor)
    .await
}

pub async fn create_plan<'e, E>(executor: E, new: &NewPaymentPlan) -> Result<PaymentPlan, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO payment_plans (name, license_category, total_amount, installments, description, is_active)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, TRUE))
            RETURNING *
        "#,
    )
    .bind(&new.name)
    .bind(new.license_category)
    .bind(new.total_amount)
    .bind(new.installments)
    .bind(new.description.as_deref())
    .bind(new.is_active)
    .fetch_one(executor)
    .await
}

pub async fn update_plan<'e, E>(
    executor: E,
    plan_id: Uuid,
    changes: &PaymentPlanChanges,
) -> Result<Option<PaymentPlan>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE payment_plans
            SET name = COALESCE($2, name),
                license_category = COALESCE($3, license_category),
                total_amount = COALESCE($4, total_amount),
                installments = COALESCE($5, installments),
                description = COALESCE($6, description),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(plan_id)
    .bind(changes.name.as_deref())
    .bind(changes.license_category)
    .bind(changes.total_amount)
    .bind(changes.installments)
    .bind(changes.description.as_deref())
    .bind(changes.is_active)
    .fetch_optional(executor)
    .await
}

pub async fn delete_plan<'e, E>(executor: E, plan_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM payment_plans WHERE id = $1
        "#,
    )
    .bind(plan_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Payments
// ============================================================================

pub async fn list<'e, E>(
    executor: E,
    filter: &PaymentFilter,
    page: PageRequest,
) -> Result<Vec<Payment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT *
            FROM payments
            WHERE ($1::uuid IS NULL OR candidate_id = $1)
                AND ($2::uuid IS NULL OR enrollment_id = $2)
                AND ($3::payment_status IS NULL OR status = $3)
            ORDER BY due_date ASC NULLS LAST, created_at DESC
            LIMIT $4 OFFSET $5
        "#,
    )
    .bind(filter.candidate_id)
    .bind(filter.enrollment_id)
    .bind(filter.status)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &PaymentFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM payments
            WHERE ($1::uuid IS NULL OR candidate_id = $1)
                AND ($2::uuid IS NULL OR enrollment_id = $2)
                AND ($3::payment_status IS NULL OR status = $3)
        "#,
    )
    .bind(filter.candidate_id)
    .bind(filter.enrollment_id)
    .bind(filter.status)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, payment_id: Uuid) -> Result<Option<Payment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM payments WHERE id = $1
        "#,
    )
    .bind(payment_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_enrollment<'e, E>(
    executor: E,
    enrollment_id: Uuid,
) -> Result<Vec<Payment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT *
            FROM payments
            WHERE enrollment_id = $1
            ORDER BY installment_number ASC NULLS LAST, created_at ASC
        "#,
    )
    .bind(enrollment_id)
    .fetch_all(executor)
    .await
}

pub async fn create<'e, E>(executor: E, new: &NewPayment) -> Result<Payment, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO payments (
                candidate_id, payment_plan_id, enrollment_id, amount, installment_number,
                due_date, status, method, reference, notes, paid_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, COALESCE($7, 'pending'::payment_status), $8, $9, $10,
                CASE WHEN $7 = 'paid'::payment_status THEN NOW() END
            )
            RETURNING *
        "#,
    )
    .bind(new.candidate_id)
    .bind(new.payment_plan_id)
    .bind(new.enrollment_id)
    .bind(new.amount)
    .bind(new.installment_number)
    .bind(new.due_date)
    .bind(new.status)
    .bind(new.method)
    .bind(new.reference.as_deref())
    .bind(new.notes.as_deref())
    .fetch_one(executor)
    .await
}

/// Insert one pending installment generated from a payment plan.
#[allow(clippy::too_many_arguments)]
pub async fn create_installment<'e, E>(
    executor: E,
    candidate_id: Uuid,
    payment_plan_id: Uuid,
    enrollment_id: Uuid,
    installment_number: i32,
    amount: f64,
    due_date: NaiveDate,
) -> Result<Payment, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO payments (
                candidate_id, payment_plan_id, enrollment_id, installment_number, amount, due_date
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
        "#,
    )
    .bind(candidate_id)
    .bind(payment_plan_id)
    .bind(enrollment_id)
    .bind(installment_number)
    .bind(amount)
    .bind(due_date)
    .fetch_one(executor)
    .await
}

/// Edit a payment. A status change only applies while the payment is still
/// open; `None` means the payment is missing or already settled.
pub async fn update<'e, E>(
    executor: E,
    payment_id: Uuid,
    changes: &PaymentChanges,
) -> Result<Option<Payment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE payments
            SET amount = COALESCE($2, amount),
                due_date = COALESCE($3, due_date),
                status = COALESCE($4, status),
                method = COALESCE($5, method),
                reference = COALESCE($6, reference),
                notes = COALESCE($7, notes),
                updated_at = NOW()
            WHERE id = $1
              AND ($4 IS NULL OR $4 = status OR status IN ('pending', 'overdue'))
            RETURNING *
        "#,
    )
    .bind(payment_id)
    .bind(changes.amount)
    .bind(changes.due_date)
    .bind(changes.status)
    .bind(changes.method)
    .bind(changes.reference.as_deref())
    .bind(changes.notes.as_deref())
    .fetch_optional(executor)
    .await
}

/// Settle a pending or overdue payment. Returns `None` when the payment
/// does not exist or is already paid or cancelled.
pub async fn mark_paid<'e, E>(
    executor: E,
    payment_id: Uuid,
    details: &MarkPaid,
) -> Result<Option<Payment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE payments
            SET status = 'paid',
                method = COALESCE($2, method),
                reference = COALESCE($3, reference),
                paid_at = COALESCE($4, NOW()),
                updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'overdue')
            RETURNING *
        "#,
    )
    .bind(payment_id)
    .bind(details.method)
    .bind(details.reference.as_deref())
    .bind(details.paid_at)
    .fetch_optional(executor)
    .await
}

/// Cancel the still-open installments of an enrollment.
pub async fn cancel_open_for_enrollment<'e, E>(
    executor: E,
    enrollment_id: Uuid,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE payments
            SET status = 'cancelled', updated_at = NOW()
            WHERE enrollment_id = $1 AND status IN ('pending', 'overdue')
        "#,
    )
    .bind(enrollment_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Flag pending payments whose due date has passed.
pub async fn mark_overdue<'e, E>(executor: E, today: NaiveDate) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE payments
            SET status = 'overdue', updated_at = NOW()
            WHERE status = 'pending' AND due_date < $1
        "#,
    )
    .bind(today)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete<'e, E>(executor: E, payment_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM payments WHERE id = $1
        "#,
    )
    .bind(payment_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
