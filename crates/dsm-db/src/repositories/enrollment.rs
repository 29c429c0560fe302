use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{
    Enrollment, EnrollmentChanges, EnrollmentFilter, LicenseCategory, PageRequest,
};

pub async fn list<'e, E>(
    executor: E,
    filter: &EnrollmentFilter,
    page: PageRequest,
) -> Result<Vec<Enrollment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT *
            FROM enrollments
            WHERE ($1::uuid IS NULL OR candidate_id = $1)
                AND ($2::enrollment_status IS NULL OR status = $2)
            ORDER BY enrolled_on DESC, created_at DESC
            LIMIT $3 OFFSET $4
        "#,
    )
    .bind(filter.candidate_id)
    .bind(filter.status)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &EnrollmentFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM enrollments
            WHERE ($1::uuid IS NULL OR candidate_id = $1)
                AND ($2::enrollment_status IS NULL OR status = $2)
        "#,
    )
    .bind(filter.candidate_id)
    .bind(filter.status)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(
    executor: E,
    enrollment_id: Uuid,
) -> Result<Option<Enrollment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM enrollments WHERE id = $1
        "#,
    )
    .bind(enrollment_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E>(
    executor: E,
    candidate_id: Uuid,
    payment_plan_id: Uuid,
    license_category: LicenseCategory,
    enrolled_on: NaiveDate,
    notes: Option<&str>,
) -> Result<Enrollment, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO enrollments (candidate_id, payment_plan_id, license_category, enrolled_on, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
        "#,
    )
    .bind(candidate_id)
    .bind(payment_plan_id)
    .bind(license_category)
    .bind(enrolled_on)
    .bind(notes)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E>(
    executor: E,
    enrollment_id: Uuid,
    changes: &EnrollmentChanges,
) -> Result<Option<Enrollment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE enrollments
            SET status = COALESCE($2, status),
                notes = COALESCE($3, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(enrollment_id)
    .bind(changes.status)
    .bind(changes.notes.as_deref())
    .fetch_optional(executor)
    .await
}

/// Close the candidate's active enrollment for a category once licensed.
pub async fn complete_active<'e, E>(
    executor: E,
    candidate_id: Uuid,
    license_category: LicenseCategory,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE enrollments
            SET status = 'completed', updated_at = NOW()
            WHERE candidate_id = $1 AND license_category = $2 AND status = 'active'
        "#,
    )
    .bind(candidate_id)
    .bind(license_category)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e, E>(executor: E, enrollment_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM enrollments WHERE id = $1
        "#,
    )
    .bind(enrollment_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
