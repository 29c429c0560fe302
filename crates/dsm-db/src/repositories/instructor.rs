use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::models::{Instructor, InstructorChanges, InstructorFilter, NewInstructor, PageRequest};

pub async fn list<'e, E>(
    executor: E,
    filter: &InstructorFilter,
    page: PageRequest,
) -> Result<Vec<Instructor>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT *
            FROM instructors
            WHERE ($1::license_category IS NULL OR specialization = $1)
                AND ($2::boolean IS NULL OR is_active = $2)
                AND ($3::text IS NULL
                    OR name ILIKE '%' || $3 || '%'
                    OR email ILIKE '%' || $3 || '%')
            ORDER BY name ASC
            LIMIT $4 OFFSET $5
        "#,
    )
    .bind(filter.specialization)
    .bind(filter.is_active)
    .bind(filter.search.as_deref())
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &InstructorFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM instructors
            WHERE ($1::license_category IS NULL OR specialization = $1)
                AND ($2::boolean IS NULL OR is_active = $2)
                AND ($3::text IS NULL
                    OR name ILIKE '%' || $3 || '%'
                    OR email ILIKE '%' || $3 || '%')
        "#,
    )
    .bind(filter.specialization)
    .bind(filter.is_active)
    .bind(filter.search.as_deref())
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(
    executor: E,
    instructor_id: Uuid,
) -> Result<Option<Instructor>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM instructors WHERE id = $1
        "#,
    )
    .bind(instructor_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E>(executor: E, new: &NewInstructor) -> Result<Instructor, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO instructors (
                name, email, phone, specialization, vehicle_id, availability, is_active, hire_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, TRUE), $8)
            RETURNING *
        "#,
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(new.specialization)
    .bind(new.vehicle_id)
    .bind(Json(&new.availability))
    .bind(new.is_active)
    .bind(new.hire_date)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E>(
    executor: E,
    instructor_id: Uuid,
    changes: &InstructorChanges,
) -> Result<Option<Instructor>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE instructors
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                specialization = COALESCE($5, specialization),
                availability = COALESCE($6, availability),
                is_active = COALESCE($7, is_active),
                hire_date = COALESCE($8, hire_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(instructor_id)
    .bind(changes.name.as_deref())
    .bind(changes.email.as_deref())
    .bind(changes.phone.as_deref())
    .bind(changes.specialization)
    .bind(changes.availability.as_ref().map(Json))
    .bind(changes.is_active)
    .bind(changes.hire_date)
    .fetch_optional(executor)
    .await
}

/// Set or clear the instructor's assigned vehicle.
pub async fn assign_vehicle<'e, E>(
    executor: E,
    instructor_id: Uuid,
    vehicle_id: Option<Uuid>,
) -> Result<Option<Instructor>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE instructors
            SET vehicle_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(instructor_id)
    .bind(vehicle_id)
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e, E>(executor: E, instructor_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM instructors WHERE id = $1
        "#,
    )
    .bind(instructor_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
