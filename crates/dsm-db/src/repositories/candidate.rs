use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{
    Candidate, CandidateChanges, CandidateFilter, CandidateStatus, LessonType, NewCandidate,
    PageRequest, ProgressChanges,
};

pub async fn list<'e, E>(
    executor: E,
    filter: &CandidateFilter,
    page: PageRequest,
) -> Result<Vec<Candidate>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT *
            FROM candidates
            WHERE ($1::candidate_status IS NULL OR status = $1)
                AND ($2::license_category IS NULL OR license_category = $2)
                AND ($3::text IS NULL
                    OR name ILIKE '%' || $3 || '%'
                    OR email ILIKE '%' || $3 || '%'
                    OR phone ILIKE '%' || $3 || '%')
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
        "#,
    )
    .bind(filter.status)
    .bind(filter.license_category)
    .bind(filter.search.as_deref())
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &CandidateFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM candidates
            WHERE ($1::candidate_status IS NULL OR status = $1)
                AND ($2::license_category IS NULL OR license_category = $2)
                AND ($3::text IS NULL
                    OR name ILIKE '%' || $3 || '%'
                    OR email ILIKE '%' || $3 || '%'
                    OR phone ILIKE '%' || $3 || '%')
        "#,
    )
    .bind(filter.status)
    .bind(filter.license_category)
    .bind(filter.search.as_deref())
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(
    executor: E,
    candidate_id: Uuid,
) -> Result<Option<Candidate>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM candidates WHERE id = $1
        "#,
    )
    .bind(candidate_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E>(executor: E, new: &NewCandidate) -> Result<Candidate, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO candidates (
                name, email, phone, national_id, date_of_birth, address,
                license_category, status, id_card, medical_certificate, photo
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'registered'::candidate_status), $9, $10, $11)
            RETURNING *
        "#,
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(new.national_id.as_deref())
    .bind(new.date_of_birth)
    .bind(new.address.as_deref())
    .bind(new.license_category)
    .bind(new.status)
    .bind(&new.documents.id_card)
    .bind(&new.documents.medical_certificate)
    .bind(&new.documents.photo)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E>(
    executor: E,
    candidate_id: Uuid,
    changes: &CandidateChanges,
) -> Result<Option<Candidate>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let documents = changes.documents.as_ref();

    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE candidates
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                national_id = COALESCE($5, national_id),
                date_of_birth = COALESCE($6, date_of_birth),
                address = COALESCE($7, address),
                license_category = COALESCE($8, license_category),
                status = COALESCE($9, status),
                id_card = COALESCE($10, id_card),
                medical_certificate = COALESCE($11, medical_certificate),
                photo = COALESCE($12, photo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(candidate_id)
    .bind(changes.name.as_deref())
    .bind(changes.email.as_deref())
    .bind(changes.phone.as_deref())
    .bind(changes.national_id.as_deref())
    .bind(changes.date_of_birth)
    .bind(changes.address.as_deref())
    .bind(changes.license_category)
    .bind(changes.status)
    .bind(documents.map(|d| d.id_card.as_str()))
    .bind(documents.map(|d| d.medical_certificate.as_str()))
    .bind(documents.map(|d| d.photo.as_str()))
    .fetch_optional(executor)
    .await
}

pub async fn update_progress<'e, E>(
    executor: E,
    candidate_id: Uuid,
    changes: &ProgressChanges,
) -> Result<Option<Candidate>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE candidates
            SET theory_hours = COALESCE($2, theory_hours),
                practical_hours = COALESCE($3, practical_hours),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(candidate_id)
    .bind(changes.theory_hours)
    .bind(changes.practical_hours)
    .bind(changes.status)
    .fetch_optional(executor)
    .await
}

/// Add completed training hours to the counter matching `lesson_type`.
pub async fn add_hours<'e, E>(
    executor: E,
    candidate_id: Uuid,
    lesson_type: LessonType,
    hours: f64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE candidates
            SET theory_hours = theory_hours + CASE WHEN $2 = 'theory'::lesson_type THEN $3 ELSE 0 END,
                practical_hours = practical_hours + CASE WHEN $2 = 'practical'::lesson_type THEN $3 ELSE 0 END,
                updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(candidate_id)
    .bind(lesson_type)
    .bind(hours)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn set_status<'e, E>(
    executor: E,
    candidate_id: Uuid,
    status: CandidateStatus,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE candidates
            SET status = $2, updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(candidate_id)
    .bind(status)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e, E>(executor: E, candidate_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM candidates WHERE id = $1
        "#,
    )
    .bind(candidate_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
