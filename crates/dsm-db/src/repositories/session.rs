use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{NewSession, PageRequest, Session, SessionChanges, SessionFilter, SessionStatus};

pub async fn list<'e, E>(
    executor: E,
    filter: &SessionFilter,
    page: PageRequest,
) -> Result<Vec<Session>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT *
            FROM sessions
            WHERE ($1::uuid IS NULL OR instructor_id = $1)
                AND ($2::uuid IS NULL OR candidate_id = $2)
                AND ($3::uuid IS NULL OR vehicle_id = $3)
                AND ($4::session_status IS NULL OR status = $4)
                AND ($5::date IS NULL OR session_date >= $5)
                AND ($6::date IS NULL OR session_date <= $6)
            ORDER BY session_date ASC, start_time ASC
            LIMIT $7 OFFSET $8
        "#,
    )
    .bind(filter.instructor_id)
    .bind(filter.candidate_id)
    .bind(filter.vehicle_id)
    .bind(filter.status)
    .bind(filter.from)
    .bind(filter.to)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &SessionFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM sessions
            WHERE ($1::uuid IS NULL OR instructor_id = $1)
                AND ($2::uuid IS NULL OR candidate_id = $2)
                AND ($3::uuid IS NULL OR vehicle_id = $3)
                AND ($4::session_status IS NULL OR status = $4)
                AND ($5::date IS NULL OR session_date >= $5)
                AND ($6::date IS NULL OR session_date <= $6)
        "#,
    )
    .bind(filter.instructor_id)
    .bind(filter.candidate_id)
    .bind(filter.vehicle_id)
    .bind(filter.status)
    .bind(filter.from)
    .bind(filter.to)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, session_id: Uuid) -> Result<Option<Session>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM sessions WHERE id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E>(executor: E, new: &NewSession) -> Result<Session, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO sessions (
                instructor_id, candidate_id, vehicle_id, session_date, start_time,
                duration_minutes, lesson_type, notes
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 60), $7, $8)
            RETURNING *
        "#,
    )
    .bind(new.instructor_id)
    .bind(new.candidate_id)
    .bind(new.vehicle_id)
    .bind(new.date)
    .bind(&new.time)
    .bind(new.duration_minutes)
    .bind(new.lesson_type)
    .bind(new.notes.as_deref())
    .fetch_one(executor)
    .await
}

/// Edit a session that is still scheduled. Returns `None` when the session
/// does not exist or has already been closed.
pub async fn update<'e, E>(
    executor: E,
    session_id: Uuid,
    changes: &SessionChanges,
) -> Result<Option<Session>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE sessions
            SET instructor_id = COALESCE($2, instructor_id),
                candidate_id = COALESCE($3, candidate_id),
                vehicle_id = COALESCE($4, vehicle_id),
                session_date = COALESCE($5, session_date),
                start_time = COALESCE($6, start_time),
                duration_minutes = COALESCE($7, duration_minutes),
                lesson_type = COALESCE($8, lesson_type),
                status = COALESCE($9, status),
                notes = COALESCE($10, notes),
                updated_at = NOW()
            WHERE id = $1 AND status = 'scheduled'
            RETURNING *
        "#,
    )
    .bind(session_id)
    .bind(changes.instructor_id)
    .bind(changes.candidate_id)
    .bind(changes.vehicle_id)
    .bind(changes.date)
    .bind(changes.time.as_deref())
    .bind(changes.duration_minutes)
    .bind(changes.lesson_type)
    .bind(changes.status)
    .bind(changes.notes.as_deref())
    .fetch_optional(executor)
    .await
}

/// Move a scheduled session to a final status. Returns `None` when the
/// session does not exist or is no longer scheduled.
pub async fn close<'e, E>(
    executor: E,
    session_id: Uuid,
    status: SessionStatus,
    notes: Option<&str>,
) -> Result<Option<Session>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE sessions
            SET status = $2,
                notes = COALESCE($3, notes),
                completed_at = CASE WHEN $2 = 'completed'::session_status THEN NOW() END,
                updated_at = NOW()
            WHERE id = $1 AND status = 'scheduled'
            RETURNING *
        "#,
    )
    .bind(session_id)
    .bind(status)
    .bind(notes)
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e, E>(executor: E, session_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM sessions WHERE id = $1
        "#,
    )
    .bind(session_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
