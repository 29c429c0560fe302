use chrono::NaiveDate;
use sqlx::{Executor, Postgres};

use crate::models::{DashboardStats, SessionOverview};

pub async fn stats<'e, E>(executor: E, today: NaiveDate) -> Result<DashboardStats, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                (SELECT COUNT(*) FROM candidates) AS total_candidates,
                (SELECT COUNT(*) FROM candidates
                    WHERE status IN ('registered', 'theory', 'practical')) AS active_candidates,
                (SELECT COUNT(*) FROM instructors WHERE is_active) AS active_instructors,
                (SELECT COUNT(*) FROM vehicles WHERE status = 'available') AS available_vehicles,
                (SELECT COUNT(*) FROM sessions
                    WHERE session_date = $1 AND status <> 'cancelled') AS sessions_today,
                (SELECT COUNT(*) FROM sessions
                    WHERE session_date >= $1 AND status = 'scheduled') AS upcoming_sessions,
                (SELECT COALESCE(SUM(amount), 0)::float8 FROM payments
                    WHERE status = 'paid') AS total_revenue,
                (SELECT COALESCE(SUM(amount), 0)::float8 FROM payments
                    WHERE status IN ('pending', 'overdue')) AS outstanding_amount,
                (SELECT COUNT(*) FROM exam_results) AS exam_results,
                (SELECT COUNT(*) FROM exam_results WHERE passed) AS exams_passed
        "#,
    )
    .bind(today)
    .fetch_one(executor)
    .await
}

pub async fn upcoming_sessions<'e, E>(
    executor: E,
    today: NaiveDate,
    limit: i64,
) -> Result<Vec<SessionOverview>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                s.id,
                s.session_date,
                s.start_time,
                s.duration_minutes,
                s.lesson_type,
                c.id AS candidate_id,
                c.name AS candidate_name,
                i.id AS instructor_id,
                i.name AS instructor_name,
                v.plate_number AS vehicle_plate
            FROM sessions s
            JOIN candidates c ON c.id = s.candidate_id
            JOIN instructors i ON i.id = s.instructor_id
            LEFT JOIN vehicles v ON v.id = s.vehicle_id
            WHERE s.status = 'scheduled' AND s.session_date >= $1
            ORDER BY s.session_date ASC, s.start_time ASC
            LIMIT $2
        "#,
    )
    .bind(today)
    .bind(limit)
    .fetch_all(executor)
    .await
}
