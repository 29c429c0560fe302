use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{
    Course, CourseChanges, CourseFilter, Exam, ExamChanges, ExamFilter, ExamResult, NewCourse,
    NewExam, NewExamResult, PageRequest,
};

// ============================================================================
// Courses
// ============================================================================

pub async fn list_courses<'e, E>(
    executor: E,
    filter: &CourseFilter,
    page: PageRequest,
) -> Result<Vec<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT *
            FROM courses
            WHERE ($1::license_category IS NULL OR license_category = $1)
                AND ($2::lesson_type IS NULL OR lesson_type = $2)
            ORDER BY title ASC
            LIMIT $3 OFFSET $4
        "#,
    )
    .bind(filter.license_category)
    .bind(filter.lesson_type)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count_courses<'e, E>(executor: E, filter: &CourseFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM courses
            WHERE ($1::license_category IS NULL OR license_category = $1)
                AND ($2::lesson_type IS NULL OR lesson_type = $2)
        "#,
    )
    .bind(filter.license_category)
    .bind(filter.lesson_type)
    .fetch_one(executor)
    .await
}

pub async fn find_course<'e, E>(executor: E, course_id: Uuid) -> Result<Option<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM courses WHERE id = $1
        "#,
    )
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub async fn create_course<'e, E>(executor: E, new: &NewCourse) -> Result<Course, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO courses (title, description, license_category, lesson_type, duration_hours, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
        "#,
    )
    .bind(&new.title)
    .bind(new.description.as_deref())
    .bind(new.license_category)
    .bind(new.lesson_type)
    .bind(new.duration_hours)
    .bind(new.price)
    .fetch_one(executor)
    .await
}

pub async fn update_course<'e, E>(
    executor: E,
    course_id: Uuid,
    changes: &CourseChanges,
) -> Result<Option<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE courses
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                license_category = COALESCE($4, license_category),
                lesson_type = COALESCE($5, lesson_type),
                duration_hours = COALESCE($6, duration_hours),
                price = COALESCE($7, price),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(course_id)
    .bind(changes.title.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.license_category)
    .bind(changes.lesson_type)
    .bind(changes.duration_hours)
    .bind(changes.price)
    .fetch_optional(executor)
    .await
}

pub async fn delete_course<'e, E>(executor: E, course_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM courses WHERE id = $1
        "#,
    )
    .bind(course_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Exams
// ============================================================================

pub async fn list<'e, E>(
    executor: E,
    filter: &ExamFilter,
    page: PageRequest,
) -> Result<Vec<Exam>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT *
            FROM exams
            WHERE ($1::uuid IS NULL OR course_id = $1)
                AND ($2::lesson_type IS NULL OR exam_type = $2)
                AND ($3::exam_status IS NULL OR status = $3)
                AND ($4::date IS NULL OR exam_date >= $4)
                AND ($5::date IS NULL OR exam_date <= $5)
            ORDER BY exam_date DESC, exam_time DESC
            LIMIT $6 OFFSET $7
        "#,
    )
    .bind(filter.course_id)
    .bind(filter.exam_type)
    .bind(filter.status)
    .bind(filter.from)
    .bind(filter.to)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &ExamFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM exams
            WHERE ($1::uuid IS NULL OR course_id = $1)
                AND ($2::lesson_type IS NULL OR exam_type = $2)
                AND ($3::exam_status IS NULL OR status = $3)
                AND ($4::date IS NULL OR exam_date >= $4)
                AND ($5::date IS NULL OR exam_date <= $5)
        "#,
    )
    .bind(filter.course_id)
    .bind(filter.exam_type)
    .bind(filter.status)
    .bind(filter.from)
    .bind(filter.to)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, exam_id: Uuid) -> Result<Option<Exam>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM exams WHERE id = $1
        "#,
    )
    .bind(exam_id)
    .fetch_optional(executor)
    .await
}

/// Load an exam and hold its row lock until the transaction ends, so result
/// inserts for the same exam are serialized
pub async fn lock_by_id<'e, E>(executor: E, exam_id: Uuid) -> Result<Option<Exam>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM exams WHERE id = $1 FOR UPDATE
        "#,
    )
    .bind(exam_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E>(executor: E, new: &NewExam) -> Result<Exam, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO exams (course_id, exam_type, exam_date, exam_time, location, examiner, max_candidates)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
        "#,
    )
    .bind(new.course_id)
    .bind(new.exam_type)
    .bind(new.date)
    .bind(&new.time)
    .bind(&new.location)
    .bind(new.examiner.as_deref())
    .bind(new.max_candidates)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E>(
    executor: E,
    exam_id: Uuid,
    changes: &ExamChanges,
) -> Result<Option<Exam>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE exams
            SET course_id = COALESCE($2, course_id),
                exam_type = COALESCE($3, exam_type),
                exam_date = COALESCE($4, exam_date),
                exam_time = COALESCE($5, exam_time),
                location = COALESCE($6, location),
                examiner = COALESCE($7, examiner),
                max_candidates = COALESCE($8, max_candidates),
                status = COALESCE($9, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(exam_id)
    .bind(changes.course_id)
    .bind(changes.exam_type)
    .bind(changes.date)
    .bind(changes.time.as_deref())
    .bind(changes.location.as_deref())
    .bind(changes.examiner.as_deref())
    .bind(changes.max_candidates)
    .bind(changes.status)
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e, E>(executor: E, exam_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM exams WHERE id = $1
        "#,
    )
    .bind(exam_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Results
// ============================================================================

pub async fn list_results<'e, E>(executor: E, exam_id: Uuid) -> Result<Vec<ExamResult>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, exam_id, candidate_id, score, passed, notes, recorded_at
            FROM exam_results
            WHERE exam_id = $1
            ORDER BY recorded_at ASC
        "#,
    )
    .bind(exam_id)
    .fetch_all(executor)
    .await
}

pub async fn count_results<'e, E>(executor: E, exam_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*) FROM exam_results WHERE exam_id = $1
        "#,
    )
    .bind(exam_id)
    .fetch_one(executor)
    .await
}

pub async fn create_result<'e, E>(
    executor: E,
    exam_id: Uuid,
    result: &NewExamResult,
) -> Result<ExamResult, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO exam_results (exam_id, candidate_id, score, passed, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, exam_id, candidate_id, score, passed, notes, recorded_at
        "#,
    )
    .bind(exam_id)
    .bind(result.candidate_id)
    .bind(result.score)
    .bind(result.passed)
    .bind(result.notes.as_deref())
    .fetch_one(executor)
    .await
}
