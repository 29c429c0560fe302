use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Admin, AdminCredentials, AdminProfileChanges};

pub async fn find_by_id<'e, E>(executor: E, admin_id: Uuid) -> Result<Option<Admin>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, created_at, updated_at
            FROM admins
            WHERE id = $1
        "#,
    )
    .bind(admin_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_credentials_by_email<'e, E>(
    executor: E,
    email: &str,
) -> Result<Option<AdminCredentials>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, password_hash
            FROM admins
            WHERE LOWER(email) = LOWER($1)
        "#,
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn find_credentials_by_id<'e, E>(
    executor: E,
    admin_id: Uuid,
) -> Result<Option<AdminCredentials>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, password_hash
            FROM admins
            WHERE id = $1
        "#,
    )
    .bind(admin_id)
    .fetch_optional(executor)
    .await
}

pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*) FROM admins
        "#,
    )
    .fetch_one(executor)
    .await
}

pub async fn create<'e, E>(
    executor: E,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<Admin, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO admins (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, created_at, updated_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(executor)
    .await
}

pub async fn update_profile<'e, E>(
    executor: E,
    admin_id: Uuid,
    changes: &AdminProfileChanges,
) -> Result<Option<Admin>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE admins
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, created_at, updated_at
        "#,
    )
    .bind(admin_id)
    .bind(changes.username.as_deref())
    .bind(changes.email.as_deref())
    .fetch_optional(executor)
    .await
}

/// Returns `false` when no admin with that id exists.
pub async fn update_password<'e, E>(
    executor: E,
    admin_id: Uuid,
    password_hash: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE admins
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(admin_id)
    .bind(password_hash)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
