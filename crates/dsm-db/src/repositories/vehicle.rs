use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{
    MaintenanceRecord, NewMaintenanceRecord, NewVehicle, PageRequest, Vehicle, VehicleChanges,
    VehicleFilter, VehicleStatus,
};

pub async fn list<'e, E>(
    executor: E,
    filter: &VehicleFilter,
    page: PageRequest,
) -> Result<Vec<Vehicle>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT *
            FROM vehicles
            WHERE ($1::vehicle_status IS NULL OR status = $1)
                AND ($2::license_category IS NULL OR category = $2)
                AND ($3::text IS NULL
                    OR plate_number ILIKE '%' || $3 || '%'
                    OR brand ILIKE '%' || $3 || '%'
                    OR model ILIKE '%' || $3 || '%')
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
        "#,
    )
    .bind(filter.status)
    .bind(filter.category)
    .bind(filter.search.as_deref())
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: &VehicleFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM vehicles
            WHERE ($1::vehicle_status IS NULL OR status = $1)
                AND ($2::license_category IS NULL OR category = $2)
                AND ($3::text IS NULL
                    OR plate_number ILIKE '%' || $3 || '%'
                    OR brand ILIKE '%' || $3 || '%'
                    OR model ILIKE '%' || $3 || '%')
        "#,
    )
    .bind(filter.status)
    .bind(filter.category)
    .bind(filter.search.as_deref())
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, vehicle_id: Uuid) -> Result<Option<Vehicle>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM vehicles WHERE id = $1
        "#,
    )
    .bind(vehicle_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E>(executor: E, new: &NewVehicle) -> Result<Vehicle, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO vehicles (category, brand, model, plate_number, year, mileage, status)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'available'::vehicle_status))
            RETURNING *
        "#,
    )
    .bind(new.category)
    .bind(&new.brand)
    .bind(&new.model)
    .bind(&new.plate_number)
    .bind(new.year)
    .bind(new.mileage)
    .bind(new.status)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E>(
    executor: E,
    vehicle_id: Uuid,
    changes: &VehicleChanges,
) -> Result<Option<Vehicle>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE vehicles
            SET category = COALESCE($2, category),
                brand = COALESCE($3, brand),
                model = COALESCE($4, model),
                plate_number = COALESCE($5, plate_number),
                year = COALESCE($6, year),
                mileage = COALESCE($7, mileage),
                status = COALESCE($8, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(vehicle_id)
    .bind(changes.category)
    .bind(changes.brand.as_deref())
    .bind(changes.model.as_deref())
    .bind(changes.plate_number.as_deref())
    .bind(changes.year)
    .bind(changes.mileage)
    .bind(changes.status)
    .fetch_optional(executor)
    .await
}

pub async fn set_status<'e, E>(
    executor: E,
    vehicle_id: Uuid,
    status: VehicleStatus,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE vehicles
            SET status = $2, updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(vehicle_id)
    .bind(status)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Raise the odometer reading; lower readings are ignored.
pub async fn bump_mileage<'e, E>(
    executor: E,
    vehicle_id: Uuid,
    mileage: i32,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE vehicles
            SET mileage = GREATEST(COALESCE(mileage, 0), $2), updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(vehicle_id)
    .bind(mileage)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn delete<'e, E>(executor: E, vehicle_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM vehicles WHERE id = $1
        "#,
    )
    .bind(vehicle_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn maintenance_history<'e, E>(
    executor: E,
    vehicle_id: Uuid,
) -> Result<Vec<MaintenanceRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, vehicle_id, performed_on, description, cost, mileage, created_at
            FROM vehicle_maintenance
            WHERE vehicle_id = $1
            ORDER BY performed_on DESC, created_at DESC
        "#,
    )
    .bind(vehicle_id)
    .fetch_all(executor)
    .await
}

pub async fn add_maintenance<'e, E>(
    executor: E,
    vehicle_id: Uuid,
    record: &NewMaintenanceRecord,
) -> Result<MaintenanceRecord, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO vehicle_maintenance (vehicle_id, performed_on, description, cost, mileage)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, vehicle_id, performed_on, description, cost, mileage, created_at
        "#,
    )
    .bind(vehicle_id)
    .bind(record.performed_on)
    .bind(&record.description)
    .bind(record.cost)
    .bind(record.mileage)
    .fetch_one(executor)
    .await
}
