// src/db/vehicle_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::vehicle::{NewVehicle, Vehicle},
};

#[derive(Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras simples (usam a pool principal)
    // ---

    pub async fn list_all(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles ORDER BY brand ASC, model ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    /// Veículos que o catálogo pode mostrar: disponíveis e fora da oficina.
    pub async fn list_rentable(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE available AND NOT in_maintenance
            ORDER BY price_per_day ASC, brand ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    /// IDs de veículos com reserva ativa que toca o intervalo pedido.
    pub async fn ids_booked_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, AppError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT vehicle_id FROM reservations
            WHERE status = 'ACTIVE' AND start_date <= $2 AND end_date >= $1
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    // ---
    // Funções transacionais (recebem um Executor)
    // ---

    /// Bloqueia a linha do veículo até ao fim da transação.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Vehicle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vehicle =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(vehicle)
    }

    pub async fn list_in_maintenance_for_update<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<Vehicle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE in_maintenance FOR UPDATE",
        )
        .fetch_all(executor)
        .await?;
        Ok(vehicles)
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewVehicle) -> Result<Vehicle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                vehicle_type, brand, model, year, price_per_day, category, category_id,
                last_maintenance_date, next_maintenance_date,
                last_legalization_date, next_legalization_date,
                available_from, max_uses_before_maintenance
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(new.vehicle_type)
        .bind(&new.brand)
        .bind(&new.model)
        .bind(new.year)
        .bind(new.price_per_day)
        .bind(new.category)
        .bind(new.category_id)
        .bind(new.last_maintenance_date)
        .bind(new.next_maintenance_date)
        .bind(new.last_legalization_date)
        .bind(new.next_legalization_date)
        .bind(new.available_from)
        .bind(new.max_uses_before_maintenance)
        .fetch_one(executor)
        .await?;
        Ok(vehicle)
    }

    /// Grava o estado completo do veículo (o domínio já aplicou as regras).
    pub async fn save<'e, E>(&self, executor: E, v: &Vehicle) -> Result<Vehicle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles SET
                vehicle_type = $2,
                brand = $3,
                model = $4,
                year = $5,
                price_per_day = $6,
                available = $7,
                category = $8,
                category_id = $9,
                in_maintenance = $10,
                last_maintenance_date = $11,
                next_maintenance_date = $12,
                maintenance_history = $13,
                last_legalization_date = $14,
                next_legalization_date = $15,
                legalization_history = $16,
                images = $17,
                available_from = $18,
                num_uses = $19,
                max_uses_before_maintenance = $20,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(v.id)
        .bind(v.vehicle_type)
        .bind(&v.brand)
        .bind(&v.model)
        .bind(v.year)
        .bind(v.price_per_day)
        .bind(v.available)
        .bind(v.category)
        .bind(v.category_id)
        .bind(v.in_maintenance)
        .bind(v.last_maintenance_date)
        .bind(v.next_maintenance_date)
        .bind(&v.maintenance_history)
        .bind(v.last_legalization_date)
        .bind(v.next_legalization_date)
        .bind(&v.legalization_history)
        .bind(&v.images)
        .bind(v.available_from)
        .bind(v.num_uses)
        .bind(v.max_uses_before_maintenance)
        .fetch_optional(executor)
        .await?;

        vehicle.ok_or(AppError::VehicleNotFound)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::VehicleNotFound);
        }
        Ok(())
    }

    /// Veículos antigos sem próxima legalização recebem uma data por omissão.
    pub async fn backfill_next_legalization<'e, E>(
        &self,
        executor: E,
        default_date: NaiveDate,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE vehicles SET next_legalization_date = $1, updated_at = NOW()
            WHERE next_legalization_date IS NULL
            "#,
        )
        .bind(default_date)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
