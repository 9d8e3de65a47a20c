// src/db/reservation_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::reservation::{NewReservation, Reservation, ReservationStatus},
};

// Cliente ou veículo removidos entre a autenticação e o INSERT.
fn map_foreign_key_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return missing_reference(db_err.constraint().unwrap_or_default());
        }
    }
    e.into()
}

fn missing_reference(constraint: &str) -> AppError {
    if constraint.contains("customer") {
        AppError::CustomerNotFound
    } else {
        AppError::VehicleNotFound
    }
}

#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Reservation>, AppError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations ORDER BY start_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(reservations)
    }

    pub async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Reservation>, AppError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE customer_id = $1 ORDER BY start_date DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reservations)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, AppError> {
        let reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(reservation)
    }

    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Reservation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(reservation)
    }

    /// Reservas ativas do veículo que tocam `[start, end]`.
    pub async fn find_overlapping<'e, E>(
        &self,
        executor: E,
        vehicle_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE vehicle_id = $1
              AND status = 'ACTIVE'
              AND start_date <= $3
              AND end_date >= $2
            "#,
        )
        .bind(vehicle_id)
        .bind(start)
        .bind(end)
        .fetch_all(executor)
        .await?;
        Ok(reservations)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        new: &NewReservation,
    ) -> Result<Reservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (
                customer_id, vehicle_id, start_date, end_date, duration_days, total_price
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.customer_id)
        .bind(new.vehicle_id)
        .bind(new.period.start)
        .bind(new.period.end)
        .bind(new.duration_days)
        .bind(new.total_price)
        .fetch_one(executor)
        .await
        .map_err(map_foreign_key_violation)?;
        Ok(reservation)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<Reservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        reservation.ok_or(AppError::ReservationNotFound)
    }

    pub async fn mark_paid<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payment_reference: &str,
    ) -> Result<Reservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET paid_at = NOW(), payment_reference = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment_reference)
        .fetch_optional(executor)
        .await?;

        reservation.ok_or(AppError::ReservationNotFound)
    }

    /// Fecha as reservas ativas cujo fim já passou.
    pub async fn complete_finished<'e, E>(
        &self,
        executor: E,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE reservations SET status = 'COMPLETED', updated_at = NOW()
            WHERE status = 'ACTIVE' AND end_date <= $1
            "#,
        )
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dangling_references_map_to_not_found() {
        assert!(matches!(
            missing_reference("reservations_customer_id_fkey"),
            AppError::CustomerNotFound
        ));
        assert!(matches!(
            missing_reference("reservations_vehicle_id_fkey"),
            AppError::VehicleNotFound
        ));
    }
}
