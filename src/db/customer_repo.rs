// src/db/customer_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::customer::{Customer, CustomerProfile},
};

// Traduz violações de unicidade nas constraints da tabela 'customers'
fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if constraint.contains("tax_number") {
                return AppError::TaxNumberAlreadyExists;
            }
            return AppError::EmailAlreadyExists;
        }
    }
    e.into()
}

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers ORDER BY last_name ASC, first_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        let customer =
            sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(customer)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        profile: &CustomerProfile,
        password_hash: &str,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                first_name, last_name, email, phone, birth_date, address,
                tax_number, password_hash, preferred_daily_rate, category
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(profile.birth_date)
        .bind(&profile.address)
        .bind(&profile.tax_number)
        .bind(password_hash)
        .bind(profile.preferred_daily_rate)
        .bind(profile.category())
        .fetch_one(executor)
        .await
        .map_err(map_unique_violation)
    }

    /// Atualiza o perfil. `password_hash = None` mantém a senha atual.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        profile: &CustomerProfile,
        password_hash: Option<&str>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                first_name = $2,
                last_name = $3,
                email = $4,
                phone = $5,
                birth_date = $6,
                address = $7,
                tax_number = $8,
                password_hash = COALESCE($9, password_hash),
                preferred_daily_rate = $10,
                category = $11,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(profile.birth_date)
        .bind(&profile.address)
        .bind(&profile.tax_number)
        .bind(password_hash)
        .bind(profile.preferred_daily_rate)
        .bind(profile.category())
        .fetch_optional(executor)
        .await
        .map_err(map_unique_violation)?;

        customer.ok_or(AppError::CustomerNotFound)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::CustomerNotFound);
        }
        Ok(())
    }
}
