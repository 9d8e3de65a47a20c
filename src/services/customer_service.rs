// src/services/customer_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CustomerRepository,
    models::customer::{Customer, CustomerProfile},
    services::auth::{ensure_adult, hash_password},
};

#[derive(Clone)]
pub struct CustomerService {
    customer_repo: CustomerRepository,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(customer_repo: CustomerRepository, pool: PgPool) -> Self {
        Self { customer_repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<Customer>, AppError> {
        self.customer_repo.list_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Customer, AppError> {
        self.customer_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }

    /// Criação pelo admin (o próprio cliente usa o registo em `AuthService`).
    pub async fn create(&self, profile: &CustomerProfile, password: &str) -> Result<Customer, AppError> {
        ensure_adult(profile, Utc::now().date_naive())?;
        let hashed = hash_password(password).await?;
        self.customer_repo.create(&self.pool, profile, &hashed).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        profile: &CustomerProfile,
        new_password: Option<&str>,
    ) -> Result<Customer, AppError> {
        ensure_adult(profile, Utc::now().date_naive())?;

        let hashed = match new_password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        self.customer_repo
            .update(&self.pool, id, profile, hashed.as_deref())
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.customer_repo.delete(&self.pool, id).await?;
        tracing::info!("🗑️ Cliente removido: {}", id);
        Ok(())
    }
}
