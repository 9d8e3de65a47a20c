// src/services/fleet_service.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::{collections::HashSet, sync::Arc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CategoryRepository, VehicleRepository},
    models::vehicle::{NewVehicle, Vehicle, VehicleChanges, VehicleFilter},
    services::storage::{vehicle_image_name, ImageStorage},
};

/// Uma imagem recebida no upload, ainda com o nome original.
pub struct UploadedImage {
    pub original_name: String,
    pub contents: Vec<u8>,
}

#[derive(Clone)]
pub struct FleetService {
    vehicle_repo: VehicleRepository,
    category_repo: CategoryRepository,
    storage: Arc<dyn ImageStorage>,
    pool: PgPool,
}

impl FleetService {
    pub fn new(
        vehicle_repo: VehicleRepository,
        category_repo: CategoryRepository,
        storage: Arc<dyn ImageStorage>,
        pool: PgPool,
    ) -> Self {
        Self { vehicle_repo, category_repo, storage, pool }
    }

    // --- LEITURAS ---

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        self.vehicle_repo.list_all().await
    }

    pub async fn get_vehicle(&self, id: Uuid) -> Result<Vehicle, AppError> {
        self.vehicle_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::VehicleNotFound)
    }

    /// Catálogo público. Com janela de datas, esconde os veículos já reservados nesse período.
    pub async fn catalog(
        &self,
        filter: &VehicleFilter,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Vehicle>, AppError> {
        let booked: HashSet<Uuid> = match window {
            Some((start, end)) => self
                .vehicle_repo
                .ids_booked_between(start, end)
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        let vehicles = self
            .vehicle_repo
            .list_rentable()
            .await?
            .into_iter()
            .filter(|v| filter.matches(v))
            .filter(|v| !booked.contains(&v.id))
            .filter(|v| match (window, v.available_from) {
                (Some((start, _)), Some(from)) => start.date_naive() >= from,
                _ => true,
            })
            .collect();

        Ok(vehicles)
    }

    // --- ESCRITAS ---

    pub async fn create_vehicle(&self, mut new: NewVehicle) -> Result<Vehicle, AppError> {
        let mut tx = self.pool.begin().await?;

        new.category_id = self
            .category_repo
            .find_by_name(&mut *tx, new.category.label())
            .await?
            .map(|c| c.id);

        let vehicle = self.vehicle_repo.create(&mut *tx, &new).await?;
        tx.commit().await?;

        tracing::info!("🚗 Veículo criado: {} ({})", vehicle.display_name(), vehicle.id);
        Ok(vehicle)
    }

    pub async fn update_vehicle(&self, id: Uuid, changes: VehicleChanges) -> Result<Vehicle, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut vehicle = self.lock_vehicle(&mut tx, id).await?;

        vehicle.apply_changes(changes);
        vehicle.category_id = self
            .category_repo
            .find_by_name(&mut *tx, vehicle.category.label())
            .await?
            .map(|c| c.id);

        let saved = self.vehicle_repo.save(&mut *tx, &vehicle).await?;
        tx.commit().await?;
        Ok(saved)
    }

    pub async fn delete_vehicle(&self, id: Uuid) -> Result<(), AppError> {
        let vehicle = self.get_vehicle(id).await?;
        self.vehicle_repo.delete(&self.pool, id).await?;

        // As fotos já não têm dono; falhas aqui não desfazem a remoção.
        for image in vehicle.image_paths() {
            if let Err(e) = self.storage.delete(&image).await {
                tracing::warn!("Falha ao remover imagem '{}': {}", image, e);
            }
        }

        tracing::info!("🗑️ Veículo removido: {}", id);
        Ok(())
    }

    pub async fn start_maintenance(&self, id: Uuid, today: NaiveDate) -> Result<Vehicle, AppError> {
        self.mutate(id, |v| v.start_maintenance(today)).await
    }

    pub async fn complete_maintenance(&self, id: Uuid, today: NaiveDate) -> Result<Vehicle, AppError> {
        self.mutate(id, |v| v.end_maintenance(today)).await
    }

    pub async fn legalize(&self, id: Uuid, today: NaiveDate) -> Result<Vehicle, AppError> {
        self.mutate(id, |v| {
            v.legalize(today);
            Ok(())
        })
        .await
    }

    pub async fn register_usage(&self, id: Uuid, today: NaiveDate) -> Result<Vehicle, AppError> {
        self.mutate(id, |v| {
            v.register_usage(today);
            Ok(())
        })
        .await
    }

    pub async fn upload_images(
        &self,
        id: Uuid,
        uploads: Vec<UploadedImage>,
    ) -> Result<Vehicle, AppError> {
        if uploads.is_empty() {
            return Err(AppError::InvalidUpload("nenhuma imagem enviada".into()));
        }

        // Valida tudo antes de escrever qualquer ficheiro
        let mut files = Vec::with_capacity(uploads.len());
        for upload in uploads {
            if upload.contents.is_empty() {
                continue;
            }
            files.push((vehicle_image_name(id, &upload.original_name)?, upload.contents));
        }

        let mut tx = self.pool.begin().await?;
        let mut vehicle = self.lock_vehicle(&mut tx, id).await?;

        let mut names = Vec::with_capacity(files.len());
        for (name, contents) in &files {
            self.storage.save(name, contents).await?;
            names.push(name.clone());
        }

        vehicle.add_images(&names);
        let saved = self.vehicle_repo.save(&mut *tx, &vehicle).await?;
        tx.commit().await?;
        Ok(saved)
    }

    /// Remove a imagem da lista do veículo e do disco.
    /// O booleano indica se o ficheiro ainda existia.
    pub async fn delete_image(&self, id: Uuid, filename: &str) -> Result<(Vehicle, bool), AppError> {
        let mut tx = self.pool.begin().await?;
        let mut vehicle = self.lock_vehicle(&mut tx, id).await?;

        vehicle.remove_image(filename)?;
        let saved = self.vehicle_repo.save(&mut *tx, &vehicle).await?;
        tx.commit().await?;

        // O ficheiro só sai do disco depois do commit.
        let existed = self.storage.delete(filename).await?;
        if !existed {
            tracing::warn!("Imagem '{}' já não existia no disco; lista atualizada.", filename);
        }
        Ok((saved, existed))
    }

    // --- AUXILIARES ---

    async fn lock_vehicle(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        id: Uuid,
    ) -> Result<Vehicle, AppError> {
        self.vehicle_repo
            .find_by_id_for_update(&mut **tx, id)
            .await?
            .ok_or(AppError::VehicleNotFound)
    }

    // Carrega com lock, aplica a regra de domínio e grava, tudo numa transação.
    async fn mutate<F>(&self, id: Uuid, apply: F) -> Result<Vehicle, AppError>
    where
        F: FnOnce(&mut Vehicle) -> Result<(), AppError>,
    {
        let mut tx = self.pool.begin().await?;
        let mut vehicle = self.lock_vehicle(&mut tx, id).await?;

        apply(&mut vehicle)?;

        let saved = self.vehicle_repo.save(&mut *tx, &vehicle).await?;
        tx.commit().await?;
        Ok(saved)
    }
}
