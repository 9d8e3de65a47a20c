// src/services/sweep_service.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    common::error::AppError,
    db::{ReservationRepository, VehicleRepository},
    models::dashboard::SweepReport,
};

/// Varredura periódica: devolve à frota os veículos cuja data de regresso da
/// oficina já passou e fecha as reservas terminadas.
#[derive(Clone)]
pub struct SweepService {
    vehicle_repo: VehicleRepository,
    reservation_repo: ReservationRepository,
    pool: PgPool,
}

impl SweepService {
    pub fn new(
        vehicle_repo: VehicleRepository,
        reservation_repo: ReservationRepository,
        pool: PgPool,
    ) -> Self {
        Self { vehicle_repo, reservation_repo, pool }
    }

    pub async fn run(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut report = SweepReport::default();

        let in_maintenance = self
            .vehicle_repo
            .list_in_maintenance_for_update(&mut *tx)
            .await?;

        for mut vehicle in in_maintenance {
            if vehicle.sweep_maintenance(today) {
                self.vehicle_repo.save(&mut *tx, &vehicle).await?;
                report.vehicles_released += 1;
            }
        }

        report.reservations_completed = self
            .reservation_repo
            .complete_finished(&mut *tx, now)
            .await?;

        tx.commit().await?;

        if report.vehicles_released > 0 || report.reservations_completed > 0 {
            info!(
                released = report.vehicles_released,
                completed = report.reservations_completed,
                "🔧 Varredura concluída"
            );
        }
        Ok(report)
    }
}

/// Arranca a tarefa em segundo plano. O primeiro tick é imediato.
pub fn start_sweep_task(service: SweepService, interval_secs: u64) {
    tokio::spawn(async move {
        info!(interval = interval_secs, "🔧 Tarefa de varredura iniciada");

        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

        loop {
            interval.tick().await;

            let now = Utc::now();
            if let Err(e) = service.run(now.date_naive(), now).await {
                warn!(error = %e, "Falha na varredura periódica");
            }
        }
    });
}
