// src/services/dashboard_service.rs

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    common::error::AppError,
    db::{CustomerRepository, VehicleRepository},
    models::{
        dashboard::{AdminDashboard, VehicleAlert},
        vehicle::{add_days, Vehicle, LEGALIZATION_INTERVAL_DAYS},
    },
    services::sweep_service::SweepService,
};

// Margem mínima de veículos acima do número de clientes
const STOCK_MARGIN: i64 = 5;

#[derive(Clone)]
pub struct DashboardService {
    vehicle_repo: VehicleRepository,
    customer_repo: CustomerRepository,
    sweep: SweepService,
    pool: sqlx::PgPool,
}

impl DashboardService {
    pub fn new(
        vehicle_repo: VehicleRepository,
        customer_repo: CustomerRepository,
        sweep: SweepService,
        pool: sqlx::PgPool,
    ) -> Self {
        Self { vehicle_repo, customer_repo, sweep, pool }
    }

    pub async fn build(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<AdminDashboard, AppError> {
        // O painel corre sempre a varredura antes de mostrar o estado.
        self.sweep.run(today, now).await?;

        self.vehicle_repo
            .backfill_next_legalization(&self.pool, add_days(today, LEGALIZATION_INTERVAL_DAYS))
            .await?;

        let vehicles = self.vehicle_repo.list_all().await?;
        let customer_count = self.customer_repo.count().await?;

        Ok(summarize(vehicles, customer_count, today))
    }
}

/// Monta o painel a partir dos dados já carregados.
pub fn summarize(vehicles: Vec<Vehicle>, customer_count: i64, today: NaiveDate) -> AdminDashboard {
    let maintenance_alerts: Vec<VehicleAlert> = vehicles
        .iter()
        .filter(|v| v.needs_maintenance_soon(today))
        .map(VehicleAlert::maintenance)
        .collect();

    let legalization_alerts: Vec<VehicleAlert> = vehicles
        .iter()
        .filter(|v| v.needs_legalization_soon(today))
        .map(VehicleAlert::legalization)
        .collect();

    let vehicle_count = vehicles.len() as i64;
    let stock_sufficient = vehicle_count >= customer_count + STOCK_MARGIN;

    let mut warnings = Vec::new();
    if !maintenance_alerts.is_empty() {
        let names: Vec<&str> = maintenance_alerts.iter().map(|a| a.description.as_str()).collect();
        warnings.push(format!(
            "Atenção: Os seguintes veículos precisam de manutenção: {}",
            names.join(", ")
        ));
    }
    if !legalization_alerts.is_empty() {
        let names: Vec<String> = legalization_alerts
            .iter()
            .map(|a| match a.due_date {
                Some(d) => format!("{} - Próxima Legalização: {}", a.description, d.format("%d/%m/%Y")),
                None => a.description.clone(),
            })
            .collect();
        warnings.push(format!(
            "Atenção: Os seguintes veículos precisam de legalização: {}",
            names.join(", ")
        ));
    }
    if !stock_sufficient {
        warnings.push(
            "Atenção: O estoque de veículos está baixo. Considere adicionar mais veículos para atender à demanda."
                .to_string(),
        );
    }

    AdminDashboard {
        today,
        vehicles,
        maintenance_alerts,
        legalization_alerts,
        vehicle_count,
        customer_count,
        stock_sufficient,
        warnings,
    }
}
