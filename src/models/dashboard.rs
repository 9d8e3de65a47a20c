// src/models/dashboard.rs

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::vehicle::Vehicle;

/// Um veículo que precisa de atenção (revisão ou legalização).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleAlert {
    pub vehicle_id: Uuid,
    #[schema(example = "Toyota Yaris (Carro)")]
    pub description: String,
    pub due_date: Option<NaiveDate>,
}

impl VehicleAlert {
    pub fn maintenance(vehicle: &Vehicle) -> Self {
        Self {
            vehicle_id: vehicle.id,
            description: vehicle.display_name(),
            due_date: vehicle.next_maintenance_date,
        }
    }

    pub fn legalization(vehicle: &Vehicle) -> Self {
        Self {
            vehicle_id: vehicle.id,
            description: vehicle.display_name(),
            due_date: vehicle.next_legalization_date,
        }
    }
}

// Painel do administrador
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub today: NaiveDate,
    pub vehicles: Vec<Vehicle>,
    pub maintenance_alerts: Vec<VehicleAlert>,
    pub legalization_alerts: Vec<VehicleAlert>,
    pub vehicle_count: i64,
    pub customer_count: i64,
    pub stock_sufficient: bool,
    pub warnings: Vec<String>,
}

/// Resultado de uma passagem da varredura periódica.
#[derive(Debug, Default, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub vehicles_released: u64,
    pub reservations_completed: u64,
}
