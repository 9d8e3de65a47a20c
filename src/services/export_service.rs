// src/services/export_service.rs

use crate::{
    common::error::AppError,
    models::{customer::Customer, reservation::Reservation, vehicle::Vehicle},
    services::{
        customer_service::CustomerService, fleet_service::FleetService,
        reservation_service::ReservationService,
    },
};

/// Conjunto exportável pelo painel de administração.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Vehicles,
    Customers,
    Reservations,
}

impl ExportKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "vehicles" => Some(Self::Vehicles),
            "customers" => Some(Self::Customers),
            "reservations" => Some(Self::Reservations),
            _ => None,
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            Self::Vehicles => "veiculos.csv",
            Self::Customers => "clientes.csv",
            Self::Reservations => "reservas.csv",
        }
    }
}

#[derive(Clone)]
pub struct ExportService {
    fleet: FleetService,
    customers: CustomerService,
    reservations: ReservationService,
}

impl ExportService {
    pub fn new(fleet: FleetService, customers: CustomerService, reservations: ReservationService) -> Self {
        Self { fleet, customers, reservations }
    }

    pub async fn export(&self, kind: ExportKind) -> Result<String, AppError> {
        let csv = match kind {
            ExportKind::Vehicles => vehicles_csv(&self.fleet.list_vehicles().await?),
            ExportKind::Customers => customers_csv(&self.customers.list().await?),
            ExportKind::Reservations => reservations_csv(&self.reservations.list_all().await?),
        };
        tracing::info!("📤 Exportação gerada: {}", kind.filename());
        Ok(csv)
    }
}

// Aspas só quando o campo tem separador, aspas ou quebra de linha.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_row(out: &mut String, fields: &[String]) {
    let line: Vec<String> = fields.iter().map(|f| escape(f)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn vehicles_csv(vehicles: &[Vehicle]) -> String {
    let mut out = String::new();
    write_row(
        &mut out,
        &[
            "id", "tipo", "marca", "modelo", "ano", "preco_diario", "categoria", "disponivel",
            "em_manutencao", "ultima_manutencao", "proxima_manutencao", "ultima_legalizacao",
            "proxima_legalizacao", "disponivel_a_partir", "utilizacoes", "max_utilizacoes",
        ]
        .map(String::from),
    );
    for v in vehicles {
        write_row(
            &mut out,
            &[
                v.id.to_string(),
                v.vehicle_type.label().to_string(),
                v.brand.clone(),
                v.model.clone(),
                v.year.to_string(),
                v.price_per_day.to_string(),
                v.category.label().to_string(),
                v.available.to_string(),
                v.in_maintenance.to_string(),
                opt(v.last_maintenance_date),
                opt(v.next_maintenance_date),
                opt(v.last_legalization_date),
                opt(v.next_legalization_date),
                opt(v.available_from),
                v.num_uses.to_string(),
                v.max_uses_before_maintenance.to_string(),
            ],
        );
    }
    out
}

pub fn customers_csv(customers: &[Customer]) -> String {
    let mut out = String::new();
    write_row(
        &mut out,
        &[
            "id", "nome", "apelido", "email", "telefone", "data_nascimento", "morada", "nif",
            "diaria_preferida", "categoria",
        ]
        .map(String::from),
    );
    for c in customers {
        write_row(
            &mut out,
            &[
                c.id.to_string(),
                c.first_name.clone(),
                c.last_name.clone(),
                c.email.clone(),
                c.phone.clone(),
                c.birth_date.to_string(),
                c.address.clone(),
                c.tax_number.clone(),
                c.preferred_daily_rate.to_string(),
                c.category.label().to_string(),
            ],
        );
    }
    out
}

pub fn reservations_csv(reservations: &[Reservation]) -> String {
    let mut out = String::new();
    write_row(
        &mut out,
        &[
            "id", "cliente_id", "veiculo_id", "inicio", "fim", "estado", "dias", "preco_total",
            "pago_em", "referencia_pagamento",
        ]
        .map(String::from),
    );
    for r in reservations {
        write_row(
            &mut out,
            &[
                r.id.to_string(),
                r.customer_id.to_string(),
                r.vehicle_id.to_string(),
                r.start_date.to_rfc3339(),
                r.end_date.to_rfc3339(),
                format!("{:?}", r.status).to_uppercase(),
                r.duration_days.to_string(),
                r.total_price.to_string(),
                opt(r.paid_at.map(|p| p.to_rfc3339())),
                opt(r.payment_reference.clone()),
            ],
        );
    }
    out
}
