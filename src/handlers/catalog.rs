// src/handlers/catalog.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        category::Category,
        vehicle::{CategoryTier, Vehicle, VehicleDetail, VehicleFilter, VehicleType},
    },
};

/// Filtros do catálogo. `startDate`/`endDate` só contam quando vêm os dois.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    pub vehicle_type: Option<VehicleType>,
    pub category: Option<CategoryTier>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl CatalogQuery {
    fn filter(&self) -> VehicleFilter {
        VehicleFilter {
            vehicle_type: self.vehicle_type,
            category: self.category,
            brand: self.brand.clone().filter(|b| !b.trim().is_empty()),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }

    fn window(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, AppError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start < end => Ok(Some((start, end))),
            (Some(_), Some(_)) => Err(AppError::field(
                "endDate",
                "date_order",
                "A data de fim deve ser posterior à data de início.",
            )),
            _ => Ok(None),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/vehicles",
    tag = "Catalog",
    params(CatalogQuery),
    responses((status = 200, description = "Veículos disponíveis para aluguer", body = [Vehicle]))
)]
pub async fn list_catalog(
    State(app_state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let window = query.window()?;
    let vehicles = app_state
        .fleet_service
        .catalog(&query.filter(), window)
        .await?;
    Ok(Json(vehicles))
}

#[utoipa::path(
    get,
    path = "/api/vehicles/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Detalhe do veículo", body = VehicleDetail),
        (status = 404, description = "Veículo não encontrado")
    )
)]
pub async fn get_vehicle(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleDetail>, AppError> {
    let vehicle = app_state.fleet_service.get_vehicle(id).await?;
    Ok(Json(vehicle.into()))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Catalog",
    responses((status = 200, description = "Categorias", body = [Category]))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(app_state.category_repo.list_all().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn inverted_window_is_a_validation_error() {
        let query = CatalogQuery {
            start_date: Some(Utc.with_ymd_and_hms(2024, 5, 3, 10, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(matches!(query.window(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn half_open_window_is_ignored() {
        let query = CatalogQuery {
            start_date: Some(Utc.with_ymd_and_hms(2024, 5, 3, 10, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(query.window().unwrap().is_none());
    }

    #[test]
    fn blank_brand_does_not_filter() {
        let query = CatalogQuery { brand: Some("  ".into()), ..Default::default() };
        assert!(query.filter().brand.is_none());
    }
}
