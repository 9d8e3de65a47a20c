// src/handlers/vehicles.rs

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        auth::validate_positive,
        vehicle::{NewVehicle, Vehicle, VehicleChanges, VehicleDetail, VehicleType},
    },
    services::fleet_service::UploadedImage,
};

const MIN_YEAR: i32 = 1900;

fn validate_year(year: i32) -> Result<(), AppError> {
    let max = Utc::now().year() + 1;
    if year < MIN_YEAR || year > max {
        return Err(AppError::field(
            "year",
            "range",
            &format!("O ano deve estar entre {} e {}.", MIN_YEAR, max),
        ));
    }
    Ok(())
}

fn validate_uses(val: i32) -> Result<(), ValidationError> {
    if val <= 0 {
        let mut err = ValidationError::new("range");
        err.message = Some("O número de utilizações deve ser positivo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateVehicle
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehiclePayload {
    pub vehicle_type: VehicleType,
    #[validate(length(min = 1, max = 100, message = "A marca é obrigatória."))]
    pub brand: String,
    #[validate(length(min = 1, max = 100, message = "O modelo é obrigatório."))]
    pub model: String,
    pub year: i32,
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "45.00")]
    pub price_per_day: Decimal,
    // Sem estas datas, assume legalização feita hoje
    pub last_legalization_date: Option<NaiveDate>,
    pub next_legalization_date: Option<NaiveDate>,
}

impl CreateVehiclePayload {
    fn into_new_vehicle(self, today: NaiveDate) -> Result<NewVehicle, AppError> {
        validate_year(self.year)?;

        let mut new = NewVehicle::initialize(
            self.vehicle_type,
            self.brand.trim().to_string(),
            self.model.trim().to_string(),
            self.year,
            self.price_per_day,
            today,
        );
        if let Some(last) = self.last_legalization_date {
            new.last_legalization_date = last;
        }
        if let Some(next) = self.next_legalization_date {
            new.next_legalization_date = next;
        }
        ensure_legalization_order(new.last_legalization_date, new.next_legalization_date)?;
        Ok(new)
    }
}

// ---
// Payload: UpdateVehicle (formulário de edição completo)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehiclePayload {
    pub vehicle_type: VehicleType,
    #[validate(length(min = 1, max = 100, message = "A marca é obrigatória."))]
    pub brand: String,
    #[validate(length(min = 1, max = 100, message = "O modelo é obrigatório."))]
    pub model: String,
    pub year: i32,
    #[validate(custom(function = "validate_positive"))]
    pub price_per_day: Decimal,
    pub last_maintenance_date: NaiveDate,
    pub next_maintenance_date: NaiveDate,
    pub last_legalization_date: NaiveDate,
    pub next_legalization_date: NaiveDate,
    pub available_from: NaiveDate,
    #[validate(custom(function = "validate_uses"))]
    pub max_uses_before_maintenance: i32,
}

impl UpdateVehiclePayload {
    fn into_changes(self) -> Result<VehicleChanges, AppError> {
        validate_year(self.year)?;
        ensure_legalization_order(self.last_legalization_date, self.next_legalization_date)?;

        Ok(VehicleChanges {
            vehicle_type: self.vehicle_type,
            brand: self.brand.trim().to_string(),
            model: self.model.trim().to_string(),
            year: self.year,
            price_per_day: self.price_per_day,
            last_maintenance_date: self.last_maintenance_date,
            next_maintenance_date: self.next_maintenance_date,
            last_legalization_date: self.last_legalization_date,
            next_legalization_date: self.next_legalization_date,
            available_from: self.available_from,
            max_uses_before_maintenance: self.max_uses_before_maintenance,
        })
    }
}

fn ensure_legalization_order(last: NaiveDate, next: NaiveDate) -> Result<(), AppError> {
    if last >= next {
        return Err(AppError::field(
            "nextLegalizationDate",
            "date_order",
            "A próxima legalização deve ser posterior à última.",
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/admin/vehicles",
    tag = "Fleet",
    responses((status = 200, description = "Todos os veículos", body = [Vehicle])),
    security(("api_jwt" = []))
)]
pub async fn list_vehicles(State(app_state): State<AppState>) -> Result<Json<Vec<Vehicle>>, AppError> {
    Ok(Json(app_state.fleet_service.list_vehicles().await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/vehicles/{id}",
    operation_id = "admin_get_vehicle",
    tag = "Fleet",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Veículo com histórico e imagens", body = VehicleDetail),
        (status = 404, description = "Veículo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_vehicle(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleDetail>, AppError> {
    let vehicle = app_state.fleet_service.get_vehicle(id).await?;
    Ok(Json(vehicle.into()))
}

#[utoipa::path(
    post,
    path = "/api/admin/vehicles",
    tag = "Fleet",
    request_body = CreateVehiclePayload,
    responses(
        (status = 201, description = "Veículo registado", body = Vehicle),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vehicle(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateVehiclePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new = payload.into_new_vehicle(Utc::now().date_naive())?;
    let vehicle = app_state.fleet_service.create_vehicle(new).await?;

    Ok((StatusCode::CREATED, Json(vehicle)))
}

#[utoipa::path(
    put,
    path = "/api/admin/vehicles/{id}",
    tag = "Fleet",
    request_body = UpdateVehiclePayload,
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Veículo atualizado", body = Vehicle),
        (status = 404, description = "Veículo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_vehicle(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVehiclePayload>,
) -> Result<Json<Vehicle>, AppError> {
    payload.validate()?;

    let changes = payload.into_changes()?;
    let vehicle = app_state.fleet_service.update_vehicle(id, changes).await?;
    Ok(Json(vehicle))
}

#[utoipa::path(
    delete,
    path = "/api/admin/vehicles/{id}",
    tag = "Fleet",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses((status = 204, description = "Veículo removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_vehicle(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.fleet_service.delete_vehicle(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/admin/vehicles/{id}/images",
    tag = "Fleet",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Imagens adicionadas", body = VehicleDetail),
        (status = 400, description = "Extensão não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_images(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<VehicleDetail>, AppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.body_text()))?
    {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let contents = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidUpload(e.body_text()))?;

        uploads.push(UploadedImage { original_name, contents: contents.to_vec() });
    }

    let vehicle = app_state.fleet_service.upload_images(id, uploads).await?;
    Ok(Json(vehicle.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/vehicles/{id}/images/{filename}",
    tag = "Fleet",
    params(
        ("id" = Uuid, Path, description = "ID do veículo"),
        ("filename" = String, Path, description = "Nome do ficheiro")
    ),
    responses(
        (status = 200, description = "Imagem removida"),
        (status = 404, description = "Imagem não pertence ao veículo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_image(
    State(app_state): State<AppState>,
    Path((id, filename)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (vehicle, existed) = app_state.fleet_service.delete_image(id, &filename).await?;

    let message = if existed {
        "Imagem removida com sucesso."
    } else {
        "A imagem já não existia no disco; a lista do veículo foi atualizada."
    };
    Ok(Json(json!({ "message": message, "vehicle": VehicleDetail::from(vehicle) })))
}

#[utoipa::path(
    post,
    path = "/api/admin/vehicles/{id}/maintenance/start",
    tag = "Fleet",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Veículo enviado para manutenção", body = Vehicle),
        (status = 422, description = "Veículo já em manutenção")
    ),
    security(("api_jwt" = []))
)]
pub async fn start_maintenance(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    let vehicle = app_state
        .fleet_service
        .start_maintenance(id, Utc::now().date_naive())
        .await?;
    Ok(Json(vehicle))
}

#[utoipa::path(
    post,
    path = "/api/admin/vehicles/{id}/maintenance/complete",
    tag = "Fleet",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Manutenção concluída", body = Vehicle),
        (status = 422, description = "Veículo não está em manutenção")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_maintenance(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    let vehicle = app_state
        .fleet_service
        .complete_maintenance(id, Utc::now().date_naive())
        .await?;
    Ok(Json(vehicle))
}

#[utoipa::path(
    post,
    path = "/api/admin/vehicles/{id}/legalize",
    tag = "Fleet",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses((status = 200, description = "Legalização registada", body = Vehicle)),
    security(("api_jwt" = []))
)]
pub async fn legalize(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    let vehicle = app_state
        .fleet_service
        .legalize(id, Utc::now().date_naive())
        .await?;
    Ok(Json(vehicle))
}

#[utoipa::path(
    post,
    path = "/api/admin/vehicles/{id}/usage",
    tag = "Fleet",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses((status = 200, description = "Utilização registada", body = Vehicle)),
    security(("api_jwt" = []))
)]
pub async fn register_usage(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    let vehicle = app_state
        .fleet_service
        .register_usage(id, Utc::now().date_naive())
        .await?;
    Ok(Json(vehicle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_payload() -> CreateVehiclePayload {
        CreateVehiclePayload {
            vehicle_type: VehicleType::Mota,
            brand: " Honda ".into(),
            model: "PCX".into(),
            year: 2022,
            price_per_day: Decimal::from(300),
            last_legalization_date: None,
            next_legalization_date: None,
        }
    }

    #[test]
    fn create_payload_derives_tier_and_trims() {
        let new = create_payload().into_new_vehicle(date(2024, 5, 1)).unwrap();
        assert_eq!(new.brand, "Honda");
        assert_eq!(new.category.label(), "Gold");
        assert_eq!(new.next_legalization_date, date(2025, 5, 1));
    }

    #[test]
    fn create_payload_rejects_inverted_legalization_dates() {
        let mut payload = create_payload();
        payload.last_legalization_date = Some(date(2024, 6, 1));
        payload.next_legalization_date = Some(date(2024, 1, 1));

        assert!(matches!(
            payload.into_new_vehicle(date(2024, 5, 1)),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn year_outside_range_is_rejected() {
        assert!(validate_year(1899).is_err());
        assert!(validate_year(Utc::now().year() + 2).is_err());
        assert!(validate_year(2020).is_ok());
    }

    #[test]
    fn zero_price_and_uses_fail_validation() {
        let payload = UpdateVehiclePayload {
            vehicle_type: VehicleType::Carro,
            brand: "Fiat".into(),
            model: "Panda".into(),
            year: 2019,
            price_per_day: Decimal::ZERO,
            last_maintenance_date: date(2024, 1, 1),
            next_maintenance_date: date(2024, 6, 1),
            last_legalization_date: date(2024, 1, 1),
            next_legalization_date: date(2025, 1, 1),
            available_from: date(2024, 1, 1),
            max_uses_before_maintenance: 0,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price_per_day"));
        assert!(errors.field_errors().contains_key("max_uses_before_maintenance"));
    }
}
