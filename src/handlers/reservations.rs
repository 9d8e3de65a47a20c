// src/handlers/reservations.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CustomerUser,
    models::reservation::{PaymentConfirmation, RentalPeriod, Reservation},
    services::reservation_service::CardDetails,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationPayload {
    pub vehicle_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

fn validate_card_number(number: &str) -> Result<(), ValidationError> {
    let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
    if !(13..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("card_number");
        err.message = Some("O número do cartão deve ter entre 13 e 19 dígitos.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_expiry(expiry: &str) -> Result<(), ValidationError> {
    let valid = match expiry.split_once('/') {
        Some((mm, yy)) => {
            mm.len() == 2
                && yy.len() == 2
                && yy.chars().all(|c| c.is_ascii_digit())
                && mm.parse::<u8>().is_ok_and(|m| (1..=12).contains(&m))
        }
        None => false,
    };
    if !valid {
        let mut err = ValidationError::new("expiry");
        err.message = Some("A validade deve estar no formato MM/AA.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_cvv(cvv: &str) -> Result<(), ValidationError> {
    if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("cvv");
        err.message = Some("O CVV deve ter 3 ou 4 dígitos.".into());
        return Err(err);
    }
    Ok(())
}

// Dados do cartão para o pagamento simulado
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    #[validate(length(min = 1, max = 100, message = "O titular do cartão é obrigatório."))]
    pub card_holder: String,
    #[validate(custom(function = "validate_card_number"))]
    #[schema(example = "4111111111111111")]
    pub card_number: String,
    #[validate(custom(function = "validate_expiry"))]
    #[schema(example = "12/27")]
    pub expiry: String,
    #[validate(custom(function = "validate_cvv"))]
    pub cvv: String,
}

impl PaymentPayload {
    fn card_details(&self) -> CardDetails {
        let digits: String = self.card_number.chars().filter(|c| c.is_ascii_digit()).collect();
        let last_digits = digits[digits.len().saturating_sub(4)..].to_string();
        CardDetails { holder: self.card_holder.trim().to_string(), last_digits }
    }
}

#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = "Reservations",
    request_body = CreateReservationPayload,
    responses(
        (status = 201, description = "Reserva criada", body = Reservation),
        (status = 400, description = "Datas inválidas"),
        (status = 409, description = "Veículo indisponível ou período ocupado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_reservation(
    State(app_state): State<AppState>,
    CustomerUser(customer_id): CustomerUser,
    Json(payload): Json<CreateReservationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let period = RentalPeriod::new(payload.start_date, payload.end_date, Utc::now().date_naive())?;

    let reservation = app_state
        .reservation_service
        .create(customer_id, payload.vehicle_id, period)
        .await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = "Reservations",
    responses((status = 200, description = "Reservas do cliente autenticado", body = [Reservation])),
    security(("api_jwt" = []))
)]
pub async fn list_my_reservations(
    State(app_state): State<AppState>,
    CustomerUser(customer_id): CustomerUser,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let reservations = app_state
        .reservation_service
        .list_for_customer(customer_id)
        .await?;
    Ok(Json(reservations))
}

#[utoipa::path(
    post,
    path = "/api/reservations/{id}/pay",
    tag = "Reservations",
    request_body = PaymentPayload,
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Pagamento simulado concluído", body = PaymentConfirmation),
        (status = 422, description = "Reserva já paga ou inativa")
    ),
    security(("api_jwt" = []))
)]
pub async fn pay_reservation(
    State(app_state): State<AppState>,
    CustomerUser(customer_id): CustomerUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentPayload>,
) -> Result<Json<PaymentConfirmation>, AppError> {
    payload.validate()?;

    let confirmation = app_state
        .reservation_service
        .pay(customer_id, id, payload.card_details(), Utc::now().date_naive())
        .await?;
    Ok(Json(confirmation))
}

#[utoipa::path(
    post,
    path = "/api/reservations/{id}/cancel",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva cancelada", body = Reservation),
        (status = 422, description = "Reserva já não está ativa")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_reservation(
    State(app_state): State<AppState>,
    CustomerUser(customer_id): CustomerUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = app_state.reservation_service.cancel(customer_id, id).await?;
    Ok(Json(reservation))
}

#[utoipa::path(
    get,
    path = "/api/reservations/{id}/receipt",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Recibo em PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 422, description = "Reserva ainda não paga")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_receipt(
    State(app_state): State<AppState>,
    CustomerUser(customer_id): CustomerUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state
        .document_service
        .reservation_receipt(customer_id, id)
        .await?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"recibo_{}.pdf\"", id)),
    ];

    Ok((headers, pdf_bytes).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/reservations",
    tag = "Reservations",
    responses((status = 200, description = "Todas as reservas", body = [Reservation])),
    security(("api_jwt" = []))
)]
pub async fn list_all_reservations(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(app_state.reservation_service.list_all().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment() -> PaymentPayload {
        PaymentPayload {
            card_holder: "Ana Silva".into(),
            card_number: "4111 1111 1111 1111".into(),
            expiry: "12/27".into(),
            cvv: "123".into(),
        }
    }

    #[test]
    fn valid_card_passes_and_keeps_last_four_digits() {
        let payload = payment();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.card_details().last_digits, "1111");
    }

    #[test]
    fn malformed_card_fields_are_reported_per_field() {
        let payload = PaymentPayload {
            card_holder: "".into(),
            card_number: "4111".into(),
            expiry: "13/27".into(),
            cvv: "12a".into(),
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["card_holder", "card_number", "expiry", "cvv"] {
            assert!(fields.contains_key(field), "faltou {}", field);
        }
    }
}
