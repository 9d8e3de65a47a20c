// src/services/document_service.rs

use std::path::PathBuf;

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, VehicleRepository},
    models::{customer::Customer, reservation::Reservation, vehicle::Vehicle},
    services::reservation_service::ReservationService,
};

// Família esperada em FONTS_DIR: Roboto-Regular.ttf, Roboto-Bold.ttf, ...
const FONT_FAMILY: &str = "Roboto";

#[derive(Clone)]
pub struct DocumentService {
    reservations: ReservationService,
    vehicle_repo: VehicleRepository,
    customer_repo: CustomerRepository,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(
        reservations: ReservationService,
        vehicle_repo: VehicleRepository,
        customer_repo: CustomerRepository,
        fonts_dir: PathBuf,
    ) -> Self {
        Self { reservations, vehicle_repo, customer_repo, fonts_dir }
    }

    /// Recibo em PDF de uma reserva paga do próprio cliente.
    pub async fn reservation_receipt(
        &self,
        customer_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<Vec<u8>, AppError> {
        let reservation = self
            .reservations
            .get_for_customer(customer_id, reservation_id)
            .await?;
        if !reservation.is_paid() {
            return Err(AppError::InvalidState(
                "O recibo só está disponível após o pagamento.".into(),
            ));
        }

        let vehicle = self
            .vehicle_repo
            .find_by_id(reservation.vehicle_id)
            .await?
            .ok_or(AppError::VehicleNotFound)?;
        let customer = self
            .customer_repo
            .find_by_id(customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let fonts_dir = self.fonts_dir.clone();
        tokio::task::spawn_blocking(move || {
            render_receipt(&fonts_dir, &reservation, &vehicle, &customer)
        })
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?
    }
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

pub fn render_receipt(
    fonts_dir: &std::path::Path,
    reservation: &Reservation,
    vehicle: &Vehicle,
    customer: &Customer,
) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None).map_err(|_| {
        AppError::FontNotFound(format!("Fonte não encontrada na pasta {}", fonts_dir.display()))
    })?;

    let reference = reservation.payment_reference.clone().unwrap_or_default();

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Recibo {}", reference));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    // --- CABEÇALHO ---
    doc.push(elements::Paragraph::new("RECIBO DE ALUGUER").styled(style::Style::new().bold().with_font_size(18)));
    doc.push(elements::Paragraph::new(format!("Referência: {}", reference)));
    if let Some(paid_at) = reservation.paid_at {
        doc.push(elements::Paragraph::new(format!("Pago em: {}", paid_at.format("%d/%m/%Y %H:%M"))));
    }
    doc.push(elements::Break::new(1.5));

    doc.push(elements::Paragraph::new(format!("Cliente: {}", customer.full_name())));
    doc.push(elements::Paragraph::new(format!("NIF: {}", customer.tax_number)));
    doc.push(elements::Break::new(1.5));

    // --- DETALHE ---
    let mut table = elements::TableLayout::new(vec![3, 2, 2, 1, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Veículo").styled(bold))
        .element(elements::Paragraph::new("Início").styled(bold))
        .element(elements::Paragraph::new("Fim").styled(bold))
        .element(elements::Paragraph::new("Dias").styled(bold))
        .element(elements::Paragraph::new("Diária").styled(bold))
        .push()
        .map_err(pdf_error)?;

    table
        .row()
        .element(elements::Paragraph::new(vehicle.display_name()))
        .element(elements::Paragraph::new(reservation.start_date.format("%d/%m/%Y %H:%M").to_string()))
        .element(elements::Paragraph::new(reservation.end_date.format("%d/%m/%Y %H:%M").to_string()))
        .element(elements::Paragraph::new(reservation.duration_days.to_string()))
        .element(elements::Paragraph::new(format!("{:.2} €", vehicle.price_per_day)))
        .push()
        .map_err(pdf_error)?;

    doc.push(table);
    doc.push(elements::Break::new(2));

    let mut total = elements::Paragraph::new(format!("TOTAL PAGO: {:.2} €", reservation.total_price));
    total.set_alignment(genpdf::Alignment::Right);
    doc.push(total.styled(style::Style::new().bold().with_font_size(12)));
    doc.push(elements::Break::new(2));

    // --- QR CODE DA REFERÊNCIA ---
    if !reference.is_empty() {
        let code = QrCode::new(reference.as_bytes()).map_err(pdf_error)?;
        let buffer = code.render::<Luma<u8>>().build();
        let image = elements::Image::from_dynamic_image(image::DynamicImage::ImageLuma8(buffer))
            .map_err(pdf_error)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(image);
    }

    let mut out = Vec::new();
    doc.render(&mut out).map_err(pdf_error)?;
    Ok(out)
}
