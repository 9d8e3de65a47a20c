// src/services/reservation_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReservationRepository, VehicleRepository},
    models::{
        reservation::{
            NewReservation, PaymentConfirmation, RentalPeriod, Reservation, ReservationStatus,
        },
        vehicle::Vehicle,
    },
};

/// Dados do cartão para o pagamento simulado (já validados no handler).
pub struct CardDetails {
    pub holder: String,
    pub last_digits: String,
}

#[derive(Clone)]
pub struct ReservationService {
    reservation_repo: ReservationRepository,
    vehicle_repo: VehicleRepository,
    pool: PgPool,
}

impl ReservationService {
    pub fn new(
        reservation_repo: ReservationRepository,
        vehicle_repo: VehicleRepository,
        pool: PgPool,
    ) -> Self {
        Self { reservation_repo, vehicle_repo, pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Reservation>, AppError> {
        self.reservation_repo.list_all().await
    }

    pub async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Reservation>, AppError> {
        self.reservation_repo.list_by_customer(customer_id).await
    }

    pub async fn get_for_customer(
        &self,
        customer_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<Reservation, AppError> {
        let reservation = self
            .reservation_repo
            .find_by_id(reservation_id)
            .await?
            .ok_or(AppError::ReservationNotFound)?;
        reservation.ensure_owned_by(customer_id)?;
        Ok(reservation)
    }

    /// Cria a reserva. A linha do veículo fica bloqueada durante a verificação de
    /// sobreposição, por isso dois pedidos concorrentes não reservam o mesmo período.
    pub async fn create(
        &self,
        customer_id: Uuid,
        vehicle_id: Uuid,
        period: RentalPeriod,
    ) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await?;

        let vehicle = self
            .vehicle_repo
            .find_by_id_for_update(&mut *tx, vehicle_id)
            .await?
            .ok_or(AppError::VehicleNotFound)?;

        let overlapping = self
            .reservation_repo
            .find_overlapping(&mut *tx, vehicle_id, period.start, period.end)
            .await?;
        ensure_bookable(&vehicle, &overlapping, &period)?;

        let new = NewReservation {
            customer_id,
            vehicle_id,
            period,
            duration_days: period.billable_days(),
            total_price: period.price(vehicle.price_per_day),
        };
        let reservation = self.reservation_repo.create(&mut *tx, &new).await?;
        tx.commit().await?;

        tracing::info!(
            "📅 Reserva {} criada para o veículo {} ({} dias)",
            reservation.id,
            vehicle_id,
            reservation.duration_days
        );
        Ok(reservation)
    }

    pub async fn cancel(&self, customer_id: Uuid, reservation_id: Uuid) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await?;

        let reservation = self
            .reservation_repo
            .find_by_id_for_update(&mut *tx, reservation_id)
            .await?
            .ok_or(AppError::ReservationNotFound)?;
        reservation.ensure_owned_by(customer_id)?;
        reservation.ensure_active()?;

        let cancelled = self
            .reservation_repo
            .set_status(&mut *tx, reservation_id, ReservationStatus::Cancelled)
            .await?;
        tx.commit().await?;

        tracing::info!("❌ Reserva {} cancelada pelo cliente", reservation_id);
        Ok(cancelled)
    }

    /// Pagamento simulado: marca a reserva como paga e conta uma utilização do veículo.
    pub async fn pay(
        &self,
        customer_id: Uuid,
        reservation_id: Uuid,
        card: CardDetails,
        today: NaiveDate,
    ) -> Result<PaymentConfirmation, AppError> {
        let mut tx = self.pool.begin().await?;

        let reservation = self
            .reservation_repo
            .find_by_id_for_update(&mut *tx, reservation_id)
            .await?
            .ok_or(AppError::ReservationNotFound)?;
        reservation.ensure_owned_by(customer_id)?;
        reservation.ensure_active()?;
        if reservation.is_paid() {
            return Err(AppError::InvalidState("A reserva já foi paga.".into()));
        }

        let payment_reference = format!(
            "PAY-{}",
            Uuid::new_v4().simple().to_string()[..12].to_uppercase()
        );
        let paid = self
            .reservation_repo
            .mark_paid(&mut *tx, reservation_id, &payment_reference)
            .await?;

        if let Some(mut vehicle) = self
            .vehicle_repo
            .find_by_id_for_update(&mut *tx, paid.vehicle_id)
            .await?
        {
            vehicle.register_usage(today);
            self.vehicle_repo.save(&mut *tx, &vehicle).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "💳 Pagamento {} registado (titular {}, cartão ****{}) às {}",
            payment_reference,
            card.holder,
            card.last_digits,
            Utc::now()
        );

        Ok(PaymentConfirmation {
            amount: paid.total_price,
            message: "Pagamento concluído com sucesso!".into(),
            payment_reference,
            reservation: paid,
        })
    }
}

/// O veículo pode ser reservado para `period`, dadas as reservas que o tocam.
pub fn ensure_bookable(
    vehicle: &Vehicle,
    existing: &[Reservation],
    period: &RentalPeriod,
) -> Result<(), AppError> {
    if !vehicle.is_rentable() {
        return Err(AppError::VehicleUnavailable);
    }
    if vehicle
        .available_from
        .is_some_and(|from| period.start.date_naive() < from)
    {
        return Err(AppError::VehicleUnavailable);
    }
    if existing.iter().any(|r| r.overlaps(period.start, period.end)) {
        return Err(AppError::ReservationConflict);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::tests::{date, sample_vehicle};
    use chrono::{DateTime, TimeZone};
    use rust_decimal::Decimal;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn booking(vehicle: &Vehicle, start: DateTime<Utc>, end: DateTime<Utc>) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            start_date: start,
            end_date: end,
            status: ReservationStatus::Active,
            duration_days: 3,
            total_price: Decimal::from(135),
            paid_at: None,
            payment_reference: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn period(start: DateTime<Utc>, end: DateTime<Utc>) -> RentalPeriod {
        RentalPeriod::new(start, end, date(2024, 6, 1)).unwrap()
    }

    #[test]
    fn free_vehicle_can_be_booked() {
        let vehicle = sample_vehicle(date(2024, 6, 1));
        let wanted = period(at(2024, 6, 10), at(2024, 6, 12));
        assert!(ensure_bookable(&vehicle, &[], &wanted).is_ok());
    }

    #[test]
    fn reservation_overlapping_an_active_booking_is_rejected() {
        let vehicle = sample_vehicle(date(2024, 6, 1));
        let existing = [booking(&vehicle, at(2024, 6, 10), at(2024, 6, 15))];
        let wanted = period(at(2024, 6, 14), at(2024, 6, 18));

        assert!(matches!(
            ensure_bookable(&vehicle, &existing, &wanted),
            Err(AppError::ReservationConflict)
        ));
    }

    #[test]
    fn cancelled_booking_does_not_block() {
        let vehicle = sample_vehicle(date(2024, 6, 1));
        let mut cancelled = booking(&vehicle, at(2024, 6, 10), at(2024, 6, 15));
        cancelled.status = ReservationStatus::Cancelled;
        let wanted = period(at(2024, 6, 12), at(2024, 6, 13));

        assert!(ensure_bookable(&vehicle, &[cancelled], &wanted).is_ok());
    }

    #[test]
    fn vehicle_in_maintenance_or_unavailable_is_rejected() {
        let wanted = period(at(2024, 6, 10), at(2024, 6, 12));

        let mut in_maintenance = sample_vehicle(date(2024, 6, 1));
        in_maintenance.start_maintenance(date(2024, 6, 1)).unwrap();
        assert!(matches!(
            ensure_bookable(&in_maintenance, &[], &wanted),
            Err(AppError::VehicleUnavailable)
        ));

        let mut withdrawn = sample_vehicle(date(2024, 6, 1));
        withdrawn.available = false;
        assert!(matches!(
            ensure_bookable(&withdrawn, &[], &wanted),
            Err(AppError::VehicleUnavailable)
        ));
    }

    #[test]
    fn start_before_available_from_is_rejected() {
        let mut vehicle = sample_vehicle(date(2024, 6, 1));
        vehicle.available_from = Some(date(2024, 6, 20));

        let too_early = period(at(2024, 6, 10), at(2024, 6, 12));
        assert!(matches!(
            ensure_bookable(&vehicle, &[], &too_early),
            Err(AppError::VehicleUnavailable)
        ));

        let on_time = period(at(2024, 6, 20), at(2024, 6, 22));
        assert!(ensure_bookable(&vehicle, &[], &on_time).is_ok());
    }
}
