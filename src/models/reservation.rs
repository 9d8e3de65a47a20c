// src/models/reservation.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ReservationStatus,
    #[schema(example = 3)]
    pub duration_days: i32,
    #[schema(example = "135.00")]
    pub total_price: Decimal,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// `start <= pedido_fim AND end >= pedido_início`, só para reservas ativas.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Active && self.start_date <= end && self.end_date >= start
    }

    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }

    pub fn ensure_owned_by(&self, customer_id: Uuid) -> Result<(), AppError> {
        // Para quem não é dono, a reserva "não existe".
        if self.customer_id != customer_id {
            return Err(AppError::ReservationNotFound);
        }
        Ok(())
    }

    pub fn ensure_active(&self) -> Result<(), AppError> {
        if self.status != ReservationStatus::Active {
            return Err(AppError::InvalidState(
                "A reserva já não está ativa.".into(),
            ));
        }
        Ok(())
    }
}

/// Intervalo pedido pelo cliente, já validado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl RentalPeriod {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, today: NaiveDate) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::field(
                "endDate",
                "date_order",
                "A data de fim deve ser posterior à data de início.",
            ));
        }
        if start.date_naive() < today {
            return Err(AppError::field(
                "startDate",
                "past_date",
                "A data de início não pode estar no passado.",
            ));
        }
        Ok(Self { start, end })
    }

    /// Dias cobrados: arredonda para cima, mínimo um dia.
    pub fn billable_days(&self) -> i32 {
        let span = self.end - self.start;
        let full_days = span.num_days();
        let days = if span > Duration::days(full_days) { full_days + 1 } else { full_days };
        days.max(1) as i32
    }

    pub fn price(&self, price_per_day: Decimal) -> Decimal {
        price_per_day * Decimal::from(self.billable_days())
    }
}

/// Reserva ainda não persistida.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub period: RentalPeriod,
    pub duration_days: i32,
    pub total_price: Decimal,
}

/// Confirmação devolvida após o pagamento simulado.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub reservation: Reservation,
    pub payment_reference: String,
    pub amount: Decimal,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn reservation(start: DateTime<Utc>, end: DateTime<Utc>, status: ReservationStatus) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
            status,
            duration_days: 1,
            total_price: Decimal::ZERO,
            paid_at: None,
            payment_reference: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn period_rejects_reversed_or_past_intervals() {
        assert!(RentalPeriod::new(at(2024, 5, 3, 10), at(2024, 5, 2, 10), today()).is_err());
        assert!(RentalPeriod::new(at(2024, 5, 3, 10), at(2024, 5, 3, 10), today()).is_err());
        assert!(RentalPeriod::new(at(2024, 4, 30, 10), at(2024, 5, 2, 10), today()).is_err());
        assert!(RentalPeriod::new(at(2024, 5, 1, 0), at(2024, 5, 2, 0), today()).is_ok());
    }

    #[test]
    fn billable_days_round_up_with_a_one_day_minimum() {
        let p = RentalPeriod::new(at(2024, 5, 2, 10), at(2024, 5, 2, 12), today()).unwrap();
        assert_eq!(p.billable_days(), 1);

        let p = RentalPeriod::new(at(2024, 5, 2, 10), at(2024, 5, 5, 10), today()).unwrap();
        assert_eq!(p.billable_days(), 3);

        let p = RentalPeriod::new(at(2024, 5, 2, 10), at(2024, 5, 5, 11), today()).unwrap();
        assert_eq!(p.billable_days(), 4);
        assert_eq!(p.price(Decimal::new(4550, 2)), Decimal::new(18200, 2));
    }

    #[test]
    fn overlap_is_inclusive_on_both_ends() {
        let booked = reservation(at(2024, 5, 10, 9), at(2024, 5, 12, 9), ReservationStatus::Active);

        assert!(booked.overlaps(at(2024, 5, 12, 9), at(2024, 5, 14, 9)));
        assert!(booked.overlaps(at(2024, 5, 8, 9), at(2024, 5, 10, 9)));
        assert!(booked.overlaps(at(2024, 5, 9, 0), at(2024, 5, 20, 0)));
        assert!(!booked.overlaps(at(2024, 5, 12, 10), at(2024, 5, 14, 9)));
        assert!(!booked.overlaps(at(2024, 5, 1, 9), at(2024, 5, 10, 8)));
    }

    #[test]
    fn cancelled_and_completed_bookings_never_overlap() {
        let cancelled = reservation(at(2024, 5, 10, 9), at(2024, 5, 12, 9), ReservationStatus::Cancelled);
        let completed = reservation(at(2024, 5, 10, 9), at(2024, 5, 12, 9), ReservationStatus::Completed);

        assert!(!cancelled.overlaps(at(2024, 5, 11, 0), at(2024, 5, 11, 12)));
        assert!(!completed.overlaps(at(2024, 5, 11, 0), at(2024, 5, 11, 12)));
    }

    #[test]
    fn only_the_owner_sees_the_reservation() {
        let r = reservation(at(2024, 5, 10, 9), at(2024, 5, 12, 9), ReservationStatus::Active);
        assert!(r.ensure_owned_by(r.customer_id).is_ok());
        assert!(matches!(r.ensure_owned_by(Uuid::new_v4()), Err(AppError::ReservationNotFound)));
    }
}
