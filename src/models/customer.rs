// src/models/customer.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::vehicle::CategoryTier;

pub const MINIMUM_AGE: i32 = 18;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[schema(example = "Ana")]
    pub first_name: String,
    #[schema(example = "Silva")]
    pub last_name: String,
    #[schema(example = "ana.silva@example.pt")]
    pub email: String,
    #[schema(example = "912345678")]
    pub phone: String,
    pub birth_date: NaiveDate,
    #[schema(example = "Rua das Flores 10, Lisboa")]
    pub address: String,
    #[schema(example = "123456789")]
    pub tax_number: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub preferred_daily_rate: Decimal,
    pub category: CategoryTier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Perfil de cliente pronto a gravar (senha já com hash).
#[derive(Debug, Clone)]
pub struct CustomerProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub tax_number: String,
    pub preferred_daily_rate: Decimal,
}

impl CustomerProfile {
    pub fn category(&self) -> CategoryTier {
        CategoryTier::from_daily_price(self.preferred_daily_rate)
    }
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Idade completa em anos na data `today`.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn sample_customer() -> Customer {
        Customer {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            email: "ana@example.pt".into(),
            phone: "912345678".into(),
            birth_date: date(1990, 5, 20),
            address: "Lisboa".into(),
            tax_number: "123456789".into(),
            password_hash: "hash".into(),
            preferred_daily_rate: Decimal::from(40),
            category: CategoryTier::Economico,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let json = serde_json::to_value(sample_customer()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["taxNumber"], "123456789");
    }

    #[test]
    fn age_counts_only_completed_birthdays() {
        assert_eq!(age_on(date(2006, 6, 15), date(2024, 6, 14)), 17);
        assert_eq!(age_on(date(2006, 6, 15), date(2024, 6, 15)), 18);
        assert_eq!(age_on(date(2000, 2, 29), date(2024, 2, 28)), 23);
    }

    #[test]
    fn customer_tier_follows_preferred_rate() {
        let profile = CustomerProfile {
            first_name: "Rui".into(),
            last_name: "Costa".into(),
            email: "rui@example.pt".into(),
            phone: "910000000".into(),
            birth_date: date(1990, 1, 1),
            address: "Porto".into(),
            tax_number: "200000000".into(),
            preferred_daily_rate: Decimal::from(120),
        };
        assert_eq!(profile.category(), CategoryTier::Silver);
    }
}
