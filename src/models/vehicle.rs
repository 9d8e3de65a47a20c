// src/models/vehicle.rs

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// Intervalos do ciclo de vida (em dias)
pub const MAINTENANCE_INTERVAL_DAYS: u64 = 180;
pub const MAINTENANCE_DURATION_DAYS: u64 = 30;
pub const LEGALIZATION_INTERVAL_DAYS: u64 = 365;
pub const ALERT_WINDOW_DAYS: i64 = 30;
pub const USAGE_MAINTENANCE_MIN_DAYS: i64 = 30;
pub const DEFAULT_MAX_USES: i32 = 50;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "vehicle_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Carro,
    Mota,
}

impl VehicleType {
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::Carro => "Carro",
            VehicleType::Mota => "Mota",
        }
    }
}

/// Escalão de preço, usado tanto para veículos como para clientes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "category_tier", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryTier {
    #[serde(rename = "Económico")]
    Economico,
    Silver,
    Gold,
}

impl CategoryTier {
    /// `<= 50` Económico, `<= 250` Silver, acima disso Gold.
    pub fn from_daily_price(price: Decimal) -> Self {
        let price = price.round_dp(2);
        if price <= Decimal::from(50) {
            CategoryTier::Economico
        } else if price <= Decimal::from(250) {
            CategoryTier::Silver
        } else {
            CategoryTier::Gold
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryTier::Economico => "Económico",
            CategoryTier::Silver => "Silver",
            CategoryTier::Gold => "Gold",
        }
    }
}

// --- Veículo ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub vehicle_type: VehicleType,
    #[schema(example = "Toyota")]
    pub brand: String,
    #[schema(example = "Yaris")]
    pub model: String,
    #[schema(example = 2021)]
    pub year: i32,
    #[schema(example = "45.00")]
    pub price_per_day: Decimal,
    pub available: bool,
    pub category: CategoryTier,
    pub category_id: Option<Uuid>,

    pub in_maintenance: bool,
    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,
    pub maintenance_history: String,

    pub last_legalization_date: Option<NaiveDate>,
    pub next_legalization_date: Option<NaiveDate>,
    pub legalization_history: String,

    // Nomes de ficheiro separados por vírgula
    pub images: String,
    pub available_from: Option<NaiveDate>,
    pub num_uses: i32,
    pub max_uses_before_maintenance: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados de um veículo ainda não persistido.
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price_per_day: Decimal,
    pub category: CategoryTier,
    pub category_id: Option<Uuid>,
    pub last_maintenance_date: NaiveDate,
    pub next_maintenance_date: NaiveDate,
    pub last_legalization_date: NaiveDate,
    pub next_legalization_date: NaiveDate,
    pub available_from: NaiveDate,
    pub max_uses_before_maintenance: i32,
}

impl NewVehicle {
    /// Estado inicial de um veículo acabado de registar: legalizado e revisto hoje,
    /// disponível a partir de hoje, categoria derivada da diária.
    pub fn initialize(
        vehicle_type: VehicleType,
        brand: String,
        model: String,
        year: i32,
        price_per_day: Decimal,
        today: NaiveDate,
    ) -> Self {
        Self {
            vehicle_type,
            brand,
            model,
            year,
            price_per_day,
            category: CategoryTier::from_daily_price(price_per_day),
            category_id: None,
            last_maintenance_date: today,
            next_maintenance_date: add_days(today, MAINTENANCE_INTERVAL_DAYS),
            last_legalization_date: today,
            next_legalization_date: add_days(today, LEGALIZATION_INTERVAL_DAYS),
            available_from: today,
            max_uses_before_maintenance: DEFAULT_MAX_USES,
        }
    }
}

/// Entrada do formulário de edição, já validada pelo handler.
#[derive(Debug, Clone)]
pub struct VehicleChanges {
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price_per_day: Decimal,
    pub last_maintenance_date: NaiveDate,
    pub next_maintenance_date: NaiveDate,
    pub last_legalization_date: NaiveDate,
    pub next_legalization_date: NaiveDate,
    pub available_from: NaiveDate,
    pub max_uses_before_maintenance: i32,
}

pub(crate) fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

fn stamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl Vehicle {
    pub fn apply_changes(&mut self, changes: VehicleChanges) {
        self.vehicle_type = changes.vehicle_type;
        self.brand = changes.brand;
        self.model = changes.model;
        self.year = changes.year;
        self.price_per_day = changes.price_per_day;
        self.category = CategoryTier::from_daily_price(changes.price_per_day);
        self.last_maintenance_date = Some(changes.last_maintenance_date);
        self.next_maintenance_date = Some(changes.next_maintenance_date);
        self.last_legalization_date = Some(changes.last_legalization_date);
        self.next_legalization_date = Some(changes.next_legalization_date);
        self.available_from = Some(changes.available_from);
        self.max_uses_before_maintenance = changes.max_uses_before_maintenance;
    }

    /// Envia o veículo para a oficina. `next_maintenance_date` passa a ser a data
    /// prevista de regresso, que é o que a varredura diária compara.
    pub fn start_maintenance(&mut self, today: NaiveDate) -> Result<(), AppError> {
        if self.in_maintenance {
            return Err(AppError::InvalidState("O veículo já está em manutenção.".into()));
        }
        self.in_maintenance = true;
        self.available = false;
        self.last_maintenance_date = Some(today);
        self.next_maintenance_date = Some(add_days(today, MAINTENANCE_DURATION_DAYS));
        self.maintenance_history
            .push_str(&format!("Manutenção iniciada {};", stamp(today)));
        Ok(())
    }

    pub fn end_maintenance(&mut self, today: NaiveDate) -> Result<(), AppError> {
        if !self.in_maintenance {
            return Err(AppError::InvalidState("O veículo não está em manutenção.".into()));
        }
        self.release_from_maintenance(today);
        Ok(())
    }

    // Partilhado entre a conclusão manual e a varredura.
    fn release_from_maintenance(&mut self, today: NaiveDate) {
        let last = self.last_maintenance_date.unwrap_or(today);
        self.in_maintenance = false;
        self.available = true;
        self.next_maintenance_date = Some(add_days(last, MAINTENANCE_INTERVAL_DAYS));
        self.maintenance_history
            .push_str(&format!("Manutenção concluída {};", stamp(last)));
    }

    /// Regra da varredura: devolve `true` se o veículo saiu da manutenção.
    pub fn sweep_maintenance(&mut self, today: NaiveDate) -> bool {
        match self.next_maintenance_date {
            Some(due) if self.in_maintenance && due <= today => {
                self.release_from_maintenance(today);
                true
            }
            _ => false,
        }
    }

    pub fn legalize(&mut self, today: NaiveDate) {
        self.last_legalization_date = Some(today);
        self.next_legalization_date = Some(add_days(today, LEGALIZATION_INTERVAL_DAYS));
        self.legalization_history
            .push_str(&format!("Legalização realizada {};", stamp(today)));
    }

    /// Conta mais uma utilização. Atingido o limite, e passados pelo menos 30 dias
    /// da última revisão, a próxima revisão é antecipada para `última + 30`.
    pub fn register_usage(&mut self, today: NaiveDate) {
        self.num_uses += 1;

        if self.num_uses >= self.max_uses_before_maintenance {
            if let Some(last) = self.last_maintenance_date {
                if (today - last).num_days() >= USAGE_MAINTENANCE_MIN_DAYS {
                    self.next_maintenance_date = Some(add_days(last, MAINTENANCE_DURATION_DAYS));
                }
            }
        }
    }

    pub fn needs_maintenance_soon(&self, today: NaiveDate) -> bool {
        !self.in_maintenance
            && self
                .next_maintenance_date
                .is_some_and(|d| (d - today).num_days() <= ALERT_WINDOW_DAYS)
    }

    pub fn needs_legalization_soon(&self, today: NaiveDate) -> bool {
        !self.in_maintenance
            && self
                .next_legalization_date
                .is_some_and(|d| (d - today).num_days() <= ALERT_WINDOW_DAYS)
    }

    /// Pode ser reservado (ignorando sobreposição com outras reservas).
    pub fn is_rentable(&self) -> bool {
        self.available && !self.in_maintenance
    }

    pub fn image_paths(&self) -> Vec<String> {
        split_images(&self.images)
    }

    pub fn add_images(&mut self, filenames: &[String]) {
        let mut paths = self.image_paths();
        for name in filenames {
            if !paths.contains(name) {
                paths.push(name.clone());
            }
        }
        self.images = paths.join(",");
    }

    pub fn remove_image(&mut self, filename: &str) -> Result<(), AppError> {
        let mut paths = self.image_paths();
        let before = paths.len();
        paths.retain(|p| p != filename);
        if paths.len() == before {
            return Err(AppError::ImageNotFound(filename.to_string()));
        }
        self.images = paths.join(",");
        Ok(())
    }

    pub fn display_name(&self) -> String {
        format!("{} {} ({})", self.brand, self.model, self.vehicle_type.label())
    }
}

fn split_images(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Veículo com a lista de imagens já separada (página de detalhe).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetail {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub image_paths: Vec<String>,
}

impl From<Vehicle> for VehicleDetail {
    fn from(vehicle: Vehicle) -> Self {
        let image_paths = vehicle.image_paths();
        Self { vehicle, image_paths }
    }
}

/// Filtros do catálogo público.
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    pub vehicle_type: Option<VehicleType>,
    pub category: Option<CategoryTier>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl VehicleFilter {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        if self.vehicle_type.is_some_and(|t| t != vehicle.vehicle_type) {
            return false;
        }
        if self.category.is_some_and(|c| c != vehicle.category) {
            return false;
        }
        if let Some(brand) = &self.brand {
            if !vehicle.brand.to_lowercase().contains(&brand.trim().to_lowercase()) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| vehicle.price_per_day < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| vehicle.price_per_day > max) {
            return false;
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn sample_vehicle(today: NaiveDate) -> Vehicle {
        let new = NewVehicle::initialize(
            VehicleType::Carro,
            "Toyota".into(),
            "Yaris".into(),
            2021,
            Decimal::from(45),
            today,
        );
        Vehicle {
            id: Uuid::new_v4(),
            vehicle_type: new.vehicle_type,
            brand: new.brand,
            model: new.model,
            year: new.year,
            price_per_day: new.price_per_day,
            available: true,
            category: new.category,
            category_id: None,
            in_maintenance: false,
            last_maintenance_date: Some(new.last_maintenance_date),
            next_maintenance_date: Some(new.next_maintenance_date),
            maintenance_history: String::new(),
            last_legalization_date: Some(new.last_legalization_date),
            next_legalization_date: Some(new.next_legalization_date),
            legalization_history: String::new(),
            images: String::new(),
            available_from: Some(new.available_from),
            num_uses: 0,
            max_uses_before_maintenance: new.max_uses_before_maintenance,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn category_thresholds_are_inclusive_on_the_upper_bound() {
        assert_eq!(CategoryTier::from_daily_price(Decimal::from(30)), CategoryTier::Economico);
        assert_eq!(CategoryTier::from_daily_price(Decimal::from(50)), CategoryTier::Economico);
        assert_eq!(CategoryTier::from_daily_price(Decimal::new(5001, 2)), CategoryTier::Silver);
        assert_eq!(CategoryTier::from_daily_price(Decimal::from(250)), CategoryTier::Silver);
        assert_eq!(CategoryTier::from_daily_price(Decimal::from(251)), CategoryTier::Gold);
        // Igual ao que fica gravado em NUMERIC(10,2)
        assert_eq!(CategoryTier::from_daily_price(Decimal::new(50004, 3)), CategoryTier::Economico);
    }

    #[test]
    fn new_vehicle_gets_default_cycle_dates() {
        let today = date(2024, 3, 1);
        let v = NewVehicle::initialize(
            VehicleType::Mota,
            "Honda".into(),
            "PCX".into(),
            2022,
            Decimal::from(300),
            today,
        );

        assert_eq!(v.last_legalization_date, today);
        assert_eq!(v.next_legalization_date, date(2025, 3, 1));
        assert_eq!(v.last_maintenance_date, today);
        assert_eq!(v.next_maintenance_date, date(2024, 8, 28));
        assert_eq!(v.available_from, today);
        assert_eq!(v.category, CategoryTier::Gold);
        assert_eq!(v.max_uses_before_maintenance, 50);
    }

    #[test]
    fn maintenance_round_trip_updates_dates_and_history() {
        let today = date(2024, 5, 10);
        let mut v = sample_vehicle(date(2024, 1, 1));

        v.start_maintenance(today).unwrap();
        assert!(v.in_maintenance);
        assert!(!v.available);
        assert_eq!(v.next_maintenance_date, Some(date(2024, 6, 9)));
        assert!(v.start_maintenance(today).is_err());

        v.end_maintenance(date(2024, 5, 12)).unwrap();
        assert!(!v.in_maintenance);
        assert!(v.available);
        assert_eq!(v.next_maintenance_date, Some(date(2024, 11, 6)));
        assert_eq!(
            v.maintenance_history,
            "Manutenção iniciada 2024-05-10;Manutenção concluída 2024-05-10;"
        );
        assert!(v.end_maintenance(today).is_err());
    }

    #[test]
    fn sweep_only_releases_vehicles_whose_return_date_passed() {
        let mut v = sample_vehicle(date(2024, 1, 1));
        v.start_maintenance(date(2024, 2, 1)).unwrap();

        assert!(!v.sweep_maintenance(date(2024, 3, 1)));
        assert!(v.in_maintenance);

        assert!(v.sweep_maintenance(date(2024, 3, 2)));
        assert!(v.available);
        assert_eq!(v.next_maintenance_date, Some(date(2024, 7, 30)));

        // Idempotente
        assert!(!v.sweep_maintenance(date(2024, 3, 3)));
    }

    #[test]
    fn legalize_moves_dates_one_year_ahead() {
        let mut v = sample_vehicle(date(2023, 1, 1));
        v.legalize(date(2024, 2, 29));

        assert_eq!(v.last_legalization_date, Some(date(2024, 2, 29)));
        assert_eq!(v.next_legalization_date, Some(date(2025, 2, 28)));
        assert_eq!(v.legalization_history, "Legalização realizada 2024-02-29;");
    }

    #[test]
    fn usage_threshold_brings_maintenance_forward() {
        let mut v = sample_vehicle(date(2024, 1, 1));
        v.max_uses_before_maintenance = 2;

        v.register_usage(date(2024, 3, 1));
        assert_eq!(v.num_uses, 1);
        assert_eq!(v.next_maintenance_date, Some(date(2024, 6, 29)));

        v.register_usage(date(2024, 3, 1));
        assert_eq!(v.num_uses, 2);
        assert_eq!(v.next_maintenance_date, Some(date(2024, 1, 31)));
    }

    #[test]
    fn usage_threshold_waits_thirty_days_after_last_maintenance() {
        let mut v = sample_vehicle(date(2024, 1, 1));
        v.max_uses_before_maintenance = 1;

        v.register_usage(date(2024, 1, 15));
        assert_eq!(v.next_maintenance_date, Some(date(2024, 6, 29)));
    }

    #[test]
    fn alerts_use_a_thirty_day_window() {
        let today = date(2024, 6, 1);
        let mut v = sample_vehicle(date(2024, 1, 1));
        v.next_maintenance_date = Some(date(2024, 7, 1));
        v.next_legalization_date = Some(date(2024, 7, 2));

        assert!(v.needs_maintenance_soon(today));
        assert!(!v.needs_legalization_soon(today));

        v.in_maintenance = true;
        assert!(!v.needs_maintenance_soon(today));
    }

    #[test]
    fn images_are_kept_as_a_comma_list() {
        let mut v = sample_vehicle(date(2024, 1, 1));
        v.add_images(&["a.jpg".into(), "b.png".into()]);
        v.add_images(&["a.jpg".into()]);
        assert_eq!(v.images, "a.jpg,b.png");

        v.remove_image("a.jpg").unwrap();
        assert_eq!(v.image_paths(), vec!["b.png".to_string()]);
        assert!(matches!(v.remove_image("zzz.jpg"), Err(AppError::ImageNotFound(_))));
    }

    #[test]
    fn catalog_filter_combines_every_criterion() {
        let v = sample_vehicle(date(2024, 1, 1));

        assert!(VehicleFilter::default().matches(&v));
        assert!(VehicleFilter { brand: Some("toy".into()), ..Default::default() }.matches(&v));
        assert!(!VehicleFilter { vehicle_type: Some(VehicleType::Mota), ..Default::default() }.matches(&v));
        assert!(!VehicleFilter { category: Some(CategoryTier::Gold), ..Default::default() }.matches(&v));
        assert!(!VehicleFilter { max_price: Some(Decimal::from(40)), ..Default::default() }.matches(&v));
        assert!(
            VehicleFilter {
                min_price: Some(Decimal::from(45)),
                max_price: Some(Decimal::from(45)),
                ..Default::default()
            }
            .matches(&v)
        );
    }

    #[test]
    fn leading_commas_do_not_produce_empty_entries() {
        let mut v = sample_vehicle(date(2024, 1, 1));
        v.images = ",x.jpg,,y.jpg".into();
        assert_eq!(v.image_paths(), vec!["x.jpg".to_string(), "y.jpg".to_string()]);
    }
}
