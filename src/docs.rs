// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::admin_login,
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::logout,

        // --- Clientes ---
        handlers::auth::get_me,
        handlers::auth::update_me,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,

        // --- Catálogo ---
        handlers::catalog::list_catalog,
        handlers::catalog::get_vehicle,
        handlers::catalog::list_categories,

        // --- Frota ---
        handlers::vehicles::list_vehicles,
        handlers::vehicles::get_vehicle,
        handlers::vehicles::create_vehicle,
        handlers::vehicles::update_vehicle,
        handlers::vehicles::delete_vehicle,
        handlers::vehicles::upload_images,
        handlers::vehicles::delete_image,
        handlers::vehicles::start_maintenance,
        handlers::vehicles::complete_maintenance,
        handlers::vehicles::legalize,
        handlers::vehicles::register_usage,

        // --- Categorias ---
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::categories::rename_category,
        handlers::categories::delete_category,

        // --- Reservas ---
        handlers::reservations::create_reservation,
        handlers::reservations::list_my_reservations,
        handlers::reservations::pay_reservation,
        handlers::reservations::cancel_reservation,
        handlers::reservations::download_receipt,
        handlers::reservations::list_all_reservations,

        // --- Painel ---
        handlers::dashboard::get_dashboard,
        handlers::dashboard::run_sweep,
        handlers::exports::export_csv,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::AdminLoginPayload,
            models::auth::LoginCustomerPayload,
            models::auth::RegisterCustomerPayload,
            models::auth::UpdateCustomerPayload,
            models::auth::AuthResponse,

            // --- Frota ---
            models::vehicle::VehicleType,
            models::vehicle::CategoryTier,
            models::vehicle::Vehicle,
            models::vehicle::VehicleDetail,
            models::category::Category,
            handlers::vehicles::CreateVehiclePayload,
            handlers::vehicles::UpdateVehiclePayload,
            handlers::categories::CategoryPayload,

            // --- Clientes e reservas ---
            models::customer::Customer,
            models::reservation::ReservationStatus,
            models::reservation::Reservation,
            models::reservation::PaymentConfirmation,
            handlers::reservations::CreateReservationPayload,
            handlers::reservations::PaymentPayload,

            // --- Painel ---
            models::dashboard::VehicleAlert,
            models::dashboard::AdminDashboard,
            models::dashboard::SweepReport,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação de administradores e clientes"),
        (name = "Customers", description = "Perfil e gestão de clientes"),
        (name = "Catalog", description = "Catálogo público de veículos"),
        (name = "Fleet", description = "Gestão da frota: manutenção, legalização e imagens"),
        (name = "Categories", description = "Categorias de preço"),
        (name = "Reservations", description = "Reservas, pagamento simulado e recibos"),
        (name = "Dashboard", description = "Painel do administrador, varredura e exportações")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
