// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{admin_guard, customer_guard},
};

// Limite por pedido de upload de imagens
const UPLOAD_LIMIT_BYTES: usize = 20 * 1024 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/admin/login", post(handlers::auth::admin_login))
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        .route("/logout", post(handlers::auth::logout));

    // Catálogo público
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/vehicles", get(handlers::catalog::list_catalog))
        .route("/api/vehicles/{id}", get(handlers::catalog::get_vehicle))
        .route("/api/categories", get(handlers::catalog::list_categories))
        .nest("/api/auth", auth_routes);

    // Área do cliente (token com papel CUSTOMER)
    let customer_routes = Router::new()
        .route(
            "/api/me",
            get(handlers::auth::get_me).put(handlers::auth::update_me),
        )
        .route(
            "/api/reservations",
            get(handlers::reservations::list_my_reservations)
                .post(handlers::reservations::create_reservation),
        )
        .route("/api/reservations/{id}/pay", post(handlers::reservations::pay_reservation))
        .route("/api/reservations/{id}/cancel", post(handlers::reservations::cancel_reservation))
        .route("/api/reservations/{id}/receipt", get(handlers::reservations::download_receipt))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            customer_guard,
        ));

    // Administração (token com papel ADMIN)
    let admin_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/sweep", post(handlers::dashboard::run_sweep))
        .route(
            "/vehicles",
            get(handlers::vehicles::list_vehicles).post(handlers::vehicles::create_vehicle),
        )
        .route(
            "/vehicles/{id}",
            get(handlers::vehicles::get_vehicle)
                .put(handlers::vehicles::update_vehicle)
                .delete(handlers::vehicles::delete_vehicle),
        )
        .route(
            "/vehicles/{id}/images",
            post(handlers::vehicles::upload_images).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route("/vehicles/{id}/images/{filename}", delete(handlers::vehicles::delete_image))
        .route("/vehicles/{id}/maintenance/start", post(handlers::vehicles::start_maintenance))
        .route("/vehicles/{id}/maintenance/complete", post(handlers::vehicles::complete_maintenance))
        .route("/vehicles/{id}/legalize", post(handlers::vehicles::legalize))
        .route("/vehicles/{id}/usage", post(handlers::vehicles::register_usage))
        .route(
            "/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/categories/{id}",
            axum::routing::put(handlers::categories::rename_category)
                .delete(handlers::categories::delete_category),
        )
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/customers/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        .route("/reservations", get(handlers::reservations::list_all_reservations))
        .route("/export/{kind}", get(handlers::exports::export_csv))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            admin_guard,
        ));

    let upload_dir = app_state.config.upload_dir.clone();

    Router::new()
        .merge(public_routes)
        .merge(customer_routes)
        .nest("/api/admin", admin_routes)
        .nest_service("/static/images", ServeDir::new(upload_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::tests::test_state, models::auth::Role};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn bearer(state: &AppState, subject: &str, role: Role) -> String {
        let token = state.auth_service.create_token(subject, role).unwrap();
        format!("Bearer {}", token)
    }

    #[tokio::test]
    async fn health_check_is_public() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes_require_a_token() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/api/admin/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn customer_token_cannot_reach_admin_routes() {
        let state = test_state();
        let auth = bearer(&state, &uuid::Uuid::new_v4().to_string(), Role::Customer);
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::get("/api/admin/vehicles")
                    .header(header::AUTHORIZATION, auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_token_cannot_reach_customer_routes() {
        let state = test_state();
        let auth = bearer(&state, "admin", Role::Admin);
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::get("/api/reservations")
                    .header(header::AUTHORIZATION, auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_login_returns_a_token() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::post("/api/auth/admin/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"admin","password":"password"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["role"], "ADMIN");
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn invalid_registration_is_rejected_with_field_details() {
        let app = build_router(test_state());
        let body = r#"{
            "firstName": "Ana", "lastName": "Silva", "email": "nao-e-email",
            "phone": "912345678", "birthDate": "1990-01-01", "address": "Lisboa",
            "taxNumber": "123", "password": "segredo123", "preferredDailyRate": 80.0
        }"#;

        let response = app
            .oneshot(
                Request::post("/api/auth/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["details"]["email"].is_array());
        assert!(json["details"]["tax_number"].is_array());
    }

    #[tokio::test]
    async fn unknown_export_kind_is_a_bad_request() {
        let state = test_state();
        let auth = bearer(&state, "admin", Role::Admin);
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::get("/api/admin/export/invoices")
                    .header(header::AUTHORIZATION, auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
