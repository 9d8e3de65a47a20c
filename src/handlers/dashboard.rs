// src/handlers/dashboard.rs

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AdminUser,
    models::dashboard::{AdminDashboard, SweepReport},
};

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Dashboard",
    responses((status = 200, description = "Frota, alertas e indicadores de estoque", body = AdminDashboard)),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<AdminDashboard>, AppError> {
    let now = Utc::now();
    let dashboard = app_state
        .dashboard_service
        .build(now.date_naive(), now)
        .await?;

    tracing::debug!(admin = %admin, alerts = dashboard.warnings.len(), "Painel carregado");
    Ok(Json(dashboard))
}

#[utoipa::path(
    post,
    path = "/api/admin/sweep",
    tag = "Dashboard",
    responses((status = 200, description = "Varredura executada", body = SweepReport)),
    security(("api_jwt" = []))
)]
pub async fn run_sweep(State(app_state): State<AppState>) -> Result<Json<SweepReport>, AppError> {
    let now = Utc::now();
    let report = app_state.sweep_service.run(now.date_naive(), now).await?;
    Ok(Json(report))
}
