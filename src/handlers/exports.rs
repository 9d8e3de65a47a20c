// src/handlers/exports.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    common::error::AppError,
    config::AppState,
    services::export_service::ExportKind,
};

#[utoipa::path(
    get,
    path = "/api/admin/export/{kind}",
    tag = "Dashboard",
    params(("kind" = String, Path, description = "vehicles, customers ou reservations")),
    responses(
        (status = 200, description = "Ficheiro CSV", body = String, content_type = "text/csv"),
        (status = 400, description = "Tipo de exportação desconhecido")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_csv(
    State(app_state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Response, AppError> {
    let kind = ExportKind::parse(&kind).ok_or_else(|| {
        AppError::field("kind", "unknown_export", "Tipo de exportação desconhecido.")
    })?;

    let csv = app_state.export_service.export(kind).await?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", kind.filename())),
    ];
    Ok((headers, csv).into_response())
}
