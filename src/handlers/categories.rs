// src/handlers/categories.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::category::Category};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryPayload {
    #[validate(length(min = 1, max = 50, message = "O nome da categoria é obrigatório."))]
    #[schema(example = "Premium")]
    pub name: String,
}

#[utoipa::path(
    get,
    path = "/api/admin/categories",
    operation_id = "admin_list_categories",
    tag = "Categories",
    responses((status = 200, description = "Categorias", body = [Category])),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(app_state.category_repo.list_all().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    tag = "Categories",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .category_repo
        .create(&app_state.db_pool, payload.name.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    tag = "Categories",
    request_body = CategoryPayload,
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria renomeada", body = Category),
        (status = 404, description = "Categoria não encontrada"),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn rename_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>, AppError> {
    payload.validate()?;

    let category = app_state
        .category_repo
        .rename(&app_state.db_pool, id, payload.name.trim())
        .await?;
    Ok(Json(category))
}

// Os veículos da categoria ficam sem categoria (ON DELETE SET NULL).
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses((status = 204, description = "Categoria removida")),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.category_repo.delete(&app_state.db_pool, id).await?;
    tracing::info!("🗑️ Categoria removida: {}", id);
    Ok(StatusCode::NO_CONTENT)
}
