// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CustomerUser,
    models::{
        auth::{
            AdminLoginPayload, AuthResponse, LoginCustomerPayload, RegisterCustomerPayload, Role,
            UpdateCustomerPayload,
        },
        customer::Customer,
    },
};

#[utoipa::path(
    post,
    path = "/api/auth/admin/login",
    tag = "Auth",
    request_body = AdminLoginPayload,
    responses(
        (status = 200, description = "Login de administrador", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn admin_login(
    State(app_state): State<AppState>,
    Json(payload): Json<AdminLoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .login_admin(&payload.username, &payload.password)?;

    Ok(Json(AuthResponse { token, role: Role::Admin }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginCustomerPayload,
    responses(
        (status = 200, description = "Login de cliente", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginCustomerPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .login_customer(payload.email.trim(), &payload.password)
        .await?;

    Ok(Json(AuthResponse { token, role: Role::Customer }))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterCustomerPayload,
    responses(
        (status = 201, description = "Cliente registado e autenticado", body = AuthResponse),
        (status = 400, description = "Dados inválidos ou cliente menor de idade"),
        (status = 409, description = "E-mail ou NIF já registado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (_, token) = app_state
        .auth_service
        .register_customer(&payload.profile(), &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, role: Role::Customer })))
}

// O token é stateless; o cliente só precisa de o descartar.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Sessão terminada"))
)]
pub async fn logout() -> Json<serde_json::Value> {
    Json(json!({ "message": "Sessão terminada com sucesso." }))
}

#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Customers",
    responses((status = 200, description = "Perfil do cliente autenticado", body = Customer)),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    CustomerUser(customer_id): CustomerUser,
) -> Result<Json<Customer>, AppError> {
    let customer = app_state.customer_service.get(customer_id).await?;
    Ok(Json(customer))
}

#[utoipa::path(
    put,
    path = "/api/me",
    tag = "Customers",
    request_body = UpdateCustomerPayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = Customer),
        (status = 409, description = "E-mail ou NIF já registado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_me(
    State(app_state): State<AppState>,
    CustomerUser(customer_id): CustomerUser,
    Json(payload): Json<UpdateCustomerPayload>,
) -> Result<Json<Customer>, AppError> {
    payload.validate()?;

    let customer = app_state
        .customer_service
        .update(customer_id, &payload.profile(), payload.password.as_deref())
        .await?;

    Ok(Json(customer))
}
