// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{Claims, Role},
};

type BearerHeader = TypedHeader<Authorization<Bearer>>;

fn claims_from_header(state: &AppState, header: Option<BearerHeader>) -> Result<Claims, AppError> {
    let TypedHeader(Authorization(bearer)) = header.ok_or(AppError::InvalidToken)?;
    state.auth_service.validate_token(bearer.token())
}

/// Exige um token de administrador. Guarda as claims nas extensions do pedido.
pub async fn admin_guard(
    State(state): State<AppState>,
    header: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = claims_from_header(&state, header)?;
    if claims.role != Role::Admin {
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(AdminUser(claims.sub));
    Ok(next.run(request).await)
}

/// Exige um token de cliente; o `sub` tem de ser o ID do cliente.
pub async fn customer_guard(
    State(state): State<AppState>,
    header: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = claims_from_header(&state, header)?;
    if claims.role != Role::Customer {
        return Err(AppError::Forbidden);
    }
    let customer_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

    request.extensions_mut().insert(CustomerUser(customer_id));
    Ok(next.run(request).await)
}

// Extratores para obter o utilizador autenticado diretamente nos handlers

#[derive(Debug, Clone)]
pub struct AdminUser(pub String);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CustomerUser(pub Uuid);

impl<S> FromRequestParts<S> for CustomerUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CustomerUser>()
            .copied()
            .ok_or(AppError::InvalidToken)
    }
}
