// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Autenticação ---
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    // --- Não encontrados ---
    #[error("Veículo não encontrado")]
    VehicleNotFound,

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Reserva não encontrada")]
    ReservationNotFound,

    #[error("Categoria não encontrada")]
    CategoryNotFound,

    #[error("Imagem '{0}' não pertence ao veículo")]
    ImageNotFound(String),

    // --- Unicidade ---
    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("NIF já existe")]
    TaxNumberAlreadyExists,

    #[error("A categoria '{0}' já existe")]
    CategoryNameAlreadyExists(String),

    // --- Regras de negócio ---
    #[error("Veículo indisponível para o período")]
    VehicleUnavailable,

    #[error("O período pedido coincide com outra reserva ativa")]
    ReservationConflict,

    #[error("Operação inválida: {0}")]
    InvalidState(String),

    #[error("Upload inválido: {0}")]
    InvalidUpload(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // --- Infraestrutura ---
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de I/O: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Cria um erro de validação associado a um único campo,
    /// mantendo o mesmo formato de resposta do `validator`.
    pub fn field(field: &'static str, code: &'static str, message: &str) -> Self {
        let mut err = validator::ValidationError::new(code);
        err.message = Some(message.to_string().into());
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, err);
        AppError::ValidationError(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::VehicleNotFound
            | AppError::CustomerNotFound
            | AppError::ReservationNotFound
            | AppError::CategoryNotFound
            | AppError::ImageNotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::TaxNumberAlreadyExists
            | AppError::CategoryNameAlreadyExists(_)
            | AppError::VehicleUnavailable
            | AppError::ReservationConflict => StatusCode::CONFLICT,
            AppError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::InvalidCredentials => "Utilizador ou senha inválidos.".to_string(),
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".to_string(),
            AppError::Forbidden => "Não tem permissão para aceder a este recurso.".to_string(),
            AppError::EmailAlreadyExists => "Este e-mail já está em uso.".to_string(),
            AppError::TaxNumberAlreadyExists => "Este NIF já está registado.".to_string(),

            // Erros de domínio já carregam uma mensagem legível.
            ref e if status != StatusCode::INTERNAL_SERVER_ERROR => e.to_string(),

            // O resto vira 500. O detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_list_every_field() {
        let (status, body) =
            body_json(AppError::field("price_per_day", "range", "A diária deve ser positiva.")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["price_per_day"][0], "A diária deve ser positiva.");
    }

    #[tokio::test]
    async fn not_found_variants_map_to_404() {
        let (status, body) = body_json(AppError::VehicleNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Veículo não encontrado");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = body_json(AppError::InternalServerError(anyhow::anyhow!(
            "connection refused on 10.0.0.5"
        )))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Ocorreu um erro inesperado.");
    }

    #[test]
    fn conflicts_map_to_409() {
        assert_eq!(AppError::ReservationConflict.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::EmailAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidState("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
