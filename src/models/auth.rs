// src/models/auth.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::customer::CustomerProfile;

// Quem é o portador do token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Customer,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Nome do admin ou ID do cliente
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

pub(crate) fn validate_tax_number(nif: &str) -> Result<(), ValidationError> {
    if nif.len() != 9 || !nif.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("tax_number");
        err.message = Some("O NIF deve ter 9 dígitos.".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser positivo.".into());
        return Err(err);
    }
    // A coluna é NUMERIC(10,2)
    if val.normalize().scale() > 2 {
        let mut err = ValidationError::new("scale");
        err.message = Some("O valor admite no máximo duas casas decimais.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminLoginPayload {
    #[validate(length(min = 1, message = "O utilizador é obrigatório."))]
    #[schema(example = "admin")]
    pub username: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginCustomerPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Registo de cliente (também usado pelo admin para criar clientes)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCustomerPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "O apelido é obrigatório."))]
    pub last_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 9, max = 20, message = "O telefone é inválido."))]
    pub phone: String,
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, max = 200, message = "A morada é obrigatória."))]
    pub address: String,
    #[validate(custom(function = "validate_tax_number"))]
    pub tax_number: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    // Diária pretendida; define o escalão do cliente
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "80.00")]
    pub preferred_daily_rate: Decimal,
}

// Edição de perfil (a senha é opcional)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "O apelido é obrigatório."))]
    pub last_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 9, max = 20, message = "O telefone é inválido."))]
    pub phone: String,
    pub birth_date: NaiveDate,
    #[validate(length(min = 1, max = 200, message = "A morada é obrigatória."))]
    pub address: String,
    #[validate(custom(function = "validate_tax_number"))]
    pub tax_number: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
    #[validate(custom(function = "validate_positive"))]
    pub preferred_daily_rate: Decimal,
}

impl RegisterCustomerPayload {
    pub fn profile(&self) -> CustomerProfile {
        CustomerProfile {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            birth_date: self.birth_date,
            address: self.address.trim().to_string(),
            tax_number: self.tax_number.clone(),
            preferred_daily_rate: self.preferred_daily_rate,
        }
    }
}

impl UpdateCustomerPayload {
    pub fn profile(&self) -> CustomerProfile {
        CustomerProfile {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            birth_date: self.birth_date,
            address: self.address.trim().to_string(),
            tax_number: self.tax_number.clone(),
            preferred_daily_rate: self.preferred_daily_rate,
        }
    }
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegisterCustomerPayload {
        RegisterCustomerPayload {
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            email: "ana@example.pt".into(),
            phone: "912345678".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
            address: "Rua das Flores 10".into(),
            tax_number: "123456789".into(),
            password: "segredo123".into(),
            preferred_daily_rate: Decimal::from(80),
        }
    }

    #[test]
    fn registration_accepts_a_complete_form() {
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn registration_rejects_bad_nif_and_rate() {
        let mut payload = valid_registration();
        payload.tax_number = "12AB".into();
        payload.preferred_daily_rate = Decimal::ZERO;

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("tax_number"));
        assert!(fields.contains_key("preferred_daily_rate"));
    }

    #[test]
    fn rate_with_more_than_two_decimals_is_rejected() {
        let mut payload = valid_registration();
        payload.preferred_daily_rate = Decimal::new(50004, 3);
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("preferred_daily_rate"));

        assert!(validate_positive(&Decimal::new(1, 3)).is_err());
        assert!(validate_positive(&Decimal::new(5000, 2)).is_ok());
        assert!(validate_positive(&Decimal::new(50100, 3)).is_ok());
    }

    #[test]
    fn profile_normalizes_email() {
        let mut payload = valid_registration();
        payload.email = " Ana@Example.PT ".into();
        assert_eq!(payload.profile().email, "ana@example.pt");
    }

    #[test]
    fn role_serializes_in_screaming_case() {
        assert_eq!(serde_json::to_string(&Role::Customer).unwrap(), "\"CUSTOMER\"");
    }
}
