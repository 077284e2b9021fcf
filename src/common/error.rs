use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::{i18n::I18nStore, validation::json_field_name},
    middleware::i18n::Locale,
};

// Nosso tipo de erro de domínio. Os serviços só conhecem este tipo;
// a tradução para HTTP (status + mensagem no idioma do cliente) fica em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // Fora do escopo do principal OU inexistente: de propósito são a mesma coisa,
    // para não vazar a existência de registros de outra organização.
    #[error("Registro não encontrado")]
    NotFound,

    // Usuário sem papel resolvível (agente sem linha em `agents`,
    // organizador sem organização, ou nenhuma das flags)
    #[error("Usuário sem contexto de papel")]
    MissingRoleContext,

    #[error("Operação exclusiva do organizador")]
    OrganizerOnly,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Código estável do erro, usado como chave do catálogo de mensagens.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::UsernameAlreadyExists => "username_already_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken | AppError::UserNotFound => "invalid_token",
            AppError::NotFound => "not_found",
            AppError::MissingRoleContext => "missing_role_context",
            AppError::OrganizerOnly => "organizer_only",
            _ => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists | AppError::UsernameAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::UserNotFound => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MissingRoleContext | AppError::OrganizerOnly => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let code = self.code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe só vai para o log; o cliente recebe a mensagem genérica
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            store.translate(&locale.0, key)
                        })
                        .collect();
                    details.insert(json_field_name(&field), messages);
                }
                Some(json!(details))
            }
            _ => None,
        };

        ApiError {
            status,
            error: store.translate(&locale.0, code),
            details,
        }
    }
}

// O erro "de borda", já traduzido e pronto para virar resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}
