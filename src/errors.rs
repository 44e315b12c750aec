use std::borrow::Cow;
use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use jsonwebtoken::errors::Error as JwtError;
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

const INTERNAL_ERROR_MESSAGE: &str = "erro interno, tente novamente mais tarde";

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    NotFound(String),
    Conflict(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "erro de validação: {}", messages)
            }
            AppError::NotFound(msg) => write!(f, "não encontrado: {}", msg),
            AppError::Conflict(msg) => write!(f, "conflito: {}", msg),
            AppError::InternalError(msg) => write!(f, "erro interno: {}", msg)
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "dados inválidos",
                    "details": errors
                })
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                serde_json::json!({"error": INTERNAL_ERROR_MESSAGE})
            }
            _ => {
                serde_json::json!({"error": self.to_string()})
            }
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "valor inválido".to_string()),
                })
            })
            .collect();

        AppError::ValidationError(field_errors)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("registro não encontrado".into()),
            sqlx::Error::Database(e) if e.code() == Some(Cow::Borrowed("23505")) => {
                AppError::Conflict("registro duplicado".into())
            }
            _ => AppError::InternalError(format!("Database error: {}", err))
        }
    }
}

/// Errors of the session token lifecycle.
///
/// The unauthorized variants tell the client to sign in again; the
/// internal ones are transient and answered with a generic message.
#[derive(Debug, Display)]
pub enum AuthError {
    #[display("token de autorização não fornecido")]
    MissingToken,

    #[display("formato de token inválido")]
    MalformedAuthorizationHeader,

    #[display("token inválido")]
    InvalidToken,

    #[display("token expirado")]
    TokenExpired,

    #[display("token revogado ou substituído")]
    TokenRevoked,

    #[display("refresh token inválido")]
    InvalidRefreshToken,

    #[display("refresh token expirado")]
    RefreshTokenExpired,

    #[display("refresh token não encontrado ou inválido")]
    RefreshTokenNotFound,

    #[display("renovação de sessão já em andamento")]
    RefreshInProgress,

    #[display("credenciais inválidas")]
    WrongCredentials,

    #[display("dados de login inválidos")]
    InvalidLoginRequest,

    #[display("erro ao gerar token: {_0}")]
    TokenCreation(String),

    #[display("erro de configuração: {_0}")]
    Configuration(String),

    #[display("erro no armazenamento de sessão: {_0}")]
    Store(String),

    #[display("erro ao consultar conta: {_0}")]
    AccountLookup(String),

    #[display("serviço de autenticação indisponível")]
    MissingAuthService,
}

impl AuthError {
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_message = if status.is_server_error() {
            tracing::error!("Authentication internal failure: {}", self);
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status)
            .json(serde_json::json!({"error": error_message}))
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::MalformedAuthorizationHeader => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::TokenRevoked => StatusCode::UNAUTHORIZED,
            AuthError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            AuthError::RefreshTokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::RefreshTokenNotFound => StatusCode::UNAUTHORIZED,
            AuthError::RefreshInProgress => StatusCode::CONFLICT,
            AuthError::WrongCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidLoginRequest => StatusCode::BAD_REQUEST,
            AuthError::TokenCreation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::AccountLookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::MissingAuthService => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Signature, algorithm, structure, issuer and claim-level expiry all
// collapse into one unauthorized class.
impl From<JwtError> for AuthError {
    fn from(_: JwtError) -> Self {
        AuthError::InvalidToken
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store(err.to_string())
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(_: ValidationErrors) -> Self {
        AuthError::InvalidLoginRequest
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::AccountLookup(err.to_string())
    }
}

#[derive(Debug, Display, PartialEq)]
pub enum StoreError {
    #[display("connection failed: {_0}")]
    Connection(String),

    #[display("operation failed: {_0}")]
    Operation(String),

    #[display("operation timed out after {_0}s")]
    Timeout(u64),
}

#[derive(Debug, Display)]
pub enum PasswordError {
    #[display("Invalid password parameters: {_0}")]
    InvalidParameters(String),

    #[display("Password hashing failed: {_0}")]
    HashingError(String),

    #[display("Invalid password hash format: {_0}")]
    InvalidHashFormat(String),

    #[display("Password verification failed: {_0}")]
    VerificationError(String),
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
