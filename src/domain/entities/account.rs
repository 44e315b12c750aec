use serde::{Serialize, Deserialize};
use std::{fmt, str::FromStr};
use validator::Validate;

/// Kind of marketplace account a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Client,
    Company,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Client => "client",
            UserType::Company => "company",
        }
    }

    /// Table holding the credentials of this account kind.
    pub fn table(&self) -> &'static str {
        match self {
            UserType::Client => "clients",
            UserType::Company => "companies",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(UserType::Client),
            "company" => Ok(UserType::Company),
            other => Err(format!("unknown user type: {other}")),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "e-mail inválido"))]
    pub email: String,

    #[validate(length(min = 1, message = "a senha não pode ser vazia"))]
    pub password: String,

    pub user_type: UserType,
}

/// Identity of the caller as carried by its access token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionIdentity {
    pub user_id: i64,
    pub user_type: String,
    pub email: String,
    pub expires_at: i64,
}
