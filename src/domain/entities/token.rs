use chrono::{DateTime, Utc};
use serde::{ Serialize, Deserialize };

/// Access/refresh pair handed to the client on sign-in and refresh.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp at which the access token expires.
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenClaims {
    pub user_id: i64,
    pub user_type: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub sub: String,
    /// Unique per token, so two pairs minted in the same second still differ.
    pub jti: String,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// True once the expiry instant lies before now.
    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(expires_at) => expires_at < Utc::now(),
            None => true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}
