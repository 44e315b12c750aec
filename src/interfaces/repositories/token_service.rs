use jsonwebtoken::TokenData;

use crate::{entities::token::{TokenClaims, TokenPair}, errors::AuthError};


pub trait TokenServiceRepository: Send + Sync {
    /// Signs a fresh access/refresh pair for the identity
    fn issue(&self, user_id: i64, user_type: &str, email: &str) -> Result<TokenPair, AuthError>;

    /// Verifies algorithm, signature, structure and registered claims
    fn parse(&self, token: &str) -> Result<TokenData<TokenClaims>, AuthError>;

    /// Parses a token and returns its claims
    fn validate(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Checks claims-level expiry against the current instant
    fn is_expired(&self, claims: &TokenClaims) -> bool;
}
