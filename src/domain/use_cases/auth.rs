use validator::Validate;

use crate::entities::account::LoginRequest;
use crate::entities::token::{TokenClaims, TokenPair};
use crate::errors::AuthError;
use crate::auth::password::{verify_dummy_password, verify_password};
use crate::repositories::account::AccountRepository;
use crate::repositories::token::TokenRepository;
use crate::repositories::token_service::TokenServiceRepository;

pub struct AuthHandler<R, T, S>
where
    R: AccountRepository,
    T: TokenServiceRepository,
    S: TokenRepository,
{
    pub account_repo: R,
    pub token_service: T,
    pub token_repo: S,
}

impl<R, T, S> AuthHandler<R, T, S>
where
    R: AccountRepository,
    T: TokenServiceRepository,
    S: TokenRepository,
{
    pub fn new(account_repo: R, token_service: T, token_repo: S) -> Self {
        AuthHandler {
            account_repo,
            token_service,
            token_repo,
        }
    }

    /// Signs in a client or company and replaces any previous session
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, AuthError> {
        request.validate()?;

        let Some(account) = self.account_repo
            .find_by_email(request.user_type, &request.email)
            .await?
        else {
            // Unknown accounts pay the same argon2 cost as a wrong password.
            verify_dummy_password(&request.password);
            tracing::warn!(user_type = %request.user_type, "Sign-in attempt for unknown account");
            return Err(AuthError::WrongCredentials);
        };

        let is_password_valid = verify_password(&request.password, &account.password_hash)
            .map_err(|e| {
                tracing::warn!("Password verification failed: {}", e);
                AuthError::WrongCredentials
            })?;
        if !is_password_valid {
            return Err(AuthError::WrongCredentials);
        }

        let user_type = request.user_type.as_str();
        let pair = self.token_service.issue(account.id, user_type, &account.email)?;
        self.token_repo
            .store_token_pair(account.id, user_type, &pair.access_token, &pair.refresh_token)
            .await?;

        tracing::info!(user_id = account.id, user_type, "User signed in");
        Ok(pair)
    }

    /// Resolves an access token into claims, rejecting superseded or revoked ones
    pub async fn authenticate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let claims = self.token_service.validate(token)?;

        if self.token_service.is_expired(&claims) {
            return Err(AuthError::TokenExpired);
        }

        self.token_repo
            .validate_access(claims.user_id, &claims.user_type, token)
            .await?;

        Ok(claims)
    }

    /// Exchanges a current refresh token for a new pair.
    ///
    /// Rotations for the same identity are serialized through a store lock,
    /// and the new pair is only returned once it has been stored.
    pub async fn refresh_token(&self, token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.token_service.validate(token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if self.token_service.is_expired(&claims) {
            return Err(AuthError::RefreshTokenExpired);
        }

        let (user_id, user_type) = (claims.user_id, claims.user_type.as_str());

        let Some(lock_token) = self.token_repo.lock_refresh(user_id, user_type).await? else {
            tracing::warn!(user_id, user_type, "Concurrent refresh rejected");
            return Err(AuthError::RefreshInProgress);
        };

        let result = self.rotate(&claims, token).await;

        if let Err(e) = self.token_repo.unlock_refresh(user_id, user_type, &lock_token).await {
            tracing::error!(user_id, user_type, "Failed to release refresh lock: {}", e);
        }

        result
    }

    async fn rotate(&self, claims: &TokenClaims, token: &str) -> Result<TokenPair, AuthError> {
        let (user_id, user_type) = (claims.user_id, claims.user_type.as_str());

        self.token_repo.validate_refresh(user_id, user_type, token).await?;

        let pair = self.token_service.issue(user_id, user_type, &claims.email)?;

        self.token_repo.delete_tokens(user_id, user_type).await?;
        self.token_repo
            .store_token_pair(user_id, user_type, &pair.access_token, &pair.refresh_token)
            .await?;

        tracing::info!(user_id, user_type, "Session tokens rotated");
        Ok(pair)
    }

    /// Ends the session of the identity carried by the claims
    pub async fn logout(&self, claims: &TokenClaims) -> Result<(), AuthError> {
        self.token_repo
            .delete_tokens(claims.user_id, &claims.user_type)
            .await?;

        tracing::info!(user_id = claims.user_id, user_type = %claims.user_type, "User signed out");
        Ok(())
    }
}
