use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use crate::constants::TOKEN_ISSUER;
use crate::entities::token::{TokenClaims, TokenPair};
use crate::repositories::token_service::TokenServiceRepository;
use crate::settings::{AppConfig, JwtKeys, TokenTtls};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Any HMAC variant is accepted on the way in; everything else is rejected.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];


#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    ttls: TokenTtls,
    validation: Validation,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService::with_keys(JwtKeys::from(config), config.token_ttls())
    }

    pub fn with_keys(keys: JwtKeys, ttls: TokenTtls) -> Self {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        JwtService { keys, ttls, validation }
    }

    pub fn issue(&self, user_id: i64, user_type: &str, email: &str) -> Result<TokenPair, AuthError> {
        let access_ttl = to_chrono(self.ttls.access()?)?;
        let refresh_ttl = to_chrono(self.ttls.refresh()?)?;

        let now = Utc::now();
        let access_expiry = expiry_after(now, access_ttl)?;
        let refresh_expiry = expiry_after(now, refresh_ttl)?;

        let access_claims = TokenClaims {
            user_id,
            user_type: user_type.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: access_expiry.timestamp(),
            nbf: now.timestamp(),
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
        };
        let refresh_claims = TokenClaims {
            exp: refresh_expiry.timestamp(),
            jti: Uuid::new_v4().to_string(),
            ..access_claims.clone()
        };

        let access_token = self.sign(&access_claims)?;
        let refresh_token = self.sign(&refresh_claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: access_claims.exp,
        })
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(JWT_ALGORITHM), claims, &self.keys.encoding)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    pub fn parse(&self, token: &str) -> Result<TokenData<TokenClaims>, AuthError> {
        decode::<TokenClaims>(token, &self.keys.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AuthError::from(e)
            })
    }

    pub fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.parse(token).map(|data| data.claims)
    }

    pub fn is_expired(&self, claims: &TokenClaims) -> bool {
        claims.is_expired()
    }
}

fn to_chrono(ttl: std::time::Duration) -> Result<Duration, AuthError> {
    Duration::from_std(ttl)
        .map_err(|e| AuthError::Configuration(format!("TTL out of range: {e}")))
}

fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AuthError> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| AuthError::Configuration(format!("TTL of {}s overflows the token expiry", ttl.num_seconds())))
}


impl TokenServiceRepository for JwtService {
    fn issue(&self, user_id: i64, user_type: &str, email: &str) -> Result<TokenPair, AuthError> {
        self.issue(user_id, user_type, email)
    }

    fn parse(&self, token: &str) -> Result<TokenData<TokenClaims>, AuthError> {
        self.parse(token)
    }

    fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.validate(token)
    }

    fn is_expired(&self, claims: &TokenClaims) -> bool {
        self.is_expired(claims)
    }
}
