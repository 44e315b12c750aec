
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::TokenData;
use mockall::mock;
use test_utils::*;
use tour_booking_backend::{
    auth::{jwt::JwtService, password::hash_password},
    entities::{
        account::{Account, LoginRequest, UserType},
        token::{TokenClaims, TokenPair},
    },
    errors::{AppError, AuthError},
    repositories::{
        account::AccountRepository,
        kv_repo::KvTokenRepo,
        token::TokenRepository,
        token_service::TokenServiceRepository,
    },
    store::{KeyValueStore, MemoryStore},
    use_cases::auth::AuthHandler,
};

mock! {
    pub AccountRepo {}

    #[async_trait]
    impl AccountRepository for AccountRepo {
        async fn check_connection(&self) -> Result<(), AppError>;
        async fn find_by_email(&self, user_type: UserType, email: &str) -> Result<Option<Account>, AppError>;
    }
}

const PASSWORD: &str = "Senha@Segura123";

type TestHandler<T = JwtService> = AuthHandler<MockAccountRepo, T, KvTokenRepo>;

fn handler(accounts: MockAccountRepo, store: Arc<dyn KeyValueStore>) -> TestHandler {
    AuthHandler::new(accounts, jwt_service(), token_repo(store))
}

fn no_accounts() -> MockAccountRepo {
    MockAccountRepo::new()
}

fn account_repo_with(id: i64, email: &'static str, user_type: UserType) -> MockAccountRepo {
    let account = Account {
        id,
        email: email.to_string(),
        password_hash: hash_password(PASSWORD).expect("hash failed"),
    };

    let mut repo = MockAccountRepo::new();
    repo.expect_find_by_email()
        .withf(move |t, e| *t == user_type && e == email)
        .returning(move |_, _| Ok(Some(account.clone())));
    repo.expect_find_by_email()
        .returning(|_, _| Ok(None));
    repo
}

fn login_request(email: &str, password: &str, user_type: UserType) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
        user_type,
    }
}

async fn seed_session(handler: &TestHandler, user_id: i64, user_type: &str) -> TokenPair {
    let pair = handler.token_service.issue(user_id, user_type, "a@b.com").unwrap();
    handler.token_repo
        .store_token_pair(user_id, user_type, &pair.access_token, &pair.refresh_token)
        .await
        .unwrap();
    pair
}

#[actix_rt::test]
async fn login_issues_and_stores_a_pair() {
    let store = MemoryStore::new();
    let handler = handler(account_repo_with(42, "a@b.com", UserType::Client), Arc::new(store.clone()));

    let pair = handler
        .login(login_request("a@b.com", PASSWORD, UserType::Client))
        .await
        .expect("login failed");

    let claims = handler.authenticate(&pair.access_token).await.expect("authenticate failed");
    assert_eq!((claims.user_id, claims.user_type.as_str(), claims.email.as_str()), (42, "client", "a@b.com"));
    assert_eq!(store.get("refresh_token:42:client").await.unwrap(), Some(pair.refresh_token));
}

#[actix_rt::test]
async fn login_with_wrong_password_is_rejected() {
    let store = MemoryStore::new();
    let handler = handler(account_repo_with(42, "a@b.com", UserType::Client), Arc::new(store.clone()));

    let result = handler.login(login_request("a@b.com", "errada", UserType::Client)).await;

    assert!(matches!(result, Err(AuthError::WrongCredentials)));
    assert!(store.is_empty());
}

#[actix_rt::test]
async fn login_for_unknown_account_is_rejected() {
    let handler = handler(account_repo_with(42, "a@b.com", UserType::Client), Arc::new(MemoryStore::new()));

    let wrong_kind = handler.login(login_request("a@b.com", PASSWORD, UserType::Company)).await;
    let unknown = handler.login(login_request("ninguem@b.com", PASSWORD, UserType::Client)).await;

    assert!(matches!(wrong_kind, Err(AuthError::WrongCredentials)));
    assert!(matches!(unknown, Err(AuthError::WrongCredentials)));
}

#[actix_rt::test]
async fn login_with_invalid_payload_skips_lookup() {
    let handler = handler(no_accounts(), Arc::new(MemoryStore::new()));

    let bad_email = handler.login(login_request("not-an-email", PASSWORD, UserType::Client)).await;
    let empty_password = handler.login(login_request("a@b.com", "", UserType::Client)).await;

    assert!(matches!(bad_email, Err(AuthError::InvalidLoginRequest)));
    assert!(matches!(empty_password, Err(AuthError::InvalidLoginRequest)));
}

#[actix_rt::test]
async fn account_lookup_failure_is_internal() {
    let mut accounts = MockAccountRepo::new();
    accounts.expect_find_by_email()
        .returning(|_, _| Err(AppError::InternalError("connection refused".into())));
    let handler = handler(accounts, Arc::new(MemoryStore::new()));

    let err = handler.login(login_request("a@b.com", PASSWORD, UserType::Client)).await.unwrap_err();

    assert!(matches!(err, AuthError::AccountLookup(_)));
    assert!(!err.is_unauthorized());
}

#[actix_rt::test]
async fn second_login_supersedes_the_first() {
    let handler = handler(account_repo_with(42, "a@b.com", UserType::Client), Arc::new(MemoryStore::new()));

    let first = handler.login(login_request("a@b.com", PASSWORD, UserType::Client)).await.unwrap();
    let second = handler.login(login_request("a@b.com", PASSWORD, UserType::Client)).await.unwrap();

    assert!(matches!(handler.authenticate(&first.access_token).await, Err(AuthError::TokenRevoked)));
    assert!(handler.authenticate(&second.access_token).await.is_ok());
    assert!(matches!(handler.refresh_token(&first.refresh_token).await, Err(AuthError::RefreshTokenNotFound)));
}

#[actix_rt::test]
async fn authenticate_rejects_refresh_token_of_other_session() {
    let handler = handler(no_accounts(), Arc::new(MemoryStore::new()));
    let pair = seed_session(&handler, 42, "client").await;

    // The refresh token is signed by the same key but is not the stored access token.
    assert!(matches!(handler.authenticate(&pair.refresh_token).await, Err(AuthError::TokenRevoked)));
}

#[actix_rt::test]
async fn logout_revokes_both_tokens() {
    let handler = handler(no_accounts(), Arc::new(MemoryStore::new()));
    let pair = seed_session(&handler, 42, "client").await;
    let claims = handler.authenticate(&pair.access_token).await.unwrap();

    handler.logout(&claims).await.expect("logout failed");

    assert!(matches!(handler.authenticate(&pair.access_token).await, Err(AuthError::TokenRevoked)));
    assert!(matches!(handler.refresh_token(&pair.refresh_token).await, Err(AuthError::RefreshTokenNotFound)));
}

#[actix_rt::test]
async fn refresh_rotates_and_rejects_replay() {
    let store = MemoryStore::new();
    let handler = handler(no_accounts(), Arc::new(store.clone()));
    let original = seed_session(&handler, 42, "client").await;

    let rotated = handler.refresh_token(&original.refresh_token).await.expect("refresh failed");

    assert_ne!(rotated.access_token, original.access_token);
    assert_ne!(rotated.refresh_token, original.refresh_token);
    assert!(handler.authenticate(&rotated.access_token).await.is_ok());
    assert!(matches!(handler.authenticate(&original.access_token).await, Err(AuthError::TokenRevoked)));

    let replay = handler.refresh_token(&original.refresh_token).await;
    assert!(matches!(replay, Err(AuthError::RefreshTokenNotFound)));

    assert!(handler.refresh_token(&rotated.refresh_token).await.is_ok());
    assert_eq!(store.get("refresh_lock:42:client").await.unwrap(), None);
}

#[actix_rt::test]
async fn refresh_with_garbage_token_is_invalid() {
    let handler = handler(no_accounts(), Arc::new(MemoryStore::new()));

    assert!(matches!(handler.refresh_token("nope").await, Err(AuthError::InvalidRefreshToken)));
}

#[actix_rt::test]
async fn refresh_while_locked_reports_in_progress() {
    let handler = handler(no_accounts(), Arc::new(MemoryStore::new()));
    let pair = seed_session(&handler, 42, "client").await;

    let held = handler.token_repo.lock_refresh(42, "client").await.unwrap().expect("lock not acquired");
    let blocked = handler.refresh_token(&pair.refresh_token).await;
    assert!(matches!(blocked, Err(AuthError::RefreshInProgress)));

    // A rejected attempt leaves the session untouched.
    assert!(handler.authenticate(&pair.access_token).await.is_ok());

    handler.token_repo.unlock_refresh(42, "client", &held).await.unwrap();
    assert!(handler.refresh_token(&pair.refresh_token).await.is_ok());
}

#[actix_rt::test]
async fn concurrent_refreshes_yield_at_most_one_pair() {
    let handler = handler(no_accounts(), Arc::new(MemoryStore::new()));
    let pair = seed_session(&handler, 42, "client").await;

    let (a, b) = tokio::join!(
        handler.refresh_token(&pair.refresh_token),
        handler.refresh_token(&pair.refresh_token),
    );

    let winners: Vec<TokenPair> = [a, b].into_iter().filter_map(Result::ok).collect();
    assert_eq!(winners.len(), 1);
    assert!(handler.authenticate(&winners[0].access_token).await.is_ok());
}

#[actix_rt::test]
async fn failed_store_write_during_refresh_returns_no_pair() {
    let memory = MemoryStore::new();
    let jwt = jwt_service();
    let pair = jwt.issue(42, "client", "a@b.com").unwrap();
    let seed = token_repo(Arc::new(memory.clone()));
    seed.store_token_pair(42, "client", &pair.access_token, &pair.refresh_token).await.unwrap();

    let failing: Arc<dyn KeyValueStore> = Arc::new(FailingWrites::new(memory.clone(), "refresh_token"));
    let handler = handler(no_accounts(), failing);

    let result = handler.refresh_token(&pair.refresh_token).await;

    assert!(matches!(result, Err(AuthError::Store(_))));
    assert_eq!(memory.get("access_token:42:client").await.unwrap(), None);
    assert_eq!(memory.get("refresh_lock:42:client").await.unwrap(), None);
}

/// Token service whose claims always look expired to the use case.
struct AlwaysExpired(JwtService);

impl TokenServiceRepository for AlwaysExpired {
    fn issue(&self, user_id: i64, user_type: &str, email: &str) -> Result<TokenPair, AuthError> {
        self.0.issue(user_id, user_type, email)
    }

    fn parse(&self, token: &str) -> Result<TokenData<TokenClaims>, AuthError> {
        self.0.parse(token)
    }

    fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.0.validate(token)
    }

    fn is_expired(&self, _claims: &TokenClaims) -> bool {
        true
    }
}

#[actix_rt::test]
async fn expired_claims_are_reported_per_token_kind() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let handler: TestHandler<AlwaysExpired> =
        AuthHandler::new(no_accounts(), AlwaysExpired(jwt_service()), token_repo(store));
    let pair = handler.token_service.issue(42, "client", "a@b.com").unwrap();

    assert!(matches!(handler.authenticate(&pair.access_token).await, Err(AuthError::TokenExpired)));
    assert!(matches!(handler.refresh_token(&pair.refresh_token).await, Err(AuthError::RefreshTokenExpired)));
}
