
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{Algorithm, Header};
use test_utils::*;
use tour_booking_backend::{constants::TOKEN_ISSUER, errors::AuthError};

#[test]
fn issued_access_token_round_trips_identity() {
    let jwt = jwt_service();
    let issued_at = Utc::now().timestamp();

    let pair = jwt.issue(42, "client", "a@b.com").expect("issue failed");
    let claims = jwt.validate(&pair.access_token).expect("validate failed");

    assert_eq!(claims.user_id, 42);
    assert_eq!(claims.user_type, "client");
    assert_eq!(claims.email, "a@b.com");
    assert_eq!(claims.sub, "42");
    assert_eq!(claims.iss, TOKEN_ISSUER);
    assert!(claims.exp > claims.iat);
    assert!(!jwt.is_expired(&claims));

    assert!((pair.expires_in - (issued_at + 900)).abs() <= 1);
    assert_eq!(pair.expires_in, claims.exp);
}

#[test]
fn refresh_token_shares_identity_but_lives_longer() {
    let jwt = jwt_service();

    let pair = jwt.issue(42, "client", "a@b.com").unwrap();
    let access = jwt.validate(&pair.access_token).unwrap();
    let refresh = jwt.validate(&pair.refresh_token).unwrap();

    assert_eq!((refresh.user_id, &refresh.user_type, &refresh.email), (access.user_id, &access.user_type, &access.email));
    assert_eq!(refresh.iat, access.iat);
    assert_eq!(refresh.exp - refresh.iat, 168 * 3600);
    assert_ne!(pair.access_token, pair.refresh_token);
}

#[test]
fn issuer_performs_no_identity_validation() {
    let jwt = jwt_service();

    for user_id in [0, -7] {
        let pair = jwt.issue(user_id, "anything", "").expect("issuer should not validate identity");
        assert_eq!(jwt.validate(&pair.access_token).unwrap().user_id, user_id);
    }
}

#[test]
fn malformed_ttl_fails_issuance() {
    let jwt = jwt_with_ttls("quinze minutos", "168h");
    assert!(matches!(jwt.issue(1, "client", "a@b.com"), Err(AuthError::Configuration(_))));

    let jwt = jwt_with_ttls("15m", "");
    assert!(matches!(jwt.issue(1, "client", "a@b.com"), Err(AuthError::Configuration(_))));
}

#[test]
fn oversized_ttl_fails_issuance_instead_of_panicking() {
    let jwt = jwt_with_ttls("1000000years", "168h");
    assert!(matches!(jwt.issue(1, "client", "a@b.com"), Err(AuthError::Configuration(_))));

    let jwt = jwt_with_ttls("15m", "1000000years");
    assert!(matches!(jwt.issue(1, "client", "a@b.com"), Err(AuthError::Configuration(_))));
}

#[test]
fn pairs_minted_back_to_back_differ() {
    let jwt = jwt_service();
    let first = jwt.issue(5, "company", "agencia@example.com").unwrap();
    let second = jwt.issue(5, "company", "agencia@example.com").unwrap();

    assert_ne!(first.access_token, second.access_token);
    assert_ne!(first.refresh_token, second.refresh_token);
}

#[test]
fn flipped_signature_byte_is_rejected() {
    let jwt = jwt_service();
    let token = jwt.issue(42, "client", "a@b.com").unwrap().access_token;

    let (unsigned, signature) = token.rsplit_once('.').unwrap();
    let mut sig = signature.as_bytes().to_vec();
    sig[0] = if sig[0] == b'A' { b'B' } else { b'A' };
    let tampered = format!("{unsigned}.{}", String::from_utf8(sig).unwrap());

    let err = jwt.validate(&tampered).unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
    assert!(err.is_unauthorized());
}

#[test]
fn token_signed_with_another_secret_is_rejected() {
    let claims = claims_for(42, "client", "a@b.com", 600);
    let token = sign_with(Header::new(Algorithm::HS256), &claims, "some_other_secret_that_is_long_enough_000");

    assert!(matches!(jwt_service().validate(&token), Err(AuthError::InvalidToken)));
}

#[test]
fn other_hmac_variants_are_accepted() {
    let claims = claims_for(42, "client", "a@b.com", 600);
    let token = sign_with(Header::new(Algorithm::HS512), &claims, TEST_SECRET);

    let decoded = jwt_service().parse(&token).expect("HS512 belongs to the accepted family");
    assert_eq!(decoded.header.alg, Algorithm::HS512);
    assert_eq!(decoded.claims, claims);
}

#[test]
fn non_hmac_algorithm_header_is_rejected() {
    let jwt = jwt_service();
    let token = jwt.issue(42, "client", "a@b.com").unwrap().access_token;
    let mut segments = token.split('.');
    let (_, payload, signature) = (segments.next().unwrap(), segments.next().unwrap(), segments.next().unwrap());

    for header in [r#"{"alg":"RS256","typ":"JWT"}"#, r#"{"alg":"none","typ":"JWT"}"#] {
        let forged = format!("{}.{payload}.{signature}", URL_SAFE_NO_PAD.encode(header));
        assert!(
            matches!(jwt.parse(&forged), Err(AuthError::InvalidToken)),
            "{header} should be rejected"
        );
    }

    let unsigned = format!("{}.{payload}.", URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#));
    assert!(jwt.parse(&unsigned).is_err());
}

#[test]
fn structurally_broken_tokens_are_rejected() {
    let jwt = jwt_service();
    for garbage in ["", "abc", "a.b", "a.b.c.d", "not a token at all"] {
        assert!(matches!(jwt.validate(garbage), Err(AuthError::InvalidToken)), "{garbage:?}");
    }
}

#[test]
fn foreign_issuer_is_rejected() {
    let mut claims = claims_for(42, "client", "a@b.com", 600);
    claims.iss = "someone-else".into();
    let token = sign_with(Header::new(Algorithm::HS256), &claims, TEST_SECRET);

    assert!(matches!(jwt_service().validate(&token), Err(AuthError::InvalidToken)));
}

#[test]
fn expired_token_fails_validation_and_reports_expired() {
    let jwt = jwt_service();
    let claims = claims_for(42, "client", "a@b.com", -1);
    let token = sign_with(Header::new(Algorithm::HS256), &claims, TEST_SECRET);

    assert!(matches!(jwt.validate(&token), Err(AuthError::InvalidToken)));
    assert!(jwt.is_expired(&claims));
    assert!(!jwt.is_expired(&claims_for(42, "client", "a@b.com", 3600)));
}

#[test]
fn not_yet_valid_token_is_rejected() {
    let mut claims = claims_for(42, "client", "a@b.com", 7200);
    claims.nbf = Utc::now().timestamp() + 3600;
    let token = sign_with(Header::new(Algorithm::HS256), &claims, TEST_SECRET);

    assert!(matches!(jwt_service().validate(&token), Err(AuthError::InvalidToken)));
}
