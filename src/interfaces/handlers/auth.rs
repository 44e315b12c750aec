use actix_web::{get, post, web, HttpResponse, Responder, ResponseError};
use crate::entities::account::{LoginRequest, SessionIdentity};
use crate::entities::token::RefreshTokenRequest;
use crate::use_cases::extractors::AuthClaims;
use crate::AppState;

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>
) -> impl Responder {
    match state.auth_handler.login(request.into_inner()).await {
        Ok(pair) => HttpResponse::Ok().json(pair),
        Err(e) => e.error_response(),
    }
}

#[post("/refresh")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> impl Responder {
    match state.auth_handler.refresh_token(&request.refresh_token).await {
        Ok(pair) => HttpResponse::Ok().json(pair),
        Err(e) => e.error_response(),
    }
}

#[post("/logout")]
pub async fn logout(
    state: web::Data<AppState>,
    claims: AuthClaims,
) -> impl Responder {
    match state.auth_handler.logout(&claims.0).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({"message": "sessão encerrada com sucesso"})),
        Err(e) => e.error_response(),
    }
}

#[get("/me")]
pub async fn me(claims: AuthClaims) -> impl Responder {
    let claims = claims.0;
    HttpResponse::Ok().json(SessionIdentity {
        user_id: claims.user_id,
        user_type: claims.user_type,
        email: claims.email,
        expires_at: claims.exp,
    })
}
