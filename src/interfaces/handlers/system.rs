use actix_web::{web, get, HttpResponse, Responder};
use humantime::format_duration;
use chrono::Utc;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::{
    constants::START_TIME,
    repositories::{account::AccountRepository, token::TokenRepository},
    AppState,
};

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthCheckResponse {
    pub status: String,
    pub uptime: String,
    pub timestamp: String,
    pub start_at: String,
    pub database: String,
    pub session_store: String,
    pub version: String,
}

fn component_status<E: std::fmt::Display>(name: &str, result: Result<(), E>) -> &'static str {
    match result {
        Ok(_) => "OK",
        Err(e) => {
            tracing::warn!("Health check: {} unavailable: {}", name, e);
            "Unavailable"
        }
    }
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now_utc = Utc::now();
    let uptime_secs = now_utc.signed_duration_since(*START_TIME).num_seconds().max(0);

    let database = component_status("database", state.auth_handler.account_repo.check_connection().await);
    let session_store = component_status("session store", state.auth_handler.token_repo.check_connection().await);

    let healthy = database == "OK" && session_store == "OK";
    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        uptime: format_duration(Duration::from_secs(uptime_secs as u64)).to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        database: database.to_string(),
        session_store: session_store.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
