use actix_web::web;

mod auth;
mod system;
mod json_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(auth::config_routes)
            .configure(system::config_routes)
    );

    cfg.configure(json_error::config_routes);
}
