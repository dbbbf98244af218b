pub mod auth;
pub mod health;
pub mod ingredients;
pub mod media;
pub mod recipes;
pub mod short_links;
pub mod users;

use actix_web::{error, web};

use crate::errors::{ApiError, ValidationError};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .app_data(payload_config())
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(users::users_routes)
            .configure(ingredients::ingredients_routes)
            .configure(recipes::recipes_routes)
    )
    .service(short_links::resolve_short_link);
}

/// Limite des corps bruts (avatar JSON ou multipart lus via Either)
fn payload_config() -> web::PayloadConfig {
    web::PayloadConfig::new(10 * 1024 * 1024)
}

/// Corps JSON invalide → même format d'erreur que le reste de l'API
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(10 * 1024 * 1024)
        .error_handler(|err, _req| {
            let message = err.to_string();
            error::Error::from(ApiError::from(ValidationError::field("non_field_errors", message)))
        })
}
