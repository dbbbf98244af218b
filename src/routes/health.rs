use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::models::dto::HealthResponse;

/// GET /api/health - État du serveur et de la BD (PUBLIC)
#[get("/health")]
pub async fn health_check(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let database = match db.ping().await {
        Ok(()) => "up",
        Err(e) => {
            log::error!("Database ping failed: {}", e);
            "down"
        }
    };

    let response = HealthResponse {
        status: "ok",
        database,
        time: Utc::now(),
    };

    HttpResponse::Ok().json(response)
}
