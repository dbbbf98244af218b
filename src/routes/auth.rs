use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{LoginRequest, TokenResponse};
use crate::services::user_service::UserService;

/// POST /api/auth/token/login/ - Obtenir un token (PUBLIC)
#[post("/login/")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let LoginRequest { email, password } = body.into_inner();
    let auth_token = UserService::login(db.get_ref(), config.get_ref(), &email, &password).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { auth_token }))
}

/// POST /api/auth/token/logout/ - Déconnexion (PROTÉGÉE)
/// Les JWT sont sans état: le client oublie son token
#[post("/logout/")]
pub async fn logout(auth_user: AuthUser) -> HttpResponse {
    log::info!("User {} logged out", auth_user.user_id);
    HttpResponse::NoContent().finish()
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth/token")
            .service(login)
            .service(logout)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::tests::test_config;
    use crate::utils::jwt;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_logout_requires_token() {
        let config = test_config();
        let token = jwt::generate_token(1, "cook@example.com", &config.jwt_secret, 1).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .configure(auth_routes),
        )
        .await;

        let anonymous = test::TestRequest::post().uri("/auth/token/logout/").to_request();
        assert_eq!(
            test::call_service(&app, anonymous).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let authenticated = test::TestRequest::post()
            .uri("/auth/token/logout/")
            .insert_header(("Authorization", format!("Token {}", token)))
            .to_request();
        assert_eq!(
            test::call_service(&app, authenticated).await.status(),
            StatusCode::NO_CONTENT
        );
    }
}
