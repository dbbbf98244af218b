// ============================================================================
// ROUTES : UTILISATEURS, AVATAR, ABONNEMENTS
// ============================================================================
//
//   POST   /api/users/                     inscription (PUBLIC)
//   GET    /api/users/                     liste paginée (page, limit)
//   GET    /api/users/me/                  profil courant (PROTÉGÉE)
//   POST   /api/users/set_password/        changement de mot de passe (PROTÉGÉE)
//   PUT    /api/users/me/avatar/           JSON data-URI ou multipart (PROTÉGÉE)
//   DELETE /api/users/me/avatar/           (PROTÉGÉE)
//   GET    /api/users/subscriptions/       auteurs suivis (PROTÉGÉE)
//   GET    /api/users/{id}/                profil
//   POST   /api/users/{id}/subscribe/      (PROTÉGÉE)
//   DELETE /api/users/{id}/subscribe/      (PROTÉGÉE)
//
// Les routes fixes sont enregistrées avant /{id}/.
//
// ============================================================================

use actix_multipart::Multipart;
use actix_web::{Either, HttpRequest, HttpResponse, delete, get, post, put, web};
use futures::TryStreamExt;
use sea_orm::DatabaseConnection;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::errors::{ApiError, ValidationError};
use crate::middleware::{AuthUser, Viewer, viewer_id};
use crate::models::dto::{
    AvatarRequest, AvatarResponse, RecipesLimitQuery, RegisterRequest, RegisteredUser,
    SetPasswordRequest,
};
use crate::services::media_store::LocalMediaStore;
use crate::services::subscription_service::SubscriptionService;
use crate::services::user_service::UserService;
use crate::utils::image::{DecodedImage, decode_data_uri, extension_for};
use crate::utils::pagination::{PageQuery, Paginated, page_number_links};
use crate::utils::request::current_url;

const SUBSCRIPTIONS_PAGE_SIZE: u64 = 10;
const MAX_AVATAR_SIZE: usize = 5 * 1024 * 1024;

/// POST /api/users/ - Créer un compte (PUBLIC)
#[post("/")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;

    let user = UserService::register(db.get_ref(), request).await?;
    Ok(HttpResponse::Created().json(RegisteredUser::from(user)))
}

/// GET /api/users/ - Liste paginée des profils
#[get("/")]
pub async fn list_users(
    req: HttpRequest,
    viewer: Viewer,
    query: web::Query<PageQuery>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let page_size = query.page_size(config.default_page_size);
    let (count, results) = UserService::list(
        db.get_ref(),
        media.get_ref(),
        viewer_id(&viewer),
        query.offset(config.default_page_size),
        page_size,
    )
    .await?;

    let (next, previous) =
        page_number_links(&current_url(&req), req.query_string(), count, query.page(), page_size);

    Ok(HttpResponse::Ok().json(Paginated { count, next, previous, results }))
}

/// GET /api/users/me/ - Profil de l'utilisateur connecté (PROTÉGÉE)
#[get("/me/")]
pub async fn me(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    let profile = UserService::profile(
        db.get_ref(),
        media.get_ref(),
        Some(auth_user.user_id),
        auth_user.user_id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// POST /api/users/set_password/ - Changer son mot de passe (PROTÉGÉE)
#[post("/set_password/")]
pub async fn set_password(
    auth_user: AuthUser,
    body: web::Json<SetPasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    UserService::set_password(
        db.get_ref(),
        auth_user.user_id,
        &body.current_password,
        &body.new_password,
    )
    .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/users/me/avatar/ - Remplacer l'avatar (PROTÉGÉE)
#[put("/me/avatar/")]
pub async fn update_avatar(
    auth_user: AuthUser,
    payload: Either<web::Json<AvatarRequest>, Multipart>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    let image = match payload {
        Either::Left(body) => {
            let data = body
                .into_inner()
                .avatar
                .filter(|data| !data.is_empty())
                .ok_or_else(avatar_required)?;
            decode_data_uri(&data)?
        }
        Either::Right(multipart) => read_avatar_upload(multipart).await?,
    };

    let avatar = UserService::set_avatar(
        db.get_ref(),
        media.get_ref(),
        auth_user.user_id,
        &image.filename,
        &image.bytes,
    )
    .await?;

    Ok(HttpResponse::Ok().json(AvatarResponse { avatar }))
}

/// DELETE /api/users/me/avatar/ - Supprimer l'avatar (PROTÉGÉE)
#[delete("/me/avatar/")]
pub async fn delete_avatar(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    UserService::delete_avatar(db.get_ref(), media.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/users/subscriptions/ - Auteurs suivis + aperçu des recettes (PROTÉGÉE)
#[get("/subscriptions/")]
pub async fn subscriptions(
    req: HttpRequest,
    auth_user: AuthUser,
    page: web::Query<PageQuery>,
    limits: web::Query<RecipesLimitQuery>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    let page_size = page.page_size(SUBSCRIPTIONS_PAGE_SIZE);
    let (count, authors) = SubscriptionService::list_authors(
        db.get_ref(),
        auth_user.user_id,
        page.offset(SUBSCRIPTIONS_PAGE_SIZE),
        page_size,
    )
    .await?;

    let results = UserService::with_recipes(
        db.get_ref(),
        media.get_ref(),
        Some(auth_user.user_id),
        authors,
        limits.recipes_limit,
    )
    .await?;

    let (next, previous) =
        page_number_links(&current_url(&req), req.query_string(), count, page.page(), page_size);

    Ok(HttpResponse::Ok().json(Paginated { count, next, previous, results }))
}

/// GET /api/users/{id}/ - Profil d'un utilisateur
#[get("/{id}/")]
pub async fn user_detail(
    path: web::Path<i32>,
    viewer: Viewer,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    let profile =
        UserService::profile(db.get_ref(), media.get_ref(), viewer_id(&viewer), path.into_inner())
            .await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// POST /api/users/{id}/subscribe/ - S'abonner à un auteur (PROTÉGÉE)
#[post("/{id}/subscribe/")]
pub async fn subscribe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    limits: web::Query<RecipesLimitQuery>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    let author =
        SubscriptionService::subscribe(db.get_ref(), auth_user.user_id, path.into_inner()).await?;

    let entry = UserService::with_recipes(
        db.get_ref(),
        media.get_ref(),
        Some(auth_user.user_id),
        vec![author],
        limits.recipes_limit,
    )
    .await?
    .pop()
    .ok_or_else(|| ApiError::Internal("Subscribed author vanished".to_string()))?;

    Ok(HttpResponse::Created().json(entry))
}

/// DELETE /api/users/{id}/subscribe/ - Se désabonner (PROTÉGÉE)
#[delete("/{id}/subscribe/")]
pub async fn unsubscribe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    SubscriptionService::unsubscribe(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

fn avatar_required() -> ValidationError {
    ValidationError::field("avatar", "This field is required")
}

// Premier champ "avatar" du formulaire; l'extension vient du Content-Type
// ou, à défaut, du nom de fichier
async fn read_avatar_upload(mut payload: Multipart) -> Result<DecodedImage, ApiError> {
    while let Some(mut field) = payload.try_next().await.map_err(upload_error)? {
        if field.name() != Some("avatar") {
            continue;
        }

        let extension = field
            .content_type()
            .filter(|mime| mime.type_() == "image")
            .and_then(|mime| extension_for(mime.subtype().as_str()))
            .or_else(|| {
                field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .and_then(|name| name.rsplit_once('.'))
                    .and_then(|(_, ext)| extension_for(ext))
            })
            .ok_or_else(|| ValidationError::InvalidImage("unsupported image type".to_string()))?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(upload_error)? {
            if bytes.len() + chunk.len() > MAX_AVATAR_SIZE {
                return Err(ValidationError::InvalidImage("file too large".to_string()).into());
            }
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(ValidationError::InvalidImage("empty image".to_string()).into());
        }

        return Ok(DecodedImage {
            filename: format!("{}.{}", Uuid::new_v4(), extension),
            bytes,
        });
    }

    Err(avatar_required().into())
}

fn upload_error(err: actix_multipart::MultipartError) -> ApiError {
    log::warn!("Multipart read error: {}", err);
    ValidationError::InvalidImage(format!("could not read upload ({})", err)).into()
}

pub fn users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(register)
            .service(list_users)
            .service(me)
            .service(set_password)
            .service(update_avatar)
            .service(delete_avatar)
            .service(subscriptions)
            .service(user_detail)
            .service(subscribe)
            .service(unsubscribe)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::tests::test_config;
    use crate::models::users;
    use crate::utils::jwt;
    use actix_web::{App, http::StatusCode, test};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user(id: i32) -> users::Model {
        users::Model {
            id,
            email: format!("user{}@example.com", id),
            username: format!("user{}", id),
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
            password_hash: String::new(),
            avatar: None,
        }
    }

    fn bearer(user_id: i32) -> (&'static str, String) {
        let config = test_config();
        let token =
            jwt::generate_token(user_id, "user@example.com", &config.jwt_secret, 1).unwrap();
        ("Authorization", format!("Token {}", token))
    }

    #[actix_web::test]
    async fn test_self_subscription_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1)]])
            .into_connection();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::new(LocalMediaStore::new("/tmp", "/media/")))
                .configure(users_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/users/1/subscribe/")
            .insert_header(bearer(1))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "You cannot subscribe to yourself");
    }

    #[actix_web::test]
    async fn test_me_requires_authentication() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::new(LocalMediaStore::new("/tmp", "/media/")))
                .configure(users_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/users/me/").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_avatar_requires_payload() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::new(LocalMediaStore::new("/tmp", "/media/")))
                .configure(users_routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/users/me/avatar/")
            .insert_header(bearer(1))
            .set_json(serde_json::json!({ "avatar": null }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["field"], "avatar");
    }

    #[actix_web::test]
    async fn test_large_avatar_data_uri_is_accepted() {
        use base64::{Engine, engine::general_purpose::STANDARD};

        let dir = tempfile::TempDir::new().unwrap();
        let stored = users::Model {
            avatar: Some("avatar_images/new.png".to_string()),
            ..user(1)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1)]])
            .append_query_results([vec![stored]])
            .into_connection();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::new(LocalMediaStore::new(dir.path(), "/media/")))
                .configure(crate::routes::configure_routes),
        )
        .await;

        // ~400 Ko une fois encodé, au-delà de la limite par défaut d'actix
        let data = format!("data:image/png;base64,{}", STANDARD.encode(vec![7u8; 300 * 1024]));
        let req = test::TestRequest::put()
            .uri("/api/users/me/avatar/")
            .insert_header(bearer(1))
            .set_json(serde_json::json!({ "avatar": data }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let avatar = body["avatar"].as_str().unwrap();
        assert!(avatar.starts_with("/media/avatar_images/"));
        assert!(avatar.ends_with(".png"));
    }
}
