// ============================================================================
// ROUTES : RECETTES
// ============================================================================
//
//   GET    /api/recipes/                         liste (limit/offset + filtres)
//   POST   /api/recipes/                         création (PROTÉGÉE)
//   GET    /api/recipes/download_shopping_cart/  liste de courses .txt (PROTÉGÉE)
//   GET    /api/recipes/{id}/                    détail
//   PATCH  /api/recipes/{id}/                    modification (auteur)
//   DELETE /api/recipes/{id}/                    suppression (auteur)
//   POST   /api/recipes/{id}/favorite/           (PROTÉGÉE)
//   DELETE /api/recipes/{id}/favorite/           (PROTÉGÉE)
//   POST   /api/recipes/{id}/shopping_cart/      (PROTÉGÉE)
//   DELETE /api/recipes/{id}/shopping_cart/      (PROTÉGÉE)
//   GET    /api/recipes/{id}/get-link/           lien court
//
// ============================================================================

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::errors::ApiError;
use crate::middleware::{AuthUser, Viewer, viewer_id};
use crate::models::dto::{
    CreateRecipeRequest, RecipeListQuery, RecipeShort, ShortLinkResponse, UpdateRecipeRequest,
};
use crate::services::media_store::LocalMediaStore;
use crate::services::recipe_service::{RecipeFilters, RecipeService};
use crate::services::shopping_list_service::{self, ShoppingListService};
use crate::services::toggle_service::{RecipeRelation, ToggleService};
use crate::utils::pagination::{Paginated, clamp_window, limit_offset_links};
use crate::utils::request::{base_url, current_url};
use crate::utils::short_link;

/// GET /api/recipes/ - Liste paginée, plus récentes d'abord
#[get("/")]
pub async fn list_recipes(
    req: HttpRequest,
    viewer: Viewer,
    query: web::Query<RecipeListQuery>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let limit = clamp_window(query.limit.filter(|l| *l > 0).unwrap_or(config.default_page_size));
    let offset = clamp_window(query.offset.unwrap_or(0));
    let viewer = viewer_id(&viewer);

    let (count, recipes) = RecipeService::list(
        db.get_ref(),
        viewer,
        RecipeFilters::from(&query.into_inner()),
        offset,
        limit,
    )
    .await?;
    let results = RecipeService::present(db.get_ref(), media.get_ref(), viewer, recipes).await?;

    let (next, previous) =
        limit_offset_links(&current_url(&req), req.query_string(), count, limit, offset);

    Ok(HttpResponse::Ok().json(Paginated { count, next, previous, results }))
}

/// POST /api/recipes/ - Publier une recette (PROTÉGÉE)
#[post("/")]
pub async fn create_recipe(
    auth_user: AuthUser,
    body: web::Json<CreateRecipeRequest>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    let recipe =
        RecipeService::create(db.get_ref(), media.get_ref(), auth_user.user_id, body.into_inner())
            .await?;
    let response =
        RecipeService::present_one(db.get_ref(), media.get_ref(), Some(auth_user.user_id), recipe)
            .await?;

    Ok(HttpResponse::Created().json(response))
}

/// GET /api/recipes/download_shopping_cart/ - Liste de courses agrégée (PROTÉGÉE)
#[get("/download_shopping_cart/")]
pub async fn download_shopping_cart(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let list = ShoppingListService::build(db.get_ref(), auth_user.user_id).await?;
    let generated_at = chrono::Local::now().naive_local();

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(
                shopping_list_service::attachment_filename(generated_at),
            )],
        })
        .body(shopping_list_service::render(&list, generated_at)))
}

/// GET /api/recipes/{id}/ - Détail d'une recette
#[get("/{id}/")]
pub async fn recipe_detail(
    path: web::Path<i32>,
    viewer: Viewer,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    let recipe = RecipeService::get(db.get_ref(), path.into_inner()).await?;
    let response =
        RecipeService::present_one(db.get_ref(), media.get_ref(), viewer_id(&viewer), recipe)
            .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// PATCH /api/recipes/{id}/ - Modifier sa recette (AUTEUR)
#[patch("/{id}/")]
pub async fn update_recipe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateRecipeRequest>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    let recipe = RecipeService::update(
        db.get_ref(),
        media.get_ref(),
        auth_user.user_id,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    let response =
        RecipeService::present_one(db.get_ref(), media.get_ref(), Some(auth_user.user_id), recipe)
            .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /api/recipes/{id}/ - Supprimer sa recette (AUTEUR)
#[delete("/{id}/")]
pub async fn delete_recipe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    RecipeService::delete(db.get_ref(), media.get_ref(), auth_user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/recipes/{id}/favorite/
#[post("/{id}/favorite/")]
pub async fn add_favorite(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    add_relation(RecipeRelation::Favorite, auth_user, path.into_inner(), &db, &media).await
}

/// DELETE /api/recipes/{id}/favorite/
#[delete("/{id}/favorite/")]
pub async fn remove_favorite(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    ToggleService::remove(db.get_ref(), RecipeRelation::Favorite, auth_user.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/recipes/{id}/shopping_cart/
#[post("/{id}/shopping_cart/")]
pub async fn add_to_cart(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    add_relation(RecipeRelation::ShoppingCart, auth_user, path.into_inner(), &db, &media).await
}

/// DELETE /api/recipes/{id}/shopping_cart/
#[delete("/{id}/shopping_cart/")]
pub async fn remove_from_cart(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    ToggleService::remove(
        db.get_ref(),
        RecipeRelation::ShoppingCart,
        auth_user.user_id,
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/recipes/{id}/get-link/ - Lien court vers la recette
#[get("/{id}/get-link/")]
pub async fn get_link(
    req: HttpRequest,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let recipe = RecipeService::get(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ShortLinkResponse {
        short_link: short_link::build(&base_url(&req), recipe.id),
    }))
}

async fn add_relation(
    relation: RecipeRelation,
    auth_user: AuthUser,
    recipe_id: i32,
    db: &DatabaseConnection,
    media: &LocalMediaStore,
) -> Result<HttpResponse, ApiError> {
    let recipe = ToggleService::add(db, relation, auth_user.user_id, recipe_id).await?;
    Ok(HttpResponse::Created().json(RecipeShort::new(&recipe, media)))
}

pub fn recipes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/recipes")
            .service(list_recipes)
            .service(create_recipe)
            .service(download_shopping_cart)
            .service(recipe_detail)
            .service(update_recipe)
            .service(delete_recipe)
            .service(add_favorite)
            .service(remove_favorite)
            .service(add_to_cart)
            .service(remove_from_cart)
            .service(get_link)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::tests::test_config;
    use crate::models::{recipe, shopping_cart};
    use crate::utils::jwt;
    use actix_web::{App, http::StatusCode, test};
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn pancakes() -> recipe::Model {
        recipe::Model {
            id: 26,
            author_id: 1,
            name: "Pancakes".to_string(),
            image: "recipes_images/pancakes.png".to_string(),
            text: "Mix and fry".to_string(),
            cooking_time: 20,
            pub_date: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    fn auth_header(user_id: i32) -> (&'static str, String) {
        let token = jwt::generate_token(user_id, "cook@example.com", "test-secret", 1).unwrap();
        ("Authorization", format!("Token {}", token))
    }

    macro_rules! app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($db))
                    .app_data(web::Data::new(test_config()))
                    .app_data(web::Data::new(LocalMediaStore::new("/tmp", "/media/")))
                    .configure(recipes_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_get_link_returns_hex_short_link() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pancakes()]])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::get()
            .uri("/recipes/26/get-link/")
            .insert_header(("Host", "foodgram.example"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["short-link"], "http://foodgram.example/s/1a");
    }

    #[actix_web::test]
    async fn test_favorite_returns_summary_then_rejects_duplicate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pancakes()]])
            .append_exec_results([MockExecResult { last_insert_id: 1, rows_affected: 1 }])
            .append_query_results([vec![pancakes()]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 0 }])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/recipes/26/favorite/")
            .insert_header(auth_header(2))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            serde_json::json!({
                "id": 26,
                "name": "Pancakes",
                "image": "/media/recipes_images/pancakes.png",
                "cooking_time": 20
            })
        );

        let req = test::TestRequest::post()
            .uri("/recipes/26/favorite/")
            .insert_header(auth_header(2))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_anonymous_cannot_create() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/recipes/")
            .set_json(serde_json::json!({
                "ingredients": [{ "id": 1, "amount": 1 }],
                "image": "data:image/png;base64,AAAA",
                "name": "Toast",
                "text": "Toast it",
                "cooking_time": 2
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_download_empty_shopping_cart() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<shopping_cart::Model>::new()])
            .into_connection();
        let app = app!(db);

        let req = test::TestRequest::get()
            .uri("/recipes/download_shopping_cart/")
            .insert_header(auth_header(2))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let disposition = resp
            .headers()
            .get("Content-Disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"Shopping_cart_"));

        let body = test::read_body(resp).await;
        assert_eq!(std::str::from_utf8(&body).unwrap(), "Shopping list is empty.");
    }
}
