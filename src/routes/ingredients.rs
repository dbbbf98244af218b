use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::errors::ApiError;
use crate::models::dto::IngredientQuery;
use crate::services::ingredient_service::IngredientService;

/// GET /api/ingredients/?name=<préfixe> - Catalogue, non paginé
#[get("/")]
pub async fn list_ingredients(
    query: web::Query<IngredientQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let ingredients = IngredientService::search(db.get_ref(), query.name.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ingredients))
}

/// GET /api/ingredients/{id}/
#[get("/{id}/")]
pub async fn ingredient_detail(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let ingredient = IngredientService::get(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ingredient))
}

pub fn ingredients_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ingredients")
            .service(list_ingredients)
            .service(ingredient_detail)
    );
}
