use actix_web::{get, http::header, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::errors::ApiError;
use crate::services::recipe_service::RecipeService;
use crate::utils::short_link;

/// GET /s/{code} - Redirection vers le détail de la recette
#[get("/s/{code}")]
pub async fn resolve_short_link(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = short_link::decode(&path).ok_or(ApiError::NotFound("Recipe"))?;
    let recipe = RecipeService::get(db.get_ref(), recipe_id).await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, short_link::recipe_path(recipe.id)))
        .finish())
}
