// ============================================================================
// SERVICE : RECETTES
// ============================================================================
//
// Écriture (création / modification):
//   1. Validation (recipe_validation puis validator sur les champs)
//   2. Ingrédients inconnus → UnknownIngredients
//   3. Image data-URI décodée et stockée via le MediaStore
//   4. Transaction: recette + lignes d'ingrédients
//      (modification: DELETE des lignes, INSERT en masse, puis scalaires)
//
// Lecture:
//   - Tri par pub_date décroissante
//   - Filtres is_favorited / is_in_shopping_cart seulement si le lecteur
//     est authentifié; author toujours
//   - present(): auteur, ingrédients et indicateurs calculés par lot
//
// Seul l'auteur peut modifier ou supprimer sa recette (PermissionDenied).
//
// ============================================================================

use std::collections::{HashMap, HashSet};

use sea_orm::sea_query::{Query, SelectStatement, SimpleExpr};
use sea_orm::*;
use validator::Validate;

use crate::errors::{ApiError, ValidationError};
use crate::models::dto::{
    CreateRecipeRequest, IngredientAmount, RecipeIngredientResponse, RecipeListQuery,
    RecipeResponse, UpdateRecipeRequest,
};
use crate::models::{favorite_recipe, ingredient, recipe, recipe_ingredient, shopping_cart, users};
use crate::services::flags_service::FlagsService;
use crate::services::media_store::{MediaStore, RECIPE_IMAGES_DIR, discard_media};
use crate::services::recipe_validation::validate_recipe_input;
use crate::services::user_service::UserService;
use crate::utils::image::decode_data_uri;
use crate::utils::request::parse_bool_flag;

/// Filtres de la liste; None = filtre absent
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecipeFilters {
    pub author: Option<i32>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

impl From<&RecipeListQuery> for RecipeFilters {
    fn from(query: &RecipeListQuery) -> Self {
        Self {
            author: query.author,
            is_favorited: query.is_favorited.as_deref().map(parse_bool_flag),
            is_in_shopping_cart: query.is_in_shopping_cart.as_deref().map(parse_bool_flag),
        }
    }
}

pub struct RecipeService;

impl RecipeService {
    pub async fn list(
        db: &DatabaseConnection,
        viewer: Option<i32>,
        filters: RecipeFilters,
        offset: u64,
        limit: u64,
    ) -> Result<(u64, Vec<recipe::Model>), ApiError> {
        let mut query = recipe::Entity::find();

        if let Some(author) = filters.author {
            query = query.filter(recipe::Column::AuthorId.eq(author));
        }

        if let Some(user_id) = viewer {
            if let Some(flag) = filters.is_favorited {
                let favorited = Query::select()
                    .column(favorite_recipe::Column::RecipeId)
                    .from(favorite_recipe::Entity)
                    .and_where(favorite_recipe::Column::UserId.eq(user_id))
                    .to_owned();
                query = query.filter(membership(flag, favorited));
            }

            if let Some(flag) = filters.is_in_shopping_cart {
                let in_cart = Query::select()
                    .column(shopping_cart::Column::RecipeId)
                    .from(shopping_cart::Entity)
                    .and_where(shopping_cart::Column::UserId.eq(user_id))
                    .to_owned();
                query = query.filter(membership(flag, in_cart));
            }
        }

        let count = query.clone().count(db).await?;

        let recipes = query
            .order_by_desc(recipe::Column::PubDate)
            .order_by_desc(recipe::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        Ok((count, recipes))
    }

    pub async fn get(db: &DatabaseConnection, recipe_id: i32) -> Result<recipe::Model, ApiError> {
        recipe::Entity::find_by_id(recipe_id)
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("Recipe"))
    }

    pub async fn create(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        author_id: i32,
        request: CreateRecipeRequest,
    ) -> Result<recipe::Model, ApiError> {
        let lines = validate_recipe_input(request.ingredients.as_deref(), Some(request.cooking_time))?;
        request.validate()?;
        ensure_ingredients_exist(db, &lines).await?;

        let image = decode_data_uri(&request.image)?;
        let image_path = media.save(RECIPE_IMAGES_DIR, &image.filename, &image.bytes).await?;

        let new_recipe = recipe::ActiveModel {
            author_id: Set(author_id),
            name: Set(request.name),
            image: Set(image_path.clone()),
            text: Set(request.text),
            cooking_time: Set(request.cooking_time),
            pub_date: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        let result = async {
            let txn = db.begin().await?;
            let recipe = new_recipe.insert(&txn).await?;
            insert_lines(&txn, recipe.id, &lines).await?;
            txn.commit().await?;
            Ok::<_, DbErr>(recipe)
        }
        .await;

        match result {
            Ok(recipe) => {
                log::info!("Recipe {} created by user {}", recipe.id, author_id);
                Ok(recipe)
            }
            Err(e) => {
                discard_media(media, &image_path).await;
                Err(e.into())
            }
        }
    }

    pub async fn update(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        user_id: i32,
        recipe_id: i32,
        request: UpdateRecipeRequest,
    ) -> Result<recipe::Model, ApiError> {
        let recipe = Self::get(db, recipe_id).await?;
        ensure_author(&recipe, user_id)?;

        let lines = validate_recipe_input(request.ingredients.as_deref(), request.cooking_time)?;
        request.validate()?;
        ensure_ingredients_exist(db, &lines).await?;

        let new_image = match request.image.as_deref() {
            Some(data) => {
                let image = decode_data_uri(data)?;
                Some(media.save(RECIPE_IMAGES_DIR, &image.filename, &image.bytes).await?)
            }
            None => None,
        };

        let old_image = recipe.image.clone();
        let mut active_model: recipe::ActiveModel = recipe.into();
        if let Some(name) = request.name {
            active_model.name = Set(name);
        }
        if let Some(text) = request.text {
            active_model.text = Set(text);
        }
        if let Some(cooking_time) = request.cooking_time {
            active_model.cooking_time = Set(cooking_time);
        }
        if let Some(path) = &new_image {
            active_model.image = Set(path.clone());
        }

        // remplacement complet des lignes puis des scalaires, dans une seule transaction
        let result = async {
            let txn = db.begin().await?;
            recipe_ingredient::Entity::delete_many()
                .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
                .exec(&txn)
                .await?;
            insert_lines(&txn, recipe_id, &lines).await?;
            let updated = active_model.update(&txn).await?;
            txn.commit().await?;
            Ok::<_, DbErr>(updated)
        }
        .await;

        match result {
            Ok(updated) => {
                if new_image.is_some() {
                    discard_media(media, &old_image).await;
                }
                log::info!("Recipe {} updated by user {}", recipe_id, user_id);
                Ok(updated)
            }
            Err(e) => {
                if let Some(path) = &new_image {
                    discard_media(media, path).await;
                }
                Err(e.into())
            }
        }
    }

    pub async fn delete(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<(), ApiError> {
        let recipe = Self::get(db, recipe_id).await?;
        ensure_author(&recipe, user_id)?;

        recipe::Entity::delete_by_id(recipe_id).exec(db).await?;
        discard_media(media, &recipe.image).await;

        log::info!("Recipe {} deleted by user {}", recipe_id, user_id);
        Ok(())
    }

    pub async fn present_one(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        viewer: Option<i32>,
        recipe: recipe::Model,
    ) -> Result<RecipeResponse, ApiError> {
        Self::present(db, media, viewer, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| ApiError::Internal("Recipe presentation came back empty".to_string()))
    }

    /// Représentation complète d'un lot de recettes pour un lecteur
    pub async fn present(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        viewer: Option<i32>,
        recipes: Vec<recipe::Model>,
    ) -> Result<Vec<RecipeResponse>, ApiError> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }

        // 1. auteurs (is_subscribed compris)
        let author_ids: Vec<i32> = recipes
            .iter()
            .map(|r| r.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors = users::Entity::find()
            .filter(users::Column::Id.is_in(author_ids))
            .all(db)
            .await?;
        let authors: HashMap<i32, _> = UserService::profiles(db, media, viewer, authors)
            .await?
            .into_iter()
            .map(|profile| (profile.id, profile))
            .collect();

        // 2. lignes d'ingrédients
        let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let mut ingredients = ingredient_lines(db, &recipe_ids).await?;

        // 3. indicateurs du lecteur
        let flags = FlagsService::recipe_flags(db, viewer, &recipe_ids).await?;

        recipes
            .into_iter()
            .map(|recipe| {
                let author = authors.get(&recipe.author_id).cloned().ok_or_else(|| {
                    ApiError::Internal(format!("Author {} of recipe {} is missing", recipe.author_id, recipe.id))
                })?;
                let recipe_flags = flags.get(recipe.id);

                Ok(RecipeResponse {
                    id: recipe.id,
                    author,
                    ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
                    is_favorited: recipe_flags.is_favorited,
                    is_in_shopping_cart: recipe_flags.is_in_shopping_cart,
                    image: media.url(&recipe.image),
                    name: recipe.name,
                    text: recipe.text,
                    cooking_time: recipe.cooking_time,
                })
            })
            .collect()
    }
}

fn membership(flag: bool, subquery: SelectStatement) -> SimpleExpr {
    if flag {
        recipe::Column::Id.in_subquery(subquery)
    } else {
        recipe::Column::Id.not_in_subquery(subquery)
    }
}

fn ensure_author(recipe: &recipe::Model, user_id: i32) -> Result<(), ApiError> {
    if recipe.author_id != user_id {
        log::warn!("User {} tried to modify recipe {} of user {}", user_id, recipe.id, recipe.author_id);
        return Err(ApiError::PermissionDenied);
    }
    Ok(())
}

async fn ensure_ingredients_exist(
    db: &DatabaseConnection,
    lines: &[IngredientAmount],
) -> Result<(), ApiError> {
    let ids: Vec<i32> = lines.iter().map(|line| line.id).collect();
    let known: HashSet<i32> = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();

    let mut unknown: Vec<i32> = ids.into_iter().filter(|id| !known.contains(id)).collect();
    if unknown.is_empty() {
        return Ok(());
    }
    unknown.sort_unstable();
    Err(ValidationError::UnknownIngredients(unknown).into())
}

async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i32,
    lines: &[IngredientAmount],
) -> Result<(), DbErr> {
    let models = lines.iter().map(|line| recipe_ingredient::ActiveModel {
        recipe_id: Set(recipe_id),
        ingredient_id: Set(line.id),
        amount: Set(line.amount),
        ..Default::default()
    });

    recipe_ingredient::Entity::insert_many(models)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Lignes d'ingrédients par recette, dans l'ordre de saisie
async fn ingredient_lines(
    db: &DatabaseConnection,
    recipe_ids: &[i32],
) -> Result<HashMap<i32, Vec<RecipeIngredientResponse>>, DbErr> {
    let lines = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.iter().copied()))
        .order_by_asc(recipe_ingredient::Column::Id)
        .all(db)
        .await?;
    if lines.is_empty() {
        return Ok(HashMap::new());
    }

    let ingredient_ids: HashSet<i32> = lines.iter().map(|l| l.ingredient_id).collect();
    let catalog: HashMap<i32, ingredient::Model> = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ingredient_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();

    let mut by_recipe: HashMap<i32, Vec<RecipeIngredientResponse>> = HashMap::new();
    for line in lines {
        if let Some(ingredient) = catalog.get(&line.ingredient_id) {
            by_recipe.entry(line.recipe_id).or_default().push(RecipeIngredientResponse {
                id: ingredient.id,
                name: ingredient.name.clone(),
                measurement_unit: ingredient.measurement_unit.clone(),
                amount: line.amount,
            });
        }
    }
    Ok(by_recipe)
}
