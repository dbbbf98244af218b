// ============================================================================
// RELATIONS "TOGGLE" : FAVORIS ET PANIER
// ============================================================================
//
// Une paire (user, recipe) unique; seules opérations: créer si absente,
// supprimer si présente.
//
// Concurrence:
//   - Création: INSERT ... ON CONFLICT DO NOTHING sur l'index unique,
//     0 ligne insérée = la paire existait déjà (pas de check-then-insert)
//   - Suppression: DELETE filtré, 0 ligne supprimée = la paire n'existait pas
//
// Les deux cas de conflit sont des erreurs 400 (ValidationError).
//
// ============================================================================

use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::errors::{ApiError, ValidationError};
use crate::models::{favorite_recipe, recipe, shopping_cart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeRelation {
    Favorite,
    ShoppingCart,
}

impl RecipeRelation {
    fn already_exists(self) -> ValidationError {
        match self {
            RecipeRelation::Favorite => ValidationError::AlreadyFavorited,
            RecipeRelation::ShoppingCart => ValidationError::AlreadyInCart,
        }
    }

    fn missing(self) -> ValidationError {
        match self {
            RecipeRelation::Favorite => ValidationError::NotFavorited,
            RecipeRelation::ShoppingCart => ValidationError::NotInCart,
        }
    }
}

pub struct ToggleService;

impl ToggleService {
    /// Ajoute la recette à la relation; renvoie la recette pour le résumé
    pub async fn add(
        db: &DatabaseConnection,
        relation: RecipeRelation,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<recipe::Model, ApiError> {
        let recipe = recipe::Entity::find_by_id(recipe_id)
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("Recipe"))?;

        let inserted = match relation {
            RecipeRelation::Favorite => {
                favorite_recipe::Entity::insert(favorite_recipe::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                    ..Default::default()
                })
                .on_conflict(
                    OnConflict::columns([
                        favorite_recipe::Column::UserId,
                        favorite_recipe::Column::RecipeId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(db)
                .await?
            }
            RecipeRelation::ShoppingCart => {
                shopping_cart::Entity::insert(shopping_cart::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                    ..Default::default()
                })
                .on_conflict(
                    OnConflict::columns([
                        shopping_cart::Column::UserId,
                        shopping_cart::Column::RecipeId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(db)
                .await?
            }
        };

        if inserted == 0 {
            log::warn!("{:?} already set for user {} and recipe {}", relation, user_id, recipe_id);
            return Err(relation.already_exists().into());
        }

        log::info!("{:?} added: user {} recipe {}", relation, user_id, recipe_id);
        Ok(recipe)
    }

    pub async fn remove(
        db: &DatabaseConnection,
        relation: RecipeRelation,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<(), ApiError> {
        let exists = recipe::Entity::find_by_id(recipe_id).one(db).await?.is_some();
        if !exists {
            return Err(ApiError::NotFound("Recipe"));
        }

        let deleted = match relation {
            RecipeRelation::Favorite => {
                favorite_recipe::Entity::delete_many()
                    .filter(favorite_recipe::Column::UserId.eq(user_id))
                    .filter(favorite_recipe::Column::RecipeId.eq(recipe_id))
                    .exec(db)
                    .await?
            }
            RecipeRelation::ShoppingCart => {
                shopping_cart::Entity::delete_many()
                    .filter(shopping_cart::Column::UserId.eq(user_id))
                    .filter(shopping_cart::Column::RecipeId.eq(recipe_id))
                    .exec(db)
                    .await?
            }
        };

        if deleted.rows_affected == 0 {
            return Err(relation.missing().into());
        }

        log::info!("{:?} removed: user {} recipe {}", relation, user_id, recipe_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn recipe_model(id: i32) -> recipe::Model {
        recipe::Model {
            id,
            author_id: 1,
            name: "Pancakes".to_string(),
            image: "recipes_images/p.png".to_string(),
            text: "Mix and fry".to_string(),
            cooking_time: 20,
            pub_date: NaiveDate::from_ymd_opt(2025, 1, 14)
                .and_then(|d| d.and_hms_opt(3, 44, 0))
                .unwrap(),
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_add_favorite() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![recipe_model(4)]])
            .append_exec_results([exec(1)])
            .into_connection();

        let recipe = ToggleService::add(&db, RecipeRelation::Favorite, 2, 4).await.unwrap();
        assert_eq!(recipe.id, 4);
    }

    #[tokio::test]
    async fn test_add_twice_is_a_validation_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![recipe_model(4)]])
            .append_exec_results([exec(0)])
            .into_connection();

        let err = ToggleService::add(&db, RecipeRelation::ShoppingCart, 2, 4)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::AlreadyInCart)
        ));
    }

    #[tokio::test]
    async fn test_add_unknown_recipe() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<recipe::Model>::new()])
            .into_connection();

        let err = ToggleService::add(&db, RecipeRelation::Favorite, 2, 99)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_missing_pair() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![recipe_model(4)]])
            .append_exec_results([exec(0)])
            .into_connection();

        let err = ToggleService::remove(&db, RecipeRelation::Favorite, 2, 4)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::NotFavorited)
        ));
    }

    #[tokio::test]
    async fn test_remove_existing_pair() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![recipe_model(4)]])
            .append_exec_results([exec(1)])
            .into_connection();

        assert!(ToggleService::remove(&db, RecipeRelation::ShoppingCart, 2, 4).await.is_ok());
    }
}
