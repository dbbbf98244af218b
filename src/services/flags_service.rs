use std::collections::{HashMap, HashSet};

use sea_orm::*;

use crate::models::{favorite_recipe, recipe, shopping_cart, subscribe};

/// Indicateurs calculés pour un lecteur donné sur une recette
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeFlags {
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Résultat d'un calcul groupé; une recette absente vaut (false, false)
#[derive(Debug, Default)]
pub struct RecipeFlagsLookup {
    favorited: HashSet<i32>,
    in_cart: HashSet<i32>,
}

impl RecipeFlagsLookup {
    pub fn get(&self, recipe_id: i32) -> RecipeFlags {
        RecipeFlags {
            is_favorited: self.favorited.contains(&recipe_id),
            is_in_shopping_cart: self.in_cart.contains(&recipe_id),
        }
    }
}

pub struct FlagsService;

impl FlagsService {
    /// is_favorited / is_in_shopping_cart pour un lot de recettes.
    /// Visiteur anonyme: tout à false, sans requête
    pub async fn recipe_flags(
        db: &DatabaseConnection,
        viewer: Option<i32>,
        recipe_ids: &[i32],
    ) -> Result<RecipeFlagsLookup, DbErr> {
        let Some(user_id) = viewer else {
            return Ok(RecipeFlagsLookup::default());
        };
        if recipe_ids.is_empty() {
            return Ok(RecipeFlagsLookup::default());
        }

        let favorited = favorite_recipe::Entity::find()
            .filter(favorite_recipe::Column::UserId.eq(user_id))
            .filter(favorite_recipe::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.recipe_id)
            .collect();

        let in_cart = shopping_cart::Entity::find()
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .filter(shopping_cart::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.recipe_id)
            .collect();

        Ok(RecipeFlagsLookup { favorited, in_cart })
    }

    /// Auteurs (parmi author_ids) auxquels le lecteur est abonné
    pub async fn subscribed_authors(
        db: &DatabaseConnection,
        viewer: Option<i32>,
        author_ids: &[i32],
    ) -> Result<HashSet<i32>, DbErr> {
        let Some(user_id) = viewer else {
            return Ok(HashSet::new());
        };
        if author_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = subscribe::Entity::find()
            .filter(subscribe::Column::UserId.eq(user_id))
            .filter(subscribe::Column::AuthorId.is_in(author_ids.iter().copied()))
            .all(db)
            .await?;

        Ok(rows.into_iter().map(|row| row.author_id).collect())
    }

    pub async fn is_subscribed(
        db: &DatabaseConnection,
        viewer: Option<i32>,
        author_id: i32,
    ) -> Result<bool, DbErr> {
        let authors = Self::subscribed_authors(db, viewer, &[author_id]).await?;
        Ok(authors.contains(&author_id))
    }

    /// Compte des recettes par auteur (pour recipes_count)
    pub async fn recipe_counts(
        db: &DatabaseConnection,
        author_ids: &[i32],
    ) -> Result<HashMap<i32, u64>, DbErr> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = recipe::Entity::find()
            .select_only()
            .column(recipe::Column::AuthorId)
            .column_as(recipe::Column::Id.count(), "recipes_count")
            .filter(recipe::Column::AuthorId.is_in(author_ids.iter().copied()))
            .group_by(recipe::Column::AuthorId)
            .into_tuple()
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(author_id, count)| (author_id, count.max(0) as u64))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_viewer_gets_false_without_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let flags = FlagsService::recipe_flags(&db, None, &[1, 2]).await.unwrap();
        assert_eq!(flags.get(1), RecipeFlags::default());
        assert!(!FlagsService::is_subscribed(&db, None, 5).await.unwrap());

        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_flags_reflect_existing_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![favorite_recipe::Model {
                id: 1,
                user_id: 7,
                recipe_id: 10,
            }]])
            .append_query_results([vec![shopping_cart::Model {
                id: 1,
                user_id: 7,
                recipe_id: 11,
            }]])
            .into_connection();

        let flags = FlagsService::recipe_flags(&db, Some(7), &[10, 11, 12]).await.unwrap();

        assert_eq!(
            flags.get(10),
            RecipeFlags { is_favorited: true, is_in_shopping_cart: false }
        );
        assert_eq!(
            flags.get(11),
            RecipeFlags { is_favorited: false, is_in_shopping_cart: true }
        );
        assert_eq!(flags.get(12), RecipeFlags::default());
    }

    #[tokio::test]
    async fn test_is_subscribed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![subscribe::Model {
                id: 3,
                user_id: 1,
                author_id: 2,
            }]])
            .append_query_results([Vec::<subscribe::Model>::new()])
            .into_connection();

        assert!(FlagsService::is_subscribed(&db, Some(1), 2).await.unwrap());
        assert!(!FlagsService::is_subscribed(&db, Some(1), 3).await.unwrap());
    }
}
