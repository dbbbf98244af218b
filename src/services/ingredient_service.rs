use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::*;

use crate::errors::ApiError;
use crate::models::ingredient;

pub struct IngredientService;

impl IngredientService {
    /// Recherche par préfixe insensible à la casse, triée par nom, non paginée
    pub async fn search(
        db: &DatabaseConnection,
        prefix: Option<&str>,
    ) -> Result<Vec<ingredient::Model>, ApiError> {
        let mut query = ingredient::Entity::find();

        if let Some(prefix) = prefix.map(str::trim).filter(|p| !p.is_empty()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(ingredient::Column::Name)))
                    .like(prefix_pattern(prefix)),
            );
        }

        Ok(query
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<ingredient::Model, ApiError> {
        ingredient::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("Ingredient"))
    }
}

// "Ab%" → "ab\%%": les jokers saisis par l'utilisateur sont littéraux
fn prefix_pattern(prefix: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for c in prefix.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_builds_case_insensitive_prefix_filter() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ingredient::Model {
                id: 1,
                name: "Flour".to_string(),
                measurement_unit: "g".to_string(),
            }]])
            .into_connection();

        let found = IngredientService::search(&db, Some("FL")).await.unwrap();
        assert_eq!(found.len(), 1);

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("LOWER"));
        assert!(sql.contains("fl%"));
    }

    #[tokio::test]
    async fn test_unknown_ingredient() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ingredient::Model>::new()])
            .into_connection();

        let err = IngredientService::get(&db, 9).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Ingredient")));
    }
}
