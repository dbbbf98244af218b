// ============================================================================
// MODÈLE : RECIPE
// ============================================================================
//
// Colonnes de la table recipe:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - author_id (INTEGER, NOT NULL, FK vers users, ON DELETE CASCADE)
//   - name (VARCHAR(256), NOT NULL)
//   - image (VARCHAR, NOT NULL) - chemin relatif dans MEDIA_ROOT
//   - text (TEXT, NOT NULL) - description libre
//   - cooking_time (INTEGER, NOT NULL) - minutes, >= 1
//   - pub_date (TIMESTAMP, NOT NULL) - tri par défaut: plus récent d'abord
//
// Points d'attention:
//   - Au moins une ligne recipe_ingredient: vérifié à l'écriture
//     (services::recipe_validation), pas par une contrainte SQL
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub author_id: i32,

    pub name: String,

    pub image: String,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    pub cooking_time: i32,

    pub pub_date: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    RecipeIngredient,

    #[sea_orm(has_many = "super::favorite_recipe::Entity")]
    FavoriteRecipe,

    #[sea_orm(has_many = "super::shopping_cart::Entity")]
    ShoppingCart,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::recipe_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredient.def()
    }
}

impl Related<super::favorite_recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FavoriteRecipe.def()
    }
}

impl Related<super::shopping_cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingCart.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
