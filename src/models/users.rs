// ============================================================================
// MODÈLE : USERS
// ============================================================================
//
// Colonnes de la table users:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - email (VARCHAR(254), UNIQUE, NOT NULL) - identifiant de connexion
//   - username (VARCHAR(150), UNIQUE, NOT NULL)
//   - first_name, last_name (VARCHAR(150), NOT NULL)
//   - password_hash (VARCHAR, NOT NULL) - format pbkdf2_sha256$iter$salt$hash
//   - avatar (VARCHAR, NULL) - chemin relatif dans MEDIA_ROOT
//
// Points d'attention:
//   - Suppression d'un user: ses recettes, favoris, panier et abonnements
//     partent en cascade (FK déclarées côté tables enfants)
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,

    #[sea_orm(unique)]
    pub username: String,

    pub first_name: String,

    pub last_name: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub avatar: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recipe::Entity")]
    Recipe,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
