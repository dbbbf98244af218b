// ============================================================================
// DTO : REQUÊTES ET RÉPONSES DE L'API
// ============================================================================
//
// Les réponses sont construites explicitement à partir des modèles
// (pas de sérialisation directe des entités, sauf ingredient).
// Les chemins d'images sont convertis en URL via le MediaStore.
//
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{recipe, users};
use crate::services::media_store::MediaStore;

pub static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.@+-]+$").unwrap_or_else(|e| panic!("invalid username regex: {}", e))
});

// ----------------------------------------------------------------------------
// Utilisateurs
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address"), length(max = 254))]
    pub email: String,

    #[validate(
        length(min = 1, max = 150),
        regex(
            path = *USERNAME_RE,
            message = "Username may contain only letters, digits and . @ + - _"
        )
    )]
    pub username: String,

    #[validate(length(min = 1, max = 150))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150))]
    pub last_name: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordRequest {
    pub current_password: String,

    #[validate(length(min = 1, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

/// Réponse après inscription (pas de is_subscribed)
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<users::Model> for RegisteredUser {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub is_subscribed: bool,
}

impl UserProfile {
    pub fn new(user: users::Model, is_subscribed: bool, media: &dyn MediaStore) -> Self {
        Self {
            id: user.id,
            avatar: user.avatar.as_deref().map(|path| media.url(path)),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// Profil d'auteur dans les abonnements: aperçu des recettes + compteur
#[derive(Debug, Serialize)]
pub struct UserWithRecipes {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RecipesLimitQuery {
    pub recipes_limit: Option<u64>,
}

// ----------------------------------------------------------------------------
// Ingrédients
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

// ----------------------------------------------------------------------------
// Recettes
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeRequest {
    pub ingredients: Option<Vec<IngredientAmount>>,

    pub image: String,

    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(length(min = 1))]
    pub text: String,

    pub cooking_time: i32,
}

/// PATCH: tout est optionnel sauf les ingrédients (vérifiés par la validation)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecipeRequest {
    pub ingredients: Option<Vec<IngredientAmount>>,

    pub image: Option<String>,

    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    #[validate(length(min = 1))]
    pub text: Option<String>,

    pub cooking_time: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub author: Option<i32>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Résumé renvoyé par favori / panier / aperçus d'abonnement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeShort {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeShort {
    pub fn new(recipe: &recipe::Model, media: &dyn MediaStore) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: media.url(&recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

// ----------------------------------------------------------------------------
// Divers
// ----------------------------------------------------------------------------

/// Réponse de /api/health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub time: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}
