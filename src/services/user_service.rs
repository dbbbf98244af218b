// ============================================================================
// SERVICE : UTILISATEURS
// ============================================================================
//
// Inscription, connexion (JWT), changement de mot de passe, avatar,
// et construction des profils vus par un lecteur (is_subscribed).
//
// Points d'attention:
//   - L'unicité email/username est détectée par la contrainte SQL,
//     pas par une lecture préalable
//   - Mauvais identifiants à la connexion → 400 (InvalidCredentials)
//
// ============================================================================

use actix_web::web;
use sea_orm::*;

use crate::config::Config;
use crate::errors::{ApiError, ValidationError};
use crate::models::dto::{RecipeShort, RegisterRequest, UserProfile, UserWithRecipes};
use crate::models::{recipe, users};
use crate::services::flags_service::FlagsService;
use crate::services::media_store::{AVATAR_IMAGES_DIR, MediaStore, discard_media};
use crate::utils::{jwt, password};

pub struct UserService;

impl UserService {
    pub async fn register(
        db: &DatabaseConnection,
        request: RegisterRequest,
    ) -> Result<users::Model, ApiError> {
        let password_hash = hash_off_thread(request.password.clone()).await?;

        let new_user = users::ActiveModel {
            email: Set(request.email),
            username: Set(request.username),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            password_hash: Set(password_hash),
            avatar: Set(None),
            ..Default::default()
        };

        match new_user.insert(db).await {
            Ok(user) => {
                log::info!("Registered user {} ({})", user.id, user.username);
                Ok(user)
            }
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) => {
                    Err(duplicate_user_error(&detail).into())
                }
                _ => Err(err.into()),
            },
        }
    }

    /// Vérifie email + mot de passe et renvoie un JWT
    pub async fn login(
        db: &DatabaseConnection,
        config: &Config,
        email: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or(ValidationError::InvalidCredentials)?;

        let is_valid = verify_off_thread(password.to_string(), user.password_hash.clone()).await?;
        if !is_valid {
            log::warn!("Failed login attempt for user {}", user.id);
            return Err(ValidationError::InvalidCredentials.into());
        }

        jwt::generate_token(user.id, &user.email, &config.jwt_secret, config.jwt_ttl_hours)
            .map_err(ApiError::Internal)
    }

    pub async fn set_password(
        db: &DatabaseConnection,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let user = Self::get(db, user_id).await?;

        let is_valid =
            verify_off_thread(current_password.to_string(), user.password_hash.clone()).await?;
        if !is_valid {
            return Err(ValidationError::field("current_password", "Current password is incorrect").into());
        }

        let new_hash = hash_off_thread(new_password.to_string()).await?;

        let mut active_model: users::ActiveModel = user.into();
        active_model.password_hash = Set(new_hash);
        active_model.update(db).await?;

        log::info!("Password changed for user {}", user_id);
        Ok(())
    }

    pub async fn get(db: &DatabaseConnection, user_id: i32) -> Result<users::Model, ApiError> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("User"))
    }

    pub async fn profile(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        viewer: Option<i32>,
        user_id: i32,
    ) -> Result<UserProfile, ApiError> {
        let user = Self::get(db, user_id).await?;
        let is_subscribed = FlagsService::is_subscribed(db, viewer, user.id).await?;
        Ok(UserProfile::new(user, is_subscribed, media))
    }

    /// Page de profils, triés par id
    pub async fn list(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        viewer: Option<i32>,
        offset: u64,
        limit: u64,
    ) -> Result<(u64, Vec<UserProfile>), ApiError> {
        let query = users::Entity::find().order_by_asc(users::Column::Id);
        let count = query.clone().count(db).await?;
        let users = query.offset(offset).limit(limit).all(db).await?;

        let profiles = Self::profiles(db, media, viewer, users).await?;
        Ok((count, profiles))
    }

    /// Profils d'un lot d'utilisateurs, is_subscribed calculé en une requête
    pub async fn profiles(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        viewer: Option<i32>,
        users: Vec<users::Model>,
    ) -> Result<Vec<UserProfile>, ApiError> {
        let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
        let subscribed = FlagsService::subscribed_authors(db, viewer, &ids).await?;

        Ok(users
            .into_iter()
            .map(|user| {
                let is_subscribed = subscribed.contains(&user.id);
                UserProfile::new(user, is_subscribed, media)
            })
            .collect())
    }

    /// Profils d'auteurs + aperçu de leurs recettes (plus récentes d'abord)
    pub async fn with_recipes(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        viewer: Option<i32>,
        authors: Vec<users::Model>,
        recipes_limit: Option<u64>,
    ) -> Result<Vec<UserWithRecipes>, ApiError> {
        let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
        let counts = FlagsService::recipe_counts(db, &ids).await?;
        let profiles = Self::profiles(db, media, viewer, authors).await?;

        let mut result = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let mut query = recipe::Entity::find()
                .filter(recipe::Column::AuthorId.eq(profile.id))
                .order_by_desc(recipe::Column::PubDate)
                .order_by_desc(recipe::Column::Id);
            if let Some(limit) = recipes_limit {
                query = query.limit(limit);
            }

            let recipes = query
                .all(db)
                .await?
                .iter()
                .map(|r| RecipeShort::new(r, media))
                .collect();

            result.push(UserWithRecipes {
                recipes_count: counts.get(&profile.id).copied().unwrap_or(0),
                recipes,
                profile,
            });
        }

        Ok(result)
    }

    /// Remplace l'avatar; l'ancien fichier est supprimé après la mise à jour
    pub async fn set_avatar(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        user_id: i32,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, ApiError> {
        let user = Self::get(db, user_id).await?;
        let new_path = media.save(AVATAR_IMAGES_DIR, filename, bytes).await?;

        let old_path = user.avatar.clone();
        let mut active_model: users::ActiveModel = user.into();
        active_model.avatar = Set(Some(new_path.clone()));

        if let Err(e) = active_model.update(db).await {
            discard_media(media, &new_path).await;
            return Err(e.into());
        }

        if let Some(old_path) = old_path {
            discard_media(media, &old_path).await;
        }

        Ok(media.url(&new_path))
    }

    pub async fn delete_avatar(
        db: &DatabaseConnection,
        media: &dyn MediaStore,
        user_id: i32,
    ) -> Result<(), ApiError> {
        let user = Self::get(db, user_id).await?;
        let Some(old_path) = user.avatar.clone() else {
            return Ok(());
        };

        let mut active_model: users::ActiveModel = user.into();
        active_model.avatar = Set(None);
        active_model.update(db).await?;

        discard_media(media, &old_path).await;
        Ok(())
    }
}

// PBKDF2 est coûteux: exécuté hors des workers actix
async fn hash_off_thread(plain: String) -> Result<String, ApiError> {
    web::block(move || password::hash_password(&plain))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::Internal)
}

async fn verify_off_thread(plain: String, stored_hash: String) -> Result<bool, ApiError> {
    web::block(move || password::verify_password(&plain, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::Internal)
}

fn duplicate_user_error(detail: &str) -> ValidationError {
    if detail.contains("email") {
        ValidationError::field("email", "A user with that email already exists")
    } else {
        ValidationError::field("username", "A user with that username already exists")
    }
}
