use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::{Ready, ready};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::ApiError;
use crate::utils::jwt;

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées;
/// `Option<AuthUser>` pour les routes ouvertes aux anonymes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
}

/// Identité du lecteur: None pour un visiteur anonyme
pub type Viewer = Option<AuthUser>;

pub fn viewer_id(viewer: &Viewer) -> Option<i32> {
    viewer.as_ref().map(|user| user.user_id)
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    // 1. Extraire le header Authorization
    let auth_str = req
        .headers()
        .get("Authorization")
        .ok_or(ApiError::Unauthenticated)?
        .to_str()
        .map_err(|_| ApiError::Unauthenticated)?;

    // 2. Extraire le token ("Token <jwt>" ou "Bearer <jwt>")
    let token = auth_str
        .strip_prefix("Token ")
        .or_else(|| auth_str.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthenticated)?;

    // 3. Vérifier le token JWT avec le secret de la config
    let config = req
        .app_data::<web::Data<Config>>()
        .ok_or_else(|| ApiError::Internal("Config is not registered".to_string()))?;

    let claims = jwt::verify_token(token, &config.jwt_secret).map_err(|e| {
        log::debug!("Rejected token: {}", e);
        ApiError::Unauthenticated
    })?;

    Ok(AuthUser {
        user_id: claims.sub,
        email: claims.email,
    })
}
