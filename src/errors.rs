// ============================================================================
// ERREURS DE L'API
// ============================================================================
//
// Description:
//   Type d'erreur unique renvoyé par les services et les handlers.
//   Chaque variante correspond à un code HTTP:
//     - Validation      → 400 (entrée invalide, conflits sur les relations)
//     - Unauthenticated → 401
//     - PermissionDenied→ 403
//     - NotFound        → 404
//     - Database/Io/Internal → 500 (message générique, détail dans les logs)
//
// Points d'attention:
//   - "déjà abonné", "pas dans le panier", etc. sont des 400, jamais 404/409
//   - Le corps JSON est toujours {"error": "..."} (+ "field" si pertinent)
//
// ============================================================================

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

/// Erreurs métier (toutes rendues en 400)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("At least one ingredient is required")]
    MissingIngredients,

    #[error("Ingredients must not repeat. Duplicates: {0:?}")]
    DuplicateIngredients(Vec<i32>),

    #[error("{0}")]
    InvalidQuantity(String),

    #[error("Unknown ingredients: {0:?}")]
    UnknownIngredients(Vec<i32>),

    #[error("You cannot subscribe to yourself")]
    SelfSubscription,

    #[error("You are already subscribed to this user")]
    AlreadySubscribed,

    #[error("You are not subscribed to this user")]
    NotSubscribed,

    #[error("Recipe is already in favorites")]
    AlreadyFavorited,

    #[error("Recipe is not in favorites")]
    NotFavorited,

    #[error("Recipe is already in the shopping cart")]
    AlreadyInCart,

    #[error("Recipe is not in the shopping cart")]
    NotInCart,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Unable to log in with provided credentials")]
    InvalidCredentials,

    #[error("{message}")]
    Field { field: String, message: String },
}

impl ValidationError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Champ concerné, pour le corps de la réponse
    pub fn field_name(&self) -> Option<&str> {
        match self {
            ValidationError::MissingIngredients
            | ValidationError::DuplicateIngredients(_)
            | ValidationError::UnknownIngredients(_) => Some("ingredients"),
            ValidationError::InvalidImage(_) => Some("image"),
            ValidationError::Field { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthenticated,

    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // On remonte la première erreur (ordre alphabétique des champs, stable)
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code));
                    (field.to_string(), message)
                })
            })
            .collect();
        fields.sort();

        match fields.into_iter().next() {
            Some((field, message)) => ValidationError::Field { field, message }.into(),
            None => ValidationError::field("non_field_errors", "Invalid input").into(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            ApiError::Validation(err) => match err.field_name() {
                Some(field) => json!({ "error": err.to_string(), "field": field }),
                None => json!({ "error": err.to_string() }),
            },
            ApiError::Database(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                log::error!("{}", self);
                json!({ "error": "Internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        HttpResponse::build(status).json(body)
    }
}
