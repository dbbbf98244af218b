// Configuration de l'application, lue depuis l'environnement (.env chargé par dotenv)

use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub media_root: String,
    pub media_url: String,
    pub ingredients_path: String,
    pub default_page_size: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in .env file".to_string())?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not found in .env, using default (INSECURE)");
            "default-insecure-key-change-this".to_string()
        });

        Ok(Self {
            database_url,
            host: try_load("HOST", "127.0.0.1"),
            port: try_load("PORT", "8080"),
            jwt_secret,
            jwt_ttl_hours: try_load("JWT_TTL_HOURS", "24"),
            media_root: try_load("MEDIA_ROOT", "media"),
            media_url: normalize_media_url(try_load("MEDIA_URL", "/media/")),
            ingredients_path: try_load("INGREDIENTS_PATH", "data/ingredients.json"),
            default_page_size: try_load("DEFAULT_PAGE_SIZE", "6"),
        })
    }
}

/// Lit une variable typée; une valeur absente ou invalide retombe sur le défaut
fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!("Invalid {key} value ({e}), using default: {default}");
            default
                .parse()
                .unwrap_or_else(|_| unreachable!("default for {key} must parse"))
        }
    }
}

// MEDIA_URL sert de préfixe: toujours "/.../"
fn normalize_media_url(url: String) -> String {
    let trimmed = url.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
