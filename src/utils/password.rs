use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "pbkdf2_sha256";
const ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;

/// Hash un mot de passe: pbkdf2_sha256$iterations$salt$hash (base64)
pub fn hash_password(password: &str) -> Result<String, String> {
    hash_with_iterations(password, ITERATIONS)
}

pub(crate) fn hash_with_iterations(password: &str, iterations: u32) -> Result<String, String> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill(&mut salt);

    let key = derive(password, &salt, iterations, KEY_LENGTH)?;

    Ok(format!(
        "{}${}${}${}",
        ALGORITHM,
        iterations,
        STANDARD.encode(salt),
        STANDARD.encode(key)
    ))
}

/// Vérifie un mot de passe contre un hash stocké
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    let [algorithm, iterations, salt, hash] = parts.as_slice() else {
        return Err("Invalid hash format".to_string());
    };

    if *algorithm != ALGORITHM {
        return Err(format!("Unsupported algorithm: {}", algorithm));
    }

    let iterations = iterations
        .parse::<u32>()
        .map_err(|_| "Invalid iterations".to_string())?;
    let salt = STANDARD
        .decode(salt)
        .map_err(|e| format!("Invalid salt: {}", e))?;
    let expected = STANDARD
        .decode(hash)
        .map_err(|e| format!("Invalid hash: {}", e))?;

    let computed = derive(password, &salt, iterations, expected.len())?;

    Ok(constant_time_eq(&computed, &expected))
}

fn derive(password: &str, salt: &[u8], iterations: u32, len: usize) -> Result<Vec<u8>, String> {
    let mut key = vec![0u8; len];
    pbkdf2::<HmacSha256>(password.as_bytes(), salt, iterations, &mut key)
        .map_err(|e| format!("PBKDF2 failed: {}", e))?;
    Ok(key)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
