// Liens courts: l'id de la recette encodé en hexadécimal, servi sous /s/{code}

pub const SHORT_LINK_PREFIX: &str = "/s/";

/// Code court d'une recette (hex minuscule, sans zéros de tête superflus)
pub fn encode(recipe_id: i32) -> String {
    format!("{:x}", recipe_id)
}

/// Décode un code; None si ce n'est pas un id de recette valide
pub fn decode(code: &str) -> Option<i32> {
    if code.is_empty() || code.len() > 8 {
        return None;
    }
    // padding à un nombre pair de chiffres pour le crate hex
    let padded = if code.len() % 2 == 1 {
        format!("0{}", code)
    } else {
        code.to_string()
    };

    let bytes = hex::decode(padded).ok()?;
    let value = bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
    i32::try_from(value).ok().filter(|id| *id > 0)
}

/// Lien absolu vers le code court
pub fn build(base_url: &str, recipe_id: i32) -> String {
    format!(
        "{}{}{}",
        base_url.trim_end_matches('/'),
        SHORT_LINK_PREFIX,
        encode(recipe_id)
    )
}

/// Chemin canonique du détail d'une recette
pub fn recipe_path(recipe_id: i32) -> String {
    format!("/api/recipes/{}/", recipe_id)
}
