// Images transmises en ligne: "data:image/<subtype>;base64,<payload>"

use base64::{Engine, engine::general_purpose::STANDARD};
use uuid::Uuid;

use crate::errors::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Nom synthétique: <uuid>.<subtype>
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub fn decode_data_uri(data: &str) -> Result<DecodedImage, ValidationError> {
    let rest = data
        .strip_prefix("data:")
        .ok_or_else(|| invalid("expected a data URI"))?;

    let (header, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| invalid("expected base64 encoded data"))?;

    let subtype = header
        .strip_prefix("image/")
        .ok_or_else(|| invalid("only image MIME types are accepted"))?;
    let extension = extension_for(subtype).ok_or_else(|| invalid("unsupported image type"))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid(&format!("undecodable payload ({})", e)))?;
    if bytes.is_empty() {
        return Err(invalid("empty image"));
    }

    Ok(DecodedImage {
        filename: format!("{}.{}", Uuid::new_v4(), extension),
        bytes,
    })
}

/// Extension de fichier pour un sous-type MIME (ou un nom de fichier uploadé)
pub fn extension_for(subtype: &str) -> Option<String> {
    let subtype = subtype.split(';').next()?.trim().to_ascii_lowercase();
    let subtype = subtype.strip_suffix("+xml").unwrap_or(&subtype);
    if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(subtype.to_string())
}

fn invalid(reason: &str) -> ValidationError {
    ValidationError::InvalidImage(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(b"\x89PNG fake"));
        let image = decode_data_uri(&uri).unwrap();
        assert!(image.filename.ends_with(".png"));
        assert_eq!(image.bytes, b"\x89PNG fake");
    }

    #[test]
    fn test_filename_uses_declared_subtype() {
        let uri = format!("data:image/JPEG;base64,{}", STANDARD.encode(b"jpg"));
        assert!(decode_data_uri(&uri).unwrap().filename.ends_with(".jpeg"));
    }

    #[test]
    fn test_rejects_non_image() {
        let uri = format!("data:text/plain;base64,{}", STANDARD.encode(b"hi"));
        assert!(matches!(decode_data_uri(&uri), Err(ValidationError::InvalidImage(_))));
    }

    #[test]
    fn test_rejects_missing_marker_and_bad_payload() {
        assert!(decode_data_uri("data:image/png,rawdata").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
        assert!(decode_data_uri("http://example.com/a.png").is_err());
    }
}
