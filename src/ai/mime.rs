use crate::models::PromptImage;
use crate::{Error, Result};
use base64::Engine as _;

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/jpeg",
                &bytes[..bytes.len().min(4)]
            );
            "image/jpeg"
        }
    }
}

/// Turn a browser-supplied image (bare base64 or a `data:` URL) into a prompt
/// image. Returns `None` for a blank payload.
pub fn parse_base64_image(raw: &str) -> Result<Option<PromptImage>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let (declared_mime, encoded) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| Error::InvalidImage("data URL has no payload".to_string()))?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| Error::InvalidImage("data URL is not base64".to_string()))?;
            (Some(mime).filter(|m| m.starts_with("image/")), data)
        }
        None => (None, raw),
    };

    // Line-wrapped base64 is common from some encoders.
    let data: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&data)
        .map_err(|e| Error::InvalidImage(e.to_string()))?;
    if bytes.is_empty() {
        return Ok(None);
    }

    let mime_type = match declared_mime {
        Some(mime) => mime.to_string(),
        None => detect_image_mime(&bytes).to_string(),
    };

    Ok(Some(PromptImage { mime_type, data }))
}
