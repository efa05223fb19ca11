//! Inline image helpers.
//!
//! Images travel to the school backend as base64 data URLs
//! (`data:image/png;base64,....`).

use base64::{engine::general_purpose::STANDARD, Engine};

/// Encodes raw bytes as a data URL with the given MIME type.
pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Returns true when the MIME type names an image.
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

/// Size in bytes an inline payload adds to a request body.
pub fn inline_payload_len(data_url: &str) -> usize {
    data_url.len()
}

/// The MIME type declared by a data URL.
pub fn data_url_mime(data_url: &str) -> Option<&str> {
    let meta = data_url.strip_prefix("data:")?.split_once(',')?.0;
    let mime = meta.split(';').next()?.trim();
    (!mime.is_empty()).then_some(mime)
}

/// Decodes the payload of a base64 data URL.
///
/// Returns `None` when the value is not a base64 data URL.
pub fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    let rest = data_url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload).ok()
}
