//! Image decoding, PNG encoding and data-URL helpers.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, RgbaImage};

use crate::error::{Error, Result};

/// Prefix of every preview URL produced by this crate.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Decode image bytes into an RGBA buffer.
///
/// Sources without an alpha channel come out fully opaque.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for empty input or a zero-dimension image,
/// and [`Error::Decode`] if the bytes are not a supported image format.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    if bytes.is_empty() {
        return Err(Error::InvalidInput("image data is empty".to_string()));
    }

    let img = image::load_from_memory(bytes).map_err(Error::Decode)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(Error::InvalidInput(format!(
            "image has zero dimension ({}x{})",
            img.width(),
            img.height()
        )));
    }

    log::trace!("decoded {}x{} {:?} image", img.width(), img.height(), img.color());
    Ok(img.to_rgba8())
}

/// Encode an RGBA buffer as PNG.
///
/// # Errors
///
/// Returns [`Error::Encode`] if the PNG encoder fails.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(Error::Encode)?;
    Ok(buf)
}

/// Wrap PNG bytes in a `data:image/png;base64,` URL.
#[must_use]
pub fn to_data_url(png_bytes: &[u8]) -> String {
    let encoded = general_purpose::STANDARD.encode(png_bytes);
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + encoded.len());
    url.push_str(PNG_DATA_URL_PREFIX);
    url.push_str(&encoded);
    url
}

/// Extract the bytes from a `data:image/*;base64,` URL.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the URL is not a base64 image data URL
/// or the payload is not valid base64.
pub fn parse_data_url(url: &str) -> Result<Vec<u8>> {
    if !url.starts_with("data:image/") {
        return Err(Error::InvalidInput(
            "data URL must start with data:image/".to_string(),
        ));
    }

    let start = url
        .find(";base64,")
        .ok_or_else(|| Error::InvalidInput("data URL is missing ;base64,".to_string()))?;

    general_purpose::STANDARD
        .decode(&url[start + ";base64,".len()..])
        .map_err(|e| Error::InvalidInput(format!("invalid base64 payload: {e}")))
}

/// Whether a declared MIME type names an image (`image/*`).
///
/// Case-insensitive; parameters such as `; charset=` are ignored.
#[must_use]
pub fn is_image_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("image/"))
        && essence.len() > 6
}
