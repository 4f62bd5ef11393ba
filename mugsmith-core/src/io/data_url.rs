//! `data:` URLs, the form images travel in between the editor, the viewer and design files.
//! Only the base64 flavor is supported.

use base64::Engine;

pub const PNG_PREFIX: &str = "data:image/png;base64,";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("not a data URL")]
    NotDataUrl,
    #[error("only base64 data URLs are supported")]
    NotBase64,
    #[error("invalid base64: {0}")]
    Base64(base64::DecodeError),
}

#[derive(Debug, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// Media type without parameters, `text/plain` when absent.
    pub mime: &'a str,
    pub data: Vec<u8>,
}

#[must_use]
pub fn is_data_url(text: &str) -> bool {
    text.trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

pub fn decode(url: &str) -> Result<DataUrl<'_>, DataUrlError> {
    let url = url.trim();
    if !is_data_url(url) {
        return Err(DataUrlError::NotDataUrl);
    }
    let (header, payload) = url[5..]
        .split_once(',')
        .ok_or(DataUrlError::NotDataUrl)?;
    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim();
    if !params.any(|param| param.trim().eq_ignore_ascii_case("base64")) {
        return Err(DataUrlError::NotBase64);
    }
    let data = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(DataUrlError::Base64)?;
    Ok(DataUrl {
        mime: if mime.is_empty() { "text/plain" } else { mime },
        data,
    })
}

#[must_use]
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    let mut url = format!("data:{mime};base64,");
    base64::engine::general_purpose::STANDARD.encode_string(bytes, &mut url);
    url
}

/// PNG-encode a bitmap straight into a data URL.
pub fn encode_png(image: &image::RgbaImage) -> Result<String, crate::render::RenderError> {
    let bytes = crate::render::encode_png(image)?;
    Ok(encode("image/png", &bytes))
}
