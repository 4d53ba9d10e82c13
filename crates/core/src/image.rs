//! Background image validation.
//!
//! Event backgrounds are stored inline as `data:image/...;base64,` URLs (what
//! the browser produces when a user picks a file) or as absolute `http(s)`
//! URLs to an image hosted elsewhere.
//!
//! Stored values end up inside a CSS `url('...')`, so a validated value never
//! contains quotes, parentheses, backslashes or whitespace.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

/// Maximum length of a remote image URL.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors from background image validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Neither a data URL nor an `http(s)` URL.
    #[error("image must be a data URL or an http(s) URL")]
    UnsupportedScheme,
    /// The data URL is not `data:<mime>;base64,<payload>`.
    #[error("image data URL is malformed")]
    Malformed,
    /// The MIME type is not `image/<subtype>`.
    #[error("file must be an image (got {0})")]
    NotAnImage(String),
    /// The remote URL does not parse or has no host.
    #[error("image URL is not a valid http(s) URL")]
    InvalidUrl,
    /// The decoded payload exceeds the size limit.
    #[error("image is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge {
        /// Decoded size in bytes.
        size: usize,
        /// Limit in bytes.
        limit: usize,
    },
    /// The remote URL is too long.
    #[error("image URL must be at most {MAX_URL_LENGTH} characters")]
    UrlTooLong,
}

/// A validated background image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundImage {
    /// Inline image with its MIME type and decoded size.
    Inline { mime: String, size: usize },
    /// Remote image URL, normalized.
    Remote { url: String },
}

impl BackgroundImage {
    /// The value to store for this image: the original data URL, or the
    /// normalized remote URL.
    #[must_use]
    pub fn into_stored(self, original: &str) -> String {
        match self {
            Self::Inline { .. } => original.to_owned(),
            Self::Remote { url } => url,
        }
    }
}

/// Whether a stored value can sit inside a CSS `url('...')` unchanged.
#[must_use]
pub fn is_css_safe(value: &str) -> bool {
    !value.contains(['\'', '"', '(', ')', '\\', '<', '>']) && !value.contains(char::is_whitespace)
}

fn is_image_mime(mime: &str) -> bool {
    mime.strip_prefix("image/").is_some_and(|subtype| {
        !subtype.is_empty()
            && subtype
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'-'))
    })
}

/// Parse and normalize a remote image URL.
fn normalize_remote(value: &str) -> Result<String, ImageError> {
    let url = Url::parse(value).map_err(|_| ImageError::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ImageError::UnsupportedScheme);
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ImageError::InvalidUrl);
    }

    // The serializer already escapes quotes and whitespace; these remain
    let mut normalized = String::with_capacity(url.as_str().len());
    for c in url.as_str().chars() {
        match c {
            '\'' => normalized.push_str("%27"),
            '(' => normalized.push_str("%28"),
            ')' => normalized.push_str("%29"),
            '"' => normalized.push_str("%22"),
            '\\' => normalized.push_str("%5C"),
            c if c.is_whitespace() => return Err(ImageError::InvalidUrl),
            c => normalized.push(c),
        }
    }
    if normalized.len() > MAX_URL_LENGTH {
        return Err(ImageError::UrlTooLong);
    }
    Ok(normalized)
}

/// Validate a background image value against a decoded-size limit.
///
/// # Errors
///
/// Returns an [`ImageError`] describing the first violated rule.
pub fn validate_background_image(value: &str, max_bytes: usize) -> Result<BackgroundImage, ImageError> {
    if let Some(rest) = value.strip_prefix("data:") {
        let (header, payload) = rest.split_once(',').ok_or(ImageError::Malformed)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(ImageError::Malformed)?
            .to_ascii_lowercase();
        if !is_image_mime(&mime) {
            return Err(ImageError::NotAnImage(mime));
        }

        // Cheap upper bound first so oversized payloads are never decoded
        let estimated = payload.len() / 4 * 3;
        if estimated > max_bytes + 3 {
            return Err(ImageError::TooLarge {
                size: estimated,
                limit: max_bytes,
            });
        }

        let size = STANDARD
            .decode(payload)
            .map_err(|_| ImageError::Malformed)?
            .len();
        if size > max_bytes {
            return Err(ImageError::TooLarge {
                size,
                limit: max_bytes,
            });
        }
        return Ok(BackgroundImage::Inline { mime, size });
    }

    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        if value.len() > MAX_URL_LENGTH {
            return Err(ImageError::UrlTooLong);
        }
        return normalize_remote(value).map(|url| BackgroundImage::Remote { url });
    }

    Err(ImageError::UnsupportedScheme)
}
