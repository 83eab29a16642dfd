//! Profile editing: username normalization, display name limits, avatars

use base64::Engine as _;

use crate::error::{Error, Result};
use crate::model::Profile;
use crate::store::ProfilePatch;

/// Longest username the form accepts.
pub const MAX_USERNAME_CHARS: usize = 15;
/// Longest display name the form accepts.
pub const MAX_DISPLAY_NAME_CHARS: usize = 50;
/// Avatar uploads above this many bytes are refused.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

const PLACEHOLDER_BASE: &str = "https://ui-avatars.com/api/";
/// Background colour of generated placeholder avatars (`#1da1f2`)
pub const PLACEHOLDER_RGB: (u8, u8, u8) = (0x1d, 0xa1, 0xf2);

/// Strip `@` and whitespace, lower-case, and cap the length.
pub fn normalize_username(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '@' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .take(MAX_USERNAME_CHARS)
        .collect()
}

pub fn username_patch(raw: &str) -> ProfilePatch {
    ProfilePatch {
        username: Some(normalize_username(raw)),
        ..Default::default()
    }
}

pub fn display_name_patch(raw: &str) -> ProfilePatch {
    ProfilePatch {
        display_name: Some(raw.chars().take(MAX_DISPLAY_NAME_CHARS).collect()),
        ..Default::default()
    }
}

pub fn followers_patch(raw: &str) -> ProfilePatch {
    ProfilePatch {
        followers: Some(raw.to_string()),
        ..Default::default()
    }
}

/// Flip the verification badge.
pub fn toggle_verified(profile: &Profile) -> ProfilePatch {
    ProfilePatch {
        verified: Some(!profile.verified),
        ..Default::default()
    }
}

/// Remove a custom avatar so the placeholder is used again.
pub fn clear_avatar() -> ProfilePatch {
    ProfilePatch {
        avatar: Some(String::new()),
        ..Default::default()
    }
}

/// A picked avatar file.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    /// Declared MIME type, e.g. `image/png`
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl AvatarUpload {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Build an upload whose MIME type is sniffed from the file contents.
    #[cfg(feature = "raster")]
    pub fn sniffed(bytes: Vec<u8>) -> Self {
        let mime_type = image::guess_format(&bytes)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());
        Self { mime_type, bytes }
    }

    /// Validate the upload and turn it into an inline `data:` URL patch.
    ///
    /// Oversized or non-image files are refused with a message meant for the
    /// user; the document is not touched in that case.
    pub fn into_patch(self) -> Result<ProfilePatch> {
        if self.bytes.len() > MAX_AVATAR_BYTES {
            return Err(Error::AvatarRejected("File size must be less than 5MB".into()));
        }
        if !self.mime_type.starts_with("image/") {
            return Err(Error::AvatarRejected("Please select an image file".into()));
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        Ok(ProfilePatch {
            avatar: Some(format!("data:{};base64,{}", self.mime_type, encoded)),
            ..Default::default()
        })
    }
}

/// Generated placeholder avatar URL for a display name.
pub fn placeholder_avatar_url(display_name: &str) -> String {
    match url::Url::parse_with_params(
        PLACEHOLDER_BASE,
        &[
            ("name", display_name),
            ("background", "1da1f2"),
            ("color", "fff"),
            ("size", "128"),
        ],
    ) {
        Ok(u) => u.to_string(),
        Err(_) => PLACEHOLDER_BASE.to_string(),
    }
}

/// The avatar to display: the stored one, or the placeholder when empty.
pub fn avatar_source(profile: &Profile) -> String {
    if profile.avatar.is_empty() {
        placeholder_avatar_url(&profile.display_name)
    } else {
        profile.avatar.clone()
    }
}

/// Decode the payload of a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(src: &str) -> Option<(String, Vec<u8>)> {
    let rest = src.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;
    Some((mime.to_string(), bytes))
}
