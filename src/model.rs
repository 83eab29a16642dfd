//! The post document and its sub-sections
//!
//! A [`Post`] is the single document being edited. It is plain data: the
//! rules for changing it live in [`crate::store`] (reducers) and the editors
//! under [`crate::editors`]. Field names serialize in camelCase so a stored
//! record carries the same shape the preview and export layers expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Root document: everything needed to render one fabricated post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub profile: Profile,
    pub content: Content,
    pub engagement: Engagement,
    pub settings: Settings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// A post populated with the stock defaults and a fresh identity.
    pub fn with_defaults(now: DateTime<Utc>) -> Self {
        Self {
            id: new_identity(),
            profile: Profile::default(),
            content: Content::default_at(now),
            engagement: Engagement::default(),
            settings: Settings::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Generate a fresh post identity.
pub fn new_identity() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Author information shown in the post header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Normalized: lowercase, no `@`, no whitespace
    pub username: String,
    pub display_name: String,
    /// Inline `data:` URL or remote URL; empty selects the generated placeholder
    pub avatar: String,
    pub verified: bool,
    /// Free-form display string such as `150.2M`
    pub followers: String,
    /// Always `@` + `username`
    pub handle: String,
}

impl Default for Profile {
    fn default() -> Self {
        let username = "elonmusk".to_string();
        Self {
            handle: handle_for(&username),
            username,
            display_name: "Elon Musk".to_string(),
            avatar: String::new(),
            verified: true,
            followers: "150.2M".to_string(),
        }
    }
}

/// The derived `@handle` for a username.
pub fn handle_for(username: &str) -> String {
    format!("@{}", username)
}

/// How the post timestamp is displayed. Storage is unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    #[default]
    Relative,
    Absolute,
}

impl TimeFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relative" => Some(TimeFormat::Relative),
            "absolute" => Some(TimeFormat::Absolute),
            _ => None,
        }
    }
}

/// Body of the post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub time_format: TimeFormat,
}

impl Content {
    pub fn default_at(now: DateTime<Utc>) -> Self {
        Self {
            text: "Just launched another rocket! 🚀".to_string(),
            timestamp: now,
            time_format: TimeFormat::Relative,
        }
    }
}

/// Engagement counters. Unsigned, so they can never go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub likes: u64,
    pub retweets: u64,
    pub comments: u64,
    pub quotes: u64,
    /// `None` or `Some(0)` hides the views line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
}

impl Engagement {
    /// Views that should actually be displayed.
    pub fn visible_views(&self) -> Option<u64> {
        self.views.filter(|v| *v > 0)
    }
}

impl Default for Engagement {
    fn default() -> Self {
        Self {
            likes: 125_000,
            retweets: 45_000,
            comments: 8_500,
            quotes: 2_100,
            views: Some(1_200_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Encoded image format for exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpg,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpg),
            _ => None,
        }
    }

    /// File extension used for downloads
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpg => "image/jpeg",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Cosmetic and export defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub language: String,
    pub show_metrics: bool,
    pub export_format: ExportFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: "en".to_string(),
            show_metrics: true,
            export_format: ExportFormat::Png,
        }
    }
}

/// Parameters for one export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// 0.0..=1.0, only meaningful for JPEG
    pub quality: f32,
    /// Positive pixel-density multiplier
    pub scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: 0.9,
            scale: 2.0,
        }
    }
}

impl ExportConfig {
    /// Clamp quality into 0..=1 and replace a non-positive or non-finite scale with 1.
    pub fn sanitized(self) -> Self {
        let quality = if self.quality.is_finite() {
            self.quality.clamp(0.0, 1.0)
        } else {
            ExportConfig::default().quality
        };
        let scale = if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        };
        Self {
            format: self.format,
            quality,
            scale,
        }
    }

    /// JPEG quality on the encoder's 1..=100 scale
    pub fn jpeg_quality(&self) -> u8 {
        let q = (self.sanitized().quality * 100.0).round() as i32;
        q.clamp(1, 100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_consistent_handle() {
        let p = Post::with_defaults(Utc::now());
        assert_eq!(p.profile.handle, "@elonmusk");
        assert_eq!(p.engagement.likes, 125_000);
        assert_eq!(p.settings.export_format, ExportFormat::Png);
        assert_eq!(p.created_at, p.updated_at);
    }

    #[test]
    fn fresh_identities_differ() {
        let now = Utc::now();
        assert_ne!(Post::with_defaults(now).id, Post::with_defaults(now).id);
    }

    #[test]
    fn serializes_camel_case_fields() {
        let p = Post::with_defaults(Utc::now());
        let v = serde_json::to_value(&p).unwrap();
        assert!(v["profile"]["displayName"].is_string());
        assert_eq!(v["content"]["timeFormat"], "relative");
        assert_eq!(v["settings"]["exportFormat"], "png");
        assert!(v["createdAt"].is_string());
    }

    #[test]
    fn views_zero_is_hidden() {
        let e = Engagement { views: Some(0), ..Default::default() };
        assert_eq!(e.visible_views(), None);
        let e = Engagement { views: Some(12), ..Default::default() };
        assert_eq!(e.visible_views(), Some(12));
    }

    #[test]
    fn export_config_sanitizes() {
        let c = ExportConfig { format: ExportFormat::Jpg, quality: 3.0, scale: -2.0 }.sanitized();
        assert_eq!(c.quality, 1.0);
        assert_eq!(c.scale, 1.0);
        assert_eq!(ExportConfig { quality: 0.0, ..Default::default() }.jpeg_quality(), 1);
        assert_eq!(ExportConfig::default().jpeg_quality(), 90);
    }

    #[test]
    fn enum_parsing() {
        assert_eq!(ExportFormat::parse("JPEG"), Some(ExportFormat::Jpg));
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(TimeFormat::parse("weekly"), None);
    }
}
