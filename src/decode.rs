//! Validating decode of stored or imported posts
//!
//! Stored records come from disk or from a user-supplied file, so nothing
//! about their shape can be trusted. Every field is read on its own and a
//! missing or wrongly typed value is replaced by that field's default; the
//! result is always a fully formed [`Post`].
//!
//! Instants accept RFC 3339 strings, naive `YYYY-MM-DDTHH:MM[:SS[.fff]]`
//! strings (read as UTC), bare `YYYY-MM-DD` dates and epoch milliseconds.
//! Anything else becomes `now`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::editors::engagement::parse_count;
use crate::editors::profile::normalize_username;
use crate::model::{
    handle_for, new_identity, Content, Engagement, ExportConfig, ExportFormat, Post, Profile,
    Settings, Theme, TimeFormat,
};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Coerce an arbitrary JSON value into a valid instant, falling back to `now`.
pub fn decode_instant(value: Option<&Value>, now: DateTime<Utc>) -> DateTime<Utc> {
    value.and_then(parse_instant).unwrap_or(now)
}

/// Parse a JSON value into an instant, or `None` when it is not one.
pub fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_instant_str(s),
        Value::Number(n) => {
            if let Some(ms) = n.as_i64() {
                DateTime::from_timestamp_millis(ms)
            } else {
                let ms = n.as_f64()?;
                if !ms.is_finite() || ms.abs() > i64::MAX as f64 {
                    return None;
                }
                DateTime::from_timestamp_millis(ms.trunc() as i64)
            }
        }
        _ => None,
    }
}

/// Parse a textual instant.
pub fn parse_instant_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Decode a whole post. Never fails: a non-object yields a default post.
pub fn decode_post(value: &Value, now: DateTime<Utc>) -> Post {
    let Some(root) = value.as_object() else {
        log::debug!("stored post is not an object; using defaults");
        return Post::with_defaults(now);
    };

    let id = match root.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => new_identity(),
    };

    Post {
        id,
        profile: decode_profile(root.get("profile")),
        content: decode_content(root.get("content"), now),
        engagement: decode_engagement(root.get("engagement")),
        settings: decode_settings(root.get("settings")),
        created_at: decode_instant(root.get("createdAt"), now),
        updated_at: decode_instant(root.get("updatedAt"), now),
    }
}

fn object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}

fn string_or(map: Option<&Map<String, Value>>, key: &str, default: String) -> String {
    match map.and_then(|m| m.get(key)) {
        Some(Value::String(s)) => s.clone(),
        _ => default,
    }
}

fn bool_or(map: Option<&Map<String, Value>>, key: &str, default: bool) -> bool {
    map.and_then(|m| m.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(default)
}

fn decode_profile(value: Option<&Value>) -> Profile {
    let map = object(value);
    let defaults = Profile::default();
    let username = normalize_username(&string_or(map, "username", defaults.username));
    Profile {
        handle: handle_for(&username),
        username,
        display_name: string_or(map, "displayName", defaults.display_name),
        avatar: string_or(map, "avatar", defaults.avatar),
        verified: bool_or(map, "verified", defaults.verified),
        followers: string_or(map, "followers", defaults.followers),
    }
}

fn decode_content(value: Option<&Value>, now: DateTime<Utc>) -> Content {
    let map = object(value);
    let defaults = Content::default_at(now);
    let time_format = map
        .and_then(|m| m.get("timeFormat"))
        .and_then(Value::as_str)
        .and_then(TimeFormat::parse)
        .unwrap_or(defaults.time_format);
    Content {
        text: string_or(map, "text", defaults.text),
        timestamp: decode_instant(map.and_then(|m| m.get("timestamp")), now),
        time_format,
    }
}

/// Read a counter: numbers are floored and clamped at zero, strings go
/// through the display-count parser.
fn decode_count(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(u)
            } else if n.as_i64().is_some() {
                Some(0)
            } else {
                let f = n.as_f64()?;
                if !f.is_finite() || f <= 0.0 {
                    Some(0)
                } else {
                    Some(f.floor().min(u64::MAX as f64) as u64)
                }
            }
        }
        Value::String(s) => Some(parse_count(s)),
        _ => None,
    }
}

fn decode_engagement(value: Option<&Value>) -> Engagement {
    let map = object(value);
    let defaults = Engagement::default();
    let field = |key: &str, default: u64| decode_count(map.and_then(|m| m.get(key))).unwrap_or(default);
    let views = match map.and_then(|m| m.get("views")) {
        None | Some(Value::Null) => None,
        other => decode_count(other),
    };
    Engagement {
        likes: field("likes", defaults.likes),
        retweets: field("retweets", defaults.retweets),
        comments: field("comments", defaults.comments),
        quotes: field("quotes", defaults.quotes),
        views,
    }
}

fn decode_settings(value: Option<&Value>) -> Settings {
    let map = object(value);
    let defaults = Settings::default();
    let theme = map
        .and_then(|m| m.get("theme"))
        .and_then(Value::as_str)
        .and_then(Theme::parse)
        .unwrap_or(defaults.theme);
    let export_format = map
        .and_then(|m| m.get("exportFormat"))
        .and_then(Value::as_str)
        .and_then(ExportFormat::parse)
        .unwrap_or(defaults.export_format);
    Settings {
        theme,
        language: string_or(map, "language", defaults.language),
        show_metrics: bool_or(map, "showMetrics", defaults.show_metrics),
        export_format,
    }
}

/// Decode a stored export configuration; `None` when absent or unusable.
pub fn decode_export_config(value: Option<&Value>) -> Option<ExportConfig> {
    let map = object(value)?;
    let defaults = ExportConfig::default();
    let format = map
        .get("format")
        .and_then(Value::as_str)
        .and_then(ExportFormat::parse)
        .unwrap_or(defaults.format);
    let number = |key: &str, default: f32| {
        map.get(key)
            .and_then(Value::as_f64)
            .map(|f| f as f32)
            .unwrap_or(default)
    };
    Some(
        ExportConfig {
            format,
            quality: number("quality", defaults.quality),
            scale: number("scale", defaults.scale),
        }
        .sanitized(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn instants_from_strings_and_millis() {
        let now = fixed_now();
        let rfc = decode_instant(Some(&json!("2023-12-15T14:30:00.000Z")), now);
        assert_eq!(rfc, Utc.with_ymd_and_hms(2023, 12, 15, 14, 30, 0).unwrap());

        let naive = decode_instant(Some(&json!("2023-12-15T14:30")), now);
        assert_eq!(naive, Utc.with_ymd_and_hms(2023, 12, 15, 14, 30, 0).unwrap());

        let date_only = decode_instant(Some(&json!("2023-12-15")), now);
        assert_eq!(date_only, Utc.with_ymd_and_hms(2023, 12, 15, 0, 0, 0).unwrap());

        let millis = decode_instant(Some(&json!(1_700_000_000_000i64)), now);
        assert_eq!(millis.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn garbage_instants_fall_back_to_now() {
        let now = fixed_now();
        assert_eq!(decode_instant(None, now), now);
        assert_eq!(decode_instant(Some(&json!("not a date")), now), now);
        assert_eq!(decode_instant(Some(&json!({"nested": true})), now), now);
        assert_eq!(decode_instant(Some(&json!(f64::MAX)), now), now);
        assert_eq!(decode_instant(Some(&Value::Null), now), now);
    }

    #[test]
    fn non_object_root_yields_defaults() {
        let post = decode_post(&json!([1, 2, 3]), fixed_now());
        assert_eq!(post.profile.username, "elonmusk");
        assert_eq!(post.created_at, fixed_now());
    }

    #[test]
    fn partial_record_is_completed_field_by_field() {
        let value = json!({
            "id": 42,
            "profile": { "username": " @Jack ", "verified": "yes" },
            "content": { "text": "hi", "timestamp": "garbage", "timeFormat": "sometimes" },
            "engagement": { "likes": -5, "retweets": 12.9, "comments": "1.5K", "quotes": null, "views": null },
            "settings": { "theme": "dark", "exportFormat": "gif" }
        });
        let post = decode_post(&value, fixed_now());
        assert_eq!(post.id, "42");
        assert_eq!(post.profile.username, "jack");
        assert_eq!(post.profile.handle, "@jack");
        assert!(post.profile.verified, "wrong-typed bool keeps the default");
        assert_eq!(post.profile.display_name, "Elon Musk");
        assert_eq!(post.content.text, "hi");
        assert_eq!(post.content.timestamp, fixed_now());
        assert_eq!(post.content.time_format, TimeFormat::Relative);
        assert_eq!(post.engagement.likes, 0);
        assert_eq!(post.engagement.retweets, 12);
        assert_eq!(post.engagement.comments, 1_500);
        assert_eq!(post.engagement.quotes, Engagement::default().quotes);
        assert_eq!(post.engagement.views, None);
        assert_eq!(post.settings.theme, Theme::Dark);
        assert_eq!(post.settings.export_format, ExportFormat::Png);
    }

    #[test]
    fn export_config_decodes_and_sanitizes() {
        let cfg = decode_export_config(Some(&json!({"format": "jpg", "quality": 7, "scale": 3}))).unwrap();
        assert_eq!(cfg.format, ExportFormat::Jpg);
        assert_eq!(cfg.quality, 1.0);
        assert_eq!(cfg.scale, 3.0);
        assert!(decode_export_config(Some(&json!("png"))).is_none());
        assert!(decode_export_config(None).is_none());
    }
}
