//! Document store: the single editable post, its reducers and persistence
//!
//! Changes are expressed as [`Action`]s and applied by the pure [`reduce`]
//! function, which returns a new snapshot. [`DocumentStore`] owns the current
//! snapshot, stamps time, and mirrors every change into its
//! [`PostStorage`]. Storage failures are logged and never undo an edit.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::decode::{decode_export_config, decode_post};
use crate::editors::profile::normalize_username;
use crate::error::{Error, Result};
use crate::model::{handle_for, ExportConfig, ExportFormat, Post, Theme, TimeFormat};
use crate::storage::PostStorage;

/// Profile fields to change; `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub verified: Option<bool>,
    pub followers: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentPatch {
    pub text: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub time_format: Option<TimeFormat>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngagementPatch {
    pub likes: Option<u64>,
    pub retweets: Option<u64>,
    pub comments: Option<u64>,
    pub quotes: Option<u64>,
    /// `Some(None)` clears views
    pub views: Option<Option<u64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub language: Option<String>,
    pub show_metrics: Option<bool>,
    pub export_format: Option<ExportFormat>,
}

/// Every way the post can change.
#[derive(Debug, Clone)]
pub enum Action {
    UpdateProfile(ProfilePatch),
    UpdateContent(ContentPatch),
    UpdateEngagement(EngagementPatch),
    UpdateSettings(SettingsPatch),
    /// Replace with defaults under a new identity
    Reset,
    /// Replace with a decoded snapshot
    Load(Box<Post>),
}

/// Next `updatedAt`: `now`, but always strictly after the previous stamp.
///
/// A previous stamp at the very end of the representable range stays where
/// it is.
pub fn next_stamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        return now;
    }
    previous
        .checked_add_signed(Duration::milliseconds(1))
        .unwrap_or(previous)
}

/// Apply `action` to `post`, producing the next snapshot.
pub fn reduce(post: &Post, action: Action, now: DateTime<Utc>) -> Post {
    let mut next = post.clone();
    match action {
        Action::UpdateProfile(patch) => {
            let p = &mut next.profile;
            if let Some(username) = patch.username {
                p.username = normalize_username(&username);
            }
            if let Some(v) = patch.display_name {
                p.display_name = v;
            }
            if let Some(v) = patch.avatar {
                p.avatar = v;
            }
            if let Some(v) = patch.verified {
                p.verified = v;
            }
            if let Some(v) = patch.followers {
                p.followers = v;
            }
            p.handle = handle_for(&p.username);
        }
        Action::UpdateContent(patch) => {
            let c = &mut next.content;
            if let Some(v) = patch.text {
                c.text = v;
            }
            if let Some(v) = patch.timestamp {
                c.timestamp = v;
            }
            if let Some(v) = patch.time_format {
                c.time_format = v;
            }
        }
        Action::UpdateEngagement(patch) => {
            let e = &mut next.engagement;
            if let Some(v) = patch.likes {
                e.likes = v;
            }
            if let Some(v) = patch.retweets {
                e.retweets = v;
            }
            if let Some(v) = patch.comments {
                e.comments = v;
            }
            if let Some(v) = patch.quotes {
                e.quotes = v;
            }
            if let Some(v) = patch.views {
                e.views = v;
            }
        }
        Action::UpdateSettings(patch) => {
            let s = &mut next.settings;
            if let Some(v) = patch.theme {
                s.theme = v;
            }
            if let Some(v) = patch.language {
                s.language = v;
            }
            if let Some(v) = patch.show_metrics {
                s.show_metrics = v;
            }
            if let Some(v) = patch.export_format {
                s.export_format = v;
            }
        }
        Action::Reset => return Post::with_defaults(now),
        Action::Load(snapshot) => return *snapshot,
    }
    next.updated_at = next_stamp(post.updated_at, now);
    next
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord<'a> {
    tweet_data: &'a Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_export_config: Option<&'a ExportConfig>,
}

/// Owner of the current post.
pub struct DocumentStore<S: PostStorage> {
    post: Post,
    last_export_config: Option<ExportConfig>,
    storage: S,
}

impl<S: PostStorage> DocumentStore<S> {
    /// Rehydrate from `storage`, falling back to defaults when the record is
    /// absent or unreadable.
    pub fn open(storage: S) -> Self {
        let now = Utc::now();
        let (post, last_export_config) = match storage.read() {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => decode_record(&value, now),
                Err(e) => {
                    log::warn!("stored post is not valid JSON ({}); starting from defaults", e);
                    (Post::with_defaults(now), None)
                }
            },
            Ok(None) => {
                log::info!("no stored post; starting from defaults");
                (Post::with_defaults(now), None)
            }
            Err(e) => {
                log::warn!("could not read stored post: {}; starting from defaults", e);
                (Post::with_defaults(now), None)
            }
        };
        Self {
            post,
            last_export_config,
            storage,
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn last_export_config(&self) -> Option<ExportConfig> {
        self.last_export_config
    }

    pub fn update_profile(&mut self, patch: ProfilePatch) -> &Post {
        self.dispatch(Action::UpdateProfile(patch))
    }

    pub fn update_content(&mut self, patch: ContentPatch) -> &Post {
        self.dispatch(Action::UpdateContent(patch))
    }

    pub fn update_engagement(&mut self, patch: EngagementPatch) -> &Post {
        self.dispatch(Action::UpdateEngagement(patch))
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> &Post {
        self.dispatch(Action::UpdateSettings(patch))
    }

    /// Replace the post with defaults under a new identity.
    pub fn reset_post(&mut self) -> &Post {
        self.dispatch(Action::Reset)
    }

    /// Replace the post with a snapshot, re-validating every field.
    pub fn load_post(&mut self, snapshot: &Value) -> &Post {
        let decoded = decode_post(snapshot, Utc::now());
        self.dispatch(Action::Load(Box::new(decoded)))
    }

    /// Parse and load a JSON snapshot. Only unparsable JSON is an error;
    /// everything past that falls back field by field.
    pub fn load_post_json(&mut self, raw: &str) -> Result<&Post> {
        let value: Value = serde_json::from_str(raw)?;
        let value = unwrap_envelope(&value).clone();
        Ok(self.load_post(&value))
    }

    /// Remember the export settings alongside the post.
    pub fn set_export_config(&mut self, config: ExportConfig) {
        self.last_export_config = Some(config.sanitized());
        self.persist();
    }

    pub fn dispatch(&mut self, action: Action) -> &Post {
        self.post = reduce(&self.post, action, Utc::now());
        self.persist();
        &self.post
    }

    /// Serialize the record as it is written to storage.
    pub fn to_record_json(&self) -> Result<String> {
        let record = StoredRecord {
            tweet_data: &self.post,
            last_export_config: self.last_export_config.as_ref(),
        };
        serde_json::to_string_pretty(&record).map_err(|e| Error::Storage(e.to_string()))
    }

    /// Write the current record, reporting failure to the caller.
    pub fn flush(&self) -> Result<()> {
        let json = self.to_record_json()?;
        self.storage.write(&json)
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            log::warn!("failed to persist post {}: {}", self.post.id, e);
        }
    }
}

/// Accept both `{tweetData: ...}` and `{state: {tweetData: ...}, version}`
/// records, as well as a bare post.
fn unwrap_envelope(value: &Value) -> &Value {
    let inner = value.get("state").filter(|v| v.is_object()).unwrap_or(value);
    inner.get("tweetData").unwrap_or(inner)
}

fn decode_record(value: &Value, now: DateTime<Utc>) -> (Post, Option<ExportConfig>) {
    let inner = value.get("state").filter(|v| v.is_object()).unwrap_or(value);
    let post = match inner.get("tweetData") {
        Some(post) => decode_post(post, now),
        None => {
            log::warn!("stored record has no tweetData; starting from defaults");
            Post::with_defaults(now)
        }
    };
    (post, decode_export_config(inner.get("lastExportConfig")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::TimeZone;
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn stamp_always_advances() {
        let prev = t0();
        assert_eq!(next_stamp(prev, prev), prev + Duration::milliseconds(1));
        assert_eq!(next_stamp(prev, prev - Duration::hours(1)), prev + Duration::milliseconds(1));
        let later = prev + Duration::seconds(5);
        assert_eq!(next_stamp(prev, later), later);
    }

    #[test]
    fn stamp_at_end_of_range_does_not_overflow() {
        let max = DateTime::<Utc>::MAX_UTC;
        assert_eq!(next_stamp(max, t0()), max);
    }

    #[test]
    fn far_future_stored_stamp_still_allows_edits() {
        let mut store = DocumentStore::open(MemoryStorage::new());
        store
            .load_post_json(r#"{"tweetData":{"id":"x","updatedAt":8210266876799999}}"#)
            .unwrap();
        let loaded = store.post().updated_at;
        assert!(loaded > Utc::now());

        let post = store.update_content(ContentPatch { text: Some("hi".into()), ..Default::default() });
        assert_eq!(post.content.text, "hi");
        assert!(post.updated_at >= loaded);
        assert!(store.storage().contents().unwrap().contains("\"hi\""));
    }

    #[test]
    fn profile_patch_is_shallow_and_rederives_handle() {
        let post = Post::with_defaults(t0());
        let next = reduce(
            &post,
            Action::UpdateProfile(ProfilePatch { username: Some("@New User".into()), ..Default::default() }),
            t0(),
        );
        assert_eq!(next.profile.username, "newuser");
        assert_eq!(next.profile.handle, "@newuser");
        assert_eq!(next.profile.display_name, post.profile.display_name);
        assert_eq!(next.profile.followers, post.profile.followers);
        assert_eq!(next.content, post.content);
        assert_eq!(next.engagement, post.engagement);
        assert!(next.updated_at > post.updated_at);
    }

    #[test]
    fn engagement_patch_leaves_other_counters() {
        let post = Post::with_defaults(t0());
        let next = reduce(
            &post,
            Action::UpdateEngagement(EngagementPatch { likes: Some(7), views: Some(None), ..Default::default() }),
            t0() + Duration::seconds(1),
        );
        assert_eq!(next.engagement.likes, 7);
        assert_eq!(next.engagement.retweets, post.engagement.retweets);
        assert_eq!(next.engagement.views, None);
    }

    #[test]
    fn reset_issues_new_identity() {
        let post = Post::with_defaults(t0());
        let next = reduce(&post, Action::Reset, t0());
        assert_ne!(next.id, post.id);
    }

    #[test]
    fn open_with_empty_storage_uses_defaults() {
        let store = DocumentStore::open(MemoryStorage::new());
        assert_eq!(store.post().profile.username, "elonmusk");
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn open_with_malformed_record_uses_defaults() {
        let store = DocumentStore::open(MemoryStorage::with_record("{not json"));
        assert_eq!(store.post().profile.handle, "@elonmusk");
    }

    #[test]
    fn every_mutation_is_persisted() {
        let mut store = DocumentStore::open(MemoryStorage::new());
        store.update_content(ContentPatch { text: Some("hello".into()), ..Default::default() });
        store.update_settings(SettingsPatch { theme: Some(Theme::Dark), ..Default::default() });
        assert_eq!(store.storage().write_count(), 2);
        let saved: Value = serde_json::from_str(&store.storage().contents().unwrap()).unwrap();
        assert_eq!(saved["tweetData"]["content"]["text"], "hello");
        assert_eq!(saved["tweetData"]["settings"]["theme"], "dark");
    }

    #[test]
    fn rehydrates_envelope_written_by_older_sessions() {
        let raw = json!({
            "state": { "tweetData": {
                "id": "abc",
                "profile": { "username": "jack", "displayName": "Jack" },
                "content": { "text": "just setting up", "timestamp": "2006-03-21T20:50:00.000Z" },
                "createdAt": "2006-03-21T20:50:00.000Z",
                "updatedAt": "garbage"
            }},
            "version": 0
        })
        .to_string();
        let store = DocumentStore::open(MemoryStorage::with_record(raw));
        let post = store.post();
        assert_eq!(post.id, "abc");
        assert_eq!(post.profile.handle, "@jack");
        assert_eq!(post.content.timestamp, Utc.with_ymd_and_hms(2006, 3, 21, 20, 50, 0).unwrap());
        assert!(post.updated_at > post.created_at);
    }

    #[test]
    fn load_json_rejects_only_unparsable_text() {
        let mut store = DocumentStore::open(MemoryStorage::new());
        assert!(store.load_post_json("nope").is_err());
        let post = store.load_post_json(r#"{"tweetData": {"id": "x", "content": {"timestamp": 5}}}"#).unwrap();
        assert_eq!(post.id, "x");
        assert_eq!(post.content.timestamp.timestamp_millis(), 5);
    }
}
