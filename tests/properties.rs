//! Behavioural properties of editing, parsing and loading

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use fauxpost::editors::{format_count, parse_count, TextGate};
use fauxpost::storage::MemoryStorage;
use fauxpost::store::{reduce, Action};
use fauxpost::{ContentPatch, DocumentStore, EngagementPatch, Post, ProfilePatch, SettingsPatch, Studio, StudioConfig};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

#[test]
fn partial_updates_leave_other_fields_alone() {
    let start = Post::with_defaults(t0());
    let actions = vec![
        Action::UpdateProfile(ProfilePatch { followers: Some("1M".into()), ..Default::default() }),
        Action::UpdateContent(ContentPatch { text: Some("new".into()), ..Default::default() }),
        Action::UpdateEngagement(EngagementPatch { quotes: Some(7), ..Default::default() }),
        Action::UpdateSettings(SettingsPatch { language: Some("fr".into()), ..Default::default() }),
    ];

    let mut post = start.clone();
    for action in actions {
        // Same clock reading every time: stamps still have to move forward
        let next = reduce(&post, action, t0());
        assert!(next.updated_at > post.updated_at);
        assert_eq!(next.id, post.id);
        assert_eq!(next.created_at, post.created_at);
        post = next;
    }

    assert_eq!(post.profile.followers, "1M");
    assert_eq!(post.profile.display_name, start.profile.display_name);
    assert_eq!(post.content.text, "new");
    assert_eq!(post.content.timestamp, start.content.timestamp);
    assert_eq!(post.engagement.quotes, 7);
    assert_eq!(post.engagement.likes, start.engagement.likes);
    assert_eq!(post.engagement.views, start.engagement.views);
    assert_eq!(post.settings.language, "fr");
    assert_eq!(post.settings.theme, start.settings.theme);
}

#[test]
fn handle_tracks_username() {
    let mut store = DocumentStore::open(MemoryStorage::new());
    for raw in ["@Alice", "  bob smith ", "carol@@", "averyveryverylongusername"] {
        store.update_profile(ProfilePatch { username: Some(raw.into()), ..Default::default() });
        let p = &store.post().profile;
        assert_eq!(p.handle, format!("@{}", p.username));
        assert!(!p.username.contains('@'));
        assert!(p.username.chars().count() <= 15);
    }
    assert_eq!(store.post().profile.username, "averyveryverylo");
}

#[test]
fn count_parse_and_format() {
    assert_eq!(parse_count("15.3K"), 15_300);
    assert_eq!(parse_count("2M"), 2_000_000);
    assert_eq!(parse_count("abc"), 0);
    assert_eq!(format_count(999), "999");
    assert_eq!(format_count(1_500), "1.5K");
    assert_eq!(format_count(2_000_000), "2M");
}

#[test]
fn counters_never_negative() {
    let mut store = DocumentStore::open(MemoryStorage::new());
    for raw in ["-5", "-1.5K", "--", "-", "-0", "   ", "1e400", "-1e400"] {
        let value = parse_count(raw);
        store.update_engagement(EngagementPatch { likes: Some(value), ..Default::default() });
        if raw.starts_with('-') {
            assert_eq!(value, 0, "input {:?}", raw);
        }
    }
    assert_eq!(parse_count("1e400"), u64::MAX);
}

#[test]
fn soft_limit_gate() {
    let mut studio = Studio::open(StudioConfig::default(), MemoryStorage::new()).unwrap();
    let limit = TextGate::default().limit();

    let at_cap = "x".repeat(limit + 10);
    assert!(studio.edit_text(&at_cap));
    assert_eq!(studio.post().content.text, at_cap);
    assert!(studio.text_status().over_limit);
    assert!(!studio.text_status().can_submit);

    let past_cap = "y".repeat(limit + 11);
    assert!(!studio.edit_text(&past_cap));
    assert_eq!(studio.post().content.text, at_cap);
}

#[test]
fn string_timestamp_is_restored() {
    let mut store = DocumentStore::open(MemoryStorage::new());
    let post = store.load_post(&json!({ "content": { "text": "x", "timestamp": "2023-12-15T14:30:00.000Z" } }));
    assert_eq!(post.content.timestamp, Utc.with_ymd_and_hms(2023, 12, 15, 14, 30, 0).unwrap());
}

#[test]
fn garbage_timestamp_falls_back_to_now() {
    let before = Utc::now() - Duration::seconds(1);
    let mut store = DocumentStore::open(MemoryStorage::new());
    for ts in [json!("not a date"), json!(null), json!({}), json!([1, 2])] {
        let post = store.load_post(&json!({ "content": { "timestamp": ts } }));
        assert!(post.content.timestamp >= before);
        assert!(post.content.timestamp <= Utc::now() + Duration::seconds(1));
    }
    let post = store.load_post(&json!({ "content": {} }));
    assert!(post.content.timestamp >= before);
}

#[test]
fn reset_gives_fresh_identity() {
    let mut store = DocumentStore::open(MemoryStorage::new());
    store.update_content(ContentPatch { text: Some("edited".into()), ..Default::default() });
    let old = store.post().id.clone();
    let post = store.reset_post();
    assert_ne!(post.id, old);
    assert_eq!(post.content.text, Post::with_defaults(Utc::now()).content.text);
}
