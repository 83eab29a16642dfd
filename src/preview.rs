//! Preview projection: what the rendered post shows, derived from a [`Post`]
//!
//! [`project`] is a pure function. It decides which pieces appear (badge,
//! counters, views line) and how they read; geometry is left to
//! [`crate::rendering::layout`].

use chrono::{DateTime, Utc};

use crate::editors::engagement::format_count;
use crate::editors::profile::avatar_source;
use crate::editors::timestamp;
use crate::model::{Post, Theme};

/// The five controls under a post, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Reply,
    Repost,
    Like,
    Share,
    More,
}

impl ActionKind {
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Reply => "reply",
            ActionKind::Repost => "repost",
            ActionKind::Like => "like",
            ActionKind::Share => "share",
            ActionKind::More => "more",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSlot {
    pub kind: ActionKind,
    /// Formatted counter; `None` when there is nothing to show
    pub label: Option<String>,
}

/// Everything the preview displays, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewModel {
    pub avatar_src: String,
    pub avatar_is_placeholder: bool,
    pub display_name: String,
    pub verified: bool,
    pub handle: String,
    pub timestamp: String,
    pub text: String,
    pub actions: Vec<ActionSlot>,
    /// `"1.2M views"` when views are set and non-zero
    pub views_line: Option<String>,
    pub theme: Theme,
}

fn counter(value: u64, show: bool) -> Option<String> {
    (show && value > 0).then(|| format_count(value))
}

/// Project `post` into its preview, with relative times measured from `now`.
pub fn project(post: &Post, now: DateTime<Utc>) -> PreviewModel {
    let profile = &post.profile;
    let e = &post.engagement;
    let show = post.settings.show_metrics;

    let actions = vec![
        ActionSlot { kind: ActionKind::Reply, label: counter(e.comments, show) },
        ActionSlot { kind: ActionKind::Repost, label: counter(e.retweets, show) },
        ActionSlot { kind: ActionKind::Like, label: counter(e.likes, show) },
        ActionSlot { kind: ActionKind::Share, label: None },
        ActionSlot { kind: ActionKind::More, label: None },
    ];

    PreviewModel {
        avatar_src: avatar_source(profile),
        avatar_is_placeholder: profile.avatar.is_empty(),
        display_name: profile.display_name.clone(),
        verified: profile.verified,
        handle: profile.handle.clone(),
        timestamp: timestamp::display(&post.content, now),
        text: post.content.text.clone(),
        actions,
        views_line: e
            .visible_views()
            .filter(|_| show)
            .map(|v| format!("{} views", format_count(v))),
        theme: post.settings.theme,
    }
}

impl PreviewModel {
    /// The header line as text: name, badge, handle and time.
    pub fn header(&self) -> String {
        let badge = if self.verified { " ✓" } else { "" };
        format!("{}{} {} · {}", self.display_name, badge, self.handle, self.timestamp)
    }

    /// Plain-text rendering for terminals and text snapshots.
    pub fn text_snapshot(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.header());
        out.push('\n');
        out.push_str(&self.text);
        out.push('\n');
        let row: Vec<String> = self
            .actions
            .iter()
            .filter_map(|a| a.label.as_ref().map(|l| format!("{} {}", a.kind.name(), l)))
            .collect();
        if !row.is_empty() {
            out.push_str(&row.join("  "));
            out.push('\n');
        }
        if let Some(views) = &self.views_line {
            out.push_str(views);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeFormat;
    use chrono::{Duration, TimeZone};

    fn sample() -> (Post, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut post = Post::with_defaults(now);
        post.content.timestamp = now - Duration::hours(3);
        (post, now)
    }

    #[test]
    fn default_post_projection() {
        let (post, now) = sample();
        let m = project(&post, now);
        assert!(m.avatar_is_placeholder);
        assert!(m.avatar_src.starts_with("https://ui-avatars.com/api/"));
        assert!(m.verified);
        assert_eq!(m.timestamp, "about 3 hours ago");
        assert_eq!(m.actions[0].label.as_deref(), Some("8.5K"));
        assert_eq!(m.actions[1].label.as_deref(), Some("45K"));
        assert_eq!(m.actions[2].label.as_deref(), Some("125K"));
        assert_eq!(m.actions[3].label, None);
        assert_eq!(m.views_line.as_deref(), Some("1.2M views"));
        assert_eq!(m.header(), "Elon Musk ✓ @elonmusk · about 3 hours ago");
    }

    #[test]
    fn zero_counters_and_views_are_hidden() {
        let (mut post, now) = sample();
        post.engagement.likes = 0;
        post.engagement.views = Some(0);
        post.profile.verified = false;
        let m = project(&post, now);
        assert_eq!(m.actions[2].label, None);
        assert_eq!(m.views_line, None);
        assert!(!m.header().contains('✓'));
    }

    #[test]
    fn show_metrics_off_hides_numbers() {
        let (mut post, now) = sample();
        post.settings.show_metrics = false;
        let m = project(&post, now);
        assert!(m.actions.iter().all(|a| a.label.is_none()));
        assert_eq!(m.views_line, None);
    }

    #[test]
    fn custom_avatar_is_used() {
        let (mut post, now) = sample();
        post.profile.avatar = "data:image/png;base64,AAAA".into();
        post.content.time_format = TimeFormat::Absolute;
        let m = project(&post, now);
        assert!(!m.avatar_is_placeholder);
        assert_eq!(m.avatar_src, "data:image/png;base64,AAAA");
        assert!(!m.timestamp.ends_with("ago"));
    }

    #[test]
    fn only_empty_avatar_selects_placeholder() {
        let (mut post, now) = sample();
        post.profile.avatar = " ".into();
        let m = project(&post, now);
        assert!(!m.avatar_is_placeholder);
        assert_eq!(m.avatar_src, " ");
    }

    #[test]
    fn snapshot_lists_visible_counters() {
        let (post, now) = sample();
        let snap = project(&post, now).text_snapshot();
        assert!(snap.contains("Just launched another rocket!"));
        assert!(snap.contains("like 125K"));
        assert!(snap.ends_with("1.2M views\n"));
    }
}
