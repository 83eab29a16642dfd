//! Post text editing with a soft length limit
//!
//! Text may run up to [`OVERFLOW_ALLOWANCE`] characters past the limit so the
//! user can keep typing and trim afterwards; anything longer is dropped
//! without touching the document. Length counts Unicode scalar values.

use crate::store::ContentPatch;

pub const DEFAULT_LIMIT: usize = 280;
/// Characters accepted beyond the limit before input is refused
pub const OVERFLOW_ALLOWANCE: usize = 10;
const NEAR_LIMIT_WINDOW: i64 = 20;

/// Quick-start texts offered next to the editor.
pub const TEMPLATES: &[&str] = &[
    "Just shipped a new feature! 🚀",
    "Excited to announce...",
    "Hot take: ",
    "PSA: ",
    "Thread 🧵 (1/n)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextGate {
    limit: usize,
}

impl Default for TextGate {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl TextGate {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Longest text that is still accepted.
    pub fn hard_cap(&self) -> usize {
        self.limit.saturating_add(OVERFLOW_ALLOWANCE)
    }

    /// Patch for `text`, or `None` when it is past the hard cap.
    pub fn accept(&self, text: &str) -> Option<ContentPatch> {
        if text.chars().count() > self.hard_cap() {
            log::debug!("text input past {} characters ignored", self.hard_cap());
            return None;
        }
        Some(ContentPatch {
            text: Some(text.to_string()),
            ..Default::default()
        })
    }

    /// Apply one of the [`TEMPLATES`] through the same gate.
    pub fn template(&self, index: usize) -> Option<ContentPatch> {
        TEMPLATES.get(index).and_then(|t| self.accept(t))
    }

    pub fn status(&self, text: &str) -> TextStatus {
        let length = text.chars().count();
        let remaining = self.limit as i64 - length as i64;
        let over_limit = remaining < 0;
        let progress = if self.limit == 0 {
            1.0
        } else {
            (length as f32 / self.limit as f32).min(1.0)
        };
        TextStatus {
            length,
            limit: self.limit,
            remaining,
            near_limit: (0..=NEAR_LIMIT_WINDOW).contains(&remaining),
            over_limit,
            can_submit: length > 0 && !over_limit,
            progress,
        }
    }
}

/// Counter state shown under the text box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStatus {
    pub length: usize,
    pub limit: usize,
    /// `limit - length`; negative when over
    pub remaining: i64,
    pub near_limit: bool,
    pub over_limit: bool,
    /// Whether a submit control would be enabled
    pub can_submit: bool,
    /// Fill fraction of the progress ring, capped at 1
    pub progress: f32,
}

impl std::fmt::Display for TextStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.length, self.limit)?;
        if self.over_limit {
            write!(f, " ({} characters over limit)", self.remaining.unsigned_abs())?;
        }
        Ok(())
    }
}
