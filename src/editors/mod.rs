//! Editors: each reads a slice of the post and turns raw user input into a
//! partial update for the [`crate::store::DocumentStore`].
//!
//! Editors never mutate the document themselves. Invalid input is either
//! normalized or dropped (`None` patch), except for avatar uploads which
//! report a user-visible rejection.

pub mod content;
pub mod engagement;
pub mod profile;
pub mod timestamp;

pub use content::{TextGate, TextStatus};
pub use engagement::{format_count, parse_count, Counter, EngagementPreset};
pub use profile::{normalize_username, placeholder_avatar_url, AvatarUpload};
pub use timestamp::{format_absolute, format_relative, TimePreset};
