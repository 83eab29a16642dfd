//! Fauxpost
//!
//! Compose a fabricated social-media post (profile, text, timestamp,
//! engagement counters), preview it, and export the preview as a PNG or JPEG.
//!
//! # Architecture
//!
//! - **Store** ([`store`]): one editable [`Post`] with partial-update
//!   reducers, mirrored to a [`storage::PostStorage`] after every change
//! - **Editors** ([`editors`]): turn raw input into patches (username
//!   normalization, soft text limit, `15.3K`-style counts, date/time edits)
//! - **Preview** ([`preview`], [`rendering`]): pure projection to a layout
//!   and paint list
//! - **Export** ([`export`]): captures the rendered surface behind the
//!   [`export::SurfaceCapture`] trait and delivers `<prefix>-<millis>.<ext>`
//!
//! # Example
//!
//! ```no_run
//! use fauxpost::{storage::FileStorage, Studio, StudioConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StudioConfig::default();
//! let storage = FileStorage::in_dir(&config.storage_dir);
//! let mut studio = Studio::open(config, storage)?;
//! studio.edit_text("Hello from the terminal");
//! println!("{}", studio.preview(chrono::Utc::now()).text_snapshot());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod decode;
pub mod editors;
pub mod error;
pub mod export;
pub mod model;
pub mod preview;
pub mod rendering;
pub mod storage;
pub mod store;
pub mod studio;

pub use error::{Error, Result};
pub use model::{Content, Engagement, ExportConfig, ExportFormat, Post, Profile, Settings, Theme, TimeFormat};
pub use store::{ContentPatch, DocumentStore, EngagementPatch, ProfilePatch, SettingsPatch};
pub use studio::Studio;

#[cfg(feature = "raster")]
pub use export::RasterCapture;

/// Configuration for a [`Studio`]
///
/// The defaults keep everything under `.fauxpost` in the working directory,
/// use the classic 280-character limit and export at 2x PNG.
///
/// # Examples
///
/// ```
/// let cfg = fauxpost::StudioConfig::default();
/// assert_eq!(cfg.text_limit, 280);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Directory holding the stored post record
    pub storage_dir: PathBuf,
    /// Display limit for post text
    pub text_limit: usize,
    /// Download file name prefix
    pub export_prefix: String,
    /// Preview surface width in pixels
    pub preview_width: u32,
    /// Export settings used until the user picks others
    pub export: ExportConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".fauxpost"),
            text_limit: editors::content::DEFAULT_LIMIT,
            export_prefix: export::DEFAULT_PREFIX.to_string(),
            preview_width: rendering::layout::DEFAULT_WIDTH,
            export: ExportConfig::default(),
        }
    }
}

impl StudioConfig {
    pub fn validate(&self) -> Result<()> {
        if self.text_limit == 0 {
            return Err(Error::Config("text_limit must be positive".into()));
        }
        if self.export_prefix.is_empty()
            || self.export_prefix.contains(['/', '\\'])
            || self.export_prefix.starts_with('.')
        {
            return Err(Error::Config(format!("invalid export prefix {:?}", self.export_prefix)));
        }
        if self.preview_width < rendering::layout::MIN_WIDTH {
            return Err(Error::Config(format!(
                "preview_width must be at least {}",
                rendering::layout::MIN_WIDTH
            )));
        }
        let scale = self.export.scale;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::Config("export scale must be positive".into()));
        }
        Ok(())
    }
}
