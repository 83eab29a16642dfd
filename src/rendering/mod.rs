//! Rendering: preview layout, paint list and rasterization
//!
//! The pipeline is `Post → PreviewModel → PreviewLayout → Surface`. A
//! [`Surface`] is what export captures; it carries paint commands, never the
//! document itself.

pub mod layout;
pub mod paint;
#[cfg(feature = "raster")]
pub mod raster;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::editors::profile::PLACEHOLDER_RGB;
use crate::model::{ExportFormat, Post};
use crate::preview::project;
use layout::layout_preview;
use paint::{paint_layout, Palette, PaintCommand, Rgba};

/// Identifier of the preview surface export looks up.
pub const SURFACE_ID: &str = "tweet-preview-container";

/// A rendered, paintable preview.
#[derive(Debug, Clone)]
pub struct Surface {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub background: Rgba,
    pub commands: Vec<PaintCommand>,
}

/// Render `post` into a surface `width` pixels wide.
pub fn render_surface(post: &Post, now: DateTime<Utc>, width: u32) -> Surface {
    let model = project(post, now);
    let layout = layout_preview(&model, width);
    let palette = Palette::for_theme(model.theme);
    let (r, g, b) = PLACEHOLDER_RGB;
    let commands = paint_layout(&layout, &palette, (r, g, b, 255));
    Surface {
        id: SURFACE_ID.to_string(),
        width: layout.width,
        height: layout.height,
        background: palette.background,
        commands,
    }
}

/// An encoded capture of a surface.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
    pub data: Vec<u8>,
}

impl Screenshot {
    /// Hex SHA-256 of the encoded bytes, used for golden comparisons.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Theme;

    #[test]
    fn surface_uses_theme_background() {
        let now = Utc::now();
        let mut post = Post::with_defaults(now);
        let light = render_surface(&post, now, layout::DEFAULT_WIDTH);
        assert_eq!(light.id, SURFACE_ID);
        assert_eq!(light.background, (255, 255, 255, 255));
        post.settings.theme = Theme::Dark;
        let dark = render_surface(&post, now, layout::DEFAULT_WIDTH);
        assert_eq!(dark.background, (0, 0, 0, 255));
        assert_eq!(dark.width, light.width);
    }

    #[test]
    fn digest_is_stable() {
        let s = Screenshot { width: 1, height: 1, format: ExportFormat::Png, data: b"abc".to_vec() };
        assert_eq!(
            s.digest(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
