//! Paint commands for the preview surface

use crate::model::Theme;
use crate::rendering::layout::{ElementType, PreviewLayout};

pub type Rgba = (u8, u8, u8, u8);

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    /// 2px outline
    StrokeRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    /// Circular avatar; `source` is a `data:` URL, a remote URL, or empty
    Avatar {
        x: i32,
        y: i32,
        size: u32,
        source: String,
        fallback: Rgba,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        rgba: Rgba,
        bold: bool,
    },
}

/// Colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Rgba,
    pub border: Rgba,
    pub primary_text: Rgba,
    pub secondary_text: Rgba,
    pub accent: Rgba,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                background: (255, 255, 255, 255),
                border: (229, 231, 235, 255),
                primary_text: (15, 20, 25, 255),
                secondary_text: (83, 100, 113, 255),
                accent: (29, 155, 240, 255),
            },
            Theme::Dark => Palette {
                background: (0, 0, 0, 255),
                border: (47, 51, 54, 255),
                primary_text: (231, 233, 234, 255),
                secondary_text: (113, 118, 123, 255),
                accent: (29, 155, 240, 255),
            },
        }
    }
}

/// Turn a layout into an ordered paint list (back to front).
pub fn paint_layout(layout: &PreviewLayout, palette: &Palette, placeholder: Rgba) -> Vec<PaintCommand> {
    let mut cmds = vec![
        PaintCommand::SolidRect { x: 0, y: 0, width: layout.width, height: layout.height, rgba: palette.background },
        PaintCommand::StrokeRect { x: 0, y: 0, width: layout.width, height: layout.height, rgba: palette.border },
    ];

    for node in &layout.nodes {
        let r = &node.lb.rect;
        match &node.elem_type {
            ElementType::Avatar => cmds.push(PaintCommand::Avatar {
                x: r.x,
                y: r.y,
                size: r.width,
                source: node.text.clone(),
                fallback: placeholder,
            }),
            ElementType::Badge => cmds.push(PaintCommand::SolidRect {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
                rgba: palette.accent,
            }),
            ElementType::ActionIcon(_) => cmds.push(PaintCommand::StrokeRect {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
                rgba: palette.secondary_text,
            }),
            ElementType::DisplayName => cmds.push(text(node.text.clone(), r.x, r.y, palette.primary_text, true)),
            ElementType::BodyLine => cmds.push(text(node.text.clone(), r.x, r.y, palette.primary_text, false)),
            ElementType::Meta | ElementType::ActionLabel(_) | ElementType::Views => {
                cmds.push(text(node.text.clone(), r.x, r.y, palette.secondary_text, false))
            }
        }
    }
    cmds
}

fn text(text: String, x: i32, y: i32, rgba: Rgba, bold: bool) -> PaintCommand {
    PaintCommand::Text { x, y, text, rgba, bold }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;
    use crate::preview::project;
    use crate::rendering::layout::{layout_preview, DEFAULT_WIDTH};
    use chrono::Utc;

    #[test]
    fn background_is_painted_first() {
        let now = Utc::now();
        let layout = layout_preview(&project(&Post::with_defaults(now), now), DEFAULT_WIDTH);
        let palette = Palette::for_theme(Theme::Light);
        let cmds = paint_layout(&layout, &palette, (29, 161, 242, 255));
        match &cmds[0] {
            PaintCommand::SolidRect { width, rgba, .. } => {
                assert_eq!(*width, DEFAULT_WIDTH);
                assert_eq!(*rgba, (255, 255, 255, 255));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(cmds.iter().any(|c| matches!(c, PaintCommand::Avatar { size: 48, .. })));
        assert!(cmds.iter().any(|c| matches!(c, PaintCommand::Text { bold: true, .. })));
    }

    #[test]
    fn dark_palette_differs() {
        assert_ne!(Palette::for_theme(Theme::Dark).background, Palette::for_theme(Theme::Light).background);
    }
}
