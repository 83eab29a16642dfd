//! Box layout for the post preview
//!
//! Everything is measured in CSS-like pixels on a fixed character grid:
//! one glyph cell is `CHAR_WIDTH` wide and lines are `LINE_HEIGHT` tall.

use crate::preview::{ActionKind, PreviewModel};

pub const CHAR_WIDTH: u32 = 8;
pub const LINE_HEIGHT: u32 = 20;
pub const AVATAR_SIZE: u32 = 48;
pub const DEFAULT_WIDTH: u32 = 598;
/// Narrowest preview that still fits avatar, gutter and a few glyphs
pub const MIN_WIDTH: u32 = 160;
const PADDING: u32 = 16;
const GUTTER: u32 = 12;
const BADGE_SIZE: u32 = 16;
const ICON_SIZE: u32 = 18;
const ACTION_ROW_HEIGHT: u32 = 36;
const ACTION_ROW_MAX_WIDTH: u32 = 448;

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub margin: u32,
    pub padding: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    fn plain(rect: Rect) -> Self {
        Self { rect, box_model: BoxModel { margin: 0, padding: 0 } }
    }

    pub fn content_width(&self) -> u32 {
        let total = self.box_model.margin + self.box_model.padding * 2;
        self.rect.width.saturating_sub(total)
    }
}

/// What a layout node draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    Avatar,
    DisplayName,
    Badge,
    /// Handle and timestamp
    Meta,
    /// One wrapped line of post text
    BodyLine,
    ActionIcon(ActionKind),
    ActionLabel(ActionKind),
    Views,
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    pub text: String,
    pub elem_type: ElementType,
}

impl LayoutNode {
    fn new(rect: Rect, text: impl Into<String>, elem_type: ElementType) -> Self {
        Self { lb: LayoutBox::plain(rect), text: text.into(), elem_type }
    }
}

/// The laid-out preview.
#[derive(Debug, Clone)]
pub struct PreviewLayout {
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<LayoutNode>,
}

impl PreviewLayout {
    pub fn find(&self, elem_type: &ElementType) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| &n.elem_type == elem_type)
    }

    pub fn count(&self, elem_type: &ElementType) -> usize {
        self.nodes.iter().filter(|n| &n.elem_type == elem_type).count()
    }
}

fn text_width(s: &str) -> u32 {
    s.chars().count() as u32 * CHAR_WIDTH
}

/// Cut `s` to `max_chars`, ending with an ellipsis when something was dropped.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Wrap `text` into lines of at most `chars_per_line` characters. Explicit
/// line breaks are kept, blank lines included; over-long words are split.
pub fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let chars_per_line = chars_per_line.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut cur = String::new();
        let mut cur_len = 0usize;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > chars_per_line {
                if cur_len > 0 {
                    lines.push(std::mem::take(&mut cur));
                    cur_len = 0;
                }
                let rest = word.split_off(chars_per_line);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if cur_len > 0 && cur_len + word.len() + 1 > chars_per_line {
                lines.push(std::mem::take(&mut cur));
                cur_len = 0;
            }
            if cur_len > 0 {
                cur.push(' ');
                cur_len += 1;
            }
            cur_len += word.len();
            cur.extend(word);
        }
        lines.push(cur);
    }
    lines
}

/// Lay the preview out for a surface `width` pixels wide.
pub fn layout_preview(model: &PreviewModel, width: u32) -> PreviewLayout {
    let width = width.max(MIN_WIDTH);
    let mut nodes = Vec::new();

    nodes.push(LayoutNode::new(
        Rect { x: PADDING as i32, y: PADDING as i32, width: AVATAR_SIZE, height: AVATAR_SIZE },
        model.avatar_src.clone(),
        ElementType::Avatar,
    ));

    let content_x = PADDING + AVATAR_SIZE + GUTTER;
    let content = LayoutBox {
        rect: Rect { x: content_x as i32, y: PADDING as i32, width: width - content_x, height: 0 },
        box_model: BoxModel { margin: PADDING, padding: 0 },
    };
    let content_w = content.content_width();
    let max_chars = (content_w / CHAR_WIDTH) as usize;

    // Header: the name keeps at most half the line, the rest goes to handle and time
    let mut x = content_x;
    let mut y = PADDING;
    let name = truncate(&model.display_name, (max_chars / 2).max(1));
    let name_w = text_width(&name);
    nodes.push(LayoutNode::new(
        Rect { x: x as i32, y: y as i32, width: name_w, height: LINE_HEIGHT },
        name,
        ElementType::DisplayName,
    ));
    x += name_w + 4;
    if model.verified {
        nodes.push(LayoutNode::new(
            Rect {
                x: x as i32,
                y: (y + (LINE_HEIGHT - BADGE_SIZE) / 2) as i32,
                width: BADGE_SIZE,
                height: BADGE_SIZE,
            },
            "",
            ElementType::Badge,
        ));
        x += BADGE_SIZE + 4;
    }
    let used = x - content_x;
    let meta_chars = (content_w.saturating_sub(used) / CHAR_WIDTH) as usize;
    let meta = truncate(&format!("{} · {}", model.handle, model.timestamp), meta_chars);
    nodes.push(LayoutNode::new(
        Rect { x: x as i32, y: y as i32, width: text_width(&meta), height: LINE_HEIGHT },
        meta,
        ElementType::Meta,
    ));
    y += LINE_HEIGHT + 4;

    for line in wrap_text(&model.text, max_chars) {
        nodes.push(LayoutNode::new(
            Rect { x: content_x as i32, y: y as i32, width: text_width(&line), height: LINE_HEIGHT },
            line,
            ElementType::BodyLine,
        ));
        y += LINE_HEIGHT;
    }

    y += 12;
    let row_w = content_w.min(ACTION_ROW_MAX_WIDTH);
    let slot_w = row_w / model.actions.len().max(1) as u32;
    for (i, slot) in model.actions.iter().enumerate() {
        let slot_x = content_x + slot_w * i as u32;
        let icon_y = y + (ACTION_ROW_HEIGHT - ICON_SIZE) / 2;
        nodes.push(LayoutNode::new(
            Rect { x: slot_x as i32, y: icon_y as i32, width: ICON_SIZE, height: ICON_SIZE },
            "",
            ElementType::ActionIcon(slot.kind),
        ));
        if let Some(label) = &slot.label {
            let label_chars = (slot_w.saturating_sub(ICON_SIZE + 6) / CHAR_WIDTH) as usize;
            let label = truncate(label, label_chars);
            nodes.push(LayoutNode::new(
                Rect {
                    x: (slot_x + ICON_SIZE + 6) as i32,
                    y: (y + (ACTION_ROW_HEIGHT - LINE_HEIGHT) / 2) as i32,
                    width: text_width(&label),
                    height: LINE_HEIGHT,
                },
                label,
                ElementType::ActionLabel(slot.kind),
            ));
        }
    }
    y += ACTION_ROW_HEIGHT;

    if let Some(views) = &model.views_line {
        y += 8;
        nodes.push(LayoutNode::new(
            Rect { x: content_x as i32, y: y as i32, width: text_width(views), height: LINE_HEIGHT },
            views.clone(),
            ElementType::Views,
        ));
        y += LINE_HEIGHT;
    }

    let height = (y + PADDING).max(PADDING * 2 + AVATAR_SIZE);
    PreviewLayout { width, height, nodes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;
    use crate::preview::project;
    use chrono::Utc;

    fn model() -> PreviewModel {
        let now = Utc::now();
        project(&Post::with_defaults(now), now)
    }

    #[test]
    fn layout_places_header_body_and_actions() {
        let layout = layout_preview(&model(), DEFAULT_WIDTH);
        let avatar = layout.find(&ElementType::Avatar).unwrap();
        let name = layout.find(&ElementType::DisplayName).unwrap();
        let body = layout.find(&ElementType::BodyLine).unwrap();
        assert_eq!(avatar.lb.rect.width, AVATAR_SIZE);
        assert!(name.lb.rect.x > avatar.lb.rect.x + AVATAR_SIZE as i32);
        assert!(body.lb.rect.y > name.lb.rect.y);
        assert_eq!(layout.find(&ElementType::Badge).map(|b| b.lb.rect.width), Some(BADGE_SIZE));
        assert_eq!(layout.count(&ElementType::ActionIcon(ActionKind::Like)), 1);
        assert!(layout.find(&ElementType::Views).is_some());
        let last = layout.nodes.iter().map(|n| n.lb.rect.bottom()).max().unwrap();
        assert!(layout.height as i32 > last);
    }

    #[test]
    fn long_text_wraps_within_width() {
        let mut m = model();
        m.text = "word ".repeat(100);
        let layout = layout_preview(&m, 300);
        let lines: Vec<_> = layout.nodes.iter().filter(|n| n.elem_type == ElementType::BodyLine).collect();
        assert!(lines.len() > 5);
        for l in lines {
            assert!(l.lb.rect.x as u32 + l.lb.rect.width <= 300);
        }
    }

    #[test]
    fn wrap_keeps_breaks_and_splits_long_words() {
        assert_eq!(wrap_text("a b\n\nc", 10), vec!["a b", "", "c"]);
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn narrow_width_is_clamped() {
        let layout = layout_preview(&model(), 10);
        assert_eq!(layout.width, MIN_WIDTH);
    }
}
