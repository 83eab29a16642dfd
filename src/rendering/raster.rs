//! Rasterizer: paint list → RGBA pixels → PNG/JPEG bytes
//!
//! Text is drawn as glyph cells on the layout grid rather than shaped
//! outlines, which is enough for a faithful silhouette of the post.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, Rgba as Px, RgbaImage};

use crate::editors::profile::decode_data_url;
use crate::error::{Error, Result};
use crate::model::{ExportConfig, ExportFormat};
use crate::rendering::layout::CHAR_WIDTH;
use crate::rendering::paint::{PaintCommand, Rgba};
use crate::rendering::{Screenshot, Surface};

/// Largest output edge in pixels
pub const MAX_DIMENSION: u32 = 16_384;
const STROKE: f32 = 2.0;

struct Canvas {
    img: RgbaImage,
    scale: f32,
}

impl Canvas {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rgba: Rgba) {
        let (iw, ih) = self.img.dimensions();
        let x0 = ((x * self.scale).floor().max(0.0) as u32).min(iw);
        let y0 = ((y * self.scale).floor().max(0.0) as u32).min(ih);
        let x1 = (((x + w) * self.scale).ceil().max(0.0) as u32).min(iw);
        let y1 = (((y + h) * self.scale).ceil().max(0.0) as u32).min(ih);
        for py in y0..y1 {
            for px in x0..x1 {
                blend(self.img.get_pixel_mut(px, py), rgba);
            }
        }
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rgba: Rgba) {
        self.fill_rect(x, y, w, STROKE, rgba);
        self.fill_rect(x, y + h - STROKE, w, STROKE, rgba);
        self.fill_rect(x, y, STROKE, h, rgba);
        self.fill_rect(x + w - STROKE, y, STROKE, h, rgba);
    }

    fn text(&mut self, x: f32, y: f32, text: &str, rgba: Rgba, bold: bool) {
        let cell = CHAR_WIDTH as f32;
        let glyph_w = if bold { 7.0 } else { 6.0 };
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let gx = x + i as f32 * cell + (cell - glyph_w) / 2.0;
            // Lowercase letters sit lower and shorter than capitals and digits
            let (gy, gh) = if ch.is_lowercase() { (y + 8.0, 8.0) } else { (y + 4.0, 12.0) };
            self.fill_rect(gx, gy, glyph_w, gh, rgba);
        }
    }

    fn avatar(&mut self, x: f32, y: f32, size: f32, source: &str, fallback: Rgba) {
        let px_size = (size * self.scale).round().max(1.0) as u32;
        let picture = decode_data_url(source)
            .and_then(|(_, bytes)| image::load_from_memory(&bytes).ok())
            .map(|img| image::imageops::resize(&img.to_rgba8(), px_size, px_size, FilterType::Triangle));
        if picture.is_none() && source.starts_with("data:") {
            log::warn!("avatar data URL could not be decoded; using placeholder");
        }

        let ox = (x * self.scale).round() as i64;
        let oy = (y * self.scale).round() as i64;
        let r = px_size as f32 / 2.0;
        let (iw, ih) = self.img.dimensions();
        for dy in 0..px_size {
            for dx in 0..px_size {
                let cx = dx as f32 + 0.5 - r;
                let cy = dy as f32 + 0.5 - r;
                if cx * cx + cy * cy > r * r {
                    continue;
                }
                let (tx, ty) = (ox + dx as i64, oy + dy as i64);
                if tx < 0 || ty < 0 || tx >= iw as i64 || ty >= ih as i64 {
                    continue;
                }
                let color = match &picture {
                    Some(p) => {
                        let c = p.get_pixel(dx, dy).0;
                        (c[0], c[1], c[2], c[3])
                    }
                    None => fallback,
                };
                blend(self.img.get_pixel_mut(tx as u32, ty as u32), color);
            }
        }
    }
}

fn blend(dst: &mut Px<u8>, (r, g, b, a): Rgba) {
    if a == 255 {
        *dst = Px([r, g, b, 255]);
        return;
    }
    let alpha = a as u32;
    let mix = |s: u8, d: u8| ((s as u32 * alpha + d as u32 * (255 - alpha)) / 255) as u8;
    let d = dst.0;
    *dst = Px([mix(r, d[0]), mix(g, d[1]), mix(b, d[2]), d[3].max(a)]);
}

/// Output size of `surface` at `scale`.
pub fn output_size(surface: &Surface, scale: f32) -> Result<(u32, u32)> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(Error::Encode(format!("invalid scale {}", scale)));
    }
    let w = (surface.width as f32 * scale).ceil();
    let h = (surface.height as f32 * scale).ceil();
    if w < 1.0 || h < 1.0 || w > MAX_DIMENSION as f32 || h > MAX_DIMENSION as f32 {
        return Err(Error::Encode(format!("output size {}x{} out of range", w, h)));
    }
    Ok((w as u32, h as u32))
}

/// `scale`, lowered when needed so the longest edge stays within
/// [`MAX_DIMENSION`].
pub fn fit_scale(surface: &Surface, scale: f32) -> Result<f32> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(Error::Encode(format!("invalid scale {}", scale)));
    }
    let edge = surface.width.max(surface.height);
    if edge == 0 || (edge as f32 * scale).ceil() <= MAX_DIMENSION as f32 {
        return Ok(scale);
    }
    let fitted = (MAX_DIMENSION - 1) as f32 / edge as f32;
    log::warn!(
        "{}x{} preview is too large at {}x; capturing at {:.2}x",
        surface.width,
        surface.height,
        scale,
        fitted
    );
    Ok(fitted)
}

/// Paint `surface` into an RGBA buffer at `scale` (see [`fit_scale`]).
pub fn rasterize(surface: &Surface, scale: f32) -> Result<RgbaImage> {
    let scale = fit_scale(surface, scale)?;
    let (w, h) = output_size(surface, scale)?;
    let (r, g, b, a) = surface.background;
    let mut canvas = Canvas { img: RgbaImage::from_pixel(w, h, Px([r, g, b, a])), scale };
    for cmd in &surface.commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                canvas.fill_rect(*x as f32, *y as f32, *width as f32, *height as f32, *rgba)
            }
            PaintCommand::StrokeRect { x, y, width, height, rgba } => {
                canvas.stroke_rect(*x as f32, *y as f32, *width as f32, *height as f32, *rgba)
            }
            PaintCommand::Avatar { x, y, size, source, fallback } => {
                canvas.avatar(*x as f32, *y as f32, *size as f32, source, *fallback)
            }
            PaintCommand::Text { x, y, text, rgba, bold } => {
                canvas.text(*x as f32, *y as f32, text, *rgba, *bold)
            }
        }
    }
    Ok(canvas.img)
}

/// Encode pixels per `config`: PNG keeps alpha, JPEG is flattened to RGB.
pub fn encode(img: &RgbaImage, config: &ExportConfig) -> Result<Vec<u8>> {
    let (w, h) = img.dimensions();
    let mut out = Cursor::new(Vec::new());
    match config.format {
        ExportFormat::Png => {
            PngEncoder::new(&mut out).write_image(img.as_raw(), w, h, ExtendedColorType::Rgba8)?;
        }
        ExportFormat::Jpg => {
            let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut out, config.jpeg_quality())
                .write_image(rgb.as_raw(), w, h, ExtendedColorType::Rgb8)?;
        }
    }
    Ok(out.into_inner())
}

/// Rasterize and encode in one step.
pub fn capture(surface: &Surface, config: &ExportConfig) -> Result<Screenshot> {
    let config = config.sanitized();
    let img = rasterize(surface, config.scale)?;
    let data = encode(&img, &config)?;
    Ok(Screenshot { width: img.width(), height: img.height(), format: config.format, data })
}
