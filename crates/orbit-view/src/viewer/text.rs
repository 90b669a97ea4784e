use anyhow::{Result, anyhow};
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use orbit_core::{CaptionLabel, FontSpec, Rgba as Color, TextMetrics};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Horizontal offset of the second pass used to embolden regular faces.
const BOLD_OFFSET_PX: f32 = 1.0;

/// Lays out and rasterizes caption text onto label canvases.
pub struct CaptionRasterizer {
    font: Font,
}

impl CaptionRasterizer {
    /// Loads `font_file` when given, falling back to the bundled face.
    pub fn new(font_file: Option<&Path>) -> Result<Self> {
        if let Some(path) = font_file {
            match fs::read(path)
                .map_err(anyhow::Error::from)
                .and_then(|bytes| Self::from_bytes(&bytes))
            {
                Ok(rasterizer) => {
                    info!(path = %path.display(), "caption font loaded");
                    return Ok(rasterizer);
                }
                Err(err) => warn!(path = %path.display(), "caption font unusable: {err:#}"),
            }
        }
        Self::from_bytes(epaint_default_fonts::UBUNTU_LIGHT)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|err| anyhow!(err))?;
        Ok(Self { font })
    }

    fn glyph_positions(&self, text: &str, spec: &FontSpec) -> (Vec<(char, f32)>, f32) {
        let px = spec.size_px;
        let mut pen = 0.0_f32;
        let mut previous = None;
        let mut glyphs = Vec::new();
        for ch in text.chars() {
            if let Some(prev) = previous {
                pen += self.font.horizontal_kern(prev, ch, px).unwrap_or(0.0);
            }
            glyphs.push((ch, pen));
            pen += self.font.metrics(ch, px).advance_width;
            previous = Some(ch);
        }
        if spec.bold && !glyphs.is_empty() {
            pen += BOLD_OFFSET_PX;
        }
        (glyphs, pen)
    }

    /// Draws the caption centred on its canvas, premultiplied.
    pub fn rasterize(&self, label: &CaptionLabel, spec: &FontSpec, color: Color) -> RgbaImage {
        let (width, height) = label.canvas_size;
        let mut coverage = vec![0u8; width as usize * height as usize];
        let (glyphs, text_width) = self.glyph_positions(&label.text, spec);

        let px = spec.size_px;
        let (ascent, descent) = self
            .font
            .horizontal_line_metrics(px)
            .map(|m| (m.ascent, m.descent))
            .unwrap_or((px * 0.8, -px * 0.2));
        // Captions wider than the canvas keep their start and lose the tail.
        let origin_x = ((width as f32 - text_width) * 0.5).max(0.0);
        let baseline = height as f32 * 0.5 + (ascent + descent) * 0.5;

        let passes: &[f32] = if spec.bold {
            &[0.0, BOLD_OFFSET_PX]
        } else {
            &[0.0]
        };
        for &(ch, pen) in &glyphs {
            let (metrics, bitmap) = self.font.rasterize(ch, px);
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }
            let top = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i64;
            for &pass in passes {
                let left = (origin_x + pen + pass + metrics.xmin as f32).round() as i64;
                blit_max(
                    &mut coverage,
                    (width, height),
                    &bitmap,
                    (metrics.width, metrics.height),
                    (left, top),
                );
            }
        }

        let [r, g, b, a] = color.to_array();
        RgbaImage::from_fn(width, height, |x, y| {
            let c = coverage[(y * width + x) as usize] as u32 * a as u32 / 255;
            let premultiply = |channel: u8| (channel as u32 * c / 255) as u8;
            Rgba([premultiply(r), premultiply(g), premultiply(b), c as u8])
        })
    }
}

impl TextMetrics for CaptionRasterizer {
    fn text_width(&self, text: &str, font: &FontSpec) -> f32 {
        self.glyph_positions(text, font).1
    }
}

fn blit_max(
    canvas: &mut [u8],
    (canvas_w, canvas_h): (u32, u32),
    glyph: &[u8],
    (glyph_w, glyph_h): (usize, usize),
    (left, top): (i64, i64),
) {
    for gy in 0..glyph_h {
        let y = top + gy as i64;
        if y < 0 || y >= canvas_h as i64 {
            continue;
        }
        for gx in 0..glyph_w {
            let x = left + gx as i64;
            if x < 0 || x >= canvas_w as i64 {
                continue;
            }
            let dst = &mut canvas[y as usize * canvas_w as usize + x as usize];
            *dst = (*dst).max(glyph[gy * glyph_w + gx]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_core::label_canvas_size;

    fn rasterizer() -> CaptionRasterizer {
        CaptionRasterizer::from_bytes(epaint_default_fonts::UBUNTU_LIGHT)
            .unwrap_or_else(|err| panic!("bundled font: {err}"))
    }

    fn spec(bold: bool) -> FontSpec {
        FontSpec {
            size_px: 30.0,
            bold,
            family: "Figtree".to_string(),
        }
    }

    #[test]
    fn width_grows_with_text() {
        let r = rasterizer();
        let short = r.text_width("Bridge", &spec(false));
        let long = r.text_width("Bridge over water", &spec(false));
        assert!(short > 0.0);
        assert!(long > short);
        assert_eq!(r.text_width("", &spec(true)), 0.0);
        assert_eq!(r.text_width("Bridge", &spec(true)), short + BOLD_OFFSET_PX);
    }

    #[test]
    fn caption_is_centred_and_premultiplied() {
        let r = rasterizer();
        let font = spec(true);
        let text = "Waterfall";
        let size = label_canvas_size(r.text_width(text, &font), &font);
        let label = CaptionLabel::new(text, size);
        let image = r.rasterize(&label, &font, Color::new(255, 128, 0, 255));
        assert_eq!(image.dimensions(), size);

        let inked: Vec<(u32, u32)> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| p[3] > 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());
        let min_x = inked.iter().map(|p| p.0).min().unwrap_or(0);
        let max_x = inked.iter().map(|p| p.0).max().unwrap_or(0);
        let left = min_x as i64;
        let right = size.0 as i64 - 1 - max_x as i64;
        assert!((left - right).abs() <= 6, "left {left} right {right}");

        for pixel in image.pixels() {
            assert!(pixel[0] <= pixel[3]);
            assert!(pixel[1] <= pixel[3]);
        }
    }

    #[test]
    fn clipped_caption_keeps_its_start() {
        let r = rasterizer();
        let font = spec(false);
        let label = CaptionLabel::new("Mountain lake at dawn", (120, 56));
        let image = r.rasterize(&label, &font, Color::new(255, 255, 255, 255));
        let first_inked = image
            .enumerate_pixels()
            .filter(|(_, _, p)| p[3] > 0)
            .map(|(x, _, _)| x)
            .min();
        assert!(first_inked.is_some_and(|x| x < 10));
    }

    #[test]
    fn missing_font_file_falls_back() -> Result<()> {
        let r = CaptionRasterizer::new(Some(Path::new("/no/such/font.ttf")))?;
        assert!(r.text_width("A", &spec(false)) > 0.0);
        Ok(())
    }
}
