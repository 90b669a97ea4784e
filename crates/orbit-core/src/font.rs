use crate::{Error, Result};

const DEFAULT_FONT_SIZE: f32 = 30.0;
/// Larger sizes parse but are clamped to this.
pub const MAX_FONT_SIZE_PX: f32 = 256.0;
/// Longest side of a caption canvas. Wider captions are clipped.
pub const MAX_LABEL_SIDE_PX: u32 = 4096;
const LABEL_PADDING_PX: u32 = 20;
const LINE_HEIGHT: f64 = 1.2;

/// A CSS-like font shorthand such as `bold 30px Figtree`.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub size_px: f32,
    pub bold: bool,
    pub family: String,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            size_px: DEFAULT_FONT_SIZE,
            bold: false,
            family: "sans-serif".to_string(),
        }
    }
}

impl FontSpec {
    /// Size comes from the first `<n>px` token, 30px when absent. Weight
    /// tokens `bold`, `bolder` and numeric weights >= 600 select bold.
    pub fn parse(text: &str) -> Result<Self> {
        let mut spec = Self::default();
        let mut family = Vec::new();
        let mut saw_size = false;
        for token in text.split_whitespace() {
            let lower = token.to_ascii_lowercase();
            if !saw_size {
                if let Some(px) = lower.strip_suffix("px") {
                    let size: f32 = px
                        .parse()
                        .map_err(|_| Error::InvalidFont(text.to_string()))?;
                    if !size.is_finite() || size <= 0.0 {
                        return Err(Error::InvalidFont(text.to_string()));
                    }
                    spec.size_px = size.min(MAX_FONT_SIZE_PX);
                    saw_size = true;
                    continue;
                }
                match lower.as_str() {
                    "bold" | "bolder" => {
                        spec.bold = true;
                        continue;
                    }
                    "normal" | "italic" | "oblique" | "lighter" => continue,
                    _ => {}
                }
                if let Ok(weight) = lower.parse::<u32>() {
                    spec.bold = weight >= 600;
                    continue;
                }
            }
            family.push(token.trim_matches(|c| c == '"' || c == '\'' || c == ','));
        }
        if !family.is_empty() {
            spec.family = family.join(" ");
        }
        Ok(spec)
    }

    pub fn parse_or_default(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to default caption font");
            Self::default()
        })
    }
}

/// Measures rendered caption width in pixels.
pub trait TextMetrics {
    fn text_width(&self, text: &str, font: &FontSpec) -> f32;
}

/// Fixed advance per character. Used when no rasterizer is at hand.
#[derive(Clone, Copy, Debug)]
pub struct MonospaceMetrics {
    pub advance_em: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { advance_em: 0.6 }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn text_width(&self, text: &str, font: &FontSpec) -> f32 {
        text.chars().count() as f32 * font.size_px * self.advance_em
    }
}

/// Pixel size of the off-screen canvas a caption is rasterized onto.
pub fn label_canvas_size(text_width: f32, font: &FontSpec) -> (u32, u32) {
    let width = padded(f64::from(text_width));
    let height = padded(f64::from(font.size_px) * LINE_HEIGHT);
    (width, height)
}

fn padded(extent: f64) -> u32 {
    let inner = f64::from(MAX_LABEL_SIDE_PX - LABEL_PADDING_PX);
    let extent = if extent.is_nan() { 0.0 } else { extent.clamp(0.0, inner) };
    (extent.ceil() as u32).saturating_add(LABEL_PADDING_PX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shorthand() {
        let spec = FontSpec::parse("bold 30px Figtree").ok();
        assert_eq!(
            spec,
            Some(FontSpec {
                size_px: 30.0,
                bold: true,
                family: "Figtree".to_string(),
            })
        );
    }

    #[test]
    fn size_defaults_to_thirty() {
        let spec = FontSpec::parse("monospace").ok();
        assert_eq!(spec.map(|s| s.size_px), Some(30.0));
    }

    #[test]
    fn numeric_weight_selects_bold() {
        let spec = FontSpec::parse("700 18px \"Open Sans\"").ok();
        assert_eq!(spec.as_ref().map(|s| s.bold), Some(true));
        assert_eq!(spec.map(|s| s.family), Some("Open Sans".to_string()));
    }

    #[test]
    fn rejects_bad_size() {
        assert!(FontSpec::parse("bold abcpx Figtree").is_err());
    }

    #[test]
    fn oversized_font_is_clamped() {
        let spec = FontSpec::parse("bold 20000px Figtree").ok();
        assert_eq!(spec.map(|s| s.size_px), Some(MAX_FONT_SIZE_PX));
        let spec = FontSpec::parse("bold 1e30px Figtree").ok();
        assert_eq!(spec.map(|s| s.size_px), Some(MAX_FONT_SIZE_PX));
    }

    #[test]
    fn canvas_never_exceeds_max_side() {
        let font = FontSpec {
            size_px: f32::MAX,
            ..FontSpec::default()
        };
        assert_eq!(
            label_canvas_size(f32::INFINITY, &font),
            (MAX_LABEL_SIDE_PX, MAX_LABEL_SIDE_PX)
        );
        assert_eq!(label_canvas_size(f32::NAN, &FontSpec::default()).0, 20);
    }

    #[test]
    fn canvas_adds_padding() {
        let font = FontSpec::default();
        assert_eq!(label_canvas_size(99.2, &font), (120, 56));
    }
}
