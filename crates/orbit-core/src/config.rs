use std::fmt;

use serde::{Deserialize, Serialize};

use crate::item::GalleryItem;
use crate::{Error, Result};

const DEFAULT_EASE: f32 = 0.05;
const DEFAULT_SPEED: f32 = 2.0;
const MAX_BORDER_RADIUS: f32 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub bend: f32,
    pub text_color: String,
    pub border_radius: f32,
    pub font: String,
    pub scroll_speed: f32,
    pub scroll_ease: f32,
    pub height: ContainerHeight,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            bend: 3.0,
            text_color: "#ffffff".to_string(),
            border_radius: 0.05,
            font: "bold 30px Figtree".to_string(),
            scroll_speed: DEFAULT_SPEED,
            scroll_ease: DEFAULT_EASE,
            height: ContainerHeight::Pixels(600.0),
        }
    }
}

impl CarouselConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Replaces values the carousel cannot work with.
    pub fn sanitized(mut self) -> Self {
        if !self.bend.is_finite() {
            self.bend = 0.0;
        }
        if !(self.scroll_ease.is_finite() && self.scroll_ease > 0.0) {
            self.scroll_ease = DEFAULT_EASE;
        }
        self.scroll_ease = self.scroll_ease.min(1.0);
        if !self.scroll_speed.is_finite() {
            self.scroll_speed = DEFAULT_SPEED;
        }
        self.border_radius = if self.border_radius.is_finite() {
            self.border_radius.clamp(0.0, MAX_BORDER_RADIUS)
        } else {
            0.0
        };
        self
    }

    /// Stable serialization of everything a rebuild depends on.
    pub fn fingerprint(&self, items: &[GalleryItem]) -> String {
        serde_json::to_string(&(self, items)).unwrap_or_default()
    }
}

/// Height of the carousel container.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HeightRepr", into = "String")]
pub enum ContainerHeight {
    Pixels(f32),
    Percent(f32),
}

impl ContainerHeight {
    pub fn parse(text: &str) -> Result<Self> {
        let value = text.trim();
        let invalid = || Error::InvalidParameter(format!("container height `{text}`"));
        let (number, percent) = match value.strip_suffix('%') {
            Some(number) => (number, true),
            None => (value.strip_suffix("px").unwrap_or(value), false),
        };
        let number: f32 = number.trim().parse().map_err(|_| invalid())?;
        if !number.is_finite() || number < 0.0 {
            return Err(invalid());
        }
        Ok(if percent {
            Self::Percent(number)
        } else {
            Self::Pixels(number)
        })
    }

    /// Logical pixel height inside a parent of height `available`.
    pub fn resolve(self, available: f32) -> f32 {
        let height = match self {
            Self::Pixels(px) => px.min(available),
            Self::Percent(pct) => available * pct / 100.0,
        };
        height.max(1.0)
    }
}

impl fmt::Display for ContainerHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

impl From<ContainerHeight> for String {
    fn from(value: ContainerHeight) -> Self {
        value.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HeightRepr {
    Number(f32),
    Text(String),
}

impl TryFrom<HeightRepr> for ContainerHeight {
    type Error = Error;

    fn try_from(value: HeightRepr) -> Result<Self> {
        match value {
            HeightRepr::Number(px) if px.is_finite() && px >= 0.0 => Ok(Self::Pixels(px)),
            HeightRepr::Number(px) => Err(Error::InvalidParameter(format!(
                "container height `{px}`"
            ))),
            HeightRepr::Text(text) => Self::parse(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() -> Result<()> {
        let config = CarouselConfig::from_json(r#"{ "bend": -2, "height": "70%" }"#)?;
        assert_eq!(config.bend, -2.0);
        assert_eq!(config.height, ContainerHeight::Percent(70.0));
        assert_eq!(config.scroll_ease, 0.05);
        assert_eq!(config.font, "bold 30px Figtree");
        Ok(())
    }

    #[test]
    fn numeric_height_is_pixels() -> Result<()> {
        let config = CarouselConfig::from_json(r#"{ "height": 480 }"#)?;
        assert_eq!(config.height, ContainerHeight::Pixels(480.0));
        Ok(())
    }

    #[test]
    fn height_parses_and_resolves() -> Result<()> {
        assert_eq!(ContainerHeight::parse("600")?, ContainerHeight::Pixels(600.0));
        assert_eq!(ContainerHeight::parse("600px")?.resolve(400.0), 400.0);
        assert_eq!(ContainerHeight::parse("50%")?.resolve(800.0), 400.0);
        assert!(ContainerHeight::parse("tall").is_err());
        Ok(())
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let config = CarouselConfig {
            border_radius: 0.9,
            scroll_ease: 0.0,
            bend: f32::NAN,
            ..CarouselConfig::default()
        }
        .sanitized();
        assert_eq!(config.border_radius, 0.5);
        assert_eq!(config.scroll_ease, 0.05);
        assert_eq!(config.bend, 0.0);
    }

    #[test]
    fn fingerprint_tracks_items_and_config() {
        let items = vec![GalleryItem::new("a.jpg", "A")];
        let config = CarouselConfig::default();
        let base = config.fingerprint(&items);
        assert_eq!(base, config.clone().fingerprint(&items));

        let tweaked = CarouselConfig {
            bend: 1.0,
            ..config.clone()
        };
        assert_ne!(base, tweaked.fingerprint(&items));

        let more = vec![GalleryItem::new("a.jpg", "A"), GalleryItem::new("b.jpg", "B")];
        assert_ne!(base, config.fingerprint(&more));
    }
}
