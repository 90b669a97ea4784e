use std::str::FromStr;

use crate::{Error, Result};

/// Straight-alpha sRGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parses the CSS forms the gallery accepts: `#rgb`, `#rgba`,
    /// `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` and a few names.
    pub fn parse(text: &str) -> Result<Self> {
        let value = text.trim().to_ascii_lowercase();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| Error::InvalidColor(text.to_string()));
        }
        if let Some(args) = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_args(args).ok_or_else(|| Error::InvalidColor(text.to_string()));
        }
        named(&value).ok_or_else(|| Error::InvalidColor(text.to_string()))
    }
}

impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Rgba::new(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
        4 => Some(Rgba::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |part: &str| -> Option<u8> {
        let value: f32 = part.parse().ok()?;
        Some(value.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(part) => {
            let value: f32 = match part.strip_suffix('%') {
                Some(pct) => pct.parse::<f32>().ok()? / 100.0,
                None => part.parse().ok()?,
            };
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Rgba::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn named(value: &str) -> Option<Rgba> {
    Some(match value {
        "white" => Rgba::WHITE,
        "black" => Rgba::BLACK,
        "transparent" => Rgba::TRANSPARENT,
        "red" => Rgba::new(255, 0, 0, 255),
        "green" => Rgba::new(0, 128, 0, 255),
        "blue" => Rgba::new(0, 0, 255, 255),
        "gray" | "grey" => Rgba::new(128, 128, 128, 255),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Rgba::parse("#fff").ok(), Some(Rgba::WHITE));
        assert_eq!(
            Rgba::parse("#545050").ok(),
            Some(Rgba::new(0x54, 0x50, 0x50, 255))
        );
        assert_eq!(
            Rgba::parse("#11223380").ok(),
            Some(Rgba::new(0x11, 0x22, 0x33, 0x80))
        );
    }

    #[test]
    fn parses_functional_and_named() {
        assert_eq!(
            Rgba::parse("rgba(10, 20, 30, 0.5)").ok(),
            Some(Rgba::new(10, 20, 30, 128))
        );
        assert_eq!(Rgba::parse(" Black ").ok(), Some(Rgba::BLACK));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Rgba::parse("#12").is_err());
        assert!(Rgba::parse("chartreuse-ish").is_err());
        assert!(Rgba::parse("rgb(1,2)").is_err());
    }
}
