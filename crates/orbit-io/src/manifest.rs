use anyhow::{Context, Result};
use orbit_core::{CarouselConfig, GalleryItem};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::source::ImageSource;

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestEntry {
    Item(GalleryItem),
    Photo {
        src: String,
        #[serde(default)]
        alt: String,
        #[serde(default)]
        photographer: Option<String>,
    },
}

impl ManifestEntry {
    fn into_item(self, base: &Path) -> GalleryItem {
        let (image, text) = match self {
            Self::Item(item) => (item.image, item.text),
            Self::Photo {
                src,
                alt,
                photographer,
            } => {
                let text = if alt.trim().is_empty() {
                    photographer.unwrap_or_default()
                } else {
                    alt
                };
                (src, text)
            }
        };
        GalleryItem::new(ImageSource::resolve(&image, base).to_string(), text)
    }
}

/// Accepts either `[{ "image", "text" }]` or the gallery page's
/// `[{ "id", "alt", "src", "photographer" }]`.
pub fn parse_manifest(text: &str, base: &Path) -> Result<Vec<GalleryItem>> {
    let entries: Vec<ManifestEntry> =
        serde_json::from_str(text).context("gallery manifest is not a list of photos")?;
    Ok(entries
        .into_iter()
        .map(|entry| entry.into_item(base))
        .collect())
}

pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<GalleryItem>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let items = parse_manifest(&text, base)?;
    info!(path = %path.display(), items = items.len(), "gallery manifest loaded");
    Ok(items)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<CarouselConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    CarouselConfig::from_json(&text)
        .with_context(|| format!("invalid carousel config {}", path.display()))
}
