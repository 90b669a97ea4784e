use serde::{Deserialize, Serialize};

/// One carousel entry. Identity is its position in the list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GalleryItem {
    pub image: String,
    #[serde(alias = "caption")]
    pub text: String,
}

impl GalleryItem {
    pub fn new(image: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            text: text.into(),
        }
    }
}

const PLACEHOLDERS: [(u32, &str); 12] = [
    (1, "Bridge"),
    (2, "Desk Setup"),
    (3, "Waterfall"),
    (4, "Strawberries"),
    (5, "Deep Diving"),
    (16, "Train Track"),
    (17, "Santorini"),
    (8, "Blurry Lights"),
    (9, "New York"),
    (10, "Good Boy"),
    (21, "Coastline"),
    (12, "Palm Trees"),
];

/// Built-in set shown when the caller supplies no items.
pub fn default_items() -> Vec<GalleryItem> {
    PLACEHOLDERS
        .iter()
        .map(|(seed, text)| {
            GalleryItem::new(
                format!("https://picsum.photos/seed/{seed}/800/600?grayscale"),
                *text,
            )
        })
        .collect()
}
