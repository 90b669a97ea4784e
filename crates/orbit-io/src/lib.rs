mod fetch;
mod loader;
mod manifest;
mod source;

pub use fetch::{HttpClient, decode_image, fetch_image};
pub use loader::{ImageLoader, LoadedImage};
pub use manifest::{load_config, load_manifest, parse_manifest};
pub use source::ImageSource;
