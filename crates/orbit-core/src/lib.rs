use thiserror::Error;

mod bend;
mod camera;
mod color;
mod config;
mod controller;
mod font;
mod input;
mod item;
mod media;
mod scroll;

pub use bend::{BendPlacement, bend_placement};
pub use camera::{Camera, Screen, Viewport};
pub use color::Rgba;
pub use config::{CarouselConfig, ContainerHeight};
pub use controller::{Carousel, CarouselSnapshot, Lifecycle, MediaSnapshot};
pub use font::{
    FontSpec, MAX_FONT_SIZE_PX, MAX_LABEL_SIDE_PX, MonospaceMetrics, TextMetrics, label_canvas_size,
};
pub use input::{DRAG_THRESHOLD_PX, InputEvent};
pub use item::{GalleryItem, default_items};
pub use media::{CaptionLabel, Media, Placement, SlideUniforms};
pub use scroll::{Direction, SETTLE_DELAY, ScrollState, SettleTimer};

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("invalid colour: {0}")]
    InvalidColor(String),
    #[error("invalid font: {0}")]
    InvalidFont(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
