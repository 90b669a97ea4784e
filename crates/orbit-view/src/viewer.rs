mod context;
mod geometry;
mod math;
mod renderer;
mod text;
mod textures;

pub use context::ContextGuard;
pub use renderer::CarouselRenderer;
pub use text::CaptionRasterizer;
pub use textures::max_side;
