mod app;
mod overlay;
mod params;
mod widget;

pub use app::run_gui;
