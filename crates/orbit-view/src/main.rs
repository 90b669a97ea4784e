use anyhow::Result;
use clap::Parser;

mod cli;
mod headless;
#[cfg(feature = "gui")]
mod gui;
#[cfg(feature = "gui")]
mod viewer;

fn main() -> Result<()> {
    init_tracing();
    let args = cli::CliArgs::parse();
    match args.mode {
        Some(cli::Mode::Headless { command }) => headless::run_headless(&args.gallery, command),
        None => run_gui(&args.gallery),
    }
}

#[cfg(feature = "gui")]
fn run_gui(gallery: &cli::GalleryArgs) -> Result<()> {
    let items = gallery.items()?;
    let config = gallery.config()?;
    gui::run_gui(items, config, gallery.font_file.clone())
}

#[cfg(not(feature = "gui"))]
fn run_gui(_gallery: &cli::GalleryArgs) -> Result<()> {
    anyhow::bail!("GUI support disabled. Rebuild with --features gui.");
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
