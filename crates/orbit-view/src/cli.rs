use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use orbit_core::{CarouselConfig, ContainerHeight, GalleryItem};
use orbit_io::{load_config, load_manifest};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "orbit-view")]
#[command(about = "Orbit circular image carousel, desktop and headless")]
pub struct CliArgs {
    #[command(flatten)]
    pub gallery: GalleryArgs,
    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Subcommand)]
pub enum Mode {
    Headless {
        #[command(subcommand)]
        command: HeadlessCommand,
    },
}

#[derive(Subcommand)]
pub enum HeadlessCommand {
    /// Drive the carousel over a simulated 60 Hz clock and print a snapshot.
    Simulate(SimulateArgs),
    /// Print the items a gallery manifest resolves to.
    Manifest {
        #[arg(long = "in")]
        input: PathBuf,
    },
}

/// Gallery inputs shared by every mode. Flags override the config file,
/// which overrides the built-in defaults.
#[derive(Args, Clone, Debug, Default)]
pub struct GalleryArgs {
    /// `[{image,text}]` list or `gallery_photos.json`.
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// TrueType font used for captions.
    #[arg(long, global = true)]
    pub font_file: Option<PathBuf>,
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub bend: Option<f32>,
    #[arg(long, global = true)]
    pub text_color: Option<String>,
    #[arg(long, global = true)]
    pub border_radius: Option<f32>,
    #[arg(long, global = true)]
    pub font: Option<String>,
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub scroll_speed: Option<f32>,
    #[arg(long, global = true)]
    pub scroll_ease: Option<f32>,
    /// `600`, `600px` or `70%`.
    #[arg(long, global = true)]
    pub height: Option<String>,
}

impl GalleryArgs {
    pub fn items(&self) -> Result<Vec<GalleryItem>> {
        match &self.manifest {
            Some(path) => load_manifest(path),
            None => Ok(Vec::new()),
        }
    }

    pub fn config(&self) -> Result<CarouselConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => CarouselConfig::default(),
        };
        if let Some(bend) = self.bend {
            config.bend = bend;
        }
        if let Some(color) = &self.text_color {
            config.text_color = color.clone();
        }
        if let Some(radius) = self.border_radius {
            config.border_radius = radius;
        }
        if let Some(font) = &self.font {
            config.font = font.clone();
        }
        if let Some(speed) = self.scroll_speed {
            config.scroll_speed = speed;
        }
        if let Some(ease) = self.scroll_ease {
            config.scroll_ease = ease;
        }
        if let Some(height) = &self.height {
            config.height = ContainerHeight::parse(height).context("invalid --height")?;
        }
        Ok(config)
    }
}

#[derive(Args)]
pub struct SimulateArgs {
    #[arg(long, default_value_t = 120)]
    pub frames: u32,
    /// Container width in logical pixels.
    #[arg(long, default_value_t = 1200.0)]
    pub width: f32,
    /// Height available to the container; the configured height resolves
    /// against it.
    #[arg(long, default_value_t = 800.0)]
    pub available_height: f32,
    /// Wheel delta, one event per frame from the first frame. Repeatable.
    #[arg(long, allow_negative_numbers = true)]
    pub wheel: Vec<f32>,
    /// Drag as `FROM:TO` in container x pixels, after the wheel events.
    #[arg(long)]
    pub drag: Option<String>,
    /// Tap at container x, after any drag.
    #[arg(long)]
    pub tap: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() -> Result<()> {
        let args = CliArgs::try_parse_from([
            "orbit-view",
            "--bend",
            "-2",
            "--height",
            "70%",
            "headless",
            "simulate",
            "--wheel",
            "100",
            "--wheel",
            "-100",
        ])?;
        let config = args.gallery.config()?;
        assert_eq!(config.bend, -2.0);
        assert_eq!(config.height, ContainerHeight::Percent(70.0));
        assert_eq!(config.scroll_ease, 0.05);
        match args.mode {
            Some(Mode::Headless {
                command: HeadlessCommand::Simulate(sim),
            }) => assert_eq!(sim.wheel, vec![100.0, -100.0]),
            _ => panic!("expected headless simulate"),
        }
        Ok(())
    }

    #[test]
    fn bad_height_is_rejected() {
        let args = GalleryArgs {
            height: Some("tall".to_string()),
            ..GalleryArgs::default()
        };
        assert!(args.config().is_err());
    }
}
