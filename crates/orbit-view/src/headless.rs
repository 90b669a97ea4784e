use anyhow::{Context, Result, bail};
use orbit_core::{
    Carousel, CarouselConfig, CarouselSnapshot, GalleryItem, InputEvent, MonospaceMetrics, Screen,
};
use orbit_io::load_manifest;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::cli::{GalleryArgs, HeadlessCommand, SimulateArgs};

const FRAME: Duration = Duration::from_micros(16_667);

pub fn run_headless(gallery: &GalleryArgs, command: HeadlessCommand) -> Result<()> {
    match command {
        HeadlessCommand::Simulate(args) => {
            let items = gallery.items()?;
            let config = gallery.config()?;
            let report = simulate(&items, &config, &args)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        HeadlessCommand::Manifest { input } => {
            let items = load_manifest(&input)?;
            println!("{}", serde_json::to_string_pretty(&items)?);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct SimulationReport {
    config: CarouselConfig,
    selected: Vec<GalleryItem>,
    snapshot: CarouselSnapshot,
}

fn simulate(
    items: &[GalleryItem],
    config: &CarouselConfig,
    args: &SimulateArgs,
) -> Result<SimulationReport> {
    let screen = Screen::new(args.width, config.height.resolve(args.available_height));
    let script = script(args)?;

    let selected = Rc::new(RefCell::new(Vec::new()));
    let sink = selected.clone();
    let mut carousel = Carousel::new(items, config, screen, &MonospaceMetrics::default())
        .with_on_select(move |item| sink.borrow_mut().push(item.clone()));

    let start = Instant::now();
    let frames = args.frames.max(script.len() as u32);
    for frame in 0..frames {
        let now = start + FRAME * frame;
        for event in script.get(frame as usize).into_iter().flatten() {
            carousel.handle(*event, now);
        }
        carousel.tick(now);
    }
    info!(frames, "simulation finished");

    let snapshot = carousel.snapshot();
    carousel.destroy();
    let selected = selected.borrow().clone();
    Ok(SimulationReport {
        config: config.clone(),
        selected,
        snapshot,
    })
}

/// Events per frame: wheel steps first, then the drag, then the tap.
fn script(args: &SimulateArgs) -> Result<Vec<Vec<InputEvent>>> {
    let mut frames: Vec<Vec<InputEvent>> = args
        .wheel
        .iter()
        .map(|&delta| vec![InputEvent::Wheel { delta }])
        .collect();
    if let Some(drag) = &args.drag {
        let (from, to) = parse_drag(drag)?;
        frames.push(vec![InputEvent::PointerDown { x: from }]);
        frames.push(vec![InputEvent::PointerMove { x: to }]);
        frames.push(vec![InputEvent::PointerUp { x: Some(to) }]);
    }
    if let Some(x) = args.tap {
        frames.push(vec![
            InputEvent::PointerDown { x },
            InputEvent::PointerUp { x: Some(x) },
        ]);
    }
    Ok(frames)
}

fn parse_drag(text: &str) -> Result<(f32, f32)> {
    let Some((from, to)) = text.split_once(':') else {
        bail!("--drag expects FROM:TO, e.g. 800:400");
    };
    let from: f32 = from.trim().parse().context("invalid drag start")?;
    let to: f32 = to.trim().parse().context("invalid drag end")?;
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SimulateArgs {
        SimulateArgs {
            frames: 30,
            width: 1200.0,
            available_height: 800.0,
            wheel: Vec::new(),
            drag: None,
            tap: None,
        }
    }

    #[test]
    fn drag_parses() -> Result<()> {
        assert_eq!(parse_drag("800:400")?, (800.0, 400.0));
        assert!(parse_drag("800").is_err());
        Ok(())
    }

    #[test]
    fn script_orders_events() -> Result<()> {
        let args = SimulateArgs {
            wheel: vec![100.0, 100.0],
            drag: Some("700:650".to_string()),
            tap: Some(600.0),
            ..args()
        };
        let script = script(&args)?;
        assert_eq!(script.len(), 6);
        assert_eq!(script[0], vec![InputEvent::Wheel { delta: 100.0 }]);
        assert_eq!(script[2], vec![InputEvent::PointerDown { x: 700.0 }]);
        assert_eq!(script[5].len(), 2);
        Ok(())
    }

    #[test]
    fn tap_in_the_centre_selects_the_first_item() -> Result<()> {
        let items = vec![
            GalleryItem::new("a.jpg", "A"),
            GalleryItem::new("b.jpg", "B"),
        ];
        let args = SimulateArgs {
            tap: Some(600.0),
            ..args()
        };
        let report = simulate(&items, &CarouselConfig::default(), &args)?;
        assert_eq!(report.selected, vec![items[0].clone()]);
        assert_eq!(report.snapshot.medias.len(), 4);
        assert_eq!(report.snapshot.frames, 30);
        Ok(())
    }

    #[test]
    fn container_height_follows_config() -> Result<()> {
        let config = CarouselConfig {
            height: orbit_core::ContainerHeight::Percent(50.0),
            ..CarouselConfig::default()
        };
        let report = simulate(&[], &config, &args())?;
        assert_eq!(report.snapshot.screen.height, 400.0);
        Ok(())
    }
}
