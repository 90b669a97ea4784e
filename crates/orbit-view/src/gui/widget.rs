use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use anyhow::Result;
use egui_wgpu::RenderState;
use image::RgbaImage;
use orbit_core::{Carousel, CarouselConfig, GalleryItem, InputEvent, Screen};
use orbit_io::ImageLoader;
use tracing::{debug, warn};

use crate::viewer::{CaptionRasterizer, CarouselRenderer, ContextGuard};

/// Device pixel ratio cap for the carousel canvas.
const MAX_PIXELS_PER_POINT: f32 = 2.0;

/// What the canvas does with the GPU this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CanvasAction {
    Paint,
    /// Device just went away: drop everything that lives on it.
    Release,
    Idle,
}

fn canvas_action(device_lost: bool, has_renderer: bool) -> CanvasAction {
    match (device_lost, has_renderer) {
        (false, true) => CanvasAction::Paint,
        (true, true) => CanvasAction::Release,
        (_, false) => CanvasAction::Idle,
    }
}

/// Hosts one carousel inside the egui frame: rebuilds it when its inputs
/// change, feeds it input, and paints its canvas.
pub struct GalleryWidget {
    fingerprint: Option<String>,
    carousel: Option<Carousel>,
    renderer: Option<CarouselRenderer>,
    rasterizer: CaptionRasterizer,
    loader: ImageLoader,
    images: HashMap<String, Option<Arc<RgbaImage>>>,
    selection_tx: Sender<GalleryItem>,
    selection_rx: Receiver<GalleryItem>,
    guard: ContextGuard,
    screen: Option<Screen>,
    texture_id: Option<egui::TextureId>,
    texture_revision: u64,
}

impl GalleryWidget {
    pub fn new(render_state: &RenderState, font_file: Option<&Path>) -> Result<Self> {
        let renderer =
            CarouselRenderer::new(render_state.device.clone(), render_state.queue.clone());
        let guard = ContextGuard::install(&render_state.device);
        let (selection_tx, selection_rx) = mpsc::channel();
        Ok(Self {
            fingerprint: None,
            carousel: None,
            renderer: Some(renderer),
            rasterizer: CaptionRasterizer::new(font_file)?,
            loader: ImageLoader::new(),
            images: HashMap::new(),
            selection_tx,
            selection_rx,
            guard,
            screen: None,
            texture_id: None,
            texture_revision: 0,
        })
    }

    /// Decoded image for `source`, `Some(None)` if it failed to load.
    pub fn image(&self, source: &str) -> Option<Option<Arc<RgbaImage>>> {
        self.images.get(source).cloned()
    }

    /// True once the device behind this widget is gone. The host must
    /// replace the widget with one built on a fresh device.
    pub fn is_context_lost(&self) -> bool {
        self.guard.is_lost()
    }

    /// Lays the widget out, runs one carousel frame and returns the item
    /// tapped during it, if any.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        render_state: &RenderState,
        items: &[GalleryItem],
        config: &CarouselConfig,
    ) -> Option<GalleryItem> {
        let width = ui.available_width();
        let height = config.height.resolve(ui.available_height());
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::click_and_drag());
        let screen = Screen::new(rect.width(), rect.height());
        let now = Instant::now();

        self.sync(items, config, screen);
        self.poll_images();

        let carousel = self.carousel.as_mut()?;
        if self.screen != Some(screen) {
            carousel.handle(InputEvent::Resize(screen), now);
            self.screen = Some(screen);
        }
        feed_input(ui.ctx(), carousel, rect, response.hovered(), now);
        carousel.tick(now);

        if carousel.is_dragging() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        }

        match canvas_action(self.guard.is_lost(), self.renderer.is_some()) {
            CanvasAction::Paint => {
                let ppp = ui.ctx().pixels_per_point().min(MAX_PIXELS_PER_POINT);
                let rendered = self
                    .renderer
                    .as_mut()
                    .is_some_and(|renderer| renderer.render(carousel, pixel_size(rect, ppp)));
                if rendered {
                    self.sync_texture(render_state);
                }
                if let Some(texture_id) = self.texture_id {
                    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    ui.painter()
                        .image(texture_id, rect, uv, egui::Color32::WHITE);
                }
            }
            CanvasAction::Release => self.release_gpu(render_state),
            CanvasAction::Idle => {}
        }

        self.selection_rx.try_iter().last()
    }

    fn sync(&mut self, items: &[GalleryItem], config: &CarouselConfig, screen: Screen) {
        let fingerprint = config.fingerprint(items);
        if self.fingerprint.as_deref() == Some(fingerprint.as_str()) {
            return;
        }
        if let Some(mut old) = self.carousel.take() {
            old.destroy();
        }

        let tx = self.selection_tx.clone();
        let mut carousel = Carousel::new(items, config, screen, &self.rasterizer)
            .with_on_select(move |item| {
                let _ = tx.send(item.clone());
            });
        for media in carousel.medias() {
            self.loader.request(&media.item().image);
        }
        for (source, image) in &self.images {
            if let Some(image) = image {
                carousel.set_image_size(source, image.width(), image.height());
            }
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.rebuild(&carousel, &self.rasterizer);
        }
        debug!(items = items.len(), "gallery rebuilt");

        self.carousel = Some(carousel);
        self.screen = Some(screen);
        self.fingerprint = Some(fingerprint);
    }

    fn poll_images(&mut self) {
        for loaded in self.loader.poll() {
            let image = loaded.image.ok();
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.set_image(&loaded.source, image.as_deref());
            }
            if let (Some(carousel), Some(image)) = (self.carousel.as_mut(), image.as_ref()) {
                carousel.set_image_size(&loaded.source, image.width(), image.height());
            }
            self.images.insert(loaded.source, image);
        }
    }

    fn sync_texture(&mut self, render_state: &RenderState) {
        let Some(target) = self.renderer.as_ref() else {
            return;
        };
        let revision = target.target_revision();
        if self.texture_revision == revision && self.texture_id.is_some() {
            return;
        }

        let view = target.target_view();
        let mut renderer = render_state.renderer.write();
        let texture_id = if let Some(id) = self.texture_id {
            renderer.update_egui_texture_from_wgpu_texture(
                &render_state.device,
                view,
                wgpu::FilterMode::Linear,
                id,
            );
            id
        } else {
            renderer.register_native_texture(&render_state.device, view, wgpu::FilterMode::Linear)
        };
        self.texture_id = Some(texture_id);
        self.texture_revision = revision;
    }

    /// Stops the carousel and releases the canvas texture. Safe to repeat.
    pub fn destroy(&mut self, render_state: &RenderState) {
        if let Some(mut carousel) = self.carousel.take() {
            carousel.destroy();
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.clear();
        }
        self.free_texture(render_state);
        self.fingerprint = None;
        self.screen = None;
    }

    fn release_gpu(&mut self, render_state: &RenderState) {
        warn!("dropping carousel gpu resources after device loss");
        self.renderer = None;
        self.free_texture(render_state);
    }

    fn free_texture(&mut self, render_state: &RenderState) {
        if let Some(id) = self.texture_id.take() {
            render_state.renderer.write().free_texture(&id);
        }
    }
}

/// Translates egui pointer and wheel state into carousel events. Presses
/// and wheel ticks count only over the widget; moves and releases follow
/// an active drag anywhere.
fn feed_input(
    ctx: &egui::Context,
    carousel: &mut Carousel,
    rect: egui::Rect,
    hovered: bool,
    now: Instant,
) {
    let (pointer, pressed, released, scroll) = ctx.input(|i| {
        (
            i.pointer.interact_pos(),
            i.pointer.button_pressed(egui::PointerButton::Primary),
            i.pointer.button_released(egui::PointerButton::Primary),
            i.raw_scroll_delta.y,
        )
    });
    let local_x = pointer.map(|pos| pos.x - rect.min.x);

    if hovered && scroll != 0.0 {
        carousel.handle(InputEvent::Wheel { delta: -scroll }, now);
    }
    if pressed {
        if let Some(pos) = pointer.filter(|_| hovered) {
            carousel.handle(
                InputEvent::PointerDown {
                    x: pos.x - rect.min.x,
                },
                now,
            );
        }
    }
    if carousel.is_dragging() {
        if let Some(x) = local_x {
            carousel.handle(InputEvent::PointerMove { x }, now);
        }
        if released {
            carousel.handle(InputEvent::PointerUp { x: local_x }, now);
        }
    }
}

fn pixel_size(rect: egui::Rect, pixels_per_point: f32) -> [u32; 2] {
    let width = (rect.width() * pixels_per_point).round().max(1.0) as u32;
    let height = (rect.height() * pixels_per_point).round().max(1.0) as u32;
    [width, height]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_device_releases_once_and_stays_idle() {
        assert_eq!(canvas_action(false, true), CanvasAction::Paint);
        assert_eq!(canvas_action(true, true), CanvasAction::Release);
        // Nothing a resize does can bring the released renderer back.
        assert_eq!(canvas_action(true, false), CanvasAction::Idle);
        assert_eq!(canvas_action(false, false), CanvasAction::Idle);
    }

    #[test]
    fn pixel_size_rounds_and_never_collapses() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.4, 0.0));
        assert_eq!(pixel_size(rect, 2.0), [201, 1]);
    }
}
