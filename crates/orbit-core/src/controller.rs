use std::fmt;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::camera::{Camera, Screen, Viewport};
use crate::color::Rgba;
use crate::config::CarouselConfig;
use crate::font::{FontSpec, TextMetrics, label_canvas_size};
use crate::input::{DRAG_STEP, DragState, InputEvent, WHEEL_STEP};
use crate::item::{GalleryItem, default_items};
use crate::media::{CaptionLabel, Media, Placement, SlideUniforms};
use crate::scroll::{Direction, ScrollState, SettleTimer};

type SelectHandler = Box<dyn FnMut(&GalleryItem)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Lifecycle {
    Running,
    Destroyed,
}

/// Scroll physics, input handling and per-frame placement of every slide.
///
/// The host drives it: events go through [`Carousel::handle`], and
/// [`Carousel::tick`] runs once per animation frame before rendering.
pub struct Carousel {
    camera: Camera,
    screen: Screen,
    viewport: Viewport,
    scroll: ScrollState,
    scroll_speed: f32,
    direction: Direction,
    medias: Vec<Media>,
    font: FontSpec,
    text_color: Rgba,
    drag: DragState,
    settle: SettleTimer,
    on_select: Option<SelectHandler>,
    lifecycle: Lifecycle,
    frames: u64,
}

impl fmt::Debug for Carousel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carousel")
            .field("screen", &self.screen)
            .field("viewport", &self.viewport)
            .field("scroll", &self.scroll)
            .field("medias", &self.medias.len())
            .field("lifecycle", &self.lifecycle)
            .field("frames", &self.frames)
            .finish()
    }
}

impl Carousel {
    pub fn new(
        items: &[GalleryItem],
        config: &CarouselConfig,
        screen: Screen,
        metrics: &dyn TextMetrics,
    ) -> Self {
        let config = config.clone().sanitized();
        let font = FontSpec::parse_or_default(&config.font);
        let text_color = Rgba::parse(&config.text_color).unwrap_or_else(|err| {
            tracing::warn!(%err, "caption colour falls back to white");
            Rgba::WHITE
        });

        let mut camera = Camera::default();
        let screen = screen.sanitized();
        camera.set_aspect(screen);
        let viewport = camera.viewport();

        let source = if items.is_empty() {
            default_items()
        } else {
            items.to_vec()
        };
        let doubled: Vec<GalleryItem> = source.iter().chain(source.iter()).cloned().collect();
        let count = doubled.len();
        let medias = doubled
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let width = metrics.text_width(&item.text, &font);
                let label = CaptionLabel::new(item.text.clone(), label_canvas_size(width, &font));
                Media::new(
                    item,
                    index,
                    count,
                    config.bend,
                    config.border_radius,
                    label,
                    screen,
                    viewport,
                )
            })
            .collect();
        debug!(items = source.len(), live = count, "carousel built");

        let mut carousel = Self {
            camera,
            screen,
            viewport,
            scroll: ScrollState::new(config.scroll_ease),
            scroll_speed: config.scroll_speed,
            direction: Direction::Left,
            medias,
            font,
            text_color,
            drag: DragState::default(),
            settle: SettleTimer::default(),
            on_select: None,
            lifecycle: Lifecycle::Running,
            frames: 0,
        };
        carousel.place_medias();
        carousel
    }

    pub fn on_select(&mut self, handler: impl FnMut(&GalleryItem) + 'static) {
        self.on_select = Some(Box::new(handler));
    }

    pub fn with_on_select(mut self, handler: impl FnMut(&GalleryItem) + 'static) -> Self {
        self.on_select(handler);
        self
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn medias(&self) -> &[Media] {
        &self.medias
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn text_color(&self) -> Rgba {
        self.text_color
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_down
    }

    pub fn is_settle_pending(&self) -> bool {
        self.settle.is_armed()
    }

    /// Width of one slide plus padding, the snapping unit.
    pub fn item_width(&self) -> Option<f32> {
        self.medias.first().map(Media::width)
    }

    /// Records decoded image dimensions for every slide showing `image`.
    pub fn set_image_size(&mut self, image: &str, width: u32, height: u32) {
        for media in self.medias.iter_mut().filter(|m| m.item().image == image) {
            media.set_image_size(width, height);
        }
    }

    /// The input port. Ignored once the carousel is destroyed.
    pub fn handle(&mut self, event: InputEvent, now: Instant) {
        if !self.is_running() {
            return;
        }
        match event {
            InputEvent::Resize(screen) => self.resize(screen),
            InputEvent::Wheel { delta } => self.wheel(delta, now),
            InputEvent::PointerDown { x } => self.pointer_down(x),
            InputEvent::PointerMove { x } => self.pointer_move(x),
            InputEvent::PointerUp { x } => self.pointer_up(x),
        }
    }

    fn wheel(&mut self, delta: f32, now: Instant) {
        if delta == 0.0 || !delta.is_finite() {
            return;
        }
        let step = if delta > 0.0 {
            self.scroll_speed
        } else {
            -self.scroll_speed
        };
        self.scroll.target += step * WHEEL_STEP;
        self.settle.arm(now);
    }

    fn pointer_down(&mut self, x: f32) {
        self.scroll.position = self.scroll.current;
        self.drag.press(x);
    }

    fn pointer_move(&mut self, x: f32) {
        if !self.drag.is_down {
            return;
        }
        let travel = self.drag.track(x);
        self.scroll.target = self.scroll.position + travel * (self.scroll_speed * DRAG_STEP);
    }

    fn pointer_up(&mut self, x: Option<f32>) {
        if !self.drag.is_down {
            return;
        }
        let dragged = self.drag.release(x);
        self.snap();
        if !dragged {
            self.select_at(self.drag.last_x);
        }
    }

    fn snap(&mut self) {
        if let Some(width) = self.item_width() {
            self.scroll.snap(width);
        }
    }

    /// Slide whose centre is horizontally closest to the container-relative
    /// pointer position.
    pub fn media_at(&self, pointer_x: f32) -> Option<&Media> {
        let world_x = (pointer_x / self.screen.width - 0.5) * self.viewport.width;
        self.medias.iter().min_by(|a, b| {
            let da = (a.placement().x - world_x).abs();
            let db = (b.placement().x - world_x).abs();
            da.total_cmp(&db)
        })
    }

    fn select_at(&mut self, pointer_x: f32) {
        let Some(item) = self.media_at(pointer_x).map(|m| m.item().clone()) else {
            return;
        };
        debug!(image = %item.image, "carousel item selected");
        if let Some(handler) = self.on_select.as_mut() {
            handler(&item);
        }
    }

    pub fn resize(&mut self, screen: Screen) {
        let screen = screen.sanitized();
        self.screen = screen;
        self.camera.set_aspect(screen);
        self.viewport = self.camera.viewport();
        for media in &mut self.medias {
            media.resize(self.screen, self.viewport);
        }
    }

    /// One animation frame: settle check, smoothing, slide placement.
    /// Returns false once destroyed, in which case nothing advances.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.is_running() {
            return false;
        }
        if self.settle.fire(now) {
            self.snap();
        }
        self.scroll.advance();
        self.direction = self.scroll.direction();
        self.place_medias();
        self.scroll.commit();
        self.frames += 1;
        true
    }

    fn place_medias(&mut self) {
        for media in &mut self.medias {
            media.update(&self.scroll, self.direction);
        }
    }

    /// Stops the frame loop and detaches input. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        self.lifecycle = Lifecycle::Destroyed;
        self.settle.cancel();
        self.drag = DragState::default();
        self.on_select = None;
        debug!(frames = self.frames, "carousel destroyed");
    }

    pub fn snapshot(&self) -> CarouselSnapshot {
        CarouselSnapshot {
            lifecycle: self.lifecycle,
            frames: self.frames,
            screen: self.screen,
            viewport: self.viewport,
            scroll: self.scroll,
            direction: self.direction,
            medias: self
                .medias
                .iter()
                .map(|media| MediaSnapshot {
                    index: media.index(),
                    image: media.item().image.clone(),
                    text: media.item().text.clone(),
                    x: media.x(),
                    extra: media.extra(),
                    placement: *media.placement(),
                    label: media.label_placement(),
                    uniforms: *media.uniforms(),
                })
                .collect(),
        }
    }
}

/// Serializable view of the carousel, used by the headless mode.
#[derive(Clone, Debug, Serialize)]
pub struct CarouselSnapshot {
    pub lifecycle: Lifecycle,
    pub frames: u64,
    pub screen: Screen,
    pub viewport: Viewport,
    pub scroll: ScrollState,
    pub direction: Direction,
    pub medias: Vec<MediaSnapshot>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MediaSnapshot {
    pub index: usize,
    pub image: String,
    pub text: String,
    pub x: f32,
    pub extra: f32,
    pub placement: Placement,
    pub label: Placement,
    pub uniforms: SlideUniforms,
}
