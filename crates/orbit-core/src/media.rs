use serde::Serialize;

use crate::bend::bend_placement;
use crate::camera::{Screen, Viewport};
use crate::item::GalleryItem;
use crate::scroll::{Direction, ScrollState};

const REFERENCE_HEIGHT: f32 = 1500.0;
const SLIDE_HEIGHT_PX: f32 = 900.0;
const SLIDE_WIDTH_PX: f32 = 700.0;
const SLIDE_PADDING: f32 = 2.0;
const TIME_STEP: f32 = 0.04;

const LABEL_HEIGHT_RATIO: f32 = 0.15;
const LABEL_GAP: f32 = 0.05;

/// Translation, z rotation and xy scale of a unit plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// Per-slide shader inputs, rewritten every tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SlideUniforms {
    pub image_size: [f32; 2],
    pub plane_size: [f32; 2],
    pub time: f32,
    pub speed: f32,
    pub border_radius: f32,
}

/// Caption plane. Its placement is expressed in the parent slide's unit
/// space, so it follows the slide through any bend or rotation.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionLabel {
    pub text: String,
    pub canvas_size: (u32, u32),
    local: Placement,
}

impl CaptionLabel {
    pub fn new(text: impl Into<String>, canvas_size: (u32, u32)) -> Self {
        let height = LABEL_HEIGHT_RATIO;
        Self {
            text: text.into(),
            canvas_size,
            local: Placement {
                x: 0.0,
                y: -0.5 - height * 0.5 - LABEL_GAP,
                rotation: 0.0,
                scale_x: height * aspect(canvas_size),
                scale_y: height,
            },
        }
    }

    /// Composes the local placement with the parent slide's. Width is
    /// corrected by the parent's aspect so the glyphs are not stretched.
    pub fn world(&self, parent: &Placement) -> Placement {
        let offset_x = self.local.x * parent.scale_x;
        let offset_y = self.local.y * parent.scale_y;
        let (sin, cos) = parent.rotation.sin_cos();
        let scale_y = self.local.scale_y * parent.scale_y;
        Placement {
            x: parent.x + offset_x * cos - offset_y * sin,
            y: parent.y + offset_x * sin + offset_y * cos,
            rotation: parent.rotation + self.local.rotation,
            scale_x: scale_y * aspect(self.canvas_size),
            scale_y,
        }
    }
}

fn aspect((width, height): (u32, u32)) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// One live slide of the (duplicated) track.
#[derive(Clone, Debug)]
pub struct Media {
    item: GalleryItem,
    index: usize,
    count: usize,
    bend: f32,
    screen: Screen,
    viewport: Viewport,
    placement: Placement,
    uniforms: SlideUniforms,
    label: CaptionLabel,
    scale: f32,
    padding: f32,
    width: f32,
    width_total: f32,
    x: f32,
    extra: f32,
    is_before: bool,
    is_after: bool,
}

impl Media {
    pub fn new(
        item: GalleryItem,
        index: usize,
        count: usize,
        bend: f32,
        border_radius: f32,
        label: CaptionLabel,
        screen: Screen,
        viewport: Viewport,
    ) -> Self {
        let mut media = Self {
            item,
            index,
            count,
            bend,
            screen,
            viewport,
            placement: Placement::default(),
            uniforms: SlideUniforms {
                image_size: [0.0, 0.0],
                plane_size: [0.0, 0.0],
                time: initial_phase(index),
                speed: 0.0,
                border_radius,
            },
            label,
            scale: 1.0,
            padding: SLIDE_PADDING,
            width: 0.0,
            width_total: 0.0,
            x: 0.0,
            extra: 0.0,
            is_before: false,
            is_after: false,
        };
        media.resize(screen, viewport);
        media
    }

    pub fn item(&self) -> &GalleryItem {
        &self.item
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn uniforms(&self) -> &SlideUniforms {
        &self.uniforms
    }

    pub fn label(&self) -> &CaptionLabel {
        &self.label
    }

    pub fn label_placement(&self) -> Placement {
        self.label.world(&self.placement)
    }

    /// Rest position on the unwrapped track.
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn extra(&self) -> f32 {
        self.extra
    }

    /// Slide width plus padding.
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn width_total(&self) -> f32 {
        self.width_total
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.uniforms.image_size = [width as f32, height as f32];
    }

    pub fn update(&mut self, scroll: &ScrollState, direction: Direction) {
        self.placement.x = self.x - scroll.current - self.extra;

        let half_width = self.viewport.width / 2.0;
        let bent = bend_placement(self.placement.x, half_width, self.bend);
        self.placement.y = bent.y;
        self.placement.rotation = bent.rotation;

        self.uniforms.speed = scroll.speed();
        self.uniforms.time += TIME_STEP;

        let plane_offset = self.placement.scale_x / 2.0;
        self.is_before = self.placement.x + plane_offset < -half_width;
        self.is_after = self.placement.x - plane_offset > half_width;
        if direction == Direction::Right && self.is_before {
            self.extra -= self.width_total;
            self.is_before = false;
            self.is_after = false;
        }
        if direction == Direction::Left && self.is_after {
            self.extra += self.width_total;
            self.is_before = false;
            self.is_after = false;
        }
    }

    pub fn resize(&mut self, screen: Screen, viewport: Viewport) {
        let screen = screen.sanitized();
        self.screen = screen;
        self.viewport = viewport;
        self.scale = screen.height / REFERENCE_HEIGHT;
        self.placement.scale_y =
            (viewport.height * (SLIDE_HEIGHT_PX * self.scale)) / screen.height;
        self.placement.scale_x = (viewport.width * (SLIDE_WIDTH_PX * self.scale)) / screen.width;
        self.uniforms.plane_size = [self.placement.scale_x, self.placement.scale_y];
        self.width = self.placement.scale_x + self.padding;
        self.width_total = self.width * self.count as f32;
        self.x = self.width * self.index as f32;
    }
}

// Spreads the ripple phase so neighbouring slides don't wave in lockstep.
fn initial_phase(index: usize) -> f32 {
    (index as f32 * 61.803_4) % 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            width: 32.0,
            height: 16.0,
        }
    }

    #[test]
    fn resize_derives_widths_from_viewport() {
        let label = CaptionLabel::new("Bridge", (120, 56));
        let media = Media::new(
            GalleryItem::new("a.jpg", "Bridge"),
            2,
            6,
            0.0,
            0.05,
            label,
            Screen::new(1200.0, 600.0),
            viewport(),
        );
        let expected_scale_x = 32.0 * (700.0 * 0.4) / 1200.0;
        assert!((media.placement().scale_x - expected_scale_x).abs() < 1.0e-5);
        assert!((media.width() - (expected_scale_x + 2.0)).abs() < 1.0e-5);
        assert!((media.x() - media.width() * 2.0).abs() < 1.0e-5);
        assert!((media.width_total() - media.width() * 6.0).abs() < 1.0e-4);
    }

    #[test]
    fn label_sits_below_slide_and_keeps_aspect() {
        let label = CaptionLabel::new("Bridge", (120, 60));
        let parent = Placement {
            x: 3.0,
            y: 1.0,
            rotation: 0.0,
            scale_x: 8.0,
            scale_y: 10.0,
        };
        let world = label.world(&parent);
        assert!((world.scale_y - 1.5).abs() < 1.0e-5);
        assert!((world.scale_x - 3.0).abs() < 1.0e-5);
        assert!((world.x - 3.0).abs() < 1.0e-5);
        let bottom_of_slide = parent.y - parent.scale_y / 2.0;
        assert!(world.y + world.scale_y / 2.0 < bottom_of_slide);
    }

    #[test]
    fn label_rotates_with_parent() {
        let label = CaptionLabel::new("x", (60, 60));
        let parent = Placement {
            x: 0.0,
            y: 0.0,
            rotation: std::f32::consts::FRAC_PI_2,
            scale_x: 1.0,
            scale_y: 1.0,
        };
        let world = label.world(&parent);
        assert!(world.x > 0.5);
        assert!(world.y.abs() < 1.0e-5);
        assert_eq!(world.rotation, parent.rotation);
    }
}
