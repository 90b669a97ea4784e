use std::sync::Arc;

use image::RgbaImage;
use orbit_core::GalleryItem;

use crate::viewer::max_side;

const IMAGE_FRACTION: f32 = 0.8;

/// Modal showing the tapped photo at full size with its caption.
#[derive(Default)]
pub struct DetailOverlay {
    item: Option<GalleryItem>,
    texture: Option<(String, egui::TextureHandle)>,
}

impl DetailOverlay {
    pub fn open(&mut self, item: GalleryItem) {
        self.item = Some(item);
    }

    pub fn close(&mut self) {
        self.item = None;
        self.texture = None;
    }

    pub fn is_open(&self) -> bool {
        self.item.is_some()
    }

    pub fn item(&self) -> Option<&GalleryItem> {
        self.item.as_ref()
    }

    /// `image` is the loader's view of the item's source: `None` while
    /// pending, `Some(None)` when it failed.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        window: egui::Vec2,
        image: Option<Option<Arc<RgbaImage>>>,
    ) {
        let Some(item) = self.item.clone() else {
            return;
        };
        let cached = self
            .texture
            .as_ref()
            .is_some_and(|(source, _)| *source == item.image);
        if !cached {
            self.texture = image
                .clone()
                .flatten()
                .map(|image| (item.image.clone(), load_texture(ctx, &image)));
        }

        let max = window * IMAGE_FRACTION;
        let response = egui::Modal::new(egui::Id::new("orbit-detail")).show(ctx, |ui| {
            match (&self.texture, &image) {
                (Some((_, texture)), _) => {
                    ui.add(
                        egui::Image::new(texture)
                            .max_size(max)
                            .maintain_aspect_ratio(true),
                    );
                }
                (None, Some(None)) => {
                    ui.label("Image unavailable");
                }
                _ => {
                    ui.spinner();
                }
            }
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(&item.text);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.button("Close").clicked()
                })
                .inner
            })
            .inner
        });

        if response.inner || response.should_close() {
            self.close();
        }
    }
}

fn load_texture(ctx: &egui::Context, image: &RgbaImage) -> egui::TextureHandle {
    let limit = ctx.input(|i| i.max_texture_side) as u32;
    let fitted = max_side(image, limit);
    let (width, height) = fitted.dimensions();
    let color =
        egui::ColorImage::from_rgba_unmultiplied([width as usize, height as usize], fitted.as_raw());
    ctx.load_texture("orbit-detail", color, egui::TextureOptions::LINEAR)
}
