use anyhow::Result;
use egui_wgpu::winit::Painter;
use egui_wgpu::{RenderState, RendererOptions, WgpuConfiguration, WgpuSetup, WgpuSetupCreateNew};
use egui_winit::State as EguiWinitState;
use orbit_core::{CarouselConfig, GalleryItem};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::raw_window_handle::HasDisplayHandle;
use winit::window::Window;

use super::overlay::DetailOverlay;
use super::params::CarouselParams;
use super::widget::GalleryWidget;

/// Narrower windows get the selection callback but no detail overlay.
const DESKTOP_MIN_WIDTH: f32 = 1024.0;

/// Minimum spacing between attempts to rebuild the GPU stack after loss.
const RECOVERY_INTERVAL: Duration = Duration::from_secs(1);

/// Everything bound to one wgpu device. Rebuilt as a unit when the device
/// is lost.
struct Gpu {
    ctx: egui::Context,
    painter: Painter,
    render_state: RenderState,
    egui_state: EguiWinitState,
    clear_color: [f32; 4],
}

impl Gpu {
    fn new(display: &dyn HasDisplayHandle, window: &Arc<Window>) -> Result<Self> {
        let ctx = egui::Context::default();
        let mut painter = create_painter(ctx.clone())?;
        pollster::block_on(painter.set_window(egui::ViewportId::ROOT, Some(window.clone())))
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
        let render_state = painter
            .render_state()
            .ok_or_else(|| anyhow::anyhow!("wgpu render state not initialized"))?;
        let egui_state = EguiWinitState::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            display,
            Some(window.scale_factor() as f32),
            window.theme(),
            painter.max_texture_side(),
        );
        let [r, g, b, a] = ctx.style().visuals.window_fill.to_array();
        let clear_color = [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ];
        Ok(Self {
            ctx,
            painter,
            render_state,
            egui_state,
            clear_color,
        })
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        {
            self.painter
                .on_window_resized(egui::ViewportId::ROOT, width, height);
        }
    }
}

pub fn run_gui(
    items: Vec<GalleryItem>,
    config: CarouselConfig,
    font_file: Option<PathBuf>,
) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow::anyhow!(err.to_string()))?;
    let window = event_loop
        .create_window(
            Window::default_attributes()
                .with_title("Orbit Gallery")
                .with_inner_size(LogicalSize::new(1280.0, 800.0))
                .with_min_inner_size(LogicalSize::new(480.0, 360.0)),
        )
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    let window = Arc::new(window);

    let mut gpu = Gpu::new(&event_loop, &window)?;
    let mut app = OrbitApp::new(&gpu.render_state, items, config, font_file)?;
    info!(
        adapter = %gpu.render_state.adapter.get_info().name,
        "gallery window ready"
    );
    let mut last_recovery: Option<Instant> = None;

    #[allow(deprecated)]
    event_loop
        .run(move |event, event_loop| {
            event_loop.set_control_flow(ControlFlow::Poll);
            match event {
                Event::Resumed => {
                    if app.is_context_lost() {
                        last_recovery = None;
                    }
                }
                Event::WindowEvent { event, window_id } if window_id == window.id() => {
                    if matches!(event, WindowEvent::CloseRequested) {
                        app.shutdown(&gpu.render_state);
                        event_loop.exit();
                        return;
                    }

                    let response = gpu.egui_state.on_window_event(&window, &event);
                    if response.repaint {
                        window.request_redraw();
                    }

                    match event {
                        WindowEvent::Resized(size) => gpu.resize(size),
                        WindowEvent::ScaleFactorChanged { .. } => gpu.resize(window.inner_size()),
                        WindowEvent::RedrawRequested => {
                            if app.is_context_lost() {
                                let now = Instant::now();
                                let due = last_recovery
                                    .is_none_or(|at| now.duration_since(at) >= RECOVERY_INTERVAL);
                                if due {
                                    last_recovery = Some(now);
                                    recover(event_loop, &window, &mut gpu, &mut app);
                                }
                                return;
                            }

                            let logical = window
                                .inner_size()
                                .to_logical::<f32>(window.scale_factor());
                            let window_size = egui::vec2(logical.width, logical.height);

                            let raw_input = gpu.egui_state.take_egui_input(&window);
                            let full_output = gpu.ctx.run(raw_input, |ctx| {
                                app.ui(ctx, &gpu.render_state, window_size);
                            });

                            gpu.egui_state
                                .handle_platform_output(&window, full_output.platform_output);

                            let clipped_primitives = gpu
                                .ctx
                                .tessellate(full_output.shapes, full_output.pixels_per_point);
                            let _ = gpu.painter.paint_and_update_textures(
                                egui::ViewportId::ROOT,
                                full_output.pixels_per_point,
                                gpu.clear_color,
                                &clipped_primitives,
                                &full_output.textures_delta,
                                Vec::new(),
                            );
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;

    Ok(())
}

/// Replaces the painter, egui context and widget with ones built on a new
/// device. On failure the old, paused stack stays in place for a retry.
fn recover(
    display: &dyn HasDisplayHandle,
    window: &Arc<Window>,
    gpu: &mut Gpu,
    app: &mut OrbitApp,
) {
    match Gpu::new(display, window) {
        Ok(mut fresh) => {
            fresh.resize(window.inner_size());
            if let Err(err) = app.reattach(&gpu.render_state, &fresh.render_state) {
                warn!("gpu recovery failed: {err:#}");
                return;
            }
            drop(std::mem::replace(gpu, fresh));
            info!(
                adapter = %gpu.render_state.adapter.get_info().name,
                "gpu context rebuilt"
            );
        }
        Err(err) => warn!("gpu recovery failed: {err:#}"),
    }
}

fn power_preference(value: Option<&str>) -> wgpu::PowerPreference {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("high" | "high_performance" | "high-performance") => {
            wgpu::PowerPreference::HighPerformance
        }
        Some("default") => wgpu::PowerPreference::default(),
        _ => wgpu::PowerPreference::LowPower,
    }
}

fn create_painter(ctx: egui::Context) -> Result<Painter> {
    let mut configuration = WgpuConfiguration::default();
    let power_preference = power_preference(std::env::var("ORBIT_POWER_PREF").ok().as_deref());
    configuration.wgpu_setup = WgpuSetup::CreateNew(WgpuSetupCreateNew {
        power_preference,
        device_descriptor: Arc::new(|adapter| {
            let required_limits =
                wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());
            wgpu::DeviceDescriptor {
                label: Some("orbit-view"),
                required_features: wgpu::Features::empty(),
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::default(),
            }
        }),
        ..Default::default()
    });

    let painter = pollster::block_on(Painter::new(
        ctx,
        configuration,
        false,
        RendererOptions::default(),
    ));
    Ok(painter)
}

struct OrbitApp {
    widget: GalleryWidget,
    font_file: Option<PathBuf>,
    items: Vec<GalleryItem>,
    config: CarouselConfig,
    params: CarouselParams,
    rejected: Vec<String>,
    overlay: DetailOverlay,
}

impl OrbitApp {
    fn new(
        render_state: &RenderState,
        items: Vec<GalleryItem>,
        config: CarouselConfig,
        font_file: Option<PathBuf>,
    ) -> Result<Self> {
        let widget = GalleryWidget::new(render_state, font_file.as_deref())?;
        let params = CarouselParams::from_config(&config);
        Ok(Self {
            widget,
            font_file,
            items,
            config,
            params,
            rejected: Vec::new(),
            overlay: DetailOverlay::default(),
        })
    }

    fn ui(&mut self, ctx: &egui::Context, render_state: &RenderState, window: egui::Vec2) {
        egui::SidePanel::left("side_panel")
            .resizable(false)
            .exact_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(8.0, 8.0);
                    ui.add_space(12.0);
                    ui.group(|ui| self.carousel_panel(ui));
                    ui.add_space(20.0);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let selected = self
                .widget
                .show(ui, render_state, &self.items, &self.config);
            if let Some(item) = selected {
                info!(image = %item.image, text = %item.text, "gallery item selected");
                if window.x >= DESKTOP_MIN_WIDTH {
                    self.overlay.open(item);
                }
            }
        });

        if self.overlay.is_open() {
            let image = self
                .overlay_source()
                .and_then(|source| self.widget.image(&source));
            self.overlay.show(ctx, window, image);
        }
    }

    fn overlay_source(&self) -> Option<String> {
        self.overlay.item().map(|item| item.image.clone())
    }

    fn carousel_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Carousel");
        ui.add(egui::Slider::new(&mut self.config.bend, -10.0..=10.0).text("Bend"));
        ui.add(egui::Slider::new(&mut self.config.scroll_ease, 0.01..=1.0).text("Ease"));
        ui.add(egui::Slider::new(&mut self.config.scroll_speed, 0.0..=10.0).text("Scroll speed"));
        ui.add(egui::Slider::new(&mut self.config.border_radius, 0.0..=0.5).text("Corner radius"));

        let mut edited = false;
        ui.label("Text colour");
        edited |= ui
            .add(egui::TextEdit::singleline(&mut self.params.text_color))
            .changed();
        ui.label("Font");
        edited |= ui
            .add(egui::TextEdit::singleline(&mut self.params.font))
            .changed();
        ui.label("Height");
        edited |= ui
            .add(egui::TextEdit::singleline(&mut self.params.height))
            .changed();
        if edited {
            self.rejected = self.params.apply(&mut self.config);
        }
        for message in &self.rejected {
            ui.colored_label(ui.visuals().warn_fg_color, message);
        }

        ui.add_space(8.0);
        let count = if self.items.is_empty() {
            "built-in placeholders".to_string()
        } else {
            format!("{} items", self.items.len())
        };
        ui.label(count);
        if ui.button("Reset").clicked() {
            self.config = CarouselConfig::default();
            self.params = CarouselParams::from_config(&self.config);
            self.rejected.clear();
        }
    }

    fn is_context_lost(&self) -> bool {
        self.widget.is_context_lost()
    }

    /// Moves the gallery onto a new device. Items and settings carry over;
    /// the overlay's texture belonged to the old context so it is closed.
    fn reattach(&mut self, old: &RenderState, fresh: &RenderState) -> Result<()> {
        let widget = GalleryWidget::new(fresh, self.font_file.as_deref())?;
        self.widget.destroy(old);
        self.widget = widget;
        self.overlay.close();
        Ok(())
    }

    fn shutdown(&mut self, render_state: &RenderState) {
        self.overlay.close();
        self.widget.destroy(render_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_preference_parses_env_values() {
        assert_eq!(
            power_preference(Some(" High-Performance ")),
            wgpu::PowerPreference::HighPerformance
        );
        assert_eq!(
            power_preference(Some("default")),
            wgpu::PowerPreference::default()
        );
        assert_eq!(power_preference(Some("fast")), wgpu::PowerPreference::LowPower);
        assert_eq!(power_preference(None), wgpu::PowerPreference::LowPower);
    }
}
