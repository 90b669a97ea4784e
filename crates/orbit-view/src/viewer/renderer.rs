use std::borrow::Cow;
use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use orbit_core::Carousel;
use tracing::debug;
use wgpu::util::DeviceExt;

use super::geometry::{PlaneVertex, SLIDE_SEGMENTS, plane};
use super::math::{mvp, view_projection};
use super::text::CaptionRasterizer;
use super::textures::{FAILED_PIXEL, GpuTexture, PENDING_PIXEL, TextureBinding, max_side};

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SlideGpu {
    mvp: [[f32; 4]; 4],
    image_size: [f32; 2],
    plane_size: [f32; 2],
    time: f32,
    speed: f32,
    border_radius: f32,
    _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct LabelGpu {
    mvp: [[f32; 4]; 4],
}

struct Mesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    count: u32,
}

struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct SlideResources {
    image: String,
    slide: UniformSlot,
    label: UniformSlot,
    caption: GpuTexture,
}

enum ImageState {
    Ready(GpuTexture),
    Failed,
}

/// Draws a carousel into an off-screen target that the UI samples as a
/// native texture.
pub struct CarouselRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    slide_pipeline: wgpu::RenderPipeline,
    label_pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    slide_mesh: Mesh,
    label_mesh: Mesh,
    pending: GpuTexture,
    failed: GpuTexture,
    images: HashMap<String, ImageState>,
    slides: Vec<SlideResources>,
    target: RenderTarget,
    target_revision: u64,
}

impl CarouselRenderer {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orbit-uniforms"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orbit-texture"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("orbit-linear-clamp"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("orbit-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let slide_pipeline = create_pipeline(
            &device,
            &layout,
            "orbit-slide",
            include_str!("shaders/slide.wgsl"),
        );
        let label_pipeline = create_pipeline(
            &device,
            &layout,
            "orbit-label",
            include_str!("shaders/label.wgsl"),
        );

        let (sx, sy) = SLIDE_SEGMENTS;
        let slide_mesh = create_mesh(&device, "orbit-slide-plane", sx, sy);
        let label_mesh = create_mesh(&device, "orbit-label-plane", 1, 1);

        let binding = TextureBinding {
            device: &device,
            queue: &queue,
            layout: &texture_layout,
            sampler: &sampler,
        };
        let pending = binding.solid("orbit-pending", PENDING_PIXEL);
        let failed = binding.solid("orbit-failed", FAILED_PIXEL);
        let target = RenderTarget::new(&device, [1, 1]);

        Self {
            device,
            queue,
            slide_pipeline,
            label_pipeline,
            uniform_layout,
            texture_layout,
            sampler,
            slide_mesh,
            label_mesh,
            pending,
            failed,
            images: HashMap::new(),
            slides: Vec::new(),
            target,
            target_revision: 0,
        }
    }

    fn binding(&self) -> TextureBinding<'_> {
        TextureBinding {
            device: &self.device,
            queue: &self.queue,
            layout: &self.texture_layout,
            sampler: &self.sampler,
        }
    }

    /// Recreates per-slide buffers and caption textures for a fresh carousel.
    /// Image textures survive, they are keyed by source.
    pub fn rebuild(&mut self, carousel: &Carousel, rasterizer: &CaptionRasterizer) {
        let limit = self.device.limits().max_texture_dimension_2d;
        let slides = carousel
            .medias()
            .iter()
            .map(|media| {
                let canvas =
                    rasterizer.rasterize(media.label(), carousel.font(), carousel.text_color());
                let fitted = max_side(&canvas, limit);
                SlideResources {
                    image: media.item().image.clone(),
                    slide: self.uniform_slot("orbit-slide-uniforms", &SlideGpu::zeroed()),
                    label: self.uniform_slot("orbit-label-uniforms", &LabelGpu::zeroed()),
                    caption: self.binding().upload("orbit-caption", &fitted),
                }
            })
            .collect();
        self.slides = slides;
        debug!(slides = self.slides.len(), "carousel gpu resources rebuilt");
    }

    /// Drops per-slide resources; image textures are kept for the next build.
    pub fn clear(&mut self) {
        self.slides.clear();
    }

    /// Uploads a decoded image, or records that it failed so slides show
    /// the neutral placeholder.
    pub fn set_image(&mut self, source: &str, image: Option<&RgbaImage>) {
        let state = match image {
            Some(image) if image.width() > 0 && image.height() > 0 => {
                let limit = self.device.limits().max_texture_dimension_2d;
                let fitted: Cow<'_, RgbaImage> = max_side(image, limit);
                ImageState::Ready(self.binding().upload("orbit-image", &fitted))
            }
            _ => ImageState::Failed,
        };
        self.images.insert(source.to_string(), state);
    }

    fn uniform_slot<T: Pod>(&self, label: &str, initial: &T) -> UniformSlot {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(initial),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        UniformSlot { buffer, bind_group }
    }

    /// Renders one frame at `size` physical pixels. Returns false when the
    /// resources do not match the carousel.
    pub fn render(&mut self, carousel: &Carousel, size: [u32; 2]) -> bool {
        if self.slides.len() != carousel.medias().len() || size[0] == 0 || size[1] == 0 {
            return false;
        }
        self.ensure_target(size);

        let view_projection = view_projection(carousel.camera());
        for (slot, media) in self.slides.iter().zip(carousel.medias()) {
            let uniforms = media.uniforms();
            let slide = SlideGpu {
                mvp: mvp(&view_projection, media.placement()),
                image_size: uniforms.image_size,
                plane_size: uniforms.plane_size,
                time: uniforms.time,
                speed: uniforms.speed,
                border_radius: uniforms.border_radius,
                _pad: 0.0,
            };
            let label = LabelGpu {
                mvp: mvp(&view_projection, &media.label_placement()),
            };
            self.queue
                .write_buffer(&slot.slide.buffer, 0, bytemuck::bytes_of(&slide));
            self.queue
                .write_buffer(&slot.label.buffer, 0, bytemuck::bytes_of(&label));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("orbit-encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("orbit-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for slot in &self.slides {
                let image = match self.images.get(&slot.image) {
                    Some(ImageState::Ready(texture)) => &texture.bind_group,
                    Some(ImageState::Failed) => &self.failed.bind_group,
                    None => &self.pending.bind_group,
                };
                pass.set_pipeline(&self.slide_pipeline);
                pass.set_bind_group(0, &slot.slide.bind_group, &[]);
                pass.set_bind_group(1, image, &[]);
                draw(&mut pass, &self.slide_mesh);

                pass.set_pipeline(&self.label_pipeline);
                pass.set_bind_group(0, &slot.label.bind_group, &[]);
                pass.set_bind_group(1, &slot.caption.bind_group, &[]);
                draw(&mut pass, &self.label_mesh);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        true
    }

    pub fn target_view(&self) -> &wgpu::TextureView {
        &self.target.view
    }

    pub fn target_revision(&self) -> u64 {
        self.target_revision
    }

    fn ensure_target(&mut self, size: [u32; 2]) {
        if self.target.size != size {
            self.target = RenderTarget::new(&self.device, size);
            self.target_revision = self.target_revision.wrapping_add(1);
        }
    }
}

fn draw(pass: &mut wgpu::RenderPass<'_>, mesh: &Mesh) {
    pass.set_vertex_buffer(0, mesh.vertices.slice(..));
    pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
    pass.draw_indexed(0..mesh.count, 0, 0..1);
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    label: &str,
    source: &str,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[PlaneVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: TARGET_FORMAT,
                blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}

fn create_mesh(device: &wgpu::Device, label: &str, segments_x: u32, segments_y: u32) -> Mesh {
    let geometry = plane(segments_x, segments_y);
    let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&geometry.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&geometry.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    Mesh {
        vertices,
        indices,
        count: geometry.indices.len() as u32,
    }
}

struct RenderTarget {
    size: [u32; 2],
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, size: [u32; 2]) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("orbit-canvas"),
            size: wgpu::Extent3d {
                width: size[0].max(1),
                height: size[1].max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            size,
            _texture: texture,
            view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layouts_match_the_shaders() {
        assert_eq!(std::mem::size_of::<SlideGpu>(), 96);
        assert_eq!(std::mem::size_of::<LabelGpu>(), 64);
        assert_eq!(std::mem::size_of::<PlaneVertex>(), 20);
    }
}
