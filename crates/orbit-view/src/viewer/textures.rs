use image::RgbaImage;
use image::imageops::{self, FilterType};
use std::borrow::Cow;

/// Shown while a slide's image is still loading.
pub const PENDING_PIXEL: [u8; 4] = [0, 0, 0, 0];
/// Substituted once a slide's image failed to load.
pub const FAILED_PIXEL: [u8; 4] = [128, 128, 128, 255];

/// A sampled texture plus the bind group that exposes it to the shaders.
pub struct GpuTexture {
    _texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

pub struct TextureBinding<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub layout: &'a wgpu::BindGroupLayout,
    pub sampler: &'a wgpu::Sampler,
}

impl TextureBinding<'_> {
    pub fn upload(&self, label: &str, image: &RgbaImage) -> GpuTexture {
        let (width, height) = image.dimensions();
        self.create(label, width.max(1), height.max(1), image.as_raw())
    }

    pub fn solid(&self, label: &str, pixel: [u8; 4]) -> GpuTexture {
        self.create(label, 1, 1, &pixel)
    }

    fn create(&self, label: &str, width: u32, height: u32, bytes: &[u8]) -> GpuTexture {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(self.sampler),
                },
            ],
        });
        GpuTexture {
            _texture: texture,
            bind_group,
        }
    }
}

/// Downscales images that exceed the device's texture limit, keeping aspect.
pub fn max_side(image: &RgbaImage, limit: u32) -> Cow<'_, RgbaImage> {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if longest <= limit || limit == 0 {
        return Cow::Borrowed(image);
    }
    let scale = limit as f64 / longest as f64;
    let w = ((width as f64 * scale).round() as u32).clamp(1, limit);
    let h = ((height as f64 * scale).round() as u32).clamp(1, limit);
    Cow::Owned(imageops::resize(image, w, h, FilterType::Triangle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_images_are_untouched() {
        let image = RgbaImage::new(640, 480);
        assert!(matches!(max_side(&image, 2048), Cow::Borrowed(_)));
    }

    #[test]
    fn large_images_keep_their_aspect() {
        let image = RgbaImage::new(4000, 1000);
        let fitted = max_side(&image, 2048);
        assert_eq!(fitted.dimensions(), (2048, 512));
    }
}
