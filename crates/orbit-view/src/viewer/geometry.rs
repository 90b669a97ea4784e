use bytemuck::{Pod, Zeroable};

/// Segments of a slide plane. The ripple needs the density.
pub const SLIDE_SEGMENTS: (u32, u32) = (100, 50);

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PlaneVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl PlaneVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Unit plane centred on the origin in the xy plane, `v` running top to
/// bottom so images land upright.
#[derive(Clone, Debug)]
pub struct PlaneGeometry {
    pub vertices: Vec<PlaneVertex>,
    pub indices: Vec<u32>,
}

pub fn plane(segments_x: u32, segments_y: u32) -> PlaneGeometry {
    let sx = segments_x.max(1);
    let sy = segments_y.max(1);
    let mut vertices = Vec::with_capacity(((sx + 1) * (sy + 1)) as usize);
    for row in 0..=sy {
        let v = row as f32 / sy as f32;
        for col in 0..=sx {
            let u = col as f32 / sx as f32;
            vertices.push(PlaneVertex {
                position: [u - 0.5, 0.5 - v, 0.0],
                uv: [u, v],
            });
        }
    }

    let stride = sx + 1;
    let mut indices = Vec::with_capacity((sx * sy * 6) as usize);
    for row in 0..sy {
        for col in 0..sx {
            let a = row * stride + col;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    PlaneGeometry { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_plane_counts() {
        let (sx, sy) = SLIDE_SEGMENTS;
        let geometry = plane(sx, sy);
        assert_eq!(geometry.vertices.len(), 101 * 51);
        assert_eq!(geometry.indices.len(), 100 * 50 * 6);
        let max = geometry.vertices.len() as u32;
        assert!(geometry.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn corners_map_to_texture_corners() {
        let geometry = plane(1, 1);
        assert_eq!(geometry.vertices[0].position, [-0.5, 0.5, 0.0]);
        assert_eq!(geometry.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(geometry.vertices[3].position, [0.5, -0.5, 0.0]);
        assert_eq!(geometry.vertices[3].uv, [1.0, 1.0]);
    }

    #[test]
    fn triangles_face_the_camera() {
        let geometry = plane(1, 1);
        let p = |i: u32| geometry.vertices[i as usize].position;
        for tri in geometry.indices.chunks(3) {
            let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross > 0.0);
        }
    }
}
