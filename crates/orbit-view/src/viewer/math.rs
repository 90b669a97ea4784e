use cgmath::{Deg, Matrix4, Rad, Vector3, perspective};
use orbit_core::{Camera, Placement};

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

#[rustfmt::skip]
const OPENGL_TO_WGPU: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Perspective camera on the z axis looking at the origin.
pub fn view_projection(camera: &Camera) -> Matrix4<f32> {
    let projection = perspective(Deg(camera.fov_deg), camera.aspect.max(1.0e-3), NEAR, FAR);
    let view = Matrix4::from_translation(Vector3::new(0.0, 0.0, -camera.distance));
    OPENGL_TO_WGPU * projection * view
}

pub fn model(placement: &Placement) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(placement.x, placement.y, 0.0))
        * Matrix4::from_angle_z(Rad(placement.rotation))
        * Matrix4::from_nonuniform_scale(placement.scale_x, placement.scale_y, 1.0)
}

pub fn mvp(view_projection: &Matrix4<f32>, placement: &Placement) -> [[f32; 4]; 4] {
    (*view_projection * model(placement)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;
    use orbit_core::Screen;

    fn project(matrix: Matrix4<f32>, x: f32, y: f32) -> (f32, f32, f32) {
        let clip = matrix * Vector4::new(x, y, 0.0, 1.0);
        (clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
    }

    #[test]
    fn viewport_edges_land_on_clip_edges() {
        let mut camera = Camera::default();
        camera.set_aspect(Screen::new(1200.0, 600.0));
        let viewport = camera.viewport();
        let matrix = view_projection(&camera);

        let (x, y, z) = project(matrix, viewport.width / 2.0, viewport.height / 2.0);
        assert!((x - 1.0).abs() < 1.0e-4);
        assert!((y - 1.0).abs() < 1.0e-4);
        assert!((0.0..=1.0).contains(&z));
    }

    #[test]
    fn model_applies_scale_then_rotation_then_translation() {
        let placement = Placement {
            x: 2.0,
            y: -1.0,
            rotation: std::f32::consts::FRAC_PI_2,
            scale_x: 4.0,
            scale_y: 3.0,
        };
        let point = model(&placement) * Vector4::new(0.5, 0.0, 0.0, 1.0);
        assert!((point.x - 2.0).abs() < 1.0e-5);
        assert!((point.y - 1.0).abs() < 1.0e-5);
    }
}
