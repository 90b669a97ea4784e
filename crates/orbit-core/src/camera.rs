use serde::Serialize;

/// Container size in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Screen {
    pub width: f32,
    pub height: f32,
}

impl Screen {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Never zero-sized, so ratios against the screen stay finite.
    pub fn sanitized(self) -> Self {
        Self::new(sanitize(self.width), sanitize(self.height))
    }
}

/// Visible plane at z = 0, in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub fov_deg: f32,
    pub distance: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            distance: 20.0,
            aspect: 1.0,
        }
    }
}

impl Camera {
    pub fn set_aspect(&mut self, screen: Screen) {
        let screen = screen.sanitized();
        self.aspect = screen.width / screen.height;
    }

    pub fn viewport(&self) -> Viewport {
        let fov = self.fov_deg.to_radians();
        let height = 2.0 * (fov / 2.0).tan() * self.distance;
        Viewport {
            width: height * self.aspect,
            height,
        }
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() && value >= 1.0 {
        value
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_follows_fov_and_aspect() {
        let mut camera = Camera::default();
        camera.set_aspect(Screen::new(1200.0, 600.0));
        let viewport = camera.viewport();
        let expected_height = 2.0 * (22.5_f32).to_radians().tan() * 20.0;
        assert!((viewport.height - expected_height).abs() < 1.0e-4);
        assert!((viewport.width - expected_height * 2.0).abs() < 1.0e-4);
    }

    #[test]
    fn degenerate_screen_does_not_divide_by_zero() {
        let mut camera = Camera::default();
        camera.set_aspect(Screen::new(0.0, 0.0));
        assert!(camera.viewport().width.is_finite());
    }
}
