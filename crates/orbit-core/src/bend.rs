/// Vertical offset and z rotation of a slide on the bent track.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BendPlacement {
    pub y: f32,
    pub rotation: f32,
}

/// Places a slide centred at horizontal offset `x` on the circle whose chord
/// spans the viewport (`half_width` either side of the centre) with sagitta
/// `|bend|`. Positive bend curves the ends up, negative curves them down.
pub fn bend_placement(x: f32, half_width: f32, bend: f32) -> BendPlacement {
    if bend == 0.0 || !(half_width > 0.0) {
        return BendPlacement::default();
    }
    let b = bend.abs();
    let radius = (half_width * half_width + b * b) / (2.0 * b);
    let effective_x = x.abs().min(half_width);
    let arc = radius - (radius * radius - effective_x * effective_x).max(0.0).sqrt();
    let angle = (effective_x / radius).clamp(-1.0, 1.0).asin();
    let side = sign(x);
    if bend > 0.0 {
        BendPlacement {
            y: -arc,
            rotation: -side * angle,
        }
    } else {
        BendPlacement {
            y: arc,
            rotation: side * angle,
        }
    }
}

// Math.sign semantics: zero maps to zero.
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_track_when_bend_is_zero() {
        for x in [-30.0, -1.0, 0.0, 2.5, 40.0] {
            assert_eq!(bend_placement(x, 16.0, 0.0), BendPlacement::default());
        }
    }

    #[test]
    fn centred_slide_sits_on_the_chord() {
        let placement = bend_placement(0.0, 16.0, 3.0);
        assert_eq!(placement.y, 0.0);
        assert_eq!(placement.rotation, 0.0);
    }

    #[test]
    fn edge_of_viewport_drops_by_full_bend() {
        let placement = bend_placement(16.0, 16.0, 3.0);
        assert!((placement.y + 3.0).abs() < 1.0e-3);
        assert!(placement.rotation < 0.0);
    }

    #[test]
    fn negative_bend_mirrors_vertically() {
        let up = bend_placement(-8.0, 16.0, 3.0);
        let down = bend_placement(-8.0, 16.0, -3.0);
        assert!((up.y + down.y).abs() < 1.0e-6);
        assert!((up.rotation + down.rotation).abs() < 1.0e-6);
        assert!(up.rotation > 0.0);
    }

    #[test]
    fn offsets_beyond_viewport_are_clamped() {
        let edge = bend_placement(16.0, 16.0, 3.0);
        let far = bend_placement(50.0, 16.0, 3.0);
        assert_eq!(edge, far);
    }
}
