use std::time::{Duration, Instant};

use serde::Serialize;

/// Quiet period after the last wheel event before the track settles.
pub const SETTLE_DELAY: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScrollState {
    pub current: f32,
    pub target: f32,
    pub last: f32,
    pub ease: f32,
    /// `current` captured when a drag began.
    pub position: f32,
}

impl ScrollState {
    pub fn new(ease: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            last: 0.0,
            ease,
            position: 0.0,
        }
    }

    /// First-order low-pass step of `current` toward `target`.
    pub fn advance(&mut self) {
        self.current += (self.target - self.current) * self.ease;
    }

    pub fn direction(&self) -> Direction {
        if self.current > self.last {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    pub fn speed(&self) -> f32 {
        self.current - self.last
    }

    pub fn commit(&mut self) {
        self.last = self.current;
    }

    /// Rounds `target` to the nearest whole item, keeping its sign.
    pub fn snap(&mut self, item_width: f32) {
        if !(item_width.is_finite() && item_width > 0.0) {
            return;
        }
        let index = (self.target.abs() / item_width).round();
        let item = item_width * index;
        self.target = if self.target < 0.0 { -item } else { item };
    }
}

/// Single-shot debounce deadline, re-armed by every wheel event.
#[derive(Clone, Copy, Debug, Default)]
pub struct SettleTimer {
    deadline: Option<Instant>,
}

impl SettleTimer {
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + SETTLE_DELAY);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once when the deadline has passed; disarms itself.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_closes_ease_fraction_of_gap() {
        let mut scroll = ScrollState::new(0.05);
        scroll.target = 10.0;
        scroll.advance();
        assert!((scroll.current - 0.5).abs() < 1.0e-6);
        scroll.advance();
        assert!((scroll.current - 0.975).abs() < 1.0e-6);
    }

    #[test]
    fn direction_compares_with_last_frame() {
        let mut scroll = ScrollState::new(0.05);
        scroll.target = 1.0;
        scroll.advance();
        assert_eq!(scroll.direction(), Direction::Right);
        scroll.commit();
        scroll.target = -1.0;
        scroll.advance();
        assert_eq!(scroll.direction(), Direction::Left);
    }

    #[test]
    fn snap_keeps_sign() {
        let mut scroll = ScrollState::new(0.05);
        scroll.target = -14.0;
        scroll.snap(10.0);
        assert_eq!(scroll.target, -10.0);
        scroll.target = 16.0;
        scroll.snap(10.0);
        assert_eq!(scroll.target, 20.0);
    }

    #[test]
    fn timer_resets_and_fires_once() {
        let start = Instant::now();
        let mut timer = SettleTimer::default();
        timer.arm(start);
        timer.arm(start + Duration::from_millis(150));
        assert!(!timer.fire(start + Duration::from_millis(250)));
        assert!(timer.fire(start + Duration::from_millis(350)));
        assert!(!timer.fire(start + Duration::from_millis(400)));
    }
}
