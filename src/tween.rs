//! Time-driven value tweens for camera zoom and pans.

use bevy::math::Vec2;

/// Cubic ease-out, the curve the camera tweens and feedback rings use.
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub trait Interpolate: Copy {
    fn interpolate(self, to: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for Vec2 {
    fn interpolate(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    from: T,
    to: T,
    elapsed: f32,
    duration: f32,
}

impl<T: Interpolate> Tween<T> {
    /// A tween over `duration` seconds. Zero or invalid durations finish on the first advance.
    pub fn new(from: T, to: T, duration: f32) -> Self {
        let duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        Self {
            from,
            to,
            elapsed: 0.0,
            duration,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn value(&self) -> T {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = ease_out_cubic(self.elapsed / self.duration);
        self.from.interpolate(self.to, t)
    }

    /// Advances by `dt` seconds and returns the eased value.
    pub fn advance(&mut self, dt: f32) -> T {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_out_hits_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn tween_reaches_target_exactly() {
        let mut tween = Tween::new(1.0_f32, 3.0, 0.5);
        let mid = tween.advance(0.25);
        assert!(mid > 2.0 && mid < 3.0);
        assert!(!tween.is_finished());

        assert_eq!(tween.advance(1.0), 3.0);
        assert!(tween.is_finished());
    }

    #[test]
    fn zero_duration_tween_jumps() {
        let mut tween = Tween::new(Vec2::ZERO, Vec2::new(4.0, 2.0), 0.0);
        assert_eq!(tween.advance(0.0), Vec2::new(4.0, 2.0));
        assert!(tween.is_finished());
    }
}
