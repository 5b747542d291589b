//! Screen effects layered on top of the follow camera: shakes and full-screen overlays
//! (flash, fade out, fade in).

use std::time::Duration;

use bevy::color::Color;
use bevy::math::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Converts a `0xRRGGBB` literal to a color.
pub fn color_from_hex(hex: u32) -> Color {
    Color::srgb_u8(
        ((hex >> 16) & 0xff) as u8,
        ((hex >> 8) & 0xff) as u8,
        (hex & 0xff) as u8,
    )
}

fn seconds(duration: Duration) -> f32 {
    duration.as_secs_f32()
}

/// Random camera jitter. Each tick with time passing draws a fresh offset direction per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Shake {
    elapsed: f32,
    duration: f32,
    /// Fraction of the viewport size.
    intensity: f32,
    noise: Vec2,
    rng: ChaCha8Rng,
}

impl Shake {
    /// `intensity` uses the 0-100 scale of the debug controls; 5 shakes by 5% of the viewport.
    pub fn new(duration: Duration, intensity: f32) -> Self {
        Self::seeded(duration, intensity, rand::random())
    }

    /// Same as [`Shake::new`] but replays the offsets of `seed`.
    pub fn seeded(duration: Duration, intensity: f32, seed: u64) -> Self {
        Self {
            elapsed: 0.0,
            duration: seconds(duration),
            intensity: intensity.max(0.0) * 0.01,
            noise: Vec2::ZERO,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.noise = Vec2::new(
            self.rng.random_range(-1.0..=1.0),
            self.rng.random_range(-1.0..=1.0),
        );
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Offset in world units for a viewport of `viewport` pixels at `zoom`.
    pub fn offset(&self, viewport: Vec2, zoom: f32) -> Vec2 {
        if self.is_finished() {
            return Vec2::ZERO;
        }
        self.noise * viewport * self.intensity / zoom
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayKind {
    Flash { peak_alpha: f32 },
    FadeOut,
    FadeIn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenOverlay {
    kind: OverlayKind,
    color: Color,
    timer: f32,
    duration: f32,
}

impl ScreenOverlay {
    pub fn flash(duration: Duration, color: Color, alpha: f32) -> Self {
        Self::new(
            OverlayKind::Flash {
                peak_alpha: alpha.clamp(0.0, 1.0),
            },
            duration,
            color,
        )
    }

    pub fn fade(duration: Duration, fade_out: bool, color: Color) -> Self {
        let kind = if fade_out {
            OverlayKind::FadeOut
        } else {
            OverlayKind::FadeIn
        };
        Self::new(kind, duration, color)
    }

    fn new(kind: OverlayKind, duration: Duration, color: Color) -> Self {
        Self {
            kind,
            color,
            timer: 0.0,
            duration: seconds(duration),
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn advance(&mut self, dt: f32) {
        self.timer = (self.timer + dt).min(self.duration);
    }

    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.timer / self.duration
        }
    }

    /// Overlay opacity (0.0 = transparent, 1.0 = fully covered).
    pub fn alpha(&self) -> f32 {
        let progress = self.progress();
        match self.kind {
            OverlayKind::Flash { peak_alpha } => peak_alpha * (1.0 - progress),
            OverlayKind::FadeOut => progress,
            OverlayKind::FadeIn => 1.0 - progress,
        }
    }

    /// A finished fade-out stays on screen until replaced.
    pub fn is_finished(&self) -> bool {
        match self.kind {
            OverlayKind::FadeOut => false,
            _ => self.timer >= self.duration,
        }
    }
}
