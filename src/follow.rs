//! Follow camera: deadzone tracking with lookahead, clamped to the world bounds.
//!
//! `CameraRig` is plain state advanced by [`CameraRig::update`]; `camera.rs` owns the Bevy
//! side and copies the center and zoom into the render camera each frame.
//!
//! The follow lerp is a constant fraction per tick, not scaled by `dt`, so its apparent speed
//! depends on the frame rate.

use std::time::Duration;

use bevy::color::Color;
use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::effects::{ScreenOverlay, Shake};
use crate::math::{lerp_clamped, sanitize_dt, WorldBounds};
use crate::tween::Tween;

/// Tracked speed (px per tick) above which lookahead kicks in.
pub const LOOKAHEAD_THRESHOLD: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deadzone {
    pub width: f32,
    pub height: f32,
}

impl Deadzone {
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub lerp_factor: f32,
    pub lookahead_distance: f32,
    pub deadzone: Deadzone,
    pub world_bounds: WorldBounds,
    pub zoom: f32,
    pub viewport: ViewportSize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            lerp_factor: 0.08,
            lookahead_distance: 32.0,
            deadzone: Deadzone {
                width: 200.0,
                height: 150.0,
            },
            world_bounds: WorldBounds::default(),
            zoom: 2.0,
            viewport: ViewportSize {
                width: 1024.0,
                height: 768.0,
            },
        }
    }
}

/// Tracked position plus a lookahead offset along the tracked velocity.
pub fn lookahead_hint(position: Vec2, velocity: Vec2, distance: f32) -> Vec2 {
    if velocity.length() > LOOKAHEAD_THRESHOLD {
        position + velocity.normalize_or_zero() * distance
    } else {
        position
    }
}

/// New center that puts `hint` back on the deadzone edge, or `None` when it is still inside.
/// Each axis is tested on its own.
pub fn deadzone_candidate(center: Vec2, hint: Vec2, deadzone: &Deadzone) -> Option<Vec2> {
    let half = deadzone.half_extents();
    let mut candidate = center;
    let mut moved = false;

    if hint.x < center.x - half.x {
        candidate.x = hint.x + half.x;
        moved = true;
    } else if hint.x > center.x + half.x {
        candidate.x = hint.x - half.x;
        moved = true;
    }

    if hint.y < center.y - half.y {
        candidate.y = hint.y + half.y;
        moved = true;
    } else if hint.y > center.y + half.y {
        candidate.y = hint.y - half.y;
        moved = true;
    }

    moved.then_some(candidate)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tracking {
    position: Vec2,
    velocity: Vec2,
    hint: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    config: CameraConfig,
    center: Vec2,
    zoom: f32,
    initial_zoom: f32,
    tracking: Option<Tracking>,
    zoom_tween: Option<Tween<f32>>,
    pan_tween: Option<Tween<Vec2>>,
    shake: Option<Shake>,
    overlay: Option<ScreenOverlay>,
}

fn valid_zoom(zoom: f32) -> bool {
    zoom.is_finite() && zoom > 0.0
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        let zoom = if valid_zoom(config.zoom) {
            config.zoom
        } else {
            1.0
        };
        let mut rig = Self {
            center: config.world_bounds.center(),
            config,
            zoom,
            initial_zoom: zoom,
            tracking: None,
            zoom_tween: None,
            pan_tween: None,
            shake: None,
            overlay: None,
        };
        rig.center = rig.clamp_center(rig.center);
        rig
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn has_target(&self) -> bool {
        self.tracking.is_some()
    }

    pub fn hint(&self) -> Option<Vec2> {
        self.tracking.map(|tracking| tracking.hint)
    }

    pub fn is_panning(&self) -> bool {
        self.pan_tween.is_some()
    }

    pub fn is_zooming(&self) -> bool {
        self.zoom_tween.is_some()
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.is_some()
    }

    /// World-space size of the visible rectangle.
    pub fn visible_size(&self) -> Vec2 {
        self.config.viewport.as_vec2() / self.zoom
    }

    /// Attaches a target and snaps onto it.
    pub fn set_target(&mut self, position: Vec2) {
        self.tracking = Some(Tracking {
            position,
            velocity: Vec2::ZERO,
            hint: position,
        });
        self.center = self.clamp_center(position);
    }

    pub fn clear_target(&mut self) {
        self.tracking = None;
    }

    /// One tick. Tweens and effects always advance; follow logic runs only with an attached
    /// target and a position for it, and is suspended while a pan is in flight.
    pub fn update(&mut self, dt: f32, target: Option<Vec2>) {
        let dt = sanitize_dt(dt);
        self.advance_effects(dt);

        if let (Some(tracking), Some(position)) = (self.tracking.as_mut(), target) {
            tracking.velocity = position - tracking.position;
            tracking.position = position;
            tracking.hint = lookahead_hint(
                position,
                tracking.velocity,
                self.config.lookahead_distance,
            );
            let hint = tracking.hint;

            if self.pan_tween.is_none() {
                let candidate = deadzone_candidate(self.center, hint, &self.config.deadzone);
                if candidate.is_some() || self.shake.is_some() {
                    let goal = candidate.unwrap_or(self.center);
                    self.center = lerp_clamped(self.center, goal, self.config.lerp_factor);
                }
            }
        }

        self.center = self.clamp_center(self.center);
    }

    fn advance_effects(&mut self, dt: f32) {
        if let Some(tween) = self.zoom_tween.as_mut() {
            self.zoom = tween.advance(dt);
            if tween.is_finished() {
                self.zoom_tween = None;
            }
        }

        if let Some(tween) = self.pan_tween.as_mut() {
            self.center = tween.advance(dt);
            if tween.is_finished() {
                self.pan_tween = None;
            }
        }

        if let Some(shake) = self.shake.as_mut() {
            shake.advance(dt);
            if shake.is_finished() {
                self.shake = None;
            }
        }

        if let Some(overlay) = self.overlay.as_mut() {
            overlay.advance(dt);
            if overlay.is_finished() {
                self.overlay = None;
            }
        }
    }

    /// Keeps the visible rectangle inside the world bounds. Axes where the bounds are smaller
    /// than the view center on the bounds.
    pub fn clamp_center(&self, center: Vec2) -> Vec2 {
        self.config
            .world_bounds
            .confine(center, self.visible_size() * 0.5)
    }

    /// Tweens the zoom with a cubic ease-out. Non-positive targets are ignored.
    pub fn zoom_to(&mut self, target: f32, duration: Duration) {
        if !valid_zoom(target) {
            return;
        }
        self.zoom_tween = Some(Tween::new(self.zoom, target, duration.as_secs_f32()));
    }

    /// Tweens the center to `point`. Deadzone tracking pauses until the pan lands.
    pub fn pan_to(&mut self, point: Vec2, duration: Duration) {
        self.pan_tween = Some(Tween::new(self.center, point, duration.as_secs_f32()));
    }

    pub fn shake(&mut self, duration: Duration, intensity: f32) {
        self.shake = Some(Shake::new(duration, intensity));
    }

    /// Render-only offset from an active shake, in world units.
    pub fn shake_offset(&self) -> Vec2 {
        self.shake
            .as_ref()
            .map(|shake| shake.offset(self.config.viewport.as_vec2(), self.zoom))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn flash(&mut self, duration: Duration, color: Color, alpha: f32) {
        self.overlay = Some(ScreenOverlay::flash(duration, color, alpha));
    }

    pub fn fade(&mut self, duration: Duration, fade_out: bool, color: Color) {
        self.overlay = Some(ScreenOverlay::fade(duration, fade_out, color));
    }

    /// Current overlay color and opacity.
    pub fn overlay(&self) -> Option<(Color, f32)> {
        self.overlay
            .map(|overlay| (overlay.color(), overlay.alpha()))
    }

    pub fn set_bounds(&mut self, bounds: WorldBounds) {
        self.config.world_bounds = bounds;
        self.center = self.clamp_center(self.center);
    }

    pub fn set_deadzone(&mut self, deadzone: Deadzone) {
        self.config.deadzone = deadzone;
    }

    pub fn set_viewport(&mut self, viewport: ViewportSize) {
        self.config.viewport = viewport;
        self.center = self.clamp_center(self.center);
    }

    /// World position of the visible rectangle's top-left corner.
    fn scroll(&self) -> Vec2 {
        self.center - self.visible_size() * 0.5
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen / self.zoom + self.scroll()
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.scroll()) * self.zoom
    }

    pub fn is_visible(&self, world: Vec2, margin: f32) -> bool {
        let min = self.scroll() - Vec2::splat(margin);
        let max = self.scroll() + self.visible_size() + Vec2::splat(margin);
        world.x >= min.x && world.x <= max.x && world.y >= min.y && world.y <= max.y
    }

    /// Restores the starting zoom and drops shake and overlay effects.
    pub fn reset(&mut self) {
        self.zoom = self.initial_zoom;
        self.zoom_tween = None;
        self.shake = None;
        self.overlay = None;
        self.center = self.clamp_center(self.center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: f32 = 1.0 / 60.0;

    fn open_config() -> CameraConfig {
        CameraConfig {
            world_bounds: WorldBounds::new(-10_000.0, -10_000.0, 20_000.0, 20_000.0),
            ..CameraConfig::default()
        }
    }

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!(
            actual.distance(expected) < 1e-3,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn candidate_is_none_inside_deadzone() {
        let deadzone = Deadzone {
            width: 200.0,
            height: 150.0,
        };
        assert_eq!(
            deadzone_candidate(Vec2::ZERO, Vec2::new(100.0, -75.0), &deadzone),
            None
        );
    }

    #[test]
    fn candidate_pushes_hint_onto_edge() {
        let deadzone = Deadzone {
            width: 200.0,
            height: 150.0,
        };
        assert_eq!(
            deadzone_candidate(Vec2::ZERO, Vec2::new(150.0, 0.0), &deadzone),
            Some(Vec2::new(50.0, 0.0))
        );
        assert_eq!(
            deadzone_candidate(Vec2::ZERO, Vec2::new(-10.0, -100.0), &deadzone),
            Some(Vec2::new(0.0, -25.0))
        );
        assert_eq!(
            deadzone_candidate(Vec2::ZERO, Vec2::new(-300.0, 200.0), &deadzone),
            Some(Vec2::new(-200.0, 125.0))
        );
    }

    #[test]
    fn lookahead_only_above_threshold() {
        assert_eq!(
            lookahead_hint(Vec2::ZERO, Vec2::new(5.0, 5.0), 32.0),
            Vec2::ZERO
        );
        assert_close(
            lookahead_hint(Vec2::ZERO, Vec2::new(0.0, -20.0), 32.0),
            Vec2::new(0.0, -32.0),
        );
    }

    #[test]
    fn camera_rests_while_target_stays_in_deadzone() {
        let mut rig = CameraRig::new(open_config());
        rig.set_target(Vec2::ZERO);

        let path = [
            Vec2::new(5.0, 0.0),
            Vec2::new(14.0, 6.0),
            Vec2::new(23.0, 12.0),
            Vec2::new(32.0, 18.0),
            Vec2::new(41.0, 24.0),
            Vec2::new(50.0, 30.0),
        ];
        for position in path {
            rig.update(TICK, Some(position));
            assert_eq!(rig.center(), Vec2::ZERO);
        }
    }

    #[test]
    fn leaving_deadzone_lerps_toward_edge_candidate() {
        let mut rig = CameraRig::new(open_config());
        rig.set_target(Vec2::new(800.0, 600.0));

        rig.update(TICK, Some(Vec2::new(905.0, 600.0)));

        // Hint: 905 + 32 lookahead; edge candidate 837; 8% of the way there.
        assert_eq!(rig.hint(), Some(Vec2::new(937.0, 600.0)));
        assert_close(rig.center(), Vec2::new(800.0 + 37.0 * 0.08, 600.0));
    }

    #[test]
    fn full_lerp_lands_on_the_edge() {
        let mut rig = CameraRig::new(CameraConfig {
            lerp_factor: 1.0,
            lookahead_distance: 0.0,
            ..open_config()
        });
        rig.set_target(Vec2::ZERO);

        rig.update(TICK, Some(Vec2::new(0.0, 300.0)));
        assert_close(rig.center(), Vec2::new(0.0, 225.0));
    }

    #[test]
    fn zero_dt_still_follows() {
        let mut rig = CameraRig::new(open_config());
        rig.set_target(Vec2::ZERO);
        rig.update(0.0, Some(Vec2::new(400.0, 0.0)));
        assert!(rig.center().x > 0.0);
    }

    #[test]
    fn no_target_means_no_follow() {
        let mut rig = CameraRig::new(open_config());
        let start = rig.center();
        rig.update(TICK, Some(Vec2::new(5_000.0, 5_000.0)));
        assert_eq!(rig.center(), start);

        rig.set_target(Vec2::ZERO);
        rig.update(TICK, None);
        assert_eq!(rig.center(), Vec2::ZERO);

        rig.clear_target();
        rig.update(TICK, Some(Vec2::new(5_000.0, 0.0)));
        assert_eq!(rig.center(), Vec2::ZERO);
    }

    #[test]
    fn view_never_leaves_world_bounds() {
        let mut rig = CameraRig::new(CameraConfig {
            lerp_factor: 1.0,
            ..CameraConfig::default()
        });
        let bounds = rig.config().world_bounds;
        rig.set_target(Vec2::new(800.0, 600.0));

        let mut position = Vec2::new(800.0, 600.0);
        for step in 0..400 {
            let angle = step as f32 * 0.05;
            position += Vec2::new(angle.cos(), angle.sin()) * 25.0;
            rig.update(TICK, Some(position));

            let half = rig.visible_size() * 0.5;
            let min = rig.center() - half;
            let max = rig.center() + half;
            assert!(min.x >= bounds.x - 1e-3 && min.y >= bounds.y - 1e-3);
            assert!(max.x <= bounds.x + bounds.width + 1e-3);
            assert!(max.y <= bounds.y + bounds.height + 1e-3);
        }
    }

    #[test]
    fn snapping_to_a_corner_clamps() {
        let mut rig = CameraRig::new(CameraConfig::default());
        rig.set_target(Vec2::ZERO);
        // 1024x768 at 2x zoom shows 512x384.
        assert_eq!(rig.center(), Vec2::new(256.0, 192.0));
    }

    #[test]
    fn narrow_bounds_center_the_view() {
        let mut rig = CameraRig::new(CameraConfig {
            zoom: 1.0,
            world_bounds: WorldBounds::new(0.0, 0.0, 300.0, 2_000.0),
            ..CameraConfig::default()
        });
        rig.set_target(Vec2::new(10.0, 10.0));
        assert_eq!(rig.center(), Vec2::new(150.0, 384.0));
    }

    #[test]
    fn zoom_tween_finishes_on_target() {
        let mut rig = CameraRig::new(open_config());
        rig.zoom_to(3.0, Duration::from_millis(500));
        rig.update(0.25, None);
        assert!(rig.zoom() > 2.0 && rig.zoom() < 3.0);
        assert!(rig.is_zooming());

        rig.update(0.25, None);
        assert_eq!(rig.zoom(), 3.0);
        assert!(!rig.is_zooming());

        rig.zoom_to(-1.0, Duration::from_millis(500));
        assert!(!rig.is_zooming());
    }

    #[test]
    fn pan_suspends_tracking_until_it_lands() {
        let mut rig = CameraRig::new(open_config());
        rig.set_target(Vec2::ZERO);
        rig.pan_to(Vec2::new(1_000.0, 0.0), Duration::from_secs(1));

        for _ in 0..30 {
            rig.update(TICK, Some(Vec2::ZERO));
            assert!(rig.center().x > 0.0);
        }
        for _ in 0..40 {
            rig.update(TICK, Some(Vec2::ZERO));
        }
        assert!(!rig.is_panning());
        let landed = rig.center();
        assert!(landed.x <= 1_000.0);

        rig.update(TICK, Some(Vec2::ZERO));
        assert!(rig.center().x < landed.x);
    }

    #[test]
    fn shake_keeps_lerp_running_and_expires() {
        let mut rig = CameraRig::new(open_config());
        rig.set_target(Vec2::ZERO);
        rig.shake(Duration::from_millis(300), 10.0);
        rig.update(TICK, Some(Vec2::new(1.0, 0.0)));
        assert!(rig.is_shaking());
        assert_eq!(rig.center(), Vec2::ZERO);

        for _ in 0..30 {
            rig.update(TICK, Some(Vec2::new(1.0, 0.0)));
        }
        assert!(!rig.is_shaking());
        assert_eq!(rig.shake_offset(), Vec2::ZERO);
    }

    #[test]
    fn invalid_dt_freezes_tweens_and_shake() {
        let mut rig = CameraRig::new(open_config());
        rig.zoom_to(3.0, Duration::from_millis(500));
        rig.shake(Duration::from_millis(300), 10.0);
        rig.update(TICK, None);

        let zoom = rig.zoom();
        let offset = rig.shake_offset();
        for dt in [f32::NAN, -1.0, f32::INFINITY] {
            rig.update(dt, None);
            assert_eq!(rig.zoom(), zoom);
            assert_eq!(rig.shake_offset(), offset);
            assert!(rig.is_zooming());
            assert!(rig.is_shaking());
        }
    }

    #[test]
    fn narrower_deadzone_starts_following_sooner() {
        let config = CameraConfig {
            lookahead_distance: 0.0,
            ..open_config()
        };
        let mut wide = CameraRig::new(config);
        let mut narrow = CameraRig::new(config);
        narrow.set_deadzone(Deadzone {
            width: 40.0,
            height: 40.0,
        });

        for rig in [&mut wide, &mut narrow] {
            rig.set_target(Vec2::ZERO);
            rig.update(TICK, Some(Vec2::new(50.0, 0.0)));
        }
        assert_eq!(wide.center(), Vec2::ZERO);
        // Candidate is 50 - 20 = 30; 8% of the way there.
        assert_close(narrow.center(), Vec2::new(30.0 * 0.08, 0.0));
    }

    #[test]
    fn screen_and_world_conversions_agree() {
        let mut rig = CameraRig::new(CameraConfig::default());
        rig.set_target(Vec2::new(800.0, 600.0));

        assert_close(rig.screen_to_world(Vec2::ZERO), Vec2::new(544.0, 408.0));
        assert_close(
            rig.world_to_screen(Vec2::new(800.0, 600.0)),
            Vec2::new(512.0, 384.0),
        );
        assert!(rig.is_visible(Vec2::new(800.0, 600.0), 0.0));
        assert!(!rig.is_visible(Vec2::new(1_100.0, 600.0), 0.0));
        assert!(rig.is_visible(Vec2::new(1_100.0, 600.0), 50.0));
    }

    #[test]
    fn overlays_run_their_course() {
        let mut rig = CameraRig::new(open_config());
        rig.fade(Duration::from_millis(500), false, Color::BLACK);
        assert_eq!(rig.overlay(), Some((Color::BLACK, 1.0)));
        rig.update(0.5, None);
        assert_eq!(rig.overlay(), None);

        rig.flash(Duration::from_millis(200), Color::WHITE, 0.5);
        rig.reset();
        assert_eq!(rig.overlay(), None);
    }

    #[test]
    fn reset_restores_initial_zoom() {
        let mut rig = CameraRig::new(open_config());
        rig.zoom_to(1.0, Duration::ZERO);
        rig.update(TICK, None);
        assert_eq!(rig.zoom(), 1.0);
        rig.reset();
        assert_eq!(rig.zoom(), 2.0);
    }

    #[test]
    fn bounds_changes_reclamp_the_center() {
        let mut rig = CameraRig::new(open_config());
        rig.set_target(Vec2::new(5_000.0, 5_000.0));
        rig.set_bounds(WorldBounds::default());
        assert_eq!(rig.center(), Vec2::new(1_344.0, 1_008.0));
    }
}
