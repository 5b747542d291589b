//! Small numeric helpers shared by the motion integrator and the follow camera.
//!
//! Everything here works in simulation space: pixels, with y growing downward like the tile
//! grid. Converting to Bevy's y-up render space happens only in the ECS glue via
//! [`to_render`].

use bevy::math::{IVec2, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Treats non-finite or negative frame deltas as an empty tick.
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Clamps each component into `[-1, 1]`. Non-finite components collapse to zero.
pub fn sanitize_axis(axis: Vec2) -> Vec2 {
    let clean = |value: f32| {
        if value.is_finite() {
            value.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    };
    Vec2::new(clean(axis.x), clean(axis.y))
}

/// Moves `current` toward `target` by at most `max_delta`, landing exactly on the target when
/// it is within reach.
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let max_delta = max_delta.max(0.0);
    let delta = target - current;
    let distance = delta.length();

    if distance <= max_delta {
        return target;
    }

    current + delta / distance * max_delta
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp_clamped(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    from + (to - from) * t
}

/// Tile containing a world position.
pub fn world_to_tile(position: Vec2, tile_size: f32) -> IVec2 {
    IVec2::new(
        (position.x / tile_size).floor() as i32,
        (position.y / tile_size).floor() as i32,
    )
}

/// Center of a tile in world space.
pub fn tile_to_world(tile: IVec2, tile_size: f32) -> Vec2 {
    Vec2::new(
        tile.x as f32 * tile_size + tile_size * 0.5,
        tile.y as f32 * tile_size + tile_size * 0.5,
    )
}

/// Maps a simulation-space point to a Bevy translation at depth `z`.
pub fn to_render(position: Vec2, z: f32) -> Vec3 {
    Vec3::new(position.x, -position.y, z)
}

/// Axis-aligned playable area, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        // 50x40 tiles of 32px.
        Self {
            x: 0.0,
            y: 0.0,
            width: 1600.0,
            height: 1200.0,
        }
    }
}

impl WorldBounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Keeps a box of `half_extents` centered on `point` inside the bounds. Axes where the box
    /// does not fit resolve to the bounds' center.
    pub fn confine(&self, point: Vec2, half_extents: Vec2) -> Vec2 {
        let center = self.center();
        let confine_axis = |value: f32, half: f32, min: f32, size: f32, mid: f32| {
            if size < half * 2.0 {
                mid
            } else {
                value.clamp(min + half, min + size - half)
            }
        };

        Vec2::new(
            confine_axis(point.x, half_extents.x, self.x, self.width, center.x),
            confine_axis(point.y, half_extents.y, self.y, self.height, center.y),
        )
    }
}
