//! Direction classification for moving entities.

use bevy::math::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Per-axis speed below which an axis counts as still.
pub const AXIS_THRESHOLD: f32 = 0.1;

/// Four-way facing used for animation and interaction. Sticky: it only changes while moving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn as_str(self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }

    /// One tile step in the tile grid (y down).
    pub fn tile_offset(self) -> IVec2 {
        match self {
            Facing::Up => IVec2::new(0, -1),
            Facing::Down => IVec2::new(0, 1),
            Facing::Left => IVec2::new(-1, 0),
            Facing::Right => IVec2::new(1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction8 {
    Idle,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction8 {
    /// Classifies a velocity (y down). The dominant axis names the direction; the other axis
    /// adds a diagonal qualifier once it passes [`AXIS_THRESHOLD`]. Equal magnitudes resolve
    /// vertically.
    pub fn from_velocity(velocity: Vec2) -> Self {
        let (vx, vy) = (velocity.x, velocity.y);

        if vx.abs() < AXIS_THRESHOLD && vy.abs() < AXIS_THRESHOLD {
            return Direction8::Idle;
        }

        if vx.abs() > vy.abs() {
            match (vx > 0.0, vy) {
                (true, vy) if vy > AXIS_THRESHOLD => Direction8::DownRight,
                (true, vy) if vy < -AXIS_THRESHOLD => Direction8::UpRight,
                (true, _) => Direction8::Right,
                (false, vy) if vy > AXIS_THRESHOLD => Direction8::DownLeft,
                (false, vy) if vy < -AXIS_THRESHOLD => Direction8::UpLeft,
                (false, _) => Direction8::Left,
            }
        } else {
            match (vy > 0.0, vx) {
                (true, vx) if vx > AXIS_THRESHOLD => Direction8::DownRight,
                (true, vx) if vx < -AXIS_THRESHOLD => Direction8::DownLeft,
                (true, _) => Direction8::Down,
                (false, vx) if vx > AXIS_THRESHOLD => Direction8::UpRight,
                (false, vx) if vx < -AXIS_THRESHOLD => Direction8::UpLeft,
                (false, _) => Direction8::Up,
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction8::Idle => "idle",
            Direction8::Up => "up",
            Direction8::Down => "down",
            Direction8::Left => "left",
            Direction8::Right => "right",
            Direction8::UpLeft => "up_left",
            Direction8::UpRight => "up_right",
            Direction8::DownLeft => "down_left",
            Direction8::DownRight => "down_right",
        }
    }

    /// Projects onto a four-way facing. Horizontal components win over vertical ones, so
    /// `DownRight` faces right and `UpLeft` faces left.
    pub fn facing(self) -> Option<Facing> {
        match self {
            Direction8::Idle => None,
            Direction8::Right | Direction8::UpRight | Direction8::DownRight => Some(Facing::Right),
            Direction8::Left | Direction8::UpLeft | Direction8::DownLeft => Some(Facing::Left),
            Direction8::Up => Some(Facing::Up),
            Direction8::Down => Some(Facing::Down),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_velocities_are_idle() {
        assert_eq!(Direction8::from_velocity(Vec2::new(0.05, -0.09)), Direction8::Idle);
        assert_eq!(Direction8::Idle.facing(), None);
    }

    #[test]
    fn dominant_axis_names_the_direction() {
        assert_eq!(Direction8::from_velocity(Vec2::new(50.0, 0.0)), Direction8::Right);
        assert_eq!(Direction8::from_velocity(Vec2::new(-50.0, 0.05)), Direction8::Left);
        assert_eq!(Direction8::from_velocity(Vec2::new(0.0, 30.0)), Direction8::Down);
        assert_eq!(Direction8::from_velocity(Vec2::new(0.0, -30.0)), Direction8::Up);
    }

    #[test]
    fn secondary_axis_adds_qualifier() {
        assert_eq!(Direction8::from_velocity(Vec2::new(50.0, 20.0)), Direction8::DownRight);
        assert_eq!(Direction8::from_velocity(Vec2::new(50.0, -20.0)), Direction8::UpRight);
        assert_eq!(Direction8::from_velocity(Vec2::new(-5.0, 40.0)), Direction8::DownLeft);
        assert_eq!(Direction8::from_velocity(Vec2::new(-5.0, -40.0)), Direction8::UpLeft);
    }

    #[test]
    fn ties_resolve_vertically() {
        assert_eq!(Direction8::from_velocity(Vec2::new(10.0, 10.0)), Direction8::DownRight);
        assert_eq!(Direction8::from_velocity(Vec2::new(-10.0, -10.0)), Direction8::UpLeft);
        assert_eq!(Direction8::from_velocity(Vec2::new(0.0, 0.1)), Direction8::Down);
    }

    #[test]
    fn diagonals_face_horizontally() {
        assert_eq!(Direction8::DownRight.facing(), Some(Facing::Right));
        assert_eq!(Direction8::UpRight.facing(), Some(Facing::Right));
        assert_eq!(Direction8::DownLeft.facing(), Some(Facing::Left));
        assert_eq!(Direction8::UpLeft.facing(), Some(Facing::Left));
        assert_eq!(Direction8::Up.facing(), Some(Facing::Up));
        assert_eq!(Direction8::Down.facing(), Some(Facing::Down));
    }

    #[test]
    fn labels_match_clip_suffixes() {
        assert_eq!(Direction8::DownRight.as_str(), "down_right");
        assert_eq!(Facing::default().as_str(), "down");
    }
}
