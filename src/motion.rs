//! Motion integrator for a single controllable entity.
//!
//! Pure simulation code: no Bevy system parameters, no render state. The ECS glue in
//! `movement.rs` feeds it input and a frame delta and copies the result back into a
//! `Transform`.

use std::time::Duration;

use bevy::math::{IVec2, Vec2};
use bevy::prelude::Event;
use serde::{Deserialize, Serialize};

use crate::direction::{Direction8, Facing};
use crate::math::{
    lerp_clamped, move_towards, sanitize_axis, sanitize_dt, world_to_tile, WorldBounds,
};

/// Speed above which the entity counts as moving.
pub const MOVING_THRESHOLD: f32 = 10.0;
/// How long a triggered action waits for the cooldown before it is forgotten.
pub const ACTION_BUFFER_WINDOW: Duration = Duration::from_millis(120);
/// Minimum spacing between two executed actions.
pub const ACTION_COOLDOWN: Duration = Duration::from_millis(250);

/// Movement tuning. Speeds are in px/s, accelerations in px/s².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Stick deflection ignored before analog input takes over from the keys.
    pub input_deadzone: f32,
    /// Fraction per second of the secondary lerp pass.
    pub smoothing_factor: f32,
    pub tile_size: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 140.0,
            acceleration: 1200.0,
            deceleration: 1500.0,
            input_deadzone: 0.12,
            smoothing_factor: 12.0,
            tile_size: 32.0,
        }
    }
}

/// Held directional keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigitalAxes {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl DigitalAxes {
    pub fn axis(self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.left {
            axis.x -= 1.0;
        }
        if self.right {
            axis.x += 1.0;
        }
        if self.up {
            axis.y -= 1.0;
        }
        if self.down {
            axis.y += 1.0;
        }
        axis
    }
}

/// Combines keys and an optional stick into one axis. The stick replaces the keys once either of
/// its axes leaves the deadzone.
pub fn resolve_axis(digital: DigitalAxes, analog: Option<Vec2>, deadzone: f32) -> Vec2 {
    match analog {
        Some(stick) if stick.x.abs() > deadzone || stick.y.abs() > deadzone => stick,
        _ => digital.axis(),
    }
}

/// Input for one tick. `interact`/`use_tool` are edge-triggered: true only on the tick the
/// button went down.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionInput {
    pub axis: Vec2,
    pub interact: bool,
    pub use_tool: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Interact,
    UseTool,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Interact => "interact",
            ActionKind::UseTool => "useTool",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferedAction {
    pub kind: ActionKind,
    pub issued_at: Duration,
}

/// Emitted once per executed action for world-interaction code.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PlayerAction {
    pub kind: ActionKind,
    pub position: Vec2,
    pub tile: IVec2,
    pub facing: Facing,
}

/// Maps a sanitized input axis to a velocity no faster than `max_speed`.
pub fn target_velocity(axis: Vec2, max_speed: f32) -> Vec2 {
    let axis = sanitize_axis(axis);
    let axis = if axis.length() > 1.0 {
        axis.normalize_or_zero()
    } else {
        axis
    };
    axis * max_speed
}

/// Motion state owned by one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionState {
    position: Vec2,
    velocity: Vec2,
    target_velocity: Vec2,
    facing: Facing,
    is_moving: bool,
    pending_action: Option<BufferedAction>,
    last_action_at: Option<Duration>,
    snap_to_grid: bool,
}

impl MotionState {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            target_velocity: Vec2::ZERO,
            facing: Facing::default(),
            is_moving: false,
            pending_action: None,
            last_action_at: None,
            snap_to_grid: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn target_velocity(&self) -> Vec2 {
        self.target_velocity
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn pending_action(&self) -> Option<BufferedAction> {
        self.pending_action
    }

    pub fn last_action_at(&self) -> Option<Duration> {
        self.last_action_at
    }

    pub fn snap_to_grid(&self) -> bool {
        self.snap_to_grid
    }

    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.snap_to_grid = snap;
    }

    /// Position as it should be drawn: whole pixels when snapping is on.
    pub fn display_position(&self) -> Vec2 {
        if self.snap_to_grid {
            self.position.round()
        } else {
            self.position
        }
    }

    /// Runs one tick: latch actions, steer, integrate, then try the action buffer. Returns the
    /// action executed this tick, if any.
    pub fn step(
        &mut self,
        config: &MotionConfig,
        input: &MotionInput,
        dt: f32,
        now: Duration,
    ) -> Option<PlayerAction> {
        if input.interact {
            self.buffer_action(ActionKind::Interact, now);
        }
        if input.use_tool {
            self.buffer_action(ActionKind::UseTool, now);
        }

        self.target_velocity = target_velocity(input.axis, config.max_speed);
        self.integrate(config, dt);
        self.process_action_buffer(config, now)
    }

    /// Blends velocity toward the target and advances the position. A non-positive or
    /// non-finite `dt` leaves the state untouched.
    pub fn integrate(&mut self, config: &MotionConfig, dt: f32) {
        let dt = sanitize_dt(dt);
        if dt == 0.0 {
            return;
        }

        let accel = if self.target_velocity.length() > self.velocity.length() {
            config.acceleration
        } else {
            config.deceleration
        };

        self.velocity = move_towards(self.velocity, self.target_velocity, accel * dt);
        self.velocity = lerp_clamped(
            self.velocity,
            self.target_velocity,
            dt * config.smoothing_factor,
        );

        self.position += self.velocity * dt;
        self.is_moving = self.velocity.length() > MOVING_THRESHOLD;

        if self.is_moving {
            if let Some(facing) = Direction8::from_velocity(self.velocity).facing() {
                self.facing = facing;
            }
        }
    }

    /// Latches an action, replacing whatever was pending.
    pub fn buffer_action(&mut self, kind: ActionKind, now: Duration) {
        self.pending_action = Some(BufferedAction {
            kind,
            issued_at: now,
        });
    }

    /// Expires, defers or executes the pending action.
    pub fn process_action_buffer(
        &mut self,
        config: &MotionConfig,
        now: Duration,
    ) -> Option<PlayerAction> {
        let pending = self.pending_action?;

        if now.saturating_sub(pending.issued_at) > ACTION_BUFFER_WINDOW {
            self.pending_action = None;
            return None;
        }

        if let Some(last) = self.last_action_at {
            if now.saturating_sub(last) < ACTION_COOLDOWN {
                return None;
            }
        }

        self.last_action_at = Some(now);
        self.pending_action = None;

        Some(PlayerAction {
            kind: pending.kind,
            position: self.position,
            tile: world_to_tile(self.position, config.tile_size),
            facing: self.facing,
        })
    }

    /// Moves instantly and stops dead.
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.target_velocity = Vec2::ZERO;
    }

    /// Keeps a body of `half_extents` inside `bounds`, cancelling velocity on blocked axes.
    pub fn confine(&mut self, bounds: &WorldBounds, half_extents: Vec2) {
        let confined = bounds.confine(self.position, half_extents);
        if confined.x != self.position.x {
            self.velocity.x = 0.0;
        }
        if confined.y != self.position.y {
            self.velocity.y = 0.0;
        }
        self.position = confined;
    }
}
