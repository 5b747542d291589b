//! World interaction. Resolves each executed action to the tile in front of the player and
//! shows a short-lived ring there.

use bevy::prelude::*;

use crate::config::MovementSettings;
use crate::direction::Facing;
use crate::effects::color_from_hex;
use crate::math::{tile_to_world, to_render};
use crate::motion::{ActionKind, PlayerAction};
use crate::state::{GameSet, GameState};
use crate::tween::ease_out_cubic;

const FEEDBACK_DURATION: f32 = 0.3;
const FEEDBACK_RADIUS: f32 = 16.0;
const FEEDBACK_ALPHA: f32 = 0.5;
const FEEDBACK_GROWTH: f32 = 0.5;
const INTERACT_COLOR: u32 = 0x00ff00;
const TOOL_COLOR: u32 = 0xff6600;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_player_actions, draw_action_feedback)
                .chain()
                .in_set(GameSet::Effects)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(OnExit(GameState::Playing), clear_action_feedback);
    }
}

/// The tile one step from `tile` in the facing direction.
pub fn target_tile(tile: IVec2, facing: Facing) -> IVec2 {
    tile + facing.tile_offset()
}

/// Expanding, fading ring over an acted-on tile.
#[derive(Component, Debug, Clone, Copy)]
pub struct ActionFeedback {
    pub center: Vec2,
    pub color: Color,
    elapsed: f32,
}

impl ActionFeedback {
    pub fn new(kind: ActionKind, center: Vec2) -> Self {
        let color = match kind {
            ActionKind::Interact => color_from_hex(INTERACT_COLOR),
            ActionKind::UseTool => color_from_hex(TOOL_COLOR),
        };
        Self {
            center,
            color,
            elapsed: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(FEEDBACK_DURATION);
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= FEEDBACK_DURATION
    }

    fn progress(&self) -> f32 {
        ease_out_cubic(self.elapsed / FEEDBACK_DURATION)
    }

    pub fn radius(&self) -> f32 {
        FEEDBACK_RADIUS * (1.0 + FEEDBACK_GROWTH * self.progress())
    }

    pub fn alpha(&self) -> f32 {
        FEEDBACK_ALPHA * (1.0 - self.progress())
    }
}

/// Logs each executed action against the tile in front of the player and spawns its ring.
fn handle_player_actions(
    mut commands: Commands,
    mut actions: EventReader<PlayerAction>,
    settings: Res<MovementSettings>,
) {
    for action in actions.read() {
        let target = target_tile(action.tile, action.facing);
        match action.kind {
            ActionKind::Interact => info!(
                "Interacting with tile ({}, {}) facing {}",
                target.x,
                target.y,
                action.facing.as_str()
            ),
            ActionKind::UseTool => info!(
                "Using tool on tile ({}, {}) facing {}",
                target.x,
                target.y,
                action.facing.as_str()
            ),
        }

        commands.spawn((
            Name::new("ActionFeedback"),
            ActionFeedback::new(action.kind, tile_to_world(target, settings.tile_size)),
        ));
    }
}

/// Ages the rings, draws the live ones as gizmo circles and despawns the finished ones.
fn draw_action_feedback(
    mut commands: Commands,
    time: Res<Time>,
    mut gizmos: Gizmos,
    mut query: Query<(Entity, &mut ActionFeedback)>,
) {
    for (entity, mut feedback) in &mut query {
        feedback.advance(time.delta_seconds());
        if feedback.is_finished() {
            commands.entity(entity).despawn();
            continue;
        }
        gizmos.circle_2d(
            to_render(feedback.center, 0.0).truncate(),
            feedback.radius(),
            feedback.color.with_alpha(feedback.alpha()),
        );
    }
}

pub(crate) fn clear_action_feedback(
    mut commands: Commands,
    query: Query<Entity, With<ActionFeedback>>,
) {
    for entity in &query {
        commands.entity(entity).despawn();
    }
}
