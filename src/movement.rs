use bevy::input::gamepad::{GamepadAxisType, GamepadButtonType};
use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

use crate::config::MovementSettings;
use crate::level::LevelAssets;
use crate::math::to_render;
use crate::motion::{resolve_axis, DigitalAxes, MotionInput, MotionState, PlayerAction};
use crate::player::Player;
use crate::state::{GameSet, GameState};

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MovementSettings>()
            .add_event::<PlayerAction>()
            .add_systems(
                Update,
                (
                    read_player_input.in_set(GameSet::Input),
                    apply_motion.in_set(GameSet::Movement),
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Simulation-space motion of a controllable entity.
#[derive(Component, Debug, Clone, Deref, DerefMut)]
pub struct Motion(pub MotionState);

/// Input gathered this frame for the entity.
#[derive(Component, Debug, Clone, Copy, Default, Deref, DerefMut)]
pub struct ControlInput(pub MotionInput);

/// Axis-aligned body kept inside the world bounds.
#[derive(Component, Copy, Clone)]
pub struct Collider {
    pub half_extents: Vec2,
}

impl Collider {
    pub fn from_size(size: Vec2) -> Self {
        Self {
            half_extents: size * 0.5,
        }
    }
}

/// Left stick reading in simulation space, or `None` while it rests at zero. Bevy's stick Y
/// points up; the simulation's points down.
fn stick_axis(x: f32, y: f32) -> Option<Vec2> {
    (x != 0.0 || y != 0.0).then(|| Vec2::new(x, -y))
}

/// Collects keyboard, mouse and first-gamepad input into the player's [`ControlInput`].
/// Held directions feed the axis; the action buttons only count on the frame they go down.
fn read_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    gamepads: Res<Gamepads>,
    gamepad_axes: Res<Axis<GamepadAxis>>,
    gamepad_buttons: Res<ButtonInput<GamepadButton>>,
    settings: Res<MovementSettings>,
    mut query: Query<&mut ControlInput, With<Player>>,
) {
    let digital = DigitalAxes {
        left: keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]),
        right: keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]),
        up: keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]),
        down: keyboard.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]),
    };

    let mut interact = keyboard.any_just_pressed([KeyCode::KeyE, KeyCode::Space])
        || mouse.just_pressed(MouseButton::Left);
    let mut use_tool = mouse.just_pressed(MouseButton::Right);

    let mut stick = None;
    if let Some(gamepad) = gamepads.iter().next() {
        let x = gamepad_axes
            .get(GamepadAxis::new(gamepad, GamepadAxisType::LeftStickX))
            .unwrap_or(0.0);
        let y = gamepad_axes
            .get(GamepadAxis::new(gamepad, GamepadAxisType::LeftStickY))
            .unwrap_or(0.0);
        stick = stick_axis(x, y);

        interact |=
            gamepad_buttons.just_pressed(GamepadButton::new(gamepad, GamepadButtonType::South));
        use_tool |=
            gamepad_buttons.just_pressed(GamepadButton::new(gamepad, GamepadButtonType::West));
    }

    let axis = resolve_axis(digital, stick, settings.input_deadzone);

    for mut input in &mut query {
        input.0 = MotionInput {
            axis,
            interact,
            use_tool,
        };
    }
}

/// Steps every mover's [`MotionState`], keeps its collider inside the level and mirrors the
/// result onto the render transform. Actions that fire are forwarded as [`PlayerAction`] events.
fn apply_motion(
    time: Res<Time>,
    settings: Res<MovementSettings>,
    level_assets: Res<LevelAssets>,
    mut actions: EventWriter<PlayerAction>,
    mut query: Query<(&mut Motion, &ControlInput, &Collider, &mut Transform)>,
) {
    let dt = time.delta_seconds();
    let now = time.elapsed();
    let bounds = level_assets.world_bounds();

    for (mut motion, input, collider, mut transform) in &mut query {
        let action = motion.step(&settings, input, dt, now);
        motion.confine(&bounds, collider.half_extents);

        let z = transform.translation.z;
        transform.translation = to_render(motion.display_position(), z);

        if let Some(action) = action {
            debug!(
                "{} at tile {:?} facing {}",
                action.kind.as_str(),
                action.tile,
                action.facing.as_str()
            );
            actions.send(action);
        }
    }
}
