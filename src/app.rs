//! High-level plugin composition.
//!
//! `HarvestTownPlugin` registers every farm subsystem and fixes the per-frame order:
//! input, then the motion integrator, then the follow camera, then presentation effects.

use bevy::prelude::*;

use crate::animation::AnimationPlugin;
use crate::audio::GameAudioPlugin;
use crate::camera::{CameraPlugin, FollowCamera, ScreenOverlaySprite};
use crate::config::{CameraSettings, ConfigPlugin};
use crate::follow::CameraRig;
use crate::interaction::InteractionPlugin;
use crate::level::LevelPlugin;
use crate::movement::MovementPlugin;
use crate::player::PlayerPlugin;
use crate::state::{GameSet, GameState};
use crate::ui::UiPlugin;

/// Large enough to cover the view at any supported zoom.
const OVERLAY_SIZE: f32 = 10_000.0;

pub struct HarvestTownPlugin;

impl Plugin for HarvestTownPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_plugins((
                ConfigPlugin,      // Tuning file -> settings resources.
                LevelPlugin,       // LDtk farm + world bounds.
                PlayerPlugin,      // Player spawn/despawn and shadow.
                GameAudioPlugin,   // Action sounds.
                CameraPlugin,      // Follow camera glue.
                MovementPlugin,    // Input + motion integrator.
                AnimationPlugin,   // Clip selection and playback.
                InteractionPlugin, // Target tiles and feedback rings.
                UiPlugin,          // Debug overlay.
            ))
            .configure_sets(
                Update,
                (
                    GameSet::Input,
                    GameSet::Movement,
                    GameSet::Camera,
                    GameSet::Effects,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Startup, setup_camera);
    }
}

/// Spawns the 2D camera with its follow rig and the overlay sprite used for fades.
fn setup_camera(mut commands: Commands, settings: Res<CameraSettings>) {
    commands
        .spawn((
            Name::new("MainCamera"),
            Camera2dBundle::default(),
            FollowCamera(CameraRig::new(**settings)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Name::new("ScreenOverlay"),
                ScreenOverlaySprite,
                SpriteBundle {
                    sprite: Sprite {
                        color: Color::NONE,
                        custom_size: Some(Vec2::splat(OVERLAY_SIZE)),
                        ..default()
                    },
                    // In front of the world, still inside the camera's far plane.
                    transform: Transform::from_xyz(0.0, 0.0, -1.0),
                    ..default()
                },
            ));
        });
}
