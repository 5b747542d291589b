//! Player entity lifecycle. Spawns the farmer with its motion state, animator and drop shadow
//! when gameplay starts and removes them when it ends.

use bevy::prelude::*;

use crate::animation::{ClipId, PlayerSheets, SpriteAnimator};
use crate::direction::Facing;
use crate::level::LevelAssets;
use crate::math::to_render;
use crate::motion::MotionState;
use crate::movement::{Collider, ControlInput, Motion};
use crate::state::{GameSet, GameState};

const PLAYER_Z: f32 = 10.0;
const BODY_SIZE: Vec2 = Vec2::new(24.0, 16.0);
/// Distance of the shadow below the sprite's center, in pixels.
const SHADOW_OFFSET: f32 = 8.0;
const SHADOW_ALPHA: f32 = 0.3;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), spawn_player)
            .add_systems(OnExit(GameState::Playing), despawn_player)
            .add_systems(
                Update,
                bob_shadow
                    .in_set(GameSet::Effects)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Marker for the controllable farmer.
#[derive(Component)]
pub struct Player;

#[derive(Component)]
pub struct PlayerShadow;

/// Vertical bob of the shadow, in pixels. Only bobs while walking.
pub fn shadow_bob(is_moving: bool, elapsed_secs: f32) -> f32 {
    if is_moving {
        (elapsed_secs * 1000.0 * 0.01).sin()
    } else {
        0.0
    }
}

/// Places the farmer at the center of the level, idle and facing down.
fn spawn_player(
    mut commands: Commands,
    level_assets: Res<LevelAssets>,
    sheets: Res<PlayerSheets>,
) {
    let spawn = level_assets.world_bounds().center();
    let clip = ClipId::Idle(Facing::default());

    info!("Spawning player at ({}, {})", spawn.x, spawn.y);

    commands
        .spawn((
            Name::new("Player"),
            Player,
            SpriteBundle {
                texture: sheets.idle_texture.clone(),
                transform: Transform::from_translation(to_render(spawn, PLAYER_Z)),
                ..default()
            },
            TextureAtlas {
                layout: sheets.idle_layout.clone(),
                index: clip.frames().first,
            },
            SpriteAnimator::new(clip),
            Motion(MotionState::new(spawn)),
            ControlInput::default(),
            Collider::from_size(BODY_SIZE),
        ))
        .with_children(|parent| {
            parent.spawn((
                Name::new("PlayerShadow"),
                PlayerShadow,
                SpriteBundle {
                    texture: sheets.idle_texture.clone(),
                    sprite: Sprite {
                        color: Color::srgba(0.0, 0.0, 0.0, SHADOW_ALPHA),
                        ..default()
                    },
                    transform: Transform {
                        translation: Vec3::new(0.0, -SHADOW_OFFSET, -0.1),
                        scale: Vec3::new(1.0, 0.5, 1.0),
                        ..default()
                    },
                    ..default()
                },
                TextureAtlas {
                    layout: sheets.idle_layout.clone(),
                    index: 0,
                },
            ));
        });
}

/// Keeps each shadow under its player, bobbing while they walk.
fn bob_shadow(
    time: Res<Time>,
    players: Query<(&Motion, &Children), With<Player>>,
    mut shadows: Query<&mut Transform, With<PlayerShadow>>,
) {
    for (motion, children) in &players {
        let bob = shadow_bob(motion.is_moving(), time.elapsed_seconds());
        for &child in children {
            if let Ok(mut transform) = shadows.get_mut(child) {
                // Render space is y-up.
                transform.translation.y = -(SHADOW_OFFSET + bob);
            }
        }
    }
}

pub(crate) fn despawn_player(mut commands: Commands, query: Query<Entity, With<Player>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
