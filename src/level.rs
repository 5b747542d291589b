//! LDtk farm map orchestration: loads project data and derives the playable world bounds.
//!
//! The LDtk world is spawned at the origin with `UseWorldTranslation`, so a level's pixel
//! rectangle (`world_x`, `world_y`, `px_wid`, `px_hei`) maps straight onto simulation space and
//! the render mapping in `math::to_render` lines the tiles up with the player. Without a
//! shipped project the farm is drawn from generated ground instead.

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy_ecs_ldtk::ldtk;
use bevy_ecs_ldtk::prelude::*;

use crate::config::asset_available;
use crate::math::{to_render, WorldBounds};
use crate::placeholder;
use crate::state::GameState;

const TILE_SIZE: f32 = 32.0;
const GROUND_Z: f32 = -10.0;

/// Registers LDtk asset plumbing and the loading-state monitor.
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(LevelConfig::default())
            .init_resource::<LevelAssets>()
            .insert_resource(LevelSelection::index(0))
            .insert_resource(LdtkSettings {
                level_spawn_behavior: LevelSpawnBehavior::UseWorldTranslation {
                    load_level_neighbors: false,
                },
                set_clear_color: SetClearColor::FromLevelBackground,
                ..default()
            })
            .add_plugins(LdtkPlugin)
            .add_systems(OnEnter(GameState::Loading), spawn_world)
            .add_systems(
                Update,
                (
                    monitor_level_loading.run_if(in_state(GameState::Loading)),
                    reload_level.run_if(in_state(GameState::Playing)),
                ),
            );
    }
}

/// Which LDtk project and level to load.
#[derive(Resource, Clone)]
pub struct LevelConfig {
    pub project_path: String,
    pub start_level: Option<String>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            project_path: "levels/farm.ldtk".to_owned(),
            start_level: Some("Farm".to_owned()),
        }
    }
}

/// Mirror of the loaded level's metadata. `bounds` stays `None` until the project is read (or
/// failed to load), and callers fall back to the default farm size.
#[derive(Resource, Default)]
pub struct LevelAssets {
    pub project: Option<Handle<LdtkProject>>,
    pub project_path: Option<String>,
    pub level_identifier: Option<String>,
    pub bounds: Option<WorldBounds>,
}

impl LevelAssets {
    pub fn world_bounds(&self) -> WorldBounds {
        self.bounds.unwrap_or_default()
    }
}

/// Marker on the spawned world (LDtk or generated ground) so a reload can despawn the old one.
#[derive(Component)]
pub struct LevelRoot;

/// Lays the generated grass map over the default farm bounds and publishes those bounds.
fn use_default_farm(
    commands: &mut Commands,
    images: &mut Assets<Image>,
    level_assets: &mut LevelAssets,
) {
    let bounds = WorldBounds::default();
    let size = Vec2::new(bounds.width, bounds.height);
    let ground = placeholder::ground_map(placeholder::ground_tiles(size, TILE_SIZE));

    commands.spawn((
        LevelRoot,
        Name::new("PlaceholderGround"),
        SpriteBundle {
            texture: images.add(ground),
            sprite: Sprite {
                custom_size: Some(size),
                ..default()
            },
            transform: Transform::from_translation(to_render(bounds.center(), GROUND_Z)),
            ..default()
        },
    ));
    level_assets.bounds = Some(bounds);
}

/// Tears down the previous world and starts loading the configured project. A project that is
/// not shipped skips straight to the generated farm.
fn spawn_world(
    mut commands: Commands,
    world: Query<Entity, With<LevelRoot>>,
    asset_server: Res<AssetServer>,
    config: Res<LevelConfig>,
    mut images: ResMut<Assets<Image>>,
    mut level_assets: ResMut<LevelAssets>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for entity in &world {
        commands.entity(entity).despawn_recursive();
    }
    *level_assets = LevelAssets::default();

    if !asset_available(&config.project_path) {
        warn!(
            "No LDtk project at '{}'; continuing with the default farm.",
            config.project_path
        );
        use_default_farm(&mut commands, &mut images, &mut level_assets);
        next_state.set(GameState::Playing);
        return;
    }

    let project_handle: Handle<LdtkProject> = asset_server.load(config.project_path.clone());
    level_assets.project = Some(project_handle.clone());
    level_assets.project_path = Some(config.project_path.clone());

    let selection = config
        .start_level
        .as_ref()
        .map(|label| LevelSelection::Identifier(label.clone()))
        .unwrap_or_else(|| LevelSelection::index(0));
    commands.insert_resource(selection);

    commands.spawn((
        LevelRoot,
        Name::new("LevelRoot"),
        LdtkWorldBundle {
            ldtk_handle: project_handle,
            ..default()
        },
    ));
}

/// The configured start level, or the first level when it is missing.
pub fn select_level<'a>(
    levels: &'a [ldtk::Level],
    start_level: Option<&str>,
) -> Option<&'a ldtk::Level> {
    start_level
        .and_then(|identifier| levels.iter().find(|level| level.identifier == identifier))
        .or_else(|| levels.first())
}

/// The level's pixel rectangle in simulation space.
pub fn level_bounds(level: &ldtk::Level) -> WorldBounds {
    WorldBounds::new(
        level.world_x as f32,
        level.world_y as f32,
        level.px_wid as f32,
        level.px_hei as f32,
    )
}

/// Waits for the project, then publishes the start level's bounds and enters gameplay.
fn monitor_level_loading(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    asset_server: Res<AssetServer>,
    mut level_assets: ResMut<LevelAssets>,
    projects: Res<Assets<LdtkProject>>,
    config: Res<LevelConfig>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(project_handle) = level_assets.project.as_ref() else {
        return;
    };

    match asset_server.get_load_state(project_handle.id()) {
        Some(LoadState::Loaded) => {
            let selected = projects.get(project_handle).and_then(|project| {
                select_level(&project.json_data().levels, config.start_level.as_deref())
                    .map(|level| (level.identifier.clone(), level_bounds(level)))
            });

            match selected {
                Some((identifier, bounds)) => {
                    info!(
                        "Loaded level '{}' ({}x{} px)",
                        identifier, bounds.width, bounds.height
                    );
                    level_assets.level_identifier = Some(identifier);
                    level_assets.bounds = Some(bounds);
                }
                None => warn!("LDtk project has no levels; using the default farm bounds."),
            }

            next_state.set(GameState::Playing);
        }
        Some(LoadState::Failed(_)) => {
            let path = level_assets.project_path.as_deref().unwrap_or("<unknown>");
            warn!("Unable to load LDtk project at '{path}'; continuing with the default farm.");
            use_default_farm(&mut commands, &mut images, &mut level_assets);
            next_state.set(GameState::Playing);
        }
        _ => {}
    }
}

/// F5 leaves gameplay and loads the farm again from scratch.
fn reload_level(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::F5) {
        info!("Reloading the farm");
        next_state.set(GameState::Loading);
    }
}
