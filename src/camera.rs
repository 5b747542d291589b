//! Follow camera glue. Feeds the player's simulation position into the `CameraRig` each frame
//! and copies the rig's center, zoom, shake and overlay back onto the render camera.

use std::time::Duration;

use bevy::prelude::*;
use bevy::window::WindowResized;

use crate::follow::{CameraRig, ViewportSize};
use crate::level::LevelAssets;
use crate::math::to_render;
use crate::movement::Motion;
use crate::player::Player;
use crate::state::{GameSet, GameState};

const FADE_IN: Duration = Duration::from_millis(500);

/// Registers the follow, bounds sync and screen overlay systems.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), start_fade_in)
            .add_systems(OnExit(GameState::Playing), detach_camera_target)
            .add_systems(
                Update,
                (
                    sync_viewport,
                    sync_camera_bounds.run_if(resource_changed::<LevelAssets>),
                ),
            )
            .add_systems(
                Update,
                (
                    (attach_camera_target, follow_player)
                        .chain()
                        .in_set(GameSet::Camera),
                    update_screen_overlay.in_set(GameSet::Effects),
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// The render camera's follow state.
#[derive(Component, Debug, Clone, Deref, DerefMut)]
pub struct FollowCamera(pub CameraRig);

/// Full-view sprite parented to the camera that draws flashes and fades.
#[derive(Component)]
pub struct ScreenOverlaySprite;

/// Snaps onto the player the frame it appears.
fn attach_camera_target(
    players: Query<&Motion, Added<Player>>,
    mut cameras: Query<&mut FollowCamera>,
) {
    let Ok(motion) = players.get_single() else {
        return;
    };
    for mut rig in &mut cameras {
        rig.set_target(motion.position());
    }
}

/// Leaving gameplay releases the player; the rig keeps its last center.
pub(crate) fn detach_camera_target(mut cameras: Query<&mut FollowCamera>) {
    for mut rig in &mut cameras {
        rig.clear_target();
    }
}

/// Every entry into gameplay fades in from black.
fn start_fade_in(mut cameras: Query<&mut FollowCamera>) {
    for mut rig in &mut cameras {
        rig.fade(FADE_IN, false, Color::BLACK);
    }
}

/// Pushes newly loaded level bounds into every rig.
fn sync_camera_bounds(level_assets: Res<LevelAssets>, mut cameras: Query<&mut FollowCamera>) {
    let bounds = level_assets.world_bounds();
    for mut rig in &mut cameras {
        rig.set_bounds(bounds);
    }
}

/// Tracks window resizes so clamping and screen conversion use the real viewport.
fn sync_viewport(mut resized: EventReader<WindowResized>, mut cameras: Query<&mut FollowCamera>) {
    let Some(event) = resized.read().last() else {
        return;
    };
    let viewport = ViewportSize {
        width: event.width,
        height: event.height,
    };
    for mut rig in &mut cameras {
        rig.set_viewport(viewport);
    }
}

/// Steps the rig with the player's simulation position and writes the shaken center and
/// `1 / zoom` scale to the render camera.
fn follow_player(
    time: Res<Time>,
    players: Query<&Motion, With<Player>>,
    mut cameras: Query<(
        &mut FollowCamera,
        &mut Transform,
        &mut OrthographicProjection,
    )>,
) {
    let target = players.get_single().ok().map(|motion| motion.position());

    for (mut rig, mut transform, mut projection) in &mut cameras {
        rig.update(time.delta_seconds(), target);

        let z = transform.translation.z;
        transform.translation = to_render(rig.center() + rig.shake_offset(), z);
        projection.scale = 1.0 / rig.zoom();
    }
}

/// Tints the overlay sprite with the rig's flash or fade; transparent when none is active.
fn update_screen_overlay(
    cameras: Query<&FollowCamera>,
    mut overlays: Query<&mut Sprite, With<ScreenOverlaySprite>>,
) {
    let Ok(rig) = cameras.get_single() else {
        return;
    };
    let (color, alpha) = rig.overlay().unwrap_or((Color::BLACK, 0.0));
    for mut sprite in &mut overlays {
        sprite.color = color.with_alpha(alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::CameraConfig;
    use crate::motion::MotionState;

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_systems(Update, (attach_camera_target, follow_player).chain());
        app
    }

    fn tick(app: &mut App) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(1.0 / 60.0));
        app.update();
    }

    fn spawn_camera(app: &mut App) -> Entity {
        app.world_mut()
            .spawn((
                FollowCamera(CameraRig::new(CameraConfig::default())),
                Transform::from_xyz(0.0, 0.0, 999.0),
                OrthographicProjection::default(),
            ))
            .id()
    }

    #[test]
    fn camera_snaps_to_new_player_and_flips_y() {
        let mut app = test_app();
        let camera = spawn_camera(&mut app);
        app.world_mut()
            .spawn((Player, Motion(MotionState::new(Vec2::new(700.0, 500.0)))));

        tick(&mut app);

        let transform = app.world().get::<Transform>(camera).unwrap();
        assert_eq!(transform.translation, Vec3::new(700.0, -500.0, 999.0));
        let projection = app.world().get::<OrthographicProjection>(camera).unwrap();
        assert_eq!(projection.scale, 0.5);
    }

    #[test]
    fn camera_trails_a_player_leaving_the_deadzone() {
        let mut app = test_app();
        let camera = spawn_camera(&mut app);
        let player = app
            .world_mut()
            .spawn((Player, Motion(MotionState::new(Vec2::new(800.0, 600.0)))))
            .id();
        tick(&mut app);

        app.world_mut()
            .get_mut::<Motion>(player)
            .unwrap()
            .teleport(Vec2::new(1000.0, 600.0));
        tick(&mut app);

        let transform = app.world().get::<Transform>(camera).unwrap();
        assert!(transform.translation.x > 800.0);
        assert!(transform.translation.x < 1000.0);
        assert_eq!(transform.translation.y, -600.0);
    }

    #[test]
    fn camera_without_player_stays_put() {
        let mut app = test_app();
        let camera = spawn_camera(&mut app);

        tick(&mut app);

        let rig = app.world().get::<FollowCamera>(camera).unwrap();
        assert!(!rig.has_target());
        assert_eq!(rig.center(), Vec2::new(800.0, 600.0));
    }
}
