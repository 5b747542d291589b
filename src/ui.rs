//! Debug overlay and debug keys. F3 shows a text panel with frame rate, player motion and
//! camera state. 1/2/3 zoom, X shakes, R resets the camera and G toggles pixel snapping.
//! C pans to the farm center, F flashes the screen and Z toggles a locked (zero) deadzone.

use std::time::Duration;

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::camera::FollowCamera;
use crate::direction::Direction8;
use crate::follow::Deadzone;
use crate::motion::ActionKind;
use crate::movement::Motion;
use crate::player::Player;
use crate::state::{GameSet, GameState};

const ZOOM_DURATION: Duration = Duration::from_millis(500);
const SHAKE_DURATION: Duration = Duration::from_millis(300);
const SHAKE_INTENSITY: f32 = 10.0;
const PAN_DURATION: Duration = Duration::from_secs(1);
const FLASH_DURATION: Duration = Duration::from_millis(200);
const FLASH_ALPHA: f32 = 0.5;
const LOCKED_DEADZONE: Deadzone = Deadzone {
    width: 0.0,
    height: 0.0,
};

const CONTROLS: &str = "WASD/Arrows: move | E/Space/LMB: interact | RMB: use tool\n\
                        1/2/3: zoom | X: shake | R: reset camera | G: pixel snap\n\
                        C: pan to center | F: flash | Z: lock deadzone\n\
                        F3: toggle debug | F5: reload farm";

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<FrameTimeDiagnosticsPlugin>() {
            app.add_plugins(FrameTimeDiagnosticsPlugin);
        }
        app.init_resource::<DebugOverlay>()
            .add_systems(Startup, spawn_debug_text)
            .add_systems(
                Update,
                (
                    (
                        toggle_debug_overlay,
                        camera_debug_controls,
                        toggle_pixel_snap,
                    )
                        .in_set(GameSet::Input),
                    update_debug_text.in_set(GameSet::Effects),
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

#[derive(Resource, Default)]
pub struct DebugOverlay {
    pub visible: bool,
    /// Deadzone to restore when the locked one is toggled off.
    saved_deadzone: Option<Deadzone>,
}

#[derive(Component)]
struct DebugText;

/// Values shown on the debug panel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DebugSnapshot {
    pub fps: Option<f64>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub target_velocity: Vec2,
    pub is_moving: bool,
    pub pending_action: Option<ActionKind>,
    /// Time since the last executed action.
    pub since_action: Option<Duration>,
    pub snap_to_grid: bool,
    pub on_screen: bool,
    pub screen_position: Vec2,
    pub camera_center: Vec2,
    pub camera_hint: Option<Vec2>,
    pub camera_mode: &'static str,
    pub zoom: f32,
    pub cursor_world: Option<Vec2>,
}

impl DebugSnapshot {
    pub fn render(&self) -> String {
        let fps = self
            .fps
            .map_or_else(|| "--".to_owned(), |fps| format!("{fps:.0}"));
        let mut lines = vec![
            format!("FPS: {fps}"),
            format!("Position: ({:.1}, {:.1})", self.position.x, self.position.y),
            format!("Velocity: ({:.1}, {:.1})", self.velocity.x, self.velocity.y),
            format!(
                "Target: ({:.1}, {:.1})",
                self.target_velocity.x, self.target_velocity.y
            ),
            format!("Speed: {:.1}", self.velocity.length()),
            format!(
                "Direction: {}",
                Direction8::from_velocity(self.velocity).as_str()
            ),
            format!("Moving: {}", self.is_moving),
            format!(
                "Action: {} (last {})",
                self.pending_action.map_or("none", ActionKind::as_str),
                self.since_action.map_or_else(
                    || "never".to_owned(),
                    |since| format!("{}ms ago", since.as_millis())
                )
            ),
            format!("Pixel snap: {}", self.snap_to_grid),
            format!(
                "On screen: {} at ({:.0}, {:.0})",
                self.on_screen, self.screen_position.x, self.screen_position.y
            ),
            format!(
                "Camera: ({:.1}, {:.1}) {}",
                self.camera_center.x, self.camera_center.y, self.camera_mode
            ),
            format!("Zoom: {:.2}", self.zoom),
        ];
        if let Some(hint) = self.camera_hint {
            lines.push(format!("Camera hint: ({:.1}, {:.1})", hint.x, hint.y));
        }
        if let Some(cursor) = self.cursor_world {
            lines.push(format!("Cursor: ({:.1}, {:.1})", cursor.x, cursor.y));
        }
        lines.push(String::new());
        lines.push(CONTROLS.to_owned());
        lines.join("\n")
    }
}

fn spawn_debug_text(mut commands: Commands) {
    commands.spawn((
        Name::new("DebugText"),
        DebugText,
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: 16.0,
                color: Color::WHITE,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            left: Val::Px(8.0),
            ..default()
        })
        .with_background_color(Color::srgba(0.0, 0.0, 0.0, 0.6)),
        Visibility::Hidden,
    ));
}

fn toggle_debug_overlay(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut overlay: ResMut<DebugOverlay>,
    mut texts: Query<&mut Visibility, With<DebugText>>,
) {
    if !keyboard.just_pressed(KeyCode::F3) {
        return;
    }
    overlay.visible = !overlay.visible;
    for mut visibility in &mut texts {
        *visibility = if overlay.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

/// Refreshes the panel text while it is visible.
fn update_debug_text(
    time: Res<Time>,
    overlay: Res<DebugOverlay>,
    diagnostics: Res<DiagnosticsStore>,
    players: Query<&Motion, With<Player>>,
    cameras: Query<&FollowCamera>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut texts: Query<&mut Text, With<DebugText>>,
) {
    if !overlay.visible {
        return;
    }

    let mut snapshot = DebugSnapshot {
        fps: diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|fps| fps.smoothed()),
        ..default()
    };
    if let Ok(motion) = players.get_single() {
        snapshot.position = motion.position();
        snapshot.velocity = motion.velocity();
        snapshot.target_velocity = motion.target_velocity();
        snapshot.is_moving = motion.is_moving();
        snapshot.pending_action = motion.pending_action().map(|pending| pending.kind);
        snapshot.since_action = motion
            .last_action_at()
            .map(|last| time.elapsed().saturating_sub(last));
        snapshot.snap_to_grid = motion.snap_to_grid();
    }
    if let Ok(rig) = cameras.get_single() {
        snapshot.camera_center = rig.center();
        snapshot.camera_hint = rig.hint();
        snapshot.camera_mode = camera_mode(rig);
        snapshot.zoom = rig.zoom();
        snapshot.on_screen = rig.is_visible(snapshot.position, 0.0);
        snapshot.screen_position = rig.world_to_screen(snapshot.position);
        snapshot.cursor_world = windows
            .get_single()
            .ok()
            .and_then(Window::cursor_position)
            .map(|cursor| rig.screen_to_world(cursor));
    }

    let value = snapshot.render();
    for mut text in &mut texts {
        if let Some(section) = text.sections.first_mut() {
            section.value.clone_from(&value);
        }
    }
}

/// Short label for what is driving the camera.
fn camera_mode(rig: &FollowCamera) -> &'static str {
    if rig.is_panning() {
        "panning"
    } else if rig.is_shaking() {
        "shaking"
    } else if rig.is_zooming() {
        "zooming"
    } else if rig.has_target() {
        "following"
    } else {
        "idle"
    }
}

/// Number keys tween the zoom, X shakes, R resets the rig, C pans to the middle of the farm,
/// F flashes and Z swaps between the tuned deadzone and a locked one.
fn camera_debug_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut overlay: ResMut<DebugOverlay>,
    mut cameras: Query<&mut FollowCamera>,
) {
    let zoom = [
        (KeyCode::Digit1, 1.0),
        (KeyCode::Digit2, 2.0),
        (KeyCode::Digit3, 3.0),
    ]
    .into_iter()
    .find(|(key, _)| keyboard.just_pressed(*key))
    .map(|(_, zoom)| zoom);
    let shake = keyboard.just_pressed(KeyCode::KeyX);
    let reset = keyboard.just_pressed(KeyCode::KeyR);
    let pan = keyboard.just_pressed(KeyCode::KeyC);
    let flash = keyboard.just_pressed(KeyCode::KeyF);
    let lock = keyboard.just_pressed(KeyCode::KeyZ);

    for mut rig in &mut cameras {
        if reset {
            rig.reset();
        }
        if let Some(zoom) = zoom {
            rig.zoom_to(zoom, ZOOM_DURATION);
        }
        if shake {
            rig.shake(SHAKE_DURATION, SHAKE_INTENSITY);
        }
        if pan {
            let center = rig.config().world_bounds.center();
            rig.pan_to(center, PAN_DURATION);
        }
        if flash {
            rig.flash(FLASH_DURATION, Color::WHITE, FLASH_ALPHA);
        }
        if lock {
            match overlay.saved_deadzone.take() {
                Some(deadzone) => rig.set_deadzone(deadzone),
                None => {
                    overlay.saved_deadzone = Some(rig.config().deadzone);
                    rig.set_deadzone(LOCKED_DEADZONE);
                }
            }
            info!(
                "Camera deadzone {}",
                if overlay.saved_deadzone.is_some() {
                    "locked"
                } else {
                    "restored"
                }
            );
        }
    }
}

fn toggle_pixel_snap(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut players: Query<&mut Motion, With<Player>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyG) {
        return;
    }
    for mut motion in &mut players {
        let snap = !motion.snap_to_grid();
        motion.set_snap_to_grid(snap);
        info!("Pixel snapping {}", if snap { "on" } else { "off" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follow::{CameraConfig, CameraRig};

    #[test]
    fn panel_lists_motion_and_camera_state() {
        let snapshot = DebugSnapshot {
            fps: Some(59.6),
            position: Vec2::new(800.0, 600.0),
            velocity: Vec2::new(140.0, 0.0),
            is_moving: true,
            snap_to_grid: false,
            on_screen: true,
            camera_center: Vec2::new(780.0, 600.0),
            zoom: 2.0,
            cursor_world: Some(Vec2::new(10.0, 20.0)),
            pending_action: Some(ActionKind::UseTool),
            since_action: Some(Duration::from_millis(420)),
            camera_mode: "following",
            ..default()
        };
        let text = snapshot.render();
        assert!(text.contains("FPS: 60"));
        assert!(text.contains("Speed: 140.0"));
        assert!(text.contains("Direction: right"));
        assert!(text.contains("Moving: true"));
        assert!(text.contains("Zoom: 2.00"));
        assert!(text.contains("Action: useTool (last 420ms ago)"));
        assert!(text.contains("Camera: (780.0, 600.0) following"));
        assert!(text.contains("Cursor: (10.0, 20.0)"));
        assert!(text.ends_with(CONTROLS));
    }

    #[test]
    fn missing_fps_shows_placeholder() {
        let text = DebugSnapshot::default().render();
        assert!(text.starts_with("FPS: --\n"));
        assert!(text.contains("Direction: idle"));
        assert!(text.contains("Action: none (last never)"));
        assert!(!text.contains("Cursor"));
        assert!(!text.contains("Camera hint"));
    }

    fn input_app() -> App {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<DebugOverlay>()
            .add_systems(Update, (toggle_debug_overlay, camera_debug_controls));
        app
    }

    fn press(app: &mut App, key: KeyCode) {
        let mut input = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        input.clear();
        input.press(key);
    }

    #[test]
    fn f3_toggles_the_panel() {
        let mut app = input_app();
        let text = app.world_mut().spawn((DebugText, Visibility::Hidden)).id();

        press(&mut app, KeyCode::F3);
        app.update();
        assert!(app.world().resource::<DebugOverlay>().visible);
        assert_eq!(
            app.world().get::<Visibility>(text),
            Some(&Visibility::Inherited)
        );

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .release(KeyCode::F3);
        press(&mut app, KeyCode::F3);
        app.update();
        assert!(!app.world().resource::<DebugOverlay>().visible);
        assert_eq!(app.world().get::<Visibility>(text), Some(&Visibility::Hidden));
    }

    #[test]
    fn number_keys_zoom_and_x_shakes() {
        let mut app = input_app();
        let camera = app
            .world_mut()
            .spawn(FollowCamera(CameraRig::new(CameraConfig::default())))
            .id();

        press(&mut app, KeyCode::Digit3);
        app.update();
        assert!(app.world().get::<FollowCamera>(camera).unwrap().is_zooming());

        press(&mut app, KeyCode::KeyX);
        app.update();
        assert!(app.world().get::<FollowCamera>(camera).unwrap().is_shaking());

        press(&mut app, KeyCode::KeyR);
        app.update();
        let rig = app.world().get::<FollowCamera>(camera).unwrap();
        assert!(!rig.is_zooming());
        assert!(!rig.is_shaking());
        assert_eq!(rig.zoom(), 2.0);
    }

    #[test]
    fn pan_flash_and_deadzone_lock_keys() {
        let mut app = input_app();
        let mut rig = CameraRig::new(CameraConfig::default());
        rig.set_target(Vec2::new(300.0, 300.0));
        let camera = app.world_mut().spawn(FollowCamera(rig)).id();

        press(&mut app, KeyCode::KeyC);
        app.update();
        let rig = app.world().get::<FollowCamera>(camera).unwrap();
        assert!(rig.is_panning());
        assert_eq!(camera_mode(rig), "panning");

        press(&mut app, KeyCode::KeyF);
        app.update();
        let rig = app.world().get::<FollowCamera>(camera).unwrap();
        assert_eq!(rig.overlay(), Some((Color::WHITE, FLASH_ALPHA)));

        let tuned = CameraConfig::default().deadzone;
        press(&mut app, KeyCode::KeyZ);
        app.update();
        let rig = app.world().get::<FollowCamera>(camera).unwrap();
        assert_eq!(rig.config().deadzone, LOCKED_DEADZONE);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .release(KeyCode::KeyZ);
        press(&mut app, KeyCode::KeyZ);
        app.update();
        let rig = app.world().get::<FollowCamera>(camera).unwrap();
        assert_eq!(rig.config().deadzone, tuned);
    }
}
