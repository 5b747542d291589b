//! Action sound effects. Keeps the clip handles alive, plays one per executed action and mutes
//! playback while the window is unfocused.

use bevy::prelude::*;
use bevy::window::WindowFocused;

use crate::config::asset_available;
use crate::motion::{ActionKind, PlayerAction};
use crate::state::{GameSet, GameState};

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActionSounds>()
            .add_systems(OnEnter(GameState::Loading), load_action_sounds)
            .add_systems(
                Update,
                play_action_sounds
                    .in_set(GameSet::Effects)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Update, pause_audio_on_blur);
    }
}

/// Handles for the per-action clips. Missing files just stay silent.
#[derive(Resource, Default)]
pub struct ActionSounds {
    pub interact: Option<Handle<AudioSource>>,
    pub use_tool: Option<Handle<AudioSource>>,
}

impl ActionSounds {
    pub fn for_action(&self, kind: ActionKind) -> Option<Handle<AudioSource>> {
        match kind {
            ActionKind::Interact => self.interact.clone(),
            ActionKind::UseTool => self.use_tool.clone(),
        }
    }
}

const INTERACT_SOUND: &str = "audio/interact.ogg";
const USE_TOOL_SOUND: &str = "audio/use_tool.ogg";

/// Only clips that ship get a handle, so a missing file means silence rather than a failed load.
fn sound_handle(
    asset_server: &AssetServer,
    path: &'static str,
) -> Option<Handle<AudioSource>> {
    if asset_available(path) {
        Some(asset_server.load(path))
    } else {
        info!("{path} not found; that action plays no sound");
        None
    }
}

fn load_action_sounds(asset_server: Res<AssetServer>, mut sounds: ResMut<ActionSounds>) {
    sounds.interact = sound_handle(&asset_server, INTERACT_SOUND);
    sounds.use_tool = sound_handle(&asset_server, USE_TOOL_SOUND);
}

/// One fire-and-forget sound entity per executed action.
fn play_action_sounds(
    mut commands: Commands,
    mut actions: EventReader<PlayerAction>,
    sounds: Res<ActionSounds>,
) {
    for action in actions.read() {
        let Some(source) = sounds.for_action(action.kind) else {
            continue;
        };
        commands.spawn(AudioBundle {
            source,
            settings: PlaybackSettings::DESPAWN,
        });
    }
}

/// Pauses every playing sink while the window is in the background.
fn pause_audio_on_blur(mut focus: EventReader<WindowFocused>, sinks: Query<&AudioSink>) {
    let Some(event) = focus.read().last() else {
        return;
    };
    for sink in &sinks {
        if event.focused {
            sink.play();
        } else {
            sink.pause();
        }
    }
}
