//! Application entry point: window setup, core Bevy plugins and the farm plugin from `app.rs`.

mod animation;
mod app;
mod audio;
mod camera;
mod config;
mod direction;
mod effects;
mod follow;
mod interaction;
mod level;
mod math;
mod motion;
mod movement;
mod placeholder;
mod player;
mod state;
mod tween;
mod ui;

use app::HarvestTownPlugin;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::render::texture::ImagePlugin;
use bevy::window::{Window, WindowResizeConstraints, WindowResolution};

use crate::effects::color_from_hex;

fn main() {
    // Route panics to the browser console instead of an opaque abort.
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    console_error_panic_hook::set_once();

    let primary_window = Window {
        title: "HarvestTown".to_string(),
        resolution: WindowResolution::new(1024.0, 768.0),
        resizable: true,
        resize_constraints: WindowResizeConstraints {
            min_width: 800.0,
            min_height: 600.0,
            max_width: 1920.0,
            max_height: 1080.0,
        },
        canvas: cfg!(all(target_arch = "wasm32", feature = "web"))
            .then(|| "#bevy-canvas".to_owned()),
        ..default()
    };

    // Nearest sampling keeps the 32px pixel art crisp at 2x and 3x zoom. Asset hot reload is
    // desktop-only.
    let default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(primary_window),
            ..default()
        })
        .set(ImagePlugin::default_nearest())
        .set(AssetPlugin {
            file_path: "assets".to_owned(),
            watch_for_changes_override: Some(cfg!(not(target_arch = "wasm32"))),
            ..default()
        });

    App::new()
        .insert_resource(ClearColor(color_from_hex(0x2c3e50)))
        .add_plugins(default_plugins)
        .add_plugins(HarvestTownPlugin)
        .run();
}
