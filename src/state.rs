//! Game states and the per-frame system ordering.

use bevy::prelude::*;

/// `Loading` waits for the farm map; `Playing` runs the simulation.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

/// Named system sets to structure the Update schedule. The integrator must see input before
/// the camera sees the integrator's output.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Movement,
    Camera,
    Effects,
}
