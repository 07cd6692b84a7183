//! Procedural generation systems.
//!
//! - Layout rules for the road lattice and building heights
//! - Staged generator stepping through the grid one cell at a time
//! - Bevy systems applying generator steps to block entities

use bevy::prelude::*;

pub mod city_builder;
pub mod generator;
pub mod layout;

pub struct ProcgenPlugin;

impl Plugin for ProcgenPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(city_builder::CityBuilderPlugin);
    }
}
