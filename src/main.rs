//! Cityscape - staged procedural city grid
//!
//! Lays out a square grid of blocks in three sweeps (buildings, road
//! lattice, final heights), one cell per frame, so generation can be
//! watched as it happens. Press B to rebuild.

use bevy::prelude::*;

mod camera;
mod procgen;
mod render;
mod ui;
mod world;

fn main() {
    // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Cityscape".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Grid and configuration
        .add_plugins(world::WorldPlugin)
        // Staged generation
        .add_plugins(procgen::ProcgenPlugin)
        // Presentation
        .add_plugins(render::RenderPlugin)
        .add_plugins(camera::CameraPlugin)
        // Status overlay and rebuild key
        .add_plugins(ui::UiPlugin)
        .run();
}
