//! Rendering: block meshes and materials, scene lighting.

use bevy::{pbr::CascadeShadowConfigBuilder, prelude::*};

pub mod blocks;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(blocks::BlocksPlugin)
            .insert_resource(ClearColor(Color::srgb(0.53, 0.7, 0.85)))
            .add_systems(Startup, setup_lighting);
    }
}

#[derive(Component)]
pub struct Sun;

fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            shadow_depth_bias: 0.3,
            shadow_normal_bias: 1.8,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_4,
            std::f32::consts::FRAC_PI_4,
            0.0,
        )),
        // Grid is tens of units across
        CascadeShadowConfigBuilder {
            num_cascades: 2,
            minimum_distance: 0.1,
            maximum_distance: 120.0,
            first_cascade_far_bound: 30.0,
            overlap_proportion: 0.3,
        }
        .build(),
        Sun,
    ));
}
