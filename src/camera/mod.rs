//! Orthographic isometric camera framing the city grid, with zoom, pan and
//! rotate controls.

use bevy::{input::mouse::MouseWheel, prelude::*};

use crate::world::CityConfig;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera)
            .add_systems(Update, (camera_zoom, camera_pan, camera_rotate));
    }
}

/// Standard isometric elevation: arctan(1/sqrt(2)).
const ISO_ANGLE_DEG: f32 = 35.264;
const CAMERA_DISTANCE: f32 = 60.0;
const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 10.0;

#[derive(Component)]
pub struct IsometricCamera {
    pub zoom: f32,
    pub rotation: f32,
    /// Ground point the camera orbits and looks at.
    pub focus: Vec3,
}

impl Default for IsometricCamera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            rotation: 0.0,
            focus: Vec3::ZERO,
        }
    }
}

/// Projection scale that keeps a grid of `grid_span` world units in view at
/// zoom 1.
fn base_scale(grid_span: f32) -> f32 {
    (grid_span / 400.0).max(0.01)
}

fn next_zoom(zoom: f32, scroll: f32) -> f32 {
    (zoom - scroll * 0.1).clamp(MIN_ZOOM, MAX_ZOOM)
}

fn setup_camera(mut commands: Commands, config: Res<CityConfig>) {
    let iso_angle = ISO_ANGLE_DEG.to_radians();
    let focus = config.footprint_center();
    let offset = Vec3::new(
        CAMERA_DISTANCE,
        CAMERA_DISTANCE * iso_angle.tan(),
        CAMERA_DISTANCE,
    );
    let span = config.grid_size as f32 * config.building_size;

    commands.spawn((
        Camera3d::default(),
        Projection::Orthographic(OrthographicProjection {
            scale: base_scale(span),
            ..OrthographicProjection::default_3d()
        }),
        Transform::from_translation(focus + offset).looking_at(focus, Vec3::Y),
        IsometricCamera {
            focus,
            ..default()
        },
    ));
}

fn camera_zoom(
    config: Res<CityConfig>,
    mut query: Query<(&mut Projection, &mut IsometricCamera)>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    let scroll: f32 = scroll_events.read().map(|e| e.y).sum();
    if scroll == 0.0 {
        return;
    }

    let base = base_scale(config.grid_size as f32 * config.building_size);
    for (mut projection, mut iso_cam) in &mut query {
        iso_cam.zoom = next_zoom(iso_cam.zoom, scroll);
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = iso_cam.zoom * base;
        }
    }
}

fn camera_pan(
    mut query: Query<(&mut Transform, &mut IsometricCamera)>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let mut direction = Vec3::ZERO;
    let speed = 20.0;

    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        direction.z -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        direction.z += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        direction.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        direction.x += 1.0;
    }

    if direction == Vec3::ZERO {
        return;
    }

    for (mut transform, mut iso_cam) in &mut query {
        // Pan relative to the current orbit so "up" always moves away from the viewer
        let delta = Quat::from_rotation_y(iso_cam.rotation)
            * direction.normalize()
            * speed
            * iso_cam.zoom
            * time.delta_secs();
        transform.translation += delta;
        iso_cam.focus += delta;
    }
}

fn camera_rotate(
    mut query: Query<(&mut Transform, &mut IsometricCamera)>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let rotation_speed = 1.0;
    let mut rotation_delta = 0.0;

    if keys.pressed(KeyCode::KeyQ) {
        rotation_delta -= rotation_speed * time.delta_secs();
    }
    if keys.pressed(KeyCode::KeyE) {
        rotation_delta += rotation_speed * time.delta_secs();
    }

    if rotation_delta != 0.0 {
        for (mut transform, mut iso_cam) in &mut query {
            iso_cam.rotation += rotation_delta;
            let focus = iso_cam.focus;
            transform.rotate_around(focus, Quat::from_rotation_y(rotation_delta));
        }
    }
}
