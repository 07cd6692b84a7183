//! Mesh and material handles for city blocks.
//!
//! Generation only tags blocks with a [`BlockSurface`]; this module gives
//! new blocks their mesh and keeps the material in step with the surface.

use bevy::prelude::*;

use crate::procgen::city_builder::{BlockSurface, CityBlock};

pub struct BlocksPlugin;

impl Plugin for BlocksPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_city_assets).add_systems(
            Update,
            (attach_block_visuals, sync_block_materials).chain(),
        );
    }
}

/// Template mesh and the two materials every block is drawn with.
#[derive(Resource, Clone)]
pub struct CityAssets {
    pub block_mesh: Handle<Mesh>,
    pub building_material: Handle<StandardMaterial>,
    pub road_material: Handle<StandardMaterial>,
}

impl CityAssets {
    pub fn new(meshes: &mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>) -> Self {
        // Unit cube with its base on the ground so scaling grows it upwards.
        let block_mesh = meshes.add(Mesh::from(Cuboid::default()).translated_by(Vec3::Y * 0.5));

        let building_material = materials.add(StandardMaterial {
            base_color: Color::srgb(0.72, 0.72, 0.74),
            perceptual_roughness: 0.85,
            metallic: 0.0,
            ..default()
        });
        let road_material = materials.add(StandardMaterial {
            base_color: Color::srgb(0.18, 0.18, 0.2),
            perceptual_roughness: 0.95,
            ..default()
        });

        Self {
            block_mesh,
            building_material,
            road_material,
        }
    }

    pub fn material_for(&self, surface: BlockSurface) -> Handle<StandardMaterial> {
        match surface {
            BlockSurface::Building => self.building_material.clone(),
            BlockSurface::Road => self.road_material.clone(),
        }
    }
}

fn setup_city_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(CityAssets::new(&mut meshes, &mut materials));
}

fn attach_block_visuals(
    mut commands: Commands,
    assets: Res<CityAssets>,
    query: Query<(Entity, &BlockSurface), Added<CityBlock>>,
) {
    for (entity, surface) in &query {
        commands.entity(entity).insert((
            Mesh3d(assets.block_mesh.clone()),
            MeshMaterial3d(assets.material_for(*surface)),
        ));
    }
}

fn sync_block_materials(
    assets: Res<CityAssets>,
    mut query: Query<(&BlockSurface, &mut MeshMaterial3d<StandardMaterial>), Changed<BlockSurface>>,
) {
    for (surface, mut material) in &mut query {
        let wanted = assets.material_for(*surface);
        if material.0 != wanted {
            material.0 = wanted;
        }
    }
}
