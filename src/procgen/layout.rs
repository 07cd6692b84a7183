//! Layout rules mapping a grid cell to its role, position and height.

use bevy::prelude::*;
use rand::Rng;

use crate::world::CellCoord;

/// Height scale given to road cells.
pub const ROAD_HEIGHT: f32 = 0.1;

/// Initial building heights, drawn before roads are carved out.
pub const INITIAL_HEIGHTS: std::ops::Range<f32> = 1.0..4.0;
/// Final heights for cells where `(x + z) % 5 < 3`.
pub const LOW_RISE_HEIGHTS: std::ops::Range<f32> = 2.0..4.0;
/// Final heights for the remaining building cells.
pub const HIGH_RISE_HEIGHTS: std::ops::Range<f32> = 4.0..6.0;

/// True when the cell sits on the road lattice.
///
/// `spacing` must be non-zero; callers validate the config first.
pub fn is_road(coord: CellCoord, spacing: u32) -> bool {
    coord.x % spacing == 0 || coord.z % spacing == 0
}

/// World position of a cell's base.
pub fn cell_position(origin: Vec3, coord: CellCoord, building_size: f32) -> Vec3 {
    origin + Vec3::new(coord.x as f32 * building_size, 0.0, coord.z as f32 * building_size)
}

/// Scale applied to a block of the given height.
pub fn block_scale(building_size: f32, height: f32) -> Vec3 {
    Vec3::new(building_size, height, building_size)
}

/// Height band a non-road cell settles into during the final sweep.
pub fn final_height_range(coord: CellCoord) -> std::ops::Range<f32> {
    if (coord.x + coord.z) % 5 < 3 {
        LOW_RISE_HEIGHTS
    } else {
        HIGH_RISE_HEIGHTS
    }
}

/// Draw from a half-open range, optionally restricted to whole units.
pub fn sample_height<R: Rng>(rng: &mut R, range: std::ops::Range<f32>, snap: bool) -> f32 {
    if snap {
        rng.gen_range(range.start as i32..range.end as i32) as f32
    } else {
        rng.gen_range(range)
    }
}
