//! World management: city configuration and the block grid.

use std::time::Duration;

use bevy::prelude::*;
use thiserror::Error;

pub mod grid;

pub use grid::{CellCoord, CityGrid};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CityConfig>().init_resource::<CityGrid>();
    }
}

/// Global city layout configuration.
///
/// Read when a generation run starts; changing it mid-run only affects the
/// next rebuild.
#[derive(Resource, Clone, Debug)]
pub struct CityConfig {
    /// Number of cells along each side of the square grid.
    pub grid_size: u32,
    /// Footprint of a single block in world units.
    pub building_size: f32,
    /// Minimum delay in seconds between two generation steps.
    pub step_interval: f32,
    /// Every `road_spacing`-th row and column becomes road.
    pub road_spacing: u32,
    /// World position of cell (0, 0).
    pub origin: Vec3,
    /// Base seed; each run mixes in its run number.
    pub seed: u64,
    /// Draw whole-unit heights instead of continuous ones.
    pub snap_heights: bool,
    /// Key that requests a rebuild.
    pub rebuild_key: KeyCode,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            building_size: 1.0,
            step_interval: 0.01,
            road_spacing: 3,
            origin: Vec3::ZERO,
            seed: 31415,
            snap_heights: true,
            rebuild_key: KeyCode::KeyB,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CityConfigError {
    #[error("road spacing must be at least 1")]
    ZeroRoadSpacing,
    #[error("building size must be positive and finite, got {0}")]
    InvalidBuildingSize(f32),
    #[error("step interval must be a non-negative, representable duration, got {0}")]
    InvalidStepInterval(f32),
}

impl CityConfig {
    /// Reject values that would make the layout rules divide by zero or
    /// produce degenerate geometry.
    pub fn validate(&self) -> Result<(), CityConfigError> {
        if self.road_spacing == 0 {
            return Err(CityConfigError::ZeroRoadSpacing);
        }
        if !self.building_size.is_finite() || self.building_size <= 0.0 {
            return Err(CityConfigError::InvalidBuildingSize(self.building_size));
        }
        // Also catches NaN and intervals too long for a `Duration`.
        if Duration::try_from_secs_f32(self.step_interval).is_err() {
            return Err(CityConfigError::InvalidStepInterval(self.step_interval));
        }
        Ok(())
    }

    /// Center of the grid footprint at ground level.
    pub fn footprint_center(&self) -> Vec3 {
        let half = (self.grid_size.saturating_sub(1)) as f32 * self.building_size * 0.5;
        self.origin + Vec3::new(half, 0.0, half)
    }
}
