//! Staged city generator.
//!
//! The generator is a plain state machine: the current phase and a cell
//! cursor. Each call to [`CityGenerator::next_step`] yields the work for one
//! cell and advances the cursor, moving to the next phase once every cell of
//! the current one has been visited. It knows nothing about entities; the
//! Bevy side applies the returned [`CellStep`]s.

use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use super::layout::{
    block_scale, cell_position, final_height_range, is_road, sample_height, INITIAL_HEIGHTS,
    ROAD_HEIGHT,
};
use crate::world::{CellCoord, CityConfig};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GenerationPhase {
    #[default]
    Idle,
    PlacingBuildings,
    ClearingRoads,
    AdjustingHeights,
    Complete,
}

impl GenerationPhase {
    /// Text shown in the status overlay.
    pub fn label(self) -> &'static str {
        match self {
            GenerationPhase::Idle => "",
            GenerationPhase::PlacingBuildings => "Phase 1: Generating Buildings",
            GenerationPhase::ClearingRoads => "Phase 2: Clearing Roads",
            GenerationPhase::AdjustingHeights => "Phase 3: Adjusting Building Heights",
            GenerationPhase::Complete => "Generation Complete!",
        }
    }

    fn next(self) -> Self {
        match self {
            GenerationPhase::Idle => GenerationPhase::PlacingBuildings,
            GenerationPhase::PlacingBuildings => GenerationPhase::ClearingRoads,
            GenerationPhase::ClearingRoads => GenerationPhase::AdjustingHeights,
            GenerationPhase::AdjustingHeights | GenerationPhase::Complete => {
                GenerationPhase::Complete
            }
        }
    }

    pub fn is_running(self) -> bool {
        !matches!(self, GenerationPhase::Idle | GenerationPhase::Complete)
    }
}

/// Work for a single cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellStep {
    /// Spawn a building block with the given height.
    Place { coord: CellCoord, height: f32 },
    /// Turn the cell's block into a flat road tile.
    Pave { coord: CellCoord, height: f32 },
    /// Give a building block its final height.
    Raise { coord: CellCoord, height: f32 },
    /// The phase visits this cell but leaves it untouched.
    Skip { coord: CellCoord },
}

impl CellStep {
    pub fn coord(&self) -> CellCoord {
        match *self {
            CellStep::Place { coord, .. }
            | CellStep::Pave { coord, .. }
            | CellStep::Raise { coord, .. }
            | CellStep::Skip { coord } => coord,
        }
    }
}

/// Layout parameters captured when a run starts.
#[derive(Clone, Copy, Debug)]
struct RunParams {
    grid_size: u32,
    road_spacing: u32,
    snap_heights: bool,
    origin: Vec3,
    building_size: f32,
}

#[derive(Resource)]
pub struct CityGenerator {
    phase: GenerationPhase,
    cursor: usize,
    params: RunParams,
    runs: u64,
    rng: StdRng,
}

impl Default for CityGenerator {
    fn default() -> Self {
        Self {
            phase: GenerationPhase::Idle,
            cursor: 0,
            params: RunParams {
                grid_size: 0,
                road_spacing: 1,
                snap_heights: true,
                origin: Vec3::ZERO,
                building_size: 1.0,
            },
            runs: 0,
            rng: StdRng::seed_from_u64(0),
        }
    }
}

impl CityGenerator {
    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_running()
    }

    /// Number of runs started so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Begin a new run. Returns `false` and changes nothing while a run is
    /// still in progress. `config` must already be validated.
    pub fn start(&mut self, config: &CityConfig) -> bool {
        if self.is_busy() {
            return false;
        }

        self.params = RunParams {
            grid_size: config.grid_size,
            road_spacing: config.road_spacing.max(1),
            snap_heights: config.snap_heights,
            origin: config.origin,
            building_size: config.building_size,
        };
        self.rng = StdRng::seed_from_u64(config.seed.wrapping_add(self.runs));
        self.runs += 1;
        self.cursor = 0;
        self.phase = GenerationPhase::PlacingBuildings;
        true
    }

    /// Road lattice spacing of the current (or last) run.
    pub fn road_spacing(&self) -> u32 {
        self.params.road_spacing
    }

    /// Transform of a block at `coord` with the given height, using the
    /// geometry captured when the run started.
    pub fn block_transform(&self, coord: CellCoord, height: f32) -> Transform {
        let RunParams {
            origin,
            building_size,
            ..
        } = self.params;
        Transform::from_translation(cell_position(origin, coord, building_size))
            .with_scale(block_scale(building_size, height))
    }

    /// Scale of a block with the given height in the current run.
    pub fn block_scale(&self, height: f32) -> Vec3 {
        block_scale(self.params.building_size, height)
    }

    fn cell_count(&self) -> usize {
        let size = self.params.grid_size as usize;
        size * size
    }

    /// Produce the next cell's work, or `None` once the run is finished (or
    /// was never started).
    pub fn next_step(&mut self) -> Option<CellStep> {
        loop {
            if !self.phase.is_running() {
                return None;
            }
            if self.cursor < self.cell_count() {
                break;
            }
            self.phase = self.phase.next();
            self.cursor = 0;
        }

        let coord = CellCoord::from_index(self.cursor, self.params.grid_size);
        self.cursor += 1;

        let RunParams {
            road_spacing,
            snap_heights,
            ..
        } = self.params;

        let step = match self.phase {
            GenerationPhase::PlacingBuildings => CellStep::Place {
                coord,
                height: sample_height(&mut self.rng, INITIAL_HEIGHTS, snap_heights),
            },
            GenerationPhase::ClearingRoads if is_road(coord, road_spacing) => CellStep::Pave {
                coord,
                height: ROAD_HEIGHT,
            },
            GenerationPhase::AdjustingHeights if !is_road(coord, road_spacing) => {
                CellStep::Raise {
                    coord,
                    height: sample_height(&mut self.rng, final_height_range(coord), snap_heights),
                }
            }
            _ => CellStep::Skip { coord },
        };
        Some(step)
    }
}
