//! Square grid of block entities, indexed by cell coordinate.

use bevy::prelude::*;

/// Integer cell coordinate in `[0, grid_size)` on both axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: u32,
    pub z: u32,
}

impl CellCoord {
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Row-major (x outer, z inner) coordinate of the `index`-th cell.
    pub fn from_index(index: usize, size: u32) -> Self {
        let size = size.max(1) as usize;
        Self {
            x: (index / size) as u32,
            z: (index % size) as u32,
        }
    }
}

/// Owns the entity handle for every placed block.
///
/// The grid never despawns anything itself; [`CityGrid::reset`] hands the
/// released handles back so the caller can despawn them.
#[derive(Resource, Default, Debug)]
pub struct CityGrid {
    size: u32,
    cells: Vec<Option<Entity>>,
}

impl CityGrid {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            cells: vec![None; (size as usize) * (size as usize)],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Release every occupied cell and reallocate an empty grid of `size`.
    pub fn reset(&mut self, size: u32) -> Vec<Entity> {
        let released: Vec<Entity> = self.cells.drain(..).flatten().collect();
        *self = Self::new(size);
        released
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if coord.x >= self.size || coord.z >= self.size {
            return None;
        }
        Some(coord.x as usize * self.size as usize + coord.z as usize)
    }

    pub fn get(&self, coord: CellCoord) -> Option<Entity> {
        self.index(coord).and_then(|i| self.cells[i])
    }

    /// Store `entity` at `coord`, returning whatever was there before.
    /// Out-of-range coordinates are ignored.
    pub fn set(&mut self, coord: CellCoord, entity: Entity) -> Option<Entity> {
        let i = self.index(coord)?;
        self.cells[i].replace(entity)
    }

    /// Number of cells currently holding an entity.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Entity)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, e)| e.map(|e| (CellCoord::from_index(i, size), e)))
    }
}
