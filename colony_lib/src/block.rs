use glam::DVec2;

use crate::grid::Sector;

/// A static repeller filling one grid sector. Placement snaps the requested
/// point to the sector's top-left corner; once placed, a block never moves
/// and only disappears when a cell-size change clears the whole block map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub position: DVec2,
    pub sector: Sector,
}

impl Block {
    pub fn new(sector: Sector, sector_size: f64) -> Self {
        Block {
            position: sector.corner(sector_size),
            sector,
        }
    }

    /// Center of the occupied cell. Repulsion measures distance to here, not
    /// to the corner, since the block fills the whole sector.
    pub fn center(&self, sector_size: f64) -> DVec2 {
        self.position + DVec2::splat(sector_size / 2.)
    }
}
