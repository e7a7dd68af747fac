use std::collections::HashMap;

use glam::DVec2;

use crate::{block::Block, boid::Boid};

/// Value key of one grid cell. Cheap to hash and to offset arithmetically,
/// unlike the stringly keys this kind of dictionary often accretes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sector {
    pub col: i32,
    pub row: i32,
}

impl Sector {
    pub fn new(col: i32, row: i32) -> Self {
        Sector { col, row }
    }

    /// Cell containing a world position.
    pub fn containing(position: DVec2, sector_size: f64) -> Self {
        Sector {
            col: (position.x / sector_size).floor() as i32,
            row: (position.y / sector_size).floor() as i32,
        }
    }

    /// Top-left corner of the cell in world coordinates.
    pub fn corner(&self, sector_size: f64) -> DVec2 {
        DVec2::new(
            self.col as f64 * sector_size,
            self.row as f64 * sector_size,
        )
    }
}

#[rustfmt::skip]
const NEIGHBOURHOOD: [(i32, i32); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0), (0,  0), (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

/// Uniform-grid spatial index. Boids live in per-sector buckets keyed by
/// their cached sector; blocks get a parallel one-per-sector map. Lookups for
/// flocking only ever touch the 3x3 neighbourhood around a boid's own cell.
pub struct SectorGrid {
    buckets: HashMap<Sector, Vec<Boid>>,
    blocks: HashMap<Sector, Block>,
    sector_size: f64,
    population: usize,
}

impl SectorGrid {
    pub fn new(sector_size: f64) -> Self {
        SectorGrid {
            buckets: HashMap::new(),
            blocks: HashMap::new(),
            sector_size,
            population: 0,
        }
    }

    /// Cell size the index is currently bucketed with.
    pub fn sector_size(&self) -> f64 {
        self.sector_size
    }

    pub fn population(&self) -> usize {
        self.population
    }

    pub fn insert(&mut self, boid: Boid) {
        self.buckets.entry(boid.sector).or_default().push(boid);
        self.population += 1;
    }

    pub fn get(&self, sector: Sector, id: usize) -> Option<&Boid> {
        self.buckets.get(&sector)?.iter().find(|b| b.id == id)
    }

    /// Removes a boid from the bucket under `sector`. A stale or missing key
    /// is a no-op; an emptied bucket is dropped from the map.
    pub fn remove(&mut self, sector: Sector, id: usize) -> Option<Boid> {
        let bucket = self.buckets.get_mut(&sector)?;
        let at = bucket.iter().position(|b| b.id == id)?;
        let boid = bucket.remove(at);
        if bucket.is_empty() {
            self.buckets.remove(&sector);
        }
        self.population -= 1;
        Some(boid)
    }

    /// Writes an updated boid back into the index, relocating it when its
    /// cached sector no longer matches the bucket it was read from. Must run
    /// after the position update, never before.
    pub fn commit(&mut self, old_sector: Sector, boid: Boid) {
        if boid.sector == old_sector {
            if let Some(slot) = self
                .buckets
                .get_mut(&old_sector)
                .and_then(|bucket| bucket.iter_mut().find(|b| b.id == boid.id))
            {
                *slot = boid;
            }
        } else if self.remove(old_sector, boid.id).is_some() {
            self.insert(boid);
        }
    }

    /// Boids in the 3x3 neighbourhood around `sector`, the center bucket
    /// included, in bucket-iteration order. Callers must not depend on the
    /// ordering and are responsible for skipping themselves.
    pub fn neighbours(&self, sector: Sector) -> Vec<Boid> {
        let mut result = Vec::new();
        for (dc, dr) in NEIGHBOURHOOD {
            let probe = Sector::new(sector.col + dc, sector.row + dr);
            if let Some(bucket) = self.buckets.get(&probe) {
                result.extend_from_slice(bucket);
            }
        }
        result
    }

    /// Blocks in the same 3x3 neighbourhood.
    pub fn nearby_blocks(&self, sector: Sector) -> Vec<Block> {
        NEIGHBOURHOOD
            .iter()
            .filter_map(|(dc, dr)| {
                self.blocks
                    .get(&Sector::new(sector.col + dc, sector.row + dr))
                    .copied()
            })
            .collect()
    }

    /// Snaps `(x, y)` to its sector corner and places a block there. A sector
    /// already holding a block rejects the placement as a no-op.
    pub fn place_block(&mut self, x: f64, y: f64) -> Option<Sector> {
        let sector = Sector::containing(DVec2::new(x, y), self.sector_size);
        if self.blocks.contains_key(&sector) {
            return None;
        }
        self.blocks.insert(sector, Block::new(sector, self.sector_size));
        Some(sector)
    }

    /// Frozen (sector, id) membership snapshot for the sweep. Relocations
    /// during the sweep apply to the live buckets, never to this list.
    pub fn roster(&self) -> Vec<(Sector, usize)> {
        self.buckets
            .iter()
            .flat_map(|(sector, bucket)| bucket.iter().map(move |b| (*sector, b.id)))
            .collect()
    }

    /// Re-derives every boid's sector under a new cell size and rebuilds the
    /// buckets. Blocks are not worth re-snapping; the block map is cleared
    /// and placements must be repeated.
    pub fn rebucket(&mut self, sector_size: f64) {
        self.sector_size = sector_size;
        self.blocks.clear();

        let boids: Vec<Boid> = self
            .buckets
            .drain()
            .flat_map(|(_, bucket)| bucket)
            .collect();
        self.population = 0;

        for mut boid in boids {
            boid.sector = Sector::containing(boid.position, sector_size);
            self.insert(boid);
        }
    }

    pub fn boids(&self) -> impl Iterator<Item = &Boid> {
        self.buckets.values().flatten()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    #[cfg(test)]
    pub(crate) fn assert_coherent(&self) {
        let mut counted = 0;
        for (sector, bucket) in &self.buckets {
            assert!(
                !bucket.is_empty(),
                "empty bucket left behind at {:?}",
                sector
            );
            for boid in bucket {
                assert_eq!(boid.sector, *sector);
                assert_eq!(
                    Sector::containing(boid.position, self.sector_size),
                    *sector
                );
                counted += 1;
            }
        }
        assert_eq!(counted, self.population);
    }
}
