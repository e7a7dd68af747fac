use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::{
    block::Block,
    boid::{Boid, Gene},
    genetics,
    grid::{Sector, SectorGrid},
    options::RunOptions,
};

/// Per-axis velocity jitter given to offspring at birth.
const BIRTH_JITTER: f64 = 0.1;

/// Per-tick birth/death report. Pull-only: collaborators read it, the engine
/// never calls out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    pub born: usize,
    pub died: usize,
    pub population: usize,
}

/// The population manager. Owns the sector grid and the run's random
/// generator, drives the two-phase tick and applies the lifecycle policy.
pub struct Colony {
    grid: SectorGrid,
    rng: Xoshiro256PlusPlus,
    next_id: usize,
}

impl Colony {
    /// Builds an empty colony. The first `tick` bootstraps the founder; equal
    /// seeds reproduce every stochastic decision of a run exactly.
    pub fn new(run_options: &RunOptions, seed: u64) -> Self {
        Colony {
            grid: SectorGrid::new(run_options.sector_size),
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            next_id: 0,
        }
    }

    pub fn population(&self) -> usize {
        self.grid.population()
    }

    /// Live boids, for a renderer to pull `(position, rgb)` from.
    pub fn boids(&self) -> impl Iterator<Item = &Boid> {
        self.grid.boids()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.grid.blocks()
    }

    /// How many milestone intervals the current population has crossed. A
    /// sound or notification collaborator diffs successive values itself.
    pub fn milestones_reached(&self, run_options: &RunOptions) -> usize {
        if run_options.milestone == 0 {
            0
        } else {
            self.population() / run_options.milestone
        }
    }

    /// Places a block at the sector containing `(x, y)`. Placement into an
    /// occupied sector is a silent no-op returning `None`.
    pub fn place_block(&mut self, x: f64, y: f64) -> Option<Sector> {
        self.grid.place_block(x, y)
    }

    /// Inserts a boid built from raw parts and returns its id. A seeding hook
    /// for scenarios; regular population growth goes through `tick`.
    pub fn insert(
        &mut self,
        x: f64,
        y: f64,
        velocity: DVec2,
        gene: Gene,
        lifespan: i64,
        run_options: &RunOptions,
    ) -> usize {
        let id = self.allocate_id();
        self.grid
            .insert(Boid::new(id, x, y, velocity, gene, lifespan, run_options));
        id
    }

    /// Advances the simulation by one step.
    pub fn tick(&mut self, run_options: &RunOptions) -> TickSummary {
        if self.grid.sector_size() != run_options.sector_size {
            self.grid.rebucket(run_options.sector_size);
        }
        if self.grid.population() == 0 {
            self.bootstrap(run_options);
        }

        // phase 1: sweep a roster frozen at tick start, so a mid-tick
        // relocation can neither skip a boid nor visit it twice
        let roster = self.grid.roster();
        let mut expired: Vec<(Sector, usize)> = Vec::new();

        for (sector, id) in roster {
            let boid = match self.grid.get(sector, id) {
                Some(b) => *b,
                None => continue,
            };
            let neighbours = self.grid.neighbours(sector);
            let blocks = self.grid.nearby_blocks(sector);

            let mut updated = boid;
            updated.update_location(run_options);
            updated.run_rules(&neighbours, &blocks, run_options, &mut self.rng);
            let new_sector = updated.sector;
            self.grid.commit(sector, updated);

            if updated.age >= updated.lifespan {
                expired.push((new_sector, id));
            }
        }

        // phase 2: the dying are exactly the reproduction candidates, and
        // they stay visible in the index until every candidate has been
        // evaluated
        let mut born = 0;
        for &(sector, id) in &expired {
            if let Some(parent) = self.grid.get(sector, id).copied() {
                born += self.try_reproduce(&parent, run_options);
            }
        }

        let mut died = 0;
        for &(sector, id) in &expired {
            if self.grid.remove(sector, id).is_some() {
                died += 1;
            }
        }

        TickSummary {
            born,
            died,
            population: self.grid.population(),
        }
    }

    /// Seeds the world with a single founder whenever it is empty.
    fn bootstrap(&mut self, run_options: &RunOptions) {
        let id = self.allocate_id();
        let mut founder = Boid::new(
            id,
            100.,
            100.,
            DVec2::new(1., 1.),
            Gene::Red,
            run_options.lifespan,
            run_options,
        );
        founder.is_founder = true;
        self.grid.insert(founder);
    }

    /// Reproduction policy, evaluated per dying parent. Every guard fails
    /// closed: an unmet precondition means zero offspring, never an error.
    fn try_reproduce(&mut self, parent: &Boid, run_options: &RunOptions) -> usize {
        // population pressure floors the odds at 10% instead of hard-capping,
        // so the population can overshoot max_boids
        let pressure = self.grid.population() as f64 / run_options.max_boids as f64;
        let chance = (1. - pressure).max(0.1);
        if self.rng.gen::<f64>() > chance {
            return 0;
        }

        // edge-hugging and off-screen parents never reproduce
        let window = run_options.window;
        if parent.position.x <= 0. || parent.position.x >= window.width {
            return 0;
        }
        if parent.position.y <= 0. || parent.position.y >= window.height {
            return 0;
        }

        // a lineage whose lifespan drifted to the floor stops here
        if parent.lifespan <= run_options.min_lifespan {
            return 0;
        }

        // flockless boids do not reproduce, founders excepted
        if parent.alone && !parent.is_founder {
            return 0;
        }

        for _ in 0..run_options.birthrate {
            let jitter = DVec2::new(
                self.rng.gen_range(-BIRTH_JITTER..BIRTH_JITTER),
                self.rng.gen_range(-BIRTH_JITTER..BIRTH_JITTER),
            );
            let traits = genetics::inherit(parent, run_options, &mut self.rng);
            let id = self.allocate_id();
            let mut child = Boid::new(
                id,
                parent.position.x,
                parent.position.y,
                parent.velocity + jitter,
                traits.gene,
                traits.lifespan,
                run_options,
            );
            child.rgb = traits.rgb;
            self.grid.insert(child);
        }

        run_options.birthrate
    }

    fn allocate_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[cfg(test)]
    pub(crate) fn grid(&self) -> &SectorGrid {
        &self.grid
    }
}
