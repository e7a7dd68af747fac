use glam::DVec2;
use rand::{seq::index, Rng};

use crate::{
    block::Block,
    grid::Sector,
    math_helpers::{normalize, rescale},
    options::RunOptions,
};

/// Soft steering applied per unit of offset from the window center once a
/// boid enters the edge buffer.
const EDGE_CENTERING_RATE: f64 = 1e-4;

/// Color every fresh lineage starts from, before any drift.
const BASE_RGB: [f64; 3] = [100., 100., 100.];

/// Categorical flocking affinity tag, doubling as the dominant color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gene {
    Red,
    Green,
    Blue,
}

impl Gene {
    /// Index of the matching channel in an rgb triple.
    pub fn channel(&self) -> usize {
        match self {
            Gene::Red => 0,
            Gene::Green => 1,
            Gene::Blue => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Boid {
    // sequential id starting from 0, never reused within a run
    pub id: usize,
    pub position: DVec2,
    pub velocity: DVec2,
    pub gene: Gene,
    /// channels clamped to [0, 255]; drifts across generations
    pub rgb: [f64; 3],
    pub lifespan: i64,
    pub age: i64,
    /// cached cell key; the colony re-buckets when it changes
    pub sector: Sector,
    /// founders are exempt from the isolation reproduction guard
    pub is_founder: bool,
    /// true until the flocking scan sees a same-gene neighbour this tick
    pub alone: bool,
}

impl Boid {
    /// Creates a new [`Boid`].
    pub fn new(
        id: usize,
        x: f64,
        y: f64,
        velocity: DVec2,
        gene: Gene,
        lifespan: i64,
        run_options: &RunOptions,
    ) -> Self {
        let position = DVec2::new(x, y);

        Boid {
            id,
            position,
            velocity,
            gene,
            rgb: BASE_RGB,
            lifespan,
            age: 0,
            sector: Sector::containing(position, run_options.sector_size),
            is_founder: false,
            alone: false,
        }
    }

    /// Advances the position by one tick, steers along the window edges,
    /// refreshes the cached sector and ages the boid. The caller is
    /// responsible for re-bucketing when the sector changed.
    pub fn update_location(&mut self, run_options: &RunOptions) {
        self.position += self.velocity * run_options.velocity;

        self.boundaries(run_options);

        self.sector = Sector::containing(self.position, run_options.sector_size);
        self.age += 1;
    }

    fn boundaries(&mut self, run_options: &RunOptions) {
        let window = run_options.window;
        let center = window.center();
        let buffer = run_options.edge_buffer;

        if self.position.x < buffer || self.position.x > window.width - buffer {
            self.velocity.x += (center.x - self.position.x) * EDGE_CENTERING_RATE;
        }
        if self.position.y < buffer || self.position.y > window.height - buffer {
            self.velocity.y += (center.y - self.position.y) * EDGE_CENTERING_RATE;
        }

        // hard bounce once the window is actually crossed
        if self.position.x > window.width || self.position.x < 0. {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y > window.height || self.position.y < 0. {
            self.velocity.y = -self.velocity.y;
        }
    }

    /// Applies block repulsion and gene-affinity flocking against the 3x3
    /// sector neighbourhood, then pins the velocity magnitude back to the
    /// speed constant. Neighbour count per tick is bounded by
    /// `max_flocking_neighbors` via sampling without replacement, so the cost
    /// of one update does not grow with local density.
    pub fn run_rules<R: Rng>(
        &mut self,
        neighbours: &[Boid],
        blocks: &[Block],
        run_options: &RunOptions,
        rng: &mut R,
    ) {
        // blocks fill whole sectors, so they repel from further away than a
        // boid would
        let block_repel_distance = run_options.sector_size * 1.5;
        for block in blocks {
            let to_block = block.center(run_options.sector_size) - self.position;
            if to_block.length_squared() < block_repel_distance * block_repel_distance {
                self.steer_away(to_block, run_options.block_repel_rate, run_options);
            }
        }

        let others: Vec<&Boid> = neighbours.iter().filter(|b| b.id != self.id).collect();
        let sampled: Vec<&Boid> = if others.len() > run_options.max_flocking_neighbors {
            index::sample(rng, others.len(), run_options.max_flocking_neighbors)
                .iter()
                .map(|at| others[at])
                .collect()
        } else {
            others
        };

        self.alone = true;
        let density_sq = run_options.density_distance * run_options.density_distance;

        for other in sampled {
            let to_other = other.position - self.position;

            if other.gene == self.gene {
                self.alone = false;
                if to_other.length_squared() < density_sq {
                    // crowded within the lineage, back off
                    self.steer_away(to_other, run_options.adjust_rate, run_options);
                } else {
                    self.steer_along(other.velocity, run_options.adjust_rate, run_options);
                }
            } else {
                // cross-gene exclusion is distance-independent
                self.steer_away(to_other, run_options.repel_rate, run_options);
            }
        }

        // holds the speed invariant even on ticks where no rule fired
        self.velocity = rescale(self.velocity, run_options.velocity);
    }

    /// Blends the velocity away from a target sitting along `towards`.
    fn steer_away(&mut self, towards: DVec2, rate: f64, run_options: &RunOptions) {
        let repel = normalize(-towards);
        self.velocity = rescale(self.velocity + repel * rate, run_options.velocity);
    }

    /// Blends the velocity toward another boid's heading.
    fn steer_along(&mut self, heading: DVec2, rate: f64, run_options: &RunOptions) {
        let blended = self.velocity + (heading - self.velocity) * rate;
        self.velocity = rescale(blended, run_options.velocity);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::DVec2;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    use super::{Boid, Gene};
    use crate::{block::Block, grid::Sector, options::RunOptions};

    fn make_boid(id: usize, x: f64, y: f64, gene: Gene, ro: &RunOptions) -> Boid {
        Boid::new(id, x, y, DVec2::new(0., 1.), gene, ro.lifespan, ro)
    }

    #[test]
    fn update_location_moves_ages_and_rebuckets() {
        let ro = RunOptions::default();
        let mut boid = make_boid(0, 120., 120., Gene::Red, &ro);
        boid.velocity = DVec2::new(1., 0.);

        boid.update_location(&ro);

        assert_eq!(boid.position, DVec2::new(122., 120.));
        assert_eq!(boid.age, 1);
        assert_eq!(boid.sector, Sector::new(2, 2));
    }

    #[test]
    fn crossing_the_window_flips_the_velocity_axis() {
        let ro = RunOptions::default();
        let mut boid = make_boid(0, 1195., 400., Gene::Red, &ro);
        boid.velocity = DVec2::new(10., 0.);

        boid.update_location(&ro);

        assert!(boid.position.x > ro.window.width);
        assert!(boid.velocity.x < 0., "x velocity must invert at the edge");
    }

    #[test]
    fn edge_buffer_biases_velocity_toward_center() {
        let ro = RunOptions::default();
        let mut boid = make_boid(0, 10., 400., Gene::Red, &ro);
        boid.velocity = DVec2::new(0., 1.);

        boid.update_location(&ro);

        assert!(
            boid.velocity.x > 0.,
            "a boid hugging the left edge drifts back toward center"
        );
    }

    #[test]
    fn run_rules_conserves_speed() {
        let ro = RunOptions::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut boid = make_boid(0, 100., 100., Gene::Red, &ro);
        let neighbours = vec![
            make_boid(1, 104., 100., Gene::Red, &ro),
            make_boid(2, 130., 95., Gene::Green, &ro),
            make_boid(3, 90., 140., Gene::Red, &ro),
        ];

        boid.run_rules(&neighbours, &[], &ro, &mut rng);

        assert_relative_eq!(boid.velocity.length(), ro.velocity, max_relative = 1e-9);
    }

    #[test]
    fn crowded_same_gene_pair_repels() {
        let ro = RunOptions::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);

        // 5 apart, well inside the 15-unit density distance
        let mut left = make_boid(0, 100., 100., Gene::Red, &ro);
        let mut right = make_boid(1, 105., 100., Gene::Red, &ro);
        let snapshot = [left, right];

        left.run_rules(&snapshot, &[], &ro, &mut rng);
        right.run_rules(&snapshot, &[], &ro, &mut rng);

        assert!(left.velocity.x < 0., "left one backs off further left");
        assert!(right.velocity.x > 0., "right one backs off further right");
        assert!(!left.alone && !right.alone);
    }

    #[test]
    fn distant_same_gene_pair_aligns() {
        let ro = RunOptions::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);

        let mut follower = make_boid(0, 100., 100., Gene::Red, &ro);
        let mut leader = make_boid(1, 130., 100., Gene::Red, &ro);
        leader.velocity = DVec2::new(1., 0.);
        let snapshot = [follower, leader];

        follower.run_rules(&snapshot, &[], &ro, &mut rng);

        assert!(
            follower.velocity.x > 0.,
            "heading blends toward the neighbour's"
        );
        assert!(!follower.alone);
    }

    #[test]
    fn cross_gene_pair_repels_at_any_distance() {
        let ro = RunOptions::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);

        // far outside the density distance; gene mismatch repels anyway
        let mut left = make_boid(0, 100., 100., Gene::Red, &ro);
        let mut right = make_boid(1, 140., 100., Gene::Blue, &ro);
        let snapshot = [left, right];

        left.run_rules(&snapshot, &[], &ro, &mut rng);
        right.run_rules(&snapshot, &[], &ro, &mut rng);

        assert!(left.velocity.x < 0.);
        assert!(right.velocity.x > 0.);
        assert!(left.alone, "a foreign gene is no company");
        assert!(right.alone);
    }

    #[test]
    fn blocks_repel_from_their_sector_center() {
        let ro = RunOptions::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut boid = make_boid(0, 100., 100., Gene::Red, &ro);
        // block at sector (2, 2), center (125, 125)
        let block = Block::new(Sector::new(2, 2), ro.sector_size);

        boid.run_rules(&[], &[block], &ro, &mut rng);

        assert!(boid.velocity.x < 0., "pushed away on x");
    }

    #[test]
    fn neighbour_cap_of_zero_leaves_a_boid_alone() {
        let mut ro = RunOptions::default();
        ro.max_flocking_neighbors = 0;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(6);

        let mut boid = make_boid(0, 100., 100., Gene::Red, &ro);
        let neighbours = vec![make_boid(1, 104., 100., Gene::Red, &ro)];

        boid.run_rules(&neighbours, &[], &ro, &mut rng);

        assert!(boid.alone, "nothing sampled, nothing seen");
    }

    #[test]
    fn degenerate_velocity_stalls_without_nans() {
        let ro = RunOptions::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut boid = make_boid(0, 100., 100., Gene::Red, &ro);
        boid.velocity = DVec2::ZERO;

        boid.run_rules(&[], &[], &ro, &mut rng);

        assert_eq!(boid.velocity, DVec2::ZERO);
        assert!(!boid.position.is_nan());
    }
}
