use rand::Rng;

use crate::{
    boid::{Boid, Gene},
    options::RunOptions,
};

/// Half-width of the lifespan drift applied to every offspring, ticks.
const LIFESPAN_DRIFT: i64 = 30;

/// Traits handed to one offspring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inheritance {
    pub gene: Gene,
    pub rgb: [f64; 3],
    pub lifespan: i64,
}

/// Derives offspring traits from a parent. The parent's dominant channel is
/// biased up before mutation, each channel then mutates independently and is
/// clamped to [0, 255]; the offspring gene follows the strongest post-clamp
/// channel, with exact ties broken by a uniform draw among the tied channels.
pub fn inherit<R: Rng>(parent: &Boid, run_options: &RunOptions, rng: &mut R) -> Inheritance {
    let mut rgb = parent.rgb;
    rgb[parent.gene.channel()] += run_options.gene_bias_factor;

    // a zero mutation range keeps inheritance deterministic
    if run_options.color_mutation > 0. {
        for channel in rgb.iter_mut() {
            *channel += rng.gen_range(-run_options.color_mutation..run_options.color_mutation);
        }
    }
    for channel in rgb.iter_mut() {
        *channel = channel.clamp(0., 255.);
    }

    // ties are exact here: clamping and zero mutation are the only sources
    let strongest = rgb[0].max(rgb[1]).max(rgb[2]);
    let mut winners = [Gene::Red; 3];
    let mut winner_count = 0;
    for gene in [Gene::Red, Gene::Green, Gene::Blue] {
        if rgb[gene.channel()] == strongest {
            winners[winner_count] = gene;
            winner_count += 1;
        }
    }
    let gene = winners[rng.gen_range(0..winner_count)];

    let lifespan = run_options.lifespan + rng.gen_range(-LIFESPAN_DRIFT..=LIFESPAN_DRIFT);

    Inheritance { gene, rgb, lifespan }
}
