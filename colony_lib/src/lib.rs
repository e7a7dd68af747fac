use birdwatcher::{Birdwatcher, ColonyData};
use colony::Colony;
use options::{OptionsError, RunOptions};

pub mod block;
pub mod boid;
pub mod colony;
pub mod genetics;
pub mod grid;

pub mod birdwatcher;
pub mod math_helpers;
pub mod options;

/// Runs a colony headless for `no_iter` ticks and returns the sampled
/// demographics, saving them according to the options' `SaveOptions`.
pub fn colony_base(
    no_iter: u64,
    run_options: RunOptions,
    seed: u64,
) -> Result<Vec<ColonyData>, OptionsError> {
    let ro = run_options;
    ro.validate()?;

    let mut colony = Colony::new(&ro, seed);
    let mut bird_watcher = Birdwatcher::new(ro.sample_rate);

    (0..no_iter).for_each(|_| {
        let summary = colony.tick(&ro);
        bird_watcher.watch(&colony, &summary);
    });

    let data = bird_watcher.pop_data_save(&ro.save_options);

    Ok(data)
}
