use std::{fs::File, io::BufReader, process::ExitCode};

use clap_serde_derive::{clap::Parser, ClapSerde};

use colony_lib::birdwatcher::Birdwatcher;
use colony_lib::colony::Colony;
use colony_lib::options::{RunOptions, SaveOptions, WindowSize};

mod cliargs;
use cliargs::{Args, Config};

fn main() -> ExitCode {
    env_logger::init();

    // Parse whole args with clap
    let mut args = Args::parse();

    // Get config file
    let config = if let Ok(f) = File::open(&args.config_path) {
        // Parse config with serde
        match serde_yaml::from_reader::<_, <Config as ClapSerde>::Opt>(BufReader::new(f)) {
            // merge config already parsed from clap
            Ok(config) => Config::from(config).merge(&mut args.config),
            Err(err) => {
                log::error!("error in configuration file: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        // no config file, use the arguments
        Config::from(&mut args.config)
    };

    let run_options = to_run_options(&config);
    if let Err(err) = run_options.validate() {
        log::error!("invalid options: {err}");
        return ExitCode::FAILURE;
    }

    let mut colony = Colony::new(&run_options, config.seed);
    let mut bird_watcher = Birdwatcher::new(run_options.sample_rate);
    let mut milestones = 0;

    for tick in 0..config.no_ticks {
        let summary = colony.tick(&run_options);
        bird_watcher.watch(&colony, &summary);

        let reached = colony.milestones_reached(&run_options);
        if reached > milestones {
            milestones = reached;
            log::info!(
                "tick {tick}: population crossed {}",
                reached * run_options.milestone
            );
        }
    }

    let data = bird_watcher.pop_data_save(&run_options.save_options);
    log::info!(
        "simulated {} ticks, final population {}, {} samples collected",
        config.no_ticks,
        colony.population(),
        data.len()
    );

    ExitCode::SUCCESS
}

fn to_run_options(config: &Config) -> RunOptions {
    let mut ro = RunOptions::default();

    ro.window = WindowSize::new(config.width, config.height);
    ro.sector_size = config.sector_size;
    ro.max_boids = config.max_boids;
    ro.lifespan = config.lifespan;
    ro.min_lifespan = config.min_lifespan;
    ro.birthrate = config.birthrate;
    ro.milestone = config.milestone;
    ro.sample_rate = config.sample_rate;
    ro.save_options = SaveOptions {
        save_data: config.save,
        save_data_path: Some("./".to_owned()),
        save_data_timestamp: config.save_timestamp,
    };

    ro
}
