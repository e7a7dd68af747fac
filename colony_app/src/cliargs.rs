use clap_serde_derive::{
    clap::{self, Parser},
    serde::Serialize,
    ClapSerde,
};

#[derive(Parser)]
#[derive(ClapSerde)]
#[command(version, about, long_about = None)]
/// Headless driver for the gene-flocking boid colony.
pub struct Args {
    /// Config file
    #[arg(short, long = "config", default_value = "colony.yaml")]
    pub config_path: std::path::PathBuf,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Serialize)]
/// Programatic configuration
///
/// Uses defaults, which can be overwritten by specifying a filepath for the
/// `-c` or `--config` arg option
pub struct Config {
    #[default(2000)]
    #[arg(short = 'n', long)]
    /// number of ticks to simulate
    pub no_ticks: u64,

    #[default(42)]
    #[arg(long)]
    /// rng seed; equal seeds reproduce a run exactly
    pub seed: u64,

    #[default(1)]
    #[arg(short = 'r', long)]
    /// ratio of ticks/sample_rate, e.g. 4 = sample every 4th tick
    pub sample_rate: u64,

    #[default(true)]
    #[arg(short = 's', long)]
    pub save: bool,

    #[default(false)]
    #[arg(short = 't', long)]
    pub save_timestamp: bool,

    #[default(1200.)]
    #[arg(short = 'x', long)]
    pub width: f64,

    #[default(800.)]
    #[arg(short = 'y', long)]
    pub height: f64,

    #[default(50.)]
    #[arg(long)]
    pub sector_size: f64,

    #[default(500)]
    #[arg(long)]
    pub max_boids: usize,

    #[default(500)]
    #[arg(long)]
    pub lifespan: i64,

    #[default(200)]
    #[arg(long)]
    pub min_lifespan: i64,

    #[default(3)]
    #[arg(long)]
    pub birthrate: usize,

    #[default(100)]
    #[arg(long)]
    pub milestone: usize,
}
