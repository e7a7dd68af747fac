use glam::DVec2;
use thiserror::Error;

/// Per-tick configuration snapshot.
///
/// The driver owns a `RunOptions` value and hands a shared reference into
/// every engine call; swapping the whole value between ticks is the only
/// supported way to reconfigure a running colony. Nothing mutates it
/// mid-tick.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// side length of one grid sector, world units
    pub sector_size: f64,
    /// speed constant: the velocity magnitude and the position step scale
    pub velocity: f64,
    /// soft population target driving the reproduction throttle
    pub max_boids: usize,

    /// blend rate for same-gene cohesion, alignment and crowding
    pub adjust_rate: f64,
    /// blend rate for cross-gene exclusion
    pub repel_rate: f64,
    /// blend rate for steering away from blocks
    pub block_repel_rate: f64,

    /// same-gene boids closer than this repel instead of cohering
    pub density_distance: f64,
    /// per-tick cap on sampled flocking neighbours
    pub max_flocking_neighbors: usize,

    /// base lifespan handed to founders and, pre-drift, to offspring
    pub lifespan: i64,
    /// lineages whose lifespan drifts to or below this stop reproducing
    pub min_lifespan: i64,
    /// offspring per qualifying parent
    pub birthrate: usize,

    /// upward nudge applied to the parent's dominant channel before mutation
    pub gene_bias_factor: f64,
    /// half-width of the per-channel color mutation
    pub color_mutation: f64,

    /// population interval at which the milestone counter advances
    pub milestone: usize,

    pub window: WindowSize,
    /// distance from a window edge inside which boids get steered back
    pub edge_buffer: f64,

    pub sample_rate: u64,
    pub save_options: SaveOptions,
}

impl RunOptions {
    /// Rejects geometry and rates the engine cannot run with. Called once at
    /// the driver boundary; the tick path itself never validates.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.sector_size > 0.0) {
            return Err(OptionsError::NonPositiveSectorSize(self.sector_size));
        }
        if !(self.velocity > 0.0) {
            return Err(OptionsError::NonPositiveVelocity(self.velocity));
        }
        if self.max_boids == 0 {
            return Err(OptionsError::ZeroMaxBoids);
        }
        if !(self.window.width > 0.0) || !(self.window.height > 0.0) {
            return Err(OptionsError::DegenerateWindow {
                width: self.window.width,
                height: self.window.height,
            });
        }
        if self.lifespan < 1 {
            return Err(OptionsError::NonPositiveLifespan(self.lifespan));
        }
        if self.sample_rate == 0 {
            return Err(OptionsError::ZeroSampleRate);
        }
        Ok(())
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        let sector_size = 50.;
        let velocity = 2.;
        let max_boids = 500;

        let adjust_rate = 0.05;
        let repel_rate = 0.05;
        let block_repel_rate = 0.2;

        let density_distance = 15.;
        let max_flocking_neighbors = 8;

        let lifespan = 500;
        let min_lifespan = 200;
        let birthrate = 3;

        let gene_bias_factor = 10.;
        let color_mutation = 20.;

        let milestone = 100;

        RunOptions {
            sector_size,
            velocity,
            max_boids,
            adjust_rate,
            repel_rate,
            block_repel_rate,
            density_distance,
            max_flocking_neighbors,
            lifespan,
            min_lifespan,
            birthrate,
            gene_bias_factor,
            color_mutation,
            milestone,
            window: WindowSize::new(1200., 800.),
            edge_buffer: 50.,
            sample_rate: 1,
            save_options: SaveOptions {
                save_data: false,
                save_data_path: Some("./".to_owned()),
                save_data_timestamp: true,
            },
        }
    }
}

/// World viewport the boids bounce around in. Positions are plain floats and
/// may leave it briefly; the window only anchors edge steering, the
/// reproduction position guard and gridline rendering.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

impl WindowSize {
    pub fn new(width: f64, height: f64) -> WindowSize {
        WindowSize { width, height }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2., self.height / 2.)
    }
}

#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub save_data: bool,
    pub save_data_path: Option<String>,
    pub save_data_timestamp: bool,
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("sector size must be positive, got {0}")]
    NonPositiveSectorSize(f64),
    #[error("velocity must be positive, got {0}")]
    NonPositiveVelocity(f64),
    #[error("max boids must be at least 1")]
    ZeroMaxBoids,
    #[error("window must have positive dimensions, got {width}x{height}")]
    DegenerateWindow { width: f64, height: f64 },
    #[error("lifespan must be at least 1, got {0}")]
    NonPositiveLifespan(i64),
    #[error("sample rate must be at least 1")]
    ZeroSampleRate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_validate() {
        assert!(RunOptions::default().validate().is_ok());
    }

    #[test]
    fn zero_sector_size_is_rejected() {
        let mut ro = RunOptions::default();
        ro.sector_size = 0.;
        assert!(matches!(
            ro.validate(),
            Err(OptionsError::NonPositiveSectorSize(_))
        ));
    }

    #[test]
    fn negative_velocity_is_rejected() {
        let mut ro = RunOptions::default();
        ro.velocity = -1.;
        assert!(matches!(
            ro.validate(),
            Err(OptionsError::NonPositiveVelocity(_))
        ));
    }

    #[test]
    fn degenerate_window_is_rejected() {
        let mut ro = RunOptions::default();
        ro.window = WindowSize::new(0., 800.);
        assert!(matches!(
            ro.validate(),
            Err(OptionsError::DegenerateWindow { .. })
        ));
    }

    #[test]
    fn nan_geometry_is_rejected() {
        let mut ro = RunOptions::default();
        ro.sector_size = f64::NAN;
        assert!(ro.validate().is_err());
    }
}
