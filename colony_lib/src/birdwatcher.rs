use std::{fs::OpenOptions, mem};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    boid::Gene,
    colony::{Colony, TickSummary},
    options::SaveOptions,
};

/// One demographic sample of the colony.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct ColonyData {
    pub time: u64,
    pub population: usize,
    pub born: usize,
    pub died: usize,
    pub reds: usize,
    pub greens: usize,
    pub blues: usize,
}

/// Accumulates demographic samples of a running colony and dumps them to CSV
/// on demand. Pull-based: the driver decides when to watch and when to save.
pub struct Birdwatcher {
    samples: Vec<ColonyData>,
    render_ticker: u64,
    sample_rate: u64,
}

const PREFIX: &str = "colony-data";

impl Birdwatcher {
    pub fn new(sample_rate: u64) -> Self {
        Birdwatcher {
            samples: Vec::new(),
            render_ticker: 0,
            sample_rate,
        }
    }

    /// Triggers data collection
    pub fn watch(&mut self, colony: &Colony, summary: &TickSummary) {
        if !self.should_sample() {
            return;
        }

        let genes = colony.boids().map(|b| b.gene).counts();

        self.samples.push(ColonyData {
            time: self.render_ticker / self.sample_rate,
            population: summary.population,
            born: summary.born,
            died: summary.died,
            reds: genes.get(&Gene::Red).copied().unwrap_or(0),
            greens: genes.get(&Gene::Green).copied().unwrap_or(0),
            blues: genes.get(&Gene::Blue).copied().unwrap_or(0),
        });
    }

    pub fn restart(&mut self) {
        self.samples.clear();
    }

    pub fn pop_data(&mut self) -> Vec<ColonyData> {
        mem::take(&mut self.samples)
    }

    /// Saves the latest data in CSV format, then returns it while emptying
    /// the birdwatcher's memory
    ///
    /// Depending on save options, either attempts to overwrite the current
    /// file or writes a new timestamped file
    pub fn pop_data_save(&mut self, save_options: &SaveOptions) -> Vec<ColonyData> {
        let data = self.pop_data();

        if !save_options.save_data {
            return data;
        }

        if let Some(path) = &save_options.save_data_path {
            let file_path = format!(
                "{path}{file_name}",
                file_name = Birdwatcher::get_dataset_name(save_options, Utc::now())
            );

            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .append(false)
                .open(file_path)
                .expect("Can't open file");
            let mut wtr = csv::Writer::from_writer(file);

            data.iter().for_each(|row| {
                wtr.serialize(row).expect("Can't serialize data point");
            });
            wtr.flush().expect("Can't write data file");
        }

        data
    }

    fn get_dataset_name(save_options: &SaveOptions, now: DateTime<Utc>) -> String {
        match save_options.save_data_timestamp {
            true => {
                let datetime_part = now.timestamp_millis();
                format!(
                    "{prefix}_{datetime}.csv",
                    prefix = PREFIX,
                    datetime = datetime_part
                )
            }
            false => format!("{prefix}.csv", prefix = PREFIX),
        }
    }

    fn should_sample(&mut self) -> bool {
        self.render_ticker += 1;

        self.render_ticker % self.sample_rate == 0
    }
}

#[cfg(test)]
#[allow(deprecated)]
mod tests {
    use chrono::prelude::*;
    use chrono::Utc;
    use glam::DVec2;

    use super::Birdwatcher;
    use crate::{
        boid::Gene,
        colony::{Colony, TickSummary},
        options::{RunOptions, SaveOptions},
    };

    #[test]
    fn test_name_timestamped() {
        let expected = "colony-data_1668038059490.csv";
        let save_options = SaveOptions {
            save_data: true,
            save_data_path: Some("".to_owned()),
            save_data_timestamp: true,
        };
        let dt = Utc.ymd(2022, 11, 09).and_hms_milli_opt(23, 54, 19, 490);
        let actual = Birdwatcher::get_dataset_name(&save_options, dt.unwrap());

        assert_eq!(actual, expected)
    }

    #[test]
    fn test_name_overwrite() {
        let expected = "colony-data.csv";
        let save_options = SaveOptions {
            save_data: true,
            save_data_path: Some("".to_owned()),
            save_data_timestamp: false,
        };
        let dt = Utc.ymd(2022, 11, 09).and_hms_milli_opt(23, 54, 19, 490);
        let actual = Birdwatcher::get_dataset_name(&save_options, dt.unwrap());

        assert_eq!(actual, expected)
    }

    #[test]
    fn watch_tallies_genes() {
        let ro = RunOptions::default();
        let mut colony = Colony::new(&ro, 1);
        colony.insert(200., 200., DVec2::new(1., 0.), Gene::Red, 400, &ro);
        colony.insert(300., 200., DVec2::new(1., 0.), Gene::Red, 400, &ro);
        colony.insert(400., 200., DVec2::new(1., 0.), Gene::Green, 400, &ro);
        let summary = TickSummary {
            born: 0,
            died: 0,
            population: colony.population(),
        };

        let mut bird_watcher = Birdwatcher::new(1);
        bird_watcher.watch(&colony, &summary);
        let data = bird_watcher.pop_data();

        assert_eq!(data.len(), 1);
        assert_eq!(data[0].population, 3);
        assert_eq!(data[0].reds, 2);
        assert_eq!(data[0].greens, 1);
        assert_eq!(data[0].blues, 0);
    }

    #[test]
    fn sample_rate_skips_ticks() {
        let ro = RunOptions::default();
        let colony = Colony::new(&ro, 1);
        let summary = TickSummary::default();

        let mut bird_watcher = Birdwatcher::new(2);
        bird_watcher.watch(&colony, &summary);
        bird_watcher.watch(&colony, &summary);
        bird_watcher.watch(&colony, &summary);

        assert_eq!(bird_watcher.pop_data().len(), 1);
    }
}
