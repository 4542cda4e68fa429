//! Terrain sensor model for the belief filter.
//!
//! The sensor reports the true terrain class with probability
//! `sensor_success`; the remaining mass is spread uniformly over the
//! other observable classes. Blocked is never observed (the agent never
//! stands on a blocked cell).

use rand::Rng;

use crate::core::{TerrainClass, TerrainReading};

/// Configuration and likelihoods of the terrain sensor.
#[derive(Clone, Copy, Debug)]
pub struct SensorModel {
    sensor_success: f64,
}

impl SensorModel {
    /// Create a model with the given read success probability.
    pub fn new(sensor_success: f64) -> Self {
        Self { sensor_success }
    }

    /// Read success probability.
    #[inline]
    pub fn sensor_success(&self) -> f64 {
        self.sensor_success
    }

    /// Likelihood of observing `reading` while standing on `terrain`.
    pub fn likelihood(&self, terrain: TerrainClass, reading: TerrainReading) -> f64 {
        if reading.matches(terrain) {
            self.sensor_success
        } else {
            (1.0 - self.sensor_success) / (TerrainClass::OBSERVABLE_COUNT as f64 - 1.0)
        }
    }

    /// Sample a reading for the true terrain under this model.
    ///
    /// `terrain` must be walkable; the misread branch picks uniformly
    /// among the two other observable classes.
    pub fn sample<R: Rng>(&self, terrain: TerrainClass, rng: &mut R) -> TerrainReading {
        let truth = TerrainReading::of_terrain(terrain)
            .unwrap_or(TerrainReading::Normal);
        if rng.gen_bool(self.sensor_success) {
            return truth;
        }
        let others: Vec<TerrainReading> = TerrainReading::ALL
            .iter()
            .copied()
            .filter(|r| *r != truth)
            .collect();
        others[rng.gen_range(0..others.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_likelihoods_sum_to_one_per_terrain() {
        let model = SensorModel::new(0.9);
        for terrain in [
            TerrainClass::Normal,
            TerrainClass::Highway,
            TerrainClass::Difficult,
        ] {
            let total: f64 = TerrainReading::ALL
                .iter()
                .map(|r| model.likelihood(terrain, *r))
                .sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_match_beats_mismatch() {
        let model = SensorModel::new(0.9);
        assert!((model.likelihood(TerrainClass::Highway, TerrainReading::Highway) - 0.9).abs() < 1e-12);
        assert!((model.likelihood(TerrainClass::Highway, TerrainReading::Normal) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_sample_frequencies_track_success_rate() {
        let model = SensorModel::new(0.8);
        let mut rng = StdRng::seed_from_u64(11);
        let mut hits = 0;
        let trials = 10_000;
        for _ in 0..trials {
            if model.sample(TerrainClass::Difficult, &mut rng) == TerrainReading::Difficult {
                hits += 1;
            }
        }
        let rate = hits as f64 / trials as f64;
        assert!((rate - 0.8).abs() < 0.02, "observed match rate {}", rate);
    }
}
