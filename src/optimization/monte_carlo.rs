// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT

//! Monte Carlo uncertainty propagation
//!
//! Batching tolerances are pushed through the property oracle: every
//! positive ingredient is perturbed with Gaussian noise proportional to its
//! dosage, the oracle is run on each perturbed mix, and the resulting
//! property samples are summarised. The summary feeds the probabilistic
//! compliance engine.

use crate::config::UncertaintyConfig;
use crate::error::{MixError, Result};
use crate::exposure::probabilistic::{Gaussian, UncertainMeasurements};
use crate::mix::Composition;
use crate::oracle::PropertySet;
use crate::traits::PropertyOracle;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Summary of one property's samples.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub q05: f64,
    pub q25: f64,
    pub q75: f64,
    pub q95: f64,
    /// std / |mean| in percent, 0 when the mean is 0.
    pub cv_percent: f64,
    pub n: usize,
}

impl SampleStats {
    /// `None` for an empty slice.
    pub fn from_samples(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let std = var.sqrt();

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(SampleStats {
            mean,
            median: quantile(&sorted, 0.5),
            std,
            q05: quantile(&sorted, 0.05),
            q25: quantile(&sorted, 0.25),
            q75: quantile(&sorted, 0.75),
            q95: quantile(&sorted, 0.95),
            cv_percent: if mean != 0.0 {
                std / mean.abs() * 100.0
            } else {
                0.0
            },
            n,
        })
    }

    pub fn as_gaussian(&self) -> Gaussian {
        Gaussian::new(self.mean, self.std)
    }
}

/// Linear interpolation between closest ranks of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyUncertainty {
    pub samples_requested: usize,
    pub valid_samples: usize,
    pub resistance: SampleStats,
    pub chloride_diffusion: SampleStats,
    pub carbonation: SampleStats,
    pub water_binder_ratio: SampleStats,
    pub total_binder: SampleStats,
}

impl PropertyUncertainty {
    /// Gaussian view of the sampled properties.
    pub fn to_uncertain_measurements(&self) -> UncertainMeasurements {
        UncertainMeasurements::new(
            self.water_binder_ratio.as_gaussian(),
            self.resistance.as_gaussian(),
        )
        .with_chloride(self.chloride_diffusion.as_gaussian())
        .with_carbonation(self.carbonation.as_gaussian())
    }

    pub fn rejection_rate(&self) -> f64 {
        1.0 - self.valid_samples as f64 / self.samples_requested as f64
    }
}

pub struct UncertaintyPropagator {
    config: UncertaintyConfig,
}

impl UncertaintyPropagator {
    pub fn new(config: UncertaintyConfig) -> Result<Self> {
        config.validate()?;
        Ok(UncertaintyPropagator { config })
    }

    pub fn config(&self) -> &UncertaintyConfig {
        &self.config
    }

    /// One perturbed copy of `base`; zero dosages stay zero.
    fn perturb(&self, base: &Composition, rng: &mut StdRng) -> Composition {
        base.iter()
            .map(|(ingredient, value)| {
                if value <= 0.0 {
                    return (ingredient, 0.0);
                }
                let sigma = value * self.config.relative_uncertainty;
                let noisy = match Normal::new(0.0, sigma) {
                    Ok(noise) => value + noise.sample(rng),
                    Err(_) => value,
                };
                (ingredient, noisy.max(0.0))
            })
            .collect()
    }

    pub fn propagate(
        &self,
        oracle: &dyn PropertyOracle,
        base: &Composition,
    ) -> Result<PropertyUncertainty> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let requested = self.config.samples;

        let predictions: Vec<PropertySet> = (0..requested)
            .filter_map(|_| oracle.predict(&self.perturb(base, &mut rng)).ok())
            .collect();

        if predictions.is_empty() {
            return Err(MixError::NoValidSamples(requested));
        }
        let rejected = requested - predictions.len();
        if rejected > 0 {
            warn!(rejected, requested, "oracle rejected perturbed compositions");
        }

        let column = |f: fn(&PropertySet) -> f64| {
            let values: Vec<f64> = predictions.iter().map(f).collect();
            SampleStats::from_samples(&values)
        };
        let (Some(resistance), Some(chloride_diffusion), Some(carbonation), Some(water_binder_ratio), Some(total_binder)) = (
            column(|p| p.resistance),
            column(|p| p.chloride_diffusion),
            column(|p| p.carbonation),
            column(|p| p.water_binder_ratio),
            column(|p| p.total_binder),
        ) else {
            return Err(MixError::NoValidSamples(requested));
        };

        debug!(
            valid = predictions.len(),
            resistance_mean = resistance.mean,
            resistance_std = resistance.std,
            "uncertainty propagated"
        );

        Ok(PropertyUncertainty {
            samples_requested: requested,
            valid_samples: predictions.len(),
            resistance,
            chloride_diffusion,
            carbonation,
            water_binder_ratio,
            total_binder,
        })
    }
}
