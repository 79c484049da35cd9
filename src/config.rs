// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Run configuration. Every struct carries its documented defaults and can be
//! hydrated from JSON with missing fields falling back to those defaults.

use crate::error::{MixError, Result};
use crate::exposure::advisor::AdvisorTuning;
use crate::exposure::deterministic::DEFAULT_RECOMMENDATION_LIMIT;
use crate::guardrails::MixGuardrails;
use crate::mix::BoundsTable;
use serde::{Deserialize, Serialize};

/// Genetic search parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub elite_size: usize,
    pub tournament_size: usize,
    /// Mutation standard deviation as a share of each ingredient's bound range.
    pub mutation_scale: f64,
    /// Cement floor (kg/m³) enforced on the winner; `None` disables it.
    pub binder_floor: Option<f64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            population_size: 100,
            generations: 50,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            elite_size: 10,
            tournament_size: 5,
            mutation_scale: 0.05,
            binder_floor: Some(200.0),
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(MixError::invalid("population_size", "must be at least 2"));
        }
        if self.generations == 0 {
            return Err(MixError::invalid("generations", "must be at least 1"));
        }
        if self.elite_size > self.population_size {
            return Err(MixError::invalid(
                "elite_size",
                format!(
                    "{} exceeds population size {}",
                    self.elite_size, self.population_size
                ),
            ));
        }
        if self.tournament_size == 0 {
            return Err(MixError::invalid("tournament_size", "must be at least 1"));
        }
        for (name, rate) in [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(MixError::invalid(name, format!("{rate} is not in [0, 1]")));
            }
        }
        if !(self.mutation_scale.is_finite() && self.mutation_scale >= 0.0) {
            return Err(MixError::invalid("mutation_scale", "must be finite and >= 0"));
        }
        if let Some(floor) = self.binder_floor {
            if !(floor.is_finite() && floor >= 0.0) {
                return Err(MixError::invalid("binder_floor", "must be finite and >= 0"));
            }
        }
        Ok(())
    }
}

/// Probabilistic classification constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbabilisticConfig {
    /// n of the binomial normal approximation behind the confidence intervals.
    pub effective_sample_size: f64,
    /// A class governs once its satisfaction probability exceeds this.
    pub governing_threshold: f64,
    /// Standard deviations at or below this are treated as exact values.
    pub std_floor: f64,
}

impl Default for ProbabilisticConfig {
    fn default() -> Self {
        ProbabilisticConfig {
            effective_sample_size: 30.0,
            governing_threshold: 0.5,
            std_floor: 1e-9,
        }
    }
}

impl ProbabilisticConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.effective_sample_size.is_finite() && self.effective_sample_size > 0.0) {
            return Err(MixError::invalid("effective_sample_size", "must be > 0"));
        }
        if !(0.0..1.0).contains(&self.governing_threshold) {
            return Err(MixError::invalid("governing_threshold", "must be in [0, 1)"));
        }
        if !(self.std_floor.is_finite() && self.std_floor > 0.0) {
            return Err(MixError::invalid("std_floor", "must be > 0"));
        }
        Ok(())
    }
}

/// Monte Carlo propagation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UncertaintyConfig {
    pub samples: usize,
    /// Relative standard deviation applied to every ingredient (0.05 = 5 %).
    pub relative_uncertainty: f64,
    pub seed: u64,
}

impl Default for UncertaintyConfig {
    fn default() -> Self {
        UncertaintyConfig {
            samples: 500,
            relative_uncertainty: 0.05,
            seed: 42,
        }
    }
}

impl UncertaintyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(MixError::invalid("samples", "must be at least 1"));
        }
        if !(self.relative_uncertainty.is_finite() && self.relative_uncertainty >= 0.0) {
            return Err(MixError::invalid("relative_uncertainty", "must be finite and >= 0"));
        }
        Ok(())
    }
}

/// Everything the durability kernel needs besides the criteria table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub optimizer: OptimizerConfig,
    pub probabilistic: ProbabilisticConfig,
    pub uncertainty: UncertaintyConfig,
    pub bounds: BoundsTable,
    pub advisor: AdvisorTuning,
    pub guardrails: MixGuardrails,
    /// Failed classes that receive remediation hints; `None` for all of them.
    pub recommendation_limit: Option<usize>,
    pub confidence_level: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            optimizer: OptimizerConfig::default(),
            probabilistic: ProbabilisticConfig::default(),
            uncertainty: UncertaintyConfig::default(),
            bounds: BoundsTable::standard(),
            advisor: AdvisorTuning::default(),
            guardrails: MixGuardrails::default(),
            recommendation_limit: Some(DEFAULT_RECOMMENDATION_LIMIT),
            confidence_level: 0.95,
        }
    }
}

impl KernelConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: KernelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.optimizer.validate()?;
        self.probabilistic.validate()?;
        self.uncertainty.validate()?;
        self.bounds.validate()?;
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(MixError::invalid(
                "confidence_level",
                format!("{} is not in (0, 1)", self.confidence_level),
            ));
        }
        Ok(())
    }
}
