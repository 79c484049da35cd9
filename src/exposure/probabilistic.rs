// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Probabilistic Exposure-Class Classification
//!
//! Each property is modelled as an independent Gaussian. The probability of
//! satisfying a class is the product of the per-criterion probabilities:
//!
//! ```text
//! P(class) = P(W/B <= max) * P(fc >= min) [* P(Cl <= max)] [* P(carb <= max)]
//! ```
//!
//! Chloride and carbonation factors only enter when the class sets the
//! ceiling and the measurement distribution is known. Air content is not
//! part of the product. Correlations between properties are ignored.

use super::criteria::{CriteriaTable, ExposureClass, ExposureCriteria};
use super::deterministic::{ComplianceEngine, ExposureResult, Measurements};
use crate::config::ProbabilisticConfig;
use crate::error::{MixError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;
use std::sync::Arc;
use tracing::debug;

/// Normal distribution of one measured property.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pub mean: f64,
    pub std: f64,
}

impl Gaussian {
    pub fn new(mean: f64, std: f64) -> Self {
        Gaussian { mean, std }
    }

    /// Zero-width distribution.
    pub fn exact(value: f64) -> Self {
        Gaussian {
            mean: value,
            std: 0.0,
        }
    }

    fn validate(&self, name: &'static str) -> Result<()> {
        if !self.mean.is_finite() || !self.std.is_finite() || self.std < 0.0 {
            return Err(MixError::invalid(
                name,
                format!("expected finite mean and std >= 0, got N({}, {})", self.mean, self.std),
            ));
        }
        Ok(())
    }

    /// P(X <= limit). Degenerate distributions resolve as an exact value.
    pub fn prob_at_most(&self, limit: f64, std_floor: f64) -> f64 {
        if self.std <= std_floor {
            return if self.mean <= limit { 1.0 } else { 0.0 };
        }
        standard_normal_cdf((limit - self.mean) / self.std)
    }

    /// P(X >= limit).
    pub fn prob_at_least(&self, limit: f64, std_floor: f64) -> f64 {
        if self.std <= std_floor {
            return if self.mean >= limit { 1.0 } else { 0.0 };
        }
        standard_normal_cdf((self.mean - limit) / self.std)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UncertainMeasurements {
    pub water_binder_ratio: Gaussian,
    pub resistance: Gaussian,
    #[serde(default)]
    pub chloride: Option<Gaussian>,
    #[serde(default)]
    pub carbonation: Option<Gaussian>,
}

impl UncertainMeasurements {
    pub fn new(water_binder_ratio: Gaussian, resistance: Gaussian) -> Self {
        UncertainMeasurements {
            water_binder_ratio,
            resistance,
            chloride: None,
            carbonation: None,
        }
    }

    pub fn with_chloride(mut self, chloride: Gaussian) -> Self {
        self.chloride = Some(chloride);
        self
    }

    pub fn with_carbonation(mut self, carbonation: Gaussian) -> Self {
        self.carbonation = Some(carbonation);
        self
    }

    /// Point measurements at the means.
    pub fn means(&self) -> Measurements {
        Measurements {
            water_binder_ratio: self.water_binder_ratio.mean,
            resistance: self.resistance.mean,
            chloride: self.chloride.map(|g| g.mean),
            carbonation: self.carbonation.map(|g| g.mean),
            air_content: None,
        }
    }

    fn validate(&self) -> Result<()> {
        self.water_binder_ratio.validate("water_binder_ratio")?;
        self.resistance.validate("resistance")?;
        if let Some(g) = &self.chloride {
            g.validate("chloride")?;
        }
        if let Some(g) = &self.carbonation {
            g.validate("carbonation")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, p: f64) -> bool {
        self.lower <= p && p <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbabilisticExposureResult {
    /// Classification at the means.
    pub deterministic: ExposureResult,
    pub governing_class: ExposureClass,
    pub probabilities: BTreeMap<ExposureClass, f64>,
    pub confidence_level: f64,
    pub confidence_intervals: BTreeMap<ExposureClass, ConfidenceInterval>,
}

impl ProbabilisticExposureResult {
    pub fn probability(&self, class: ExposureClass) -> Option<f64> {
        self.probabilities.get(&class).copied()
    }

    /// Classes whose probability exceeds `threshold`, the same strict test
    /// the governing class uses.
    pub fn likely_classes(&self, threshold: f64) -> Vec<ExposureClass> {
        self.probabilities
            .iter()
            .filter(|(_, p)| **p > threshold)
            .map(|(c, _)| *c)
            .collect()
    }
}

/// Φ(z) = ½·erfc(−z/√2)
pub fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * libm::erfc(-z / SQRT_2)
}

/// Inverse standard normal CDF, Abramowitz and Stegun 26.2.23
/// (absolute error below 4.5e-4).
pub fn inv_normal_cdf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let sign = if p < 0.5 { -1.0 } else { 1.0 };
    let q = if p < 0.5 { p } else { 1.0 - p };
    let t = (-2.0 * q.ln()).sqrt();

    const C0: f64 = 2.515517;
    const C1: f64 = 0.802853;
    const C2: f64 = 0.010328;
    const D1: f64 = 1.432788;
    const D2: f64 = 0.189269;
    const D3: f64 = 0.001308;

    let num = C0 + C1 * t + C2 * t * t;
    let den = 1.0 + D1 * t + D2 * t * t + D3 * t * t * t;
    sign * (t - num / den)
}

/// Two-sided critical value for a confidence level in (0, 1).
pub fn z_score(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(MixError::invalid(
            "confidence_level",
            format!("{confidence_level} is not in (0, 1)"),
        ));
    }
    Ok(inv_normal_cdf((1.0 + confidence_level) / 2.0))
}

#[derive(Clone, Debug)]
pub struct ProbabilisticEngine {
    table: Arc<CriteriaTable>,
    config: ProbabilisticConfig,
    deterministic: ComplianceEngine,
}

impl ProbabilisticEngine {
    pub fn new(table: Arc<CriteriaTable>) -> Self {
        Self::with_config(table, ProbabilisticConfig::default())
    }

    pub fn with_config(table: Arc<CriteriaTable>, config: ProbabilisticConfig) -> Self {
        ProbabilisticEngine {
            deterministic: ComplianceEngine::new(Arc::clone(&table)),
            table,
            config,
        }
    }

    /// Replace the engine used for the classification at the means.
    pub fn with_deterministic(mut self, engine: ComplianceEngine) -> Self {
        self.deterministic = engine;
        self
    }

    pub fn config(&self) -> &ProbabilisticConfig {
        &self.config
    }

    /// Probability that a formulation drawn from `m` satisfies `criteria`.
    pub fn class_probability(&self, criteria: &ExposureCriteria, m: &UncertainMeasurements) -> f64 {
        let floor = self.config.std_floor;
        let mut p = m.water_binder_ratio.prob_at_most(criteria.max_water_binder, floor)
            * m.resistance.prob_at_least(criteria.min_resistance, floor);

        if let (Some(limit), Some(g)) = (criteria.max_chloride, m.chloride) {
            p *= g.prob_at_most(limit, floor);
        }
        if let (Some(limit), Some(g)) = (criteria.max_carbonation, m.carbonation) {
            p *= g.prob_at_most(limit, floor);
        }
        p.clamp(0.0, 1.0)
    }

    /// Binomial normal-approximation interval around `p`, clamped to [0, 1].
    pub fn confidence_interval(&self, p: f64, z: f64) -> ConfidenceInterval {
        let half = z * (p * (1.0 - p) / self.config.effective_sample_size).sqrt();
        ConfidenceInterval {
            lower: (p - half).max(0.0),
            upper: (p + half).min(1.0),
        }
    }

    pub fn classify_probabilistic(
        &self,
        m: &UncertainMeasurements,
        confidence_level: f64,
    ) -> Result<ProbabilisticExposureResult> {
        let z = z_score(confidence_level)?;
        m.validate()?;

        let deterministic = self.deterministic.classify(&m.means());

        let mut probabilities = BTreeMap::new();
        let mut confidence_intervals = BTreeMap::new();
        for (class, criteria) in self.table.by_severity() {
            let p = self.class_probability(criteria, m);
            probabilities.insert(class, p);
            confidence_intervals.insert(class, self.confidence_interval(p, z));
        }

        let governing_class = self.governing(&probabilities);
        debug!(
            governing = %governing_class,
            deterministic = %deterministic.governing_class,
            "probabilistic classification"
        );

        Ok(ProbabilisticExposureResult {
            deterministic,
            governing_class,
            probabilities,
            confidence_level,
            confidence_intervals,
        })
    }

    /// Most severe class above the threshold, else the most probable class
    /// (the more severe one on ties).
    fn governing(&self, probabilities: &BTreeMap<ExposureClass, f64>) -> ExposureClass {
        let ordered = self
            .table
            .severity_order()
            .iter()
            .filter_map(|c| probabilities.get(c).map(|p| (*c, *p)));

        let mut best: Option<(ExposureClass, f64)> = None;
        for (class, p) in ordered {
            if p > self.config.governing_threshold {
                return class;
            }
            if best.map_or(true, |(_, bp)| p > bp) {
                best = Some((class, p));
            }
        }
        best.map(|(c, _)| c)
            .unwrap_or_else(|| self.table.least_demanding())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ProbabilisticEngine {
        ProbabilisticEngine::new(Arc::new(CriteriaTable::en206()))
    }

    #[test]
    fn test_cdf_reference_values() {
        assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-15);
        assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-4);
        assert!((standard_normal_cdf(-1.0) - 0.158_655).abs() < 1e-5);
    }

    #[test]
    fn test_inverse_cdf_reference_values() {
        assert!((inv_normal_cdf(0.975) - 1.959964).abs() < 1e-3);
        assert!((inv_normal_cdf(0.5)).abs() < 1e-3);
        assert!((inv_normal_cdf(0.025) + 1.959964).abs() < 1e-3);
        assert!((z_score(0.95).unwrap() - 1.96).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_confidence_level() {
        let m = UncertainMeasurements::new(Gaussian::new(0.45, 0.02), Gaussian::new(40.0, 3.0));
        for level in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(matches!(
                engine().classify_probabilistic(&m, level),
                Err(MixError::InvalidParameter { name: "confidence_level", .. })
            ));
        }
    }

    #[test]
    fn test_negative_std_rejected() {
        let m = UncertainMeasurements::new(Gaussian::new(0.45, -0.1), Gaussian::new(40.0, 3.0));
        assert!(engine().classify_probabilistic(&m, 0.95).is_err());
    }

    #[test]
    fn test_mean_on_threshold_gives_half() {
        let table = CriteriaTable::en206().subset(&[ExposureClass::XA1]).unwrap();
        let engine = ProbabilisticEngine::new(Arc::new(table));
        // W/B exactly at 0.55 with spread, resistance far above 30
        let m = UncertainMeasurements::new(Gaussian::new(0.55, 0.02), Gaussian::new(60.0, 0.5));
        let r = engine.classify_probabilistic(&m, 0.95).unwrap();
        let p = r.probability(ExposureClass::XA1).unwrap();
        assert!((p - 0.5).abs() < 1e-9);
        let ci = r.confidence_intervals[&ExposureClass::XA1];
        let expected_half = 1.96 * (0.25f64 / 30.0).sqrt();
        assert!((ci.width() / 2.0 - expected_half).abs() < 2e-3);
    }

    #[test]
    fn test_zero_std_resolves_exactly() {
        let e = engine();
        let at_limit = UncertainMeasurements::new(Gaussian::exact(0.45), Gaussian::exact(35.0));
        let r = e.classify_probabilistic(&at_limit, 0.9).unwrap();
        assert_eq!(r.probability(ExposureClass::XA3), Some(1.0));
        assert_eq!(r.probability(ExposureClass::XS2), Some(0.0));
        let ci = r.confidence_intervals[&ExposureClass::XA3];
        assert_eq!((ci.lower, ci.upper), (1.0, 1.0));
        assert!(r.probabilities.values().all(|p| *p == 0.0 || *p == 1.0));
    }

    #[test]
    fn test_missing_chloride_excluded_from_product() {
        let e = engine();
        let m = UncertainMeasurements::new(Gaussian::exact(0.40), Gaussian::exact(50.0));
        let r = e.classify_probabilistic(&m, 0.95).unwrap();
        // probabilistic view ignores the missing chloride, deterministic fails on it
        assert_eq!(r.probability(ExposureClass::XS3), Some(1.0));
        assert_eq!(r.governing_class, ExposureClass::XS3);
        assert!(!r.deterministic.satisfies(ExposureClass::XS3));
    }

    #[test]
    fn test_likely_classes_threshold_is_strict() {
        let table = CriteriaTable::en206().subset(&[ExposureClass::XA1]).unwrap();
        let engine = ProbabilisticEngine::new(Arc::new(table));
        let m = UncertainMeasurements::new(Gaussian::new(0.55, 0.02), Gaussian::new(60.0, 0.5));
        let r = engine.classify_probabilistic(&m, 0.95).unwrap();
        let p = r.probability(ExposureClass::XA1).unwrap();
        assert!(r.likely_classes(p).is_empty());
        assert_eq!(r.likely_classes(p - 1e-6), vec![ExposureClass::XA1]);
    }

    #[test]
    fn test_carbonation_factor_lowers_probability() {
        let table = CriteriaTable::en206().subset(&[ExposureClass::XC4]).unwrap();
        let engine = ProbabilisticEngine::new(Arc::new(table));
        let base = UncertainMeasurements::new(Gaussian::exact(0.45), Gaussian::exact(40.0));
        let without = engine.classify_probabilistic(&base, 0.95).unwrap();
        assert_eq!(without.probability(ExposureClass::XC4), Some(1.0));

        // mean sits on the 8 mm ceiling
        let on_ceiling = base.with_carbonation(Gaussian::new(8.0, 2.0));
        let r = engine.classify_probabilistic(&on_ceiling, 0.95).unwrap();
        let p = r.probability(ExposureClass::XC4).unwrap();
        assert!((p - 0.5).abs() < 1e-9);

        let deep = base.with_carbonation(Gaussian::new(12.0, 2.0));
        let r = engine.classify_probabilistic(&deep, 0.95).unwrap();
        assert!(r.probability(ExposureClass::XC4).unwrap() < 0.05);
        assert!(!r.deterministic.satisfies(ExposureClass::XC4));
    }

    #[test]
    fn test_governing_falls_back_to_most_probable() {
        let m = UncertainMeasurements::new(Gaussian::new(0.75, 0.05), Gaussian::new(18.0, 2.0));
        let r = engine().classify_probabilistic(&m, 0.95).unwrap();
        assert!(r.probabilities.values().all(|p| *p <= 0.5));
        assert_eq!(r.governing_class, ExposureClass::XC1);
    }
}
