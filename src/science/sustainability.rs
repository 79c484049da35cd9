// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
use crate::error::Result;
use crate::mix::{Composition, Ingredient};
use crate::traits::MixMetric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Environmental banding of a formulation's footprint (kg CO₂/m³).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnvironmentalGrade {
    VeryLow,  // < 200, LC3 / CEM III/C territory
    Low,      // 200-280
    Medium,   // 280-350
    High,     // 350-420
    VeryHigh, // >= 420, plain CEM I
}

impl EnvironmentalGrade {
    pub fn from_co2(co2_total: f64) -> Self {
        match co2_total {
            x if x < 200.0 => EnvironmentalGrade::VeryLow,
            x if x < 280.0 => EnvironmentalGrade::Low,
            x if x < 350.0 => EnvironmentalGrade::Medium,
            x if x < 420.0 => EnvironmentalGrade::High,
            _ => EnvironmentalGrade::VeryHigh,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SustainabilityResult {
    pub gwp_total: f64, // kg CO2e / m3
    pub breakdown: BTreeMap<Ingredient, f64>,
    pub score: f64, // 0.0 - 1.0 (1.0 is net zero)
    pub grade: EnvironmentalGrade,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SustainabilityEngine {
    /// kg CO₂ per kg of material.
    pub factors: BTreeMap<Ingredient, f64>,
}

impl Default for SustainabilityEngine {
    fn default() -> Self {
        use Ingredient::*;
        SustainabilityEngine {
            factors: [
                (Cement, 0.9),
                (Slag, 0.05),
                (FlyAsh, 0.02),
                (Water, 0.0001),
                (Superplasticizer, 0.5),
                (CoarseAggregate, 0.005),
                (FineAggregate, 0.005),
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl SustainabilityEngine {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, f64> = serde_json::from_str(json)?;
        let mut factors = BTreeMap::new();
        for (name, factor) in raw {
            factors.insert(name.parse::<Ingredient>()?, factor);
        }
        Ok(SustainabilityEngine { factors })
    }

    /// Embodied carbon of one cubic metre.
    pub fn compute_impact(&self, mix: &Composition) -> SustainabilityResult {
        let breakdown: BTreeMap<Ingredient, f64> = mix
            .iter()
            .filter_map(|(ingredient, mass)| {
                self.factors
                    .get(&ingredient)
                    .map(|factor| (ingredient, mass.max(0.0) * factor))
            })
            .collect();
        let gwp_total: f64 = breakdown.values().sum();

        // CEM I concrete sits around 300-400 kg CO2/m3
        let score = (1.0 - gwp_total / 600.0).clamp(0.0, 1.0);

        SustainabilityResult {
            gwp_total,
            breakdown,
            score,
            grade: EnvironmentalGrade::from_co2(gwp_total),
        }
    }
}

impl MixMetric for SustainabilityEngine {
    fn evaluate(&self, mix: &Composition) -> f64 {
        self.compute_impact(mix).gwp_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_cement_grade() {
        let mix = Composition::new()
            .with(Ingredient::Cement, 480.0)
            .with(Ingredient::Water, 180.0);
        let r = SustainabilityEngine::default().compute_impact(&mix);
        assert!((r.gwp_total - 432.018).abs() < 1e-9);
        assert_eq!(r.grade, EnvironmentalGrade::VeryHigh);
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(EnvironmentalGrade::from_co2(150.0), EnvironmentalGrade::VeryLow);
        assert_eq!(EnvironmentalGrade::from_co2(200.0), EnvironmentalGrade::Low);
        assert_eq!(EnvironmentalGrade::from_co2(349.9), EnvironmentalGrade::Medium);
        assert_eq!(EnvironmentalGrade::from_co2(350.0), EnvironmentalGrade::High);
    }

    #[test]
    fn test_slag_substitution_lowers_carbon() {
        let engine = SustainabilityEngine::default();
        let plain = Composition::new().with(Ingredient::Cement, 350.0);
        let blended = Composition::new()
            .with(Ingredient::Cement, 200.0)
            .with(Ingredient::Slag, 150.0);
        let a = engine.compute_impact(&plain);
        let b = engine.compute_impact(&blended);
        assert!(b.gwp_total < a.gwp_total);
        assert!(b.score > a.score);
    }
}
