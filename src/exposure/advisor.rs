// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Target-class advisor: ingredient deltas that move a formulation toward a
//! chosen exposure class, with a first-order estimate of the outcome.

use super::criteria::{CriteriaTable, ExposureClass};
use super::deterministic::{check_class, ComplianceEngine, Measurements, Priority};
use crate::error::Result;
use crate::mix::{Composition, Ingredient};
use crate::oracle::PropertySet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-kg sensitivities of the properties to one ingredient.
///
/// `resistance` is additive in MPa; the `_pct` factors are percentages, added
/// to W/B as `delta * f / 100` and applied to chloride and carbonation as
/// `(1 + delta * f / 100)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactFactors {
    pub resistance: f64,
    pub water_binder_pct: f64,
    pub chloride_pct: f64,
    pub carbonation_pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorTuning {
    /// Water above this (kg/m³) can still be cut; below it cement is added.
    pub water_floor: f64,
    pub max_water_cut: f64,
    /// kg of water removed per unit of W/B excess.
    pub water_per_wb: f64,
    /// kg of cement added per unit of W/B excess.
    pub cement_per_wb: f64,
    pub mpa_per_kg_cement: f64,
    /// Slag is only proposed below this dosage.
    pub slag_cap: f64,
    pub slag_addition: f64,
    /// Cement removed when slag is added.
    pub cement_swap: f64,
    pub impact: BTreeMap<Ingredient, ImpactFactors>,
}

impl Default for AdvisorTuning {
    fn default() -> Self {
        let impact = [
            (
                Ingredient::Cement,
                ImpactFactors {
                    resistance: 0.15,
                    water_binder_pct: -0.02,
                    chloride_pct: -0.05,
                    carbonation_pct: 0.0,
                },
            ),
            (
                Ingredient::Slag,
                ImpactFactors {
                    resistance: 0.08,
                    water_binder_pct: 0.0,
                    chloride_pct: -0.15,
                    carbonation_pct: 0.10,
                },
            ),
            (
                Ingredient::Water,
                ImpactFactors {
                    resistance: -0.30,
                    water_binder_pct: 0.10,
                    ..ImpactFactors::default()
                },
            ),
            (
                Ingredient::Superplasticizer,
                ImpactFactors {
                    resistance: 0.20,
                    water_binder_pct: -0.03,
                    ..ImpactFactors::default()
                },
            ),
        ];
        AdvisorTuning {
            water_floor: 140.0,
            max_water_cut: 20.0,
            water_per_wb: 100.0,
            cement_per_wb: 200.0,
            mpa_per_kg_cement: 0.15,
            slag_cap: 150.0,
            slag_addition: 50.0,
            cement_swap: 30.0,
            impact: impact.into_iter().collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExposureRecommendation {
    pub target_class: ExposureClass,
    /// Governing class of the current formulation.
    pub current_class: ExposureClass,
    /// Signed ingredient changes, kg/m³.
    pub deltas: BTreeMap<Ingredient, f64>,
    pub priority: Priority,
    pub rationale: String,
    pub estimated_properties: PropertySet,
}

impl ExposureRecommendation {
    pub fn is_noop(&self) -> bool {
        self.deltas.is_empty()
    }
}

/// Urgency of reaching `target`.
pub fn target_priority(target: ExposureClass) -> Priority {
    use ExposureClass::*;
    match target {
        XS3 | XS2 | XD3 | XF4 => Priority::High,
        XS1 | XD2 | XF3 | XA3 => Priority::Medium,
        _ => Priority::Low,
    }
}

#[derive(Clone, Debug)]
pub struct Advisor {
    table: Arc<CriteriaTable>,
    engine: ComplianceEngine,
    tuning: AdvisorTuning,
}

impl Advisor {
    pub fn new(table: Arc<CriteriaTable>) -> Self {
        Self::with_tuning(table, AdvisorTuning::default())
    }

    pub fn with_tuning(table: Arc<CriteriaTable>, tuning: AdvisorTuning) -> Self {
        Advisor {
            engine: ComplianceEngine::new(Arc::clone(&table)),
            table,
            tuning,
        }
    }

    pub fn tuning(&self) -> &AdvisorTuning {
        &self.tuning
    }

    /// Propose changes to `mix` so that `properties` reach `target`.
    ///
    /// Fails on an unknown code or a class the table does not define.
    pub fn recommend(
        &self,
        mix: &Composition,
        properties: &PropertySet,
        target: &str,
    ) -> Result<ExposureRecommendation> {
        let target_class = self.table.resolve(target)?;
        self.recommend_class(mix, properties, target_class)
    }

    pub fn recommend_class(
        &self,
        mix: &Composition,
        properties: &PropertySet,
        target_class: ExposureClass,
    ) -> Result<ExposureRecommendation> {
        let criteria = self.table.require(target_class)?;
        let measurements = Measurements::from(properties);
        let current_class = self.engine.classify(&measurements).governing_class;

        if !check_class(criteria, &measurements)
            .iter()
            .any(|c| c.is_failure())
        {
            return Ok(ExposureRecommendation {
                target_class,
                current_class,
                deltas: BTreeMap::new(),
                priority: Priority::Low,
                rationale: format!("{target_class} is already satisfied"),
                estimated_properties: *properties,
            });
        }

        let t = &self.tuning;
        let mut deltas: BTreeMap<Ingredient, f64> = BTreeMap::new();
        let mut lines = Vec::new();

        if properties.water_binder_ratio > criteria.max_water_binder {
            let excess = properties.water_binder_ratio - criteria.max_water_binder;
            if mix.get(Ingredient::Water) > t.water_floor {
                let cut = (excess * t.water_per_wb).min(t.max_water_cut);
                *deltas.entry(Ingredient::Water).or_default() -= cut;
                lines.push(format!(
                    "Reduce water by {cut:.0} kg/m3 to reach W/B <= {}",
                    criteria.max_water_binder
                ));
            } else {
                let add = excess * t.cement_per_wb;
                *deltas.entry(Ingredient::Cement).or_default() += add;
                lines.push(format!(
                    "Increase cement by {add:.0} kg/m3 to reach W/B <= {}",
                    criteria.max_water_binder
                ));
            }
        }

        if properties.resistance < criteria.min_resistance {
            let add = (criteria.min_resistance - properties.resistance) / t.mpa_per_kg_cement;
            *deltas.entry(Ingredient::Cement).or_default() += add;
            lines.push(format!(
                "Increase cement by {add:.0} kg/m3 to reach resistance >= {} MPa",
                criteria.min_resistance
            ));
        }

        if let Some(ceiling) = criteria.max_chloride {
            if properties.chloride_diffusion > ceiling && mix.get(Ingredient::Slag) < t.slag_cap {
                *deltas.entry(Ingredient::Slag).or_default() += t.slag_addition;
                *deltas.entry(Ingredient::Cement).or_default() -= t.cement_swap;
                lines.push(format!(
                    "Add {:.0} kg/m3 slag (replacing {:.0} kg/m3 cement) to improve chloride resistance",
                    t.slag_addition, t.cement_swap
                ));
            }
        }

        let rationale = if lines.is_empty() {
            format!("Optimise the formulation toward {target_class}")
        } else {
            lines.join("\n")
        };

        Ok(ExposureRecommendation {
            target_class,
            current_class,
            estimated_properties: self.estimate(properties, &deltas),
            deltas,
            priority: target_priority(target_class),
            rationale,
        })
    }

    /// First-order property estimate after applying `deltas`.
    pub fn estimate(&self, properties: &PropertySet, deltas: &BTreeMap<Ingredient, f64>) -> PropertySet {
        let mut est = *properties;
        for (ingredient, delta) in deltas {
            if ingredient.is_binder() {
                est.total_binder += delta;
            }
            let Some(f) = self.tuning.impact.get(ingredient) else {
                continue;
            };
            est.water_binder_ratio += delta * f.water_binder_pct / 100.0;
            est.resistance += delta * f.resistance;
            est.chloride_diffusion *= 1.0 + delta * f.chloride_pct / 100.0;
            est.carbonation *= 1.0 + delta * f.carbonation_pct / 100.0;
        }
        est
    }
}
