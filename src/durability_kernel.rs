// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// DurabilityKernel: one facade over every engine in the crate.
//
// ============================================================================
// Callers hand the kernel a criteria table and a `KernelConfig` once; every
// engine is built from those and shares the same `Arc<CriteriaTable>`.
// ============================================================================

use crate::config::KernelConfig;
use crate::error::Result;
use crate::exposure::{
    Advisor, ComplianceEngine, CriteriaTable, ExposureClass, ExposureRecommendation,
    ExposureResult, Measurements, ProbabilisticEngine, ProbabilisticExposureResult,
    UncertainMeasurements,
};
use crate::guardrails::{GuardrailEngine, GuardrailValidation};
use crate::mix::Composition;
use crate::optimization::{
    GeneticOptimizer, Objective, OptimizationResult, PropertyUncertainty, UncertaintyPropagator,
};
use crate::oracle::PropertySet;
use crate::traits::PropertyOracle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Targets `analyze` proposes upgrades toward, most demanding first.
pub const SEVERE_TARGETS: [ExposureClass; 5] = [
    ExposureClass::XS3,
    ExposureClass::XS2,
    ExposureClass::XD3,
    ExposureClass::XF4,
    ExposureClass::XC4,
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurabilityAnalysis {
    pub current: ExposureResult,
    pub guardrails: GuardrailValidation,
    /// Upgrades toward unmet severe targets, truncated to the recommendation limit.
    pub recommendations: Vec<ExposureRecommendation>,
    pub summary: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignOutcome {
    pub optimization: OptimizationResult,
    pub exposure: ExposureResult,
    pub target_class: ExposureClass,
    pub target_met: bool,
    /// Guardrails of the optimised mix, including those of `target_class`.
    pub guardrails: GuardrailValidation,
    /// Present only when the optimised mix misses the target.
    pub recommendation: Option<ExposureRecommendation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityAssessment {
    pub uncertainty: PropertyUncertainty,
    pub classification: ProbabilisticExposureResult,
}

pub struct DurabilityKernel {
    table: Arc<CriteriaTable>,
    config: KernelConfig,
    compliance: ComplianceEngine,
    probabilistic: ProbabilisticEngine,
    advisor: Advisor,
    guardrails: GuardrailEngine,
    optimizer: GeneticOptimizer,
    propagator: UncertaintyPropagator,
}

impl DurabilityKernel {
    pub fn new(table: Arc<CriteriaTable>, config: KernelConfig) -> Result<Self> {
        config.validate()?;

        let compliance = ComplianceEngine::new(Arc::clone(&table))
            .with_recommendation_limit(config.recommendation_limit);
        let probabilistic =
            ProbabilisticEngine::with_config(Arc::clone(&table), config.probabilistic.clone())
                .with_deterministic(compliance.clone());
        let advisor = Advisor::with_tuning(Arc::clone(&table), config.advisor.clone());
        let guardrails = GuardrailEngine::with_constraints(config.guardrails.clone());
        let optimizer = GeneticOptimizer::new(config.optimizer.clone(), config.bounds.clone())?
            .with_guardrails(guardrails.clone());
        let propagator = UncertaintyPropagator::new(config.uncertainty.clone())?;

        info!(
            classes = table.len(),
            population = config.optimizer.population_size,
            generations = config.optimizer.generations,
            "durability kernel ready"
        );

        Ok(DurabilityKernel {
            table,
            config,
            compliance,
            probabilistic,
            advisor,
            guardrails,
            optimizer,
            propagator,
        })
    }

    /// Built-in EN 206 table with default configuration.
    pub fn en206() -> Result<Self> {
        Self::new(Arc::new(CriteriaTable::en206()), KernelConfig::default())
    }

    pub fn table(&self) -> &Arc<CriteriaTable> {
        &self.table
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn optimizer(&self) -> &GeneticOptimizer {
        &self.optimizer
    }

    pub fn classify(&self, measurements: &Measurements) -> ExposureResult {
        self.compliance.classify(measurements)
    }

    pub fn classify_probabilistic(
        &self,
        measurements: &UncertainMeasurements,
        confidence_level: f64,
    ) -> Result<ProbabilisticExposureResult> {
        self.probabilistic
            .classify_probabilistic(measurements, confidence_level)
    }

    pub fn recommend(
        &self,
        mix: &Composition,
        properties: &PropertySet,
        target: &str,
    ) -> Result<ExposureRecommendation> {
        self.advisor.recommend(mix, properties, target)
    }

    pub fn validate(&self, mix: &Composition) -> GuardrailValidation {
        self.guardrails.validate(mix, &self.config.bounds)
    }

    pub fn validate_for_target(
        &self,
        mix: &Composition,
        target: ExposureClass,
    ) -> GuardrailValidation {
        self.guardrails
            .validate_for_target(mix, &self.config.bounds, target)
    }

    /// Current classification plus upgrade paths toward the severe targets
    /// the formulation does not reach yet. Targets missing from the table
    /// are skipped.
    pub fn analyze(&self, mix: &Composition, properties: &PropertySet) -> DurabilityAnalysis {
        let current = self.compliance.classify_properties(properties);

        let pending = SEVERE_TARGETS
            .iter()
            .filter(|t| self.table.contains(**t) && !current.satisfies(**t))
            .filter_map(|t| self.advisor.recommend_class(mix, properties, *t).ok());
        let recommendations: Vec<ExposureRecommendation> = match self.config.recommendation_limit {
            Some(limit) => pending.take(limit).collect(),
            None => pending.collect(),
        };

        DurabilityAnalysis {
            summary: current.summary(),
            guardrails: self.validate_for_target(mix, current.governing_class),
            current,
            recommendations,
        }
    }

    /// Optimise, classify the winner and, if it misses `target`, attach the
    /// advisor's proposal. `Ok(None)` when the search found nothing feasible.
    pub fn design(
        &self,
        oracle: &dyn PropertyOracle,
        objective: Objective,
        resistance_floor: f64,
        seed: u64,
        target: &str,
    ) -> Result<Option<DesignOutcome>> {
        let target_class = self.table.resolve(target)?;
        let Some(optimization) = self
            .optimizer
            .optimize(oracle, objective, resistance_floor, seed)
        else {
            return Ok(None);
        };

        let exposure = self.compliance.classify_properties(&optimization.properties);
        let target_met = exposure.satisfies(target_class);
        let guardrails = self.validate_for_target(&optimization.mix, target_class);
        let recommendation = if target_met {
            None
        } else {
            Some(self.advisor.recommend_class(
                &optimization.mix,
                &optimization.properties,
                target_class,
            )?)
        };

        info!(
            target = %target_class,
            governing = %exposure.governing_class,
            target_met,
            warnings = guardrails.warnings().count(),
            "design complete"
        );

        Ok(Some(DesignOutcome {
            optimization,
            exposure,
            target_class,
            target_met,
            guardrails,
            recommendation,
        }))
    }

    /// Monte Carlo spread of the oracle's prediction for `mix`, classified
    /// probabilistically.
    pub fn assess_reliability(
        &self,
        oracle: &dyn PropertyOracle,
        mix: &Composition,
        confidence_level: f64,
    ) -> Result<ReliabilityAssessment> {
        let uncertainty = self.propagator.propagate(oracle, mix)?;
        let classification = self
            .probabilistic
            .classify_probabilistic(&uncertainty.to_uncertain_measurements(), confidence_level)?;
        Ok(ReliabilityAssessment {
            uncertainty,
            classification,
        })
    }
}
