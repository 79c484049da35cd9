// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// EN 206 Mix Core
// Genetic mix optimisation and exposure-class compliance for concrete
//

pub mod bindings;
pub mod config;
pub mod durability_kernel;
pub mod error;
pub mod exposure;
pub mod guardrails;
pub mod mix;
pub mod optimization;
pub mod oracle;
pub mod science;
pub mod traits;
#[cfg(test)]
pub mod tests_compliance;
#[cfg(test)]
pub mod tests_proptest;

// Re-export core types
pub use bindings::ExposureBridge;
pub use config::{KernelConfig, OptimizerConfig, ProbabilisticConfig, UncertaintyConfig};
pub use durability_kernel::{
    DesignOutcome, DurabilityAnalysis, DurabilityKernel, ReliabilityAssessment,
};
pub use error::{MixError, Result};
pub use exposure::{
    Advisor, ComplianceEngine, CriteriaTable, ExposureClass, ExposureCriteria,
    ExposureRecommendation, ExposureResult, Measurements, ProbabilisticEngine,
    ProbabilisticExposureResult, UncertainMeasurements,
};
pub use guardrails::{GuardrailEngine, GuardrailValidation, MixGuardrails};
pub use mix::{Bounds, BoundsTable, Composition, Ingredient};
pub use optimization::{GeneticOptimizer, Objective, OptimizationResult, UncertaintyPropagator};
pub use oracle::{EmpiricalOracle, PropertySet};
pub use traits::{MixMetric, PropertyOracle};
