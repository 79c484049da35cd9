// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
pub mod advisor;
pub mod criteria;
pub mod deterministic;
pub mod probabilistic;

pub use advisor::{Advisor, AdvisorTuning, ExposureRecommendation, ImpactFactors};
pub use criteria::{CriteriaTable, ExposureCategory, ExposureClass, ExposureCriteria};
pub use deterministic::{
    ComplianceEngine, CheckStatus, Criterion, CriterionCheck, ExposureResult, Measurements,
    Priority, Remediation, RemediationAction,
};
pub use probabilistic::{
    ConfidenceInterval, Gaussian, ProbabilisticEngine, ProbabilisticExposureResult,
    UncertainMeasurements,
};
