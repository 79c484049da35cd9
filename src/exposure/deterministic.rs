// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Deterministic Exposure-Class Classification
//!
//! Every class of the criteria table is checked against a single set of
//! measurements. A class is satisfied when none of its checks fail; the
//! governing class is the most demanding satisfied one.

use super::criteria::{CriteriaTable, ExposureClass, ExposureCriteria};
use crate::error::{MixError, Result};
use crate::oracle::PropertySet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Binder needed per MPa of missing strength.
pub const MPA_PER_KG_BINDER: f64 = 0.15;
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 3;

/// Point values fed to the classifier. Optional entries may be unknown.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub water_binder_ratio: f64,
    pub resistance: f64,
    #[serde(default)]
    pub chloride: Option<f64>,
    #[serde(default)]
    pub carbonation: Option<f64>,
    /// Entrained air, %.
    #[serde(default)]
    pub air_content: Option<f64>,
}

impl Measurements {
    pub fn new(water_binder_ratio: f64, resistance: f64) -> Self {
        Measurements {
            water_binder_ratio,
            resistance,
            chloride: None,
            carbonation: None,
            air_content: None,
        }
    }

    pub fn with_chloride(mut self, chloride: f64) -> Self {
        self.chloride = Some(chloride);
        self
    }

    pub fn with_carbonation(mut self, carbonation: f64) -> Self {
        self.carbonation = Some(carbonation);
        self
    }

    pub fn with_air(mut self, air_content: f64) -> Self {
        self.air_content = Some(air_content);
        self
    }

    /// Every supplied value must be finite.
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("water_binder_ratio", Some(self.water_binder_ratio)),
            ("resistance", Some(self.resistance)),
            ("chloride", self.chloride),
            ("carbonation", self.carbonation),
            ("air_content", self.air_content),
        ];
        for (name, value) in values {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(MixError::invalid(name, format!("expected a finite value, got {v}")));
            }
        }
        Ok(())
    }
}

impl From<&PropertySet> for Measurements {
    fn from(p: &PropertySet) -> Self {
        Measurements::new(p.water_binder_ratio, p.resistance)
            .with_chloride(p.chloride_diffusion)
            .with_carbonation(p.carbonation)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    WaterBinderRatio,
    Resistance,
    ChlorideDiffusion,
    Carbonation,
    AirContent,
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Criterion::WaterBinderRatio => "W/B",
            Criterion::Resistance => "resistance",
            Criterion::ChlorideDiffusion => "chloride diffusion",
            Criterion::Carbonation => "carbonation",
            Criterion::AirContent => "air content",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    /// Required measurement absent; counts as a failure.
    Missing,
    /// Measurement absent for a non-blocking criterion.
    Advisory,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CriterionCheck {
    pub criterion: Criterion,
    pub status: CheckStatus,
    pub measured: Option<f64>,
    pub limit: f64,
}

impl CriterionCheck {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, CheckStatus::Fail | CheckStatus::Missing)
    }

    fn ceiling(criterion: Criterion, measured: f64, limit: f64) -> Self {
        CriterionCheck {
            criterion,
            status: if measured <= limit {
                CheckStatus::Pass
            } else {
                CheckStatus::Fail
            },
            measured: Some(measured),
            limit,
        }
    }

    fn floor(criterion: Criterion, measured: f64, limit: f64) -> Self {
        CriterionCheck {
            criterion,
            status: if measured >= limit {
                CheckStatus::Pass
            } else {
                CheckStatus::Fail
            },
            measured: Some(measured),
            limit,
        }
    }

    fn absent(criterion: Criterion, limit: f64, status: CheckStatus) -> Self {
        CriterionCheck {
            criterion,
            status,
            measured: None,
            limit,
        }
    }
}

impl fmt::Display for CriterionCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.criterion {
            Criterion::Resistance | Criterion::AirContent => ">=",
            _ => "<=",
        };
        match (self.status, self.measured) {
            (CheckStatus::Missing, _) => {
                write!(f, "{} not measured (required {} {})", self.criterion, op, self.limit)
            }
            (CheckStatus::Advisory, _) => write!(
                f,
                "{} not measured, verify {} {}",
                self.criterion, op, self.limit
            ),
            (_, Some(m)) => write!(f, "{} {:.3} (required {} {})", self.criterion, m, op, self.limit),
            (_, None) => write!(f, "{} (required {} {})", self.criterion, op, self.limit),
        }
    }
}

/// Run every applicable check of one class, in fixed order.
pub fn check_class(criteria: &ExposureCriteria, m: &Measurements) -> Vec<CriterionCheck> {
    let mut checks = vec![
        CriterionCheck::ceiling(
            Criterion::WaterBinderRatio,
            m.water_binder_ratio,
            criteria.max_water_binder,
        ),
        CriterionCheck::floor(Criterion::Resistance, m.resistance, criteria.min_resistance),
    ];

    if let Some(limit) = criteria.max_chloride {
        checks.push(match m.chloride {
            Some(v) => CriterionCheck::ceiling(Criterion::ChlorideDiffusion, v, limit),
            None => CriterionCheck::absent(Criterion::ChlorideDiffusion, limit, CheckStatus::Missing),
        });
    }
    if let Some(limit) = criteria.max_carbonation {
        checks.push(match m.carbonation {
            Some(v) => CriterionCheck::ceiling(Criterion::Carbonation, v, limit),
            None => CriterionCheck::absent(Criterion::Carbonation, limit, CheckStatus::Missing),
        });
    }
    // Air content is rarely measured: absence only warns.
    if let Some(limit) = criteria.min_air {
        checks.push(match m.air_content {
            Some(v) => CriterionCheck::floor(Criterion::AirContent, v, limit),
            None => CriterionCheck::absent(Criterion::AirContent, limit, CheckStatus::Advisory),
        });
    }
    checks
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemediationAction {
    /// Lower W/B by this share of its current value.
    ReduceWaterBinder { percent: f64, target: f64 },
    IncreaseResistance { mpa: f64, binder_kg: f64 },
    /// Qualitative: add slag (20-30 %) or silica fume (5-10 %).
    ImproveChlorideResistance,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Remediation {
    pub class: ExposureClass,
    pub priority: Priority,
    pub action: RemediationAction,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExposureResult {
    /// Most demanding first.
    pub satisfied_classes: Vec<ExposureClass>,
    /// Least demanding class of the table when nothing is satisfied.
    pub governing_class: ExposureClass,
    /// Failing checks per failed class.
    pub failed_classes: BTreeMap<ExposureClass, Vec<CriterionCheck>>,
    pub warnings: BTreeMap<ExposureClass, Vec<String>>,
    pub recommendations: Vec<Remediation>,
}

impl ExposureResult {
    pub fn satisfies(&self, class: ExposureClass) -> bool {
        self.satisfied_classes.contains(&class)
    }

    pub fn is_compliant(&self) -> bool {
        !self.satisfied_classes.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Governing class: {} | Satisfied classes: {} | Recommendations: {}",
            self.governing_class,
            self.satisfied_classes.len(),
            self.recommendations.len()
        )
    }
}

/// Deterministic classifier over a shared criteria table.
#[derive(Clone, Debug)]
pub struct ComplianceEngine {
    table: Arc<CriteriaTable>,
    recommendation_limit: Option<usize>,
}

impl ComplianceEngine {
    pub fn new(table: Arc<CriteriaTable>) -> Self {
        ComplianceEngine {
            table,
            recommendation_limit: Some(DEFAULT_RECOMMENDATION_LIMIT),
        }
    }

    /// `None` keeps remediation hints for every failed class.
    pub fn with_recommendation_limit(mut self, limit: Option<usize>) -> Self {
        self.recommendation_limit = limit;
        self
    }

    pub fn table(&self) -> &Arc<CriteriaTable> {
        &self.table
    }

    pub fn recommendation_limit(&self) -> Option<usize> {
        self.recommendation_limit
    }

    pub fn classify(&self, m: &Measurements) -> ExposureResult {
        let mut satisfied = Vec::new();
        let mut failed = BTreeMap::new();
        let mut warnings: BTreeMap<ExposureClass, Vec<String>> = BTreeMap::new();

        for (class, criteria) in self.table.by_severity() {
            let checks = check_class(criteria, m);
            for advisory in checks.iter().filter(|c| c.status == CheckStatus::Advisory) {
                warnings.entry(class).or_default().push(advisory.to_string());
            }
            let failures: Vec<CriterionCheck> =
                checks.into_iter().filter(|c| c.is_failure()).collect();
            if failures.is_empty() {
                satisfied.push(class);
            } else {
                failed.insert(class, failures);
            }
        }

        let governing_class = satisfied
            .first()
            .copied()
            .unwrap_or_else(|| self.table.least_demanding());
        let recommendations = self.remediations(m, &failed);

        debug!(
            satisfied = satisfied.len(),
            failed = failed.len(),
            governing = %governing_class,
            "classified measurements"
        );

        ExposureResult {
            satisfied_classes: satisfied,
            governing_class,
            failed_classes: failed,
            warnings,
            recommendations,
        }
    }

    pub fn classify_properties(&self, properties: &PropertySet) -> ExposureResult {
        self.classify(&Measurements::from(properties))
    }

    fn remediations(
        &self,
        m: &Measurements,
        failed: &BTreeMap<ExposureClass, Vec<CriterionCheck>>,
    ) -> Vec<Remediation> {
        let limit = self.recommendation_limit.unwrap_or(usize::MAX);
        let mut out = Vec::new();

        for class in self
            .table
            .severity_order()
            .iter()
            .filter(|c| failed.contains_key(c))
            .take(limit)
        {
            for check in &failed[class] {
                // no quantitative hint from an unknown or non-finite value
                let Some(measured) = check.measured.filter(|v| v.is_finite()) else {
                    continue;
                };
                if check.status != CheckStatus::Fail {
                    continue;
                }
                match check.criterion {
                    Criterion::WaterBinderRatio => {
                        let percent = (measured - check.limit) / measured * 100.0;
                        out.push(Remediation {
                            class: *class,
                            priority: if class.is_chloride_exposure() {
                                Priority::High
                            } else {
                                Priority::Medium
                            },
                            action: RemediationAction::ReduceWaterBinder {
                                percent,
                                target: check.limit,
                            },
                            message: format!(
                                "Reduce W/B by {percent:.1}% (from {:.3} to <= {}) to reach {class}",
                                m.water_binder_ratio, check.limit
                            ),
                        });
                    }
                    Criterion::Resistance => {
                        let mpa = check.limit - measured;
                        let binder_kg = mpa / MPA_PER_KG_BINDER;
                        out.push(Remediation {
                            class: *class,
                            priority: Priority::Medium,
                            action: RemediationAction::IncreaseResistance { mpa, binder_kg },
                            message: format!(
                                "Raise resistance by {mpa:.1} MPa (about {binder_kg:.0} kg/m3 binder) to reach {class}"
                            ),
                        });
                    }
                    Criterion::ChlorideDiffusion => out.push(Remediation {
                        class: *class,
                        priority: Priority::High,
                        action: RemediationAction::ImproveChlorideResistance,
                        message: format!(
                            "Improve chloride resistance for {class}: add slag (20-30%) or silica fume (5-10%)"
                        ),
                    }),
                    Criterion::Carbonation | Criterion::AirContent => {}
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ComplianceEngine {
        ComplianceEngine::new(Arc::new(CriteriaTable::en206()))
    }

    #[test]
    fn test_check_order_and_air_asymmetry() {
        let table = CriteriaTable::en206();
        let xf3 = table.get(ExposureClass::XF3).unwrap();
        let m = Measurements::new(0.50, 35.0);
        let checks = check_class(xf3, &m);
        assert_eq!(checks.len(), 3);
        assert_eq!(checks[2].status, CheckStatus::Advisory);
        assert!(!checks.iter().any(|c| c.is_failure()));

        let low_air = check_class(xf3, &m.with_air(3.5));
        assert_eq!(low_air[2].status, CheckStatus::Fail);
    }

    #[test]
    fn test_missing_chloride_fails_class() {
        let result = engine().classify(&Measurements::new(0.40, 50.0));
        let reasons = &result.failed_classes[&ExposureClass::XS3];
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].status, CheckStatus::Missing);
        // no chloride or carbonation data: XA3 is the best reachable class
        assert_eq!(result.governing_class, ExposureClass::XA3);
        assert!(result.warnings.contains_key(&ExposureClass::XF4));
    }

    #[test]
    fn test_missing_or_deep_carbonation_fails_class() {
        let table = CriteriaTable::en206();
        let xc2 = table.get(ExposureClass::XC2).unwrap();
        let m = Measurements::new(0.45, 40.0);

        let checks = check_class(xc2, &m);
        assert_eq!(checks.len(), 3);
        assert_eq!(checks[2].criterion, Criterion::Carbonation);
        assert_eq!(checks[2].status, CheckStatus::Missing);

        let deep = check_class(xc2, &m.with_carbonation(30.0));
        assert_eq!(deep[2].status, CheckStatus::Fail);
        assert_eq!(deep[2].measured, Some(30.0));

        let result = engine().classify(&m);
        for class in [ExposureClass::XC2, ExposureClass::XC3, ExposureClass::XC4] {
            assert!(!result.satisfies(class), "{class} satisfied without carbonation");
            assert_eq!(result.failed_classes[&class].len(), 1);
        }
        assert!(result.satisfies(ExposureClass::XC1));

        let shallow = engine().classify(&m.with_carbonation(5.0));
        assert!(shallow.satisfies(ExposureClass::XC4));
    }

    #[test]
    fn test_non_finite_measurements() {
        let m = Measurements::new(f64::NAN, 38.0).with_chloride(9.0);
        assert!(matches!(
            m.validate(),
            Err(MixError::InvalidParameter { name: "water_binder_ratio", .. })
        ));
        assert!(matches!(
            Measurements::new(0.5, 40.0).with_air(f64::INFINITY).validate(),
            Err(MixError::InvalidParameter { name: "air_content", .. })
        ));
        assert!(Measurements::new(0.5, 40.0).with_carbonation(3.0).validate().is_ok());

        let result = engine().classify(&m);
        assert!(result.satisfied_classes.is_empty());
        assert!(!result.recommendations.is_empty());
        for r in &result.recommendations {
            assert!(!r.message.contains("NaN"), "{}", r.message);
            assert!(!matches!(r.action, RemediationAction::ReduceWaterBinder { .. }));
        }
    }

    #[test]
    fn test_comparisons_are_inclusive() {
        let table = Arc::new(CriteriaTable::en206().subset(&[ExposureClass::XD3]).unwrap());
        let engine = ComplianceEngine::new(table);
        let at_limits = Measurements::new(0.45, 35.0).with_chloride(5.0);
        assert_eq!(engine.classify(&at_limits).satisfied_classes, vec![ExposureClass::XD3]);
    }

    #[test]
    fn test_nothing_satisfied_defaults_to_mildest() {
        let result = engine().classify(&Measurements::new(0.80, 15.0));
        assert!(result.satisfied_classes.is_empty());
        assert!(!result.is_compliant());
        assert_eq!(result.governing_class, ExposureClass::XC1);
    }

    #[test]
    fn test_remediation_ranking_and_limit() {
        let m = Measurements::new(0.50, 38.0).with_chloride(9.0).with_carbonation(5.0);
        let result = engine().classify(&m);
        // XS1 passes, so the three most severe failures are XS3, XS2, XD3
        assert!(result.satisfies(ExposureClass::XS1));
        let classes: Vec<ExposureClass> = result.recommendations.iter().map(|r| r.class).collect();
        assert!(classes.iter().all(|c| matches!(
            c,
            ExposureClass::XS3 | ExposureClass::XS2 | ExposureClass::XD3
        )));
        assert!(classes.contains(&ExposureClass::XD3));

        let xs3: Vec<&Remediation> = result
            .recommendations
            .iter()
            .filter(|r| r.class == ExposureClass::XS3)
            .collect();
        assert_eq!(xs3.len(), 3);
        match &xs3[0].action {
            RemediationAction::ReduceWaterBinder { percent, .. } => {
                assert!((percent - 20.0).abs() < 1e-9);
                assert_eq!(xs3[0].priority, Priority::High);
            }
            other => panic!("unexpected action {other:?}"),
        }
        match &xs3[1].action {
            RemediationAction::IncreaseResistance { mpa, binder_kg } => {
                assert!((mpa - 7.0).abs() < 1e-9);
                assert!((binder_kg - 7.0 / 0.15).abs() < 1e-9);
            }
            other => panic!("unexpected action {other:?}"),
        }
        assert_eq!(xs3[2].action, RemediationAction::ImproveChlorideResistance);

        let unlimited = engine().with_recommendation_limit(None).classify(&m);
        assert!(unlimited.recommendations.len() > result.recommendations.len());
    }

    #[test]
    fn test_wb_priority_medium_outside_chloride_classes() {
        let table = Arc::new(CriteriaTable::en206().subset(&[ExposureClass::XC4]).unwrap());
        let m = Measurements::new(0.60, 40.0).with_carbonation(4.0);
        let result = ComplianceEngine::new(table).classify(&m);
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].priority, Priority::Medium);
    }
}
