// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Composition Guardrails
//!
//! Hard and soft limits every recommended formulation is screened against.
//! [`GuardrailEngine::validate`] is class-independent;
//! [`GuardrailEngine::validate_for_target`] adds the binder floor of the
//! severe chloride and seawater classes.

use crate::exposure::ExposureClass;
use crate::mix::{BoundsTable, Composition, Ingredient};
use serde::{Deserialize, Serialize};

/// Composition limits
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixGuardrails {
    pub max_wb_ratio: f64,     // Above = bleeding, segregation
    pub warning_wb_ratio: f64, // Above = durability concerns
    pub min_cement: f64,       // kg/m3, below = insufficient alkalinity
    pub max_substitution: f64, // SCM share of binder, above = slow strength gain
    pub min_binder_severe: f64, // kg/m3 total binder for `severe_binder_classes`
    pub severe_binder_classes: Vec<ExposureClass>,
}

impl Default for MixGuardrails {
    fn default() -> Self {
        MixGuardrails {
            max_wb_ratio: 0.70,
            warning_wb_ratio: 0.60,
            min_cement: 200.0,
            max_substitution: 0.70,
            min_binder_severe: 360.0,
            severe_binder_classes: vec![ExposureClass::XD3, ExposureClass::XS2, ExposureClass::XS3],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Acceptable but worth reviewing
    Warning,
    /// Formulation must not be recommended
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardrailViolation {
    pub constraint: String,
    pub actual_value: f64,
    pub limit: f64,
    pub severity: ViolationSeverity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardrailValidation {
    /// No `Error`-level violation.
    pub is_valid: bool,
    pub violations: Vec<GuardrailViolation>,
}

impl GuardrailValidation {
    fn from_violations(violations: Vec<GuardrailViolation>) -> Self {
        GuardrailValidation {
            is_valid: !violations
                .iter()
                .any(|v| v.severity == ViolationSeverity::Error),
            violations,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &GuardrailViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &GuardrailViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Warning)
    }
}

#[derive(Clone, Debug, Default)]
pub struct GuardrailEngine {
    constraints: MixGuardrails,
}

impl GuardrailEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constraints(constraints: MixGuardrails) -> Self {
        GuardrailEngine { constraints }
    }

    pub fn constraints(&self) -> &MixGuardrails {
        &self.constraints
    }

    pub fn validate(&self, mix: &Composition, bounds: &BoundsTable) -> GuardrailValidation {
        let mut violations: Vec<GuardrailViolation> = bounds
            .violations(mix)
            .into_iter()
            .map(|(ingredient, value, b)| GuardrailViolation {
                constraint: format!("bounds:{ingredient}"),
                actual_value: value,
                limit: if value < b.min { b.min } else { b.max },
                severity: ViolationSeverity::Error,
            })
            .collect();

        let c = &self.constraints;
        let wb = mix.water_binder_ratio();
        if wb > c.max_wb_ratio {
            violations.push(GuardrailViolation {
                constraint: "max_wb_ratio".to_string(),
                actual_value: wb,
                limit: c.max_wb_ratio,
                severity: ViolationSeverity::Error,
            });
        } else if wb > c.warning_wb_ratio {
            violations.push(GuardrailViolation {
                constraint: "warning_wb_ratio".to_string(),
                actual_value: wb,
                limit: c.warning_wb_ratio,
                severity: ViolationSeverity::Warning,
            });
        }

        let cement = mix.get(Ingredient::Cement);
        if cement < c.min_cement {
            violations.push(GuardrailViolation {
                constraint: "min_cement".to_string(),
                actual_value: cement,
                limit: c.min_cement,
                severity: ViolationSeverity::Error,
            });
        }

        let substitution = mix.substitution_ratio();
        if substitution > c.max_substitution {
            violations.push(GuardrailViolation {
                constraint: "max_substitution".to_string(),
                actual_value: substitution,
                limit: c.max_substitution,
                severity: ViolationSeverity::Warning,
            });
        }

        GuardrailValidation::from_violations(violations)
    }

    /// [`validate`](Self::validate) plus the checks that depend on the
    /// targeted exposure class. A low binder content is a warning.
    pub fn validate_for_target(
        &self,
        mix: &Composition,
        bounds: &BoundsTable,
        target: ExposureClass,
    ) -> GuardrailValidation {
        let mut validation = self.validate(mix, bounds);
        let c = &self.constraints;
        let binder = mix.total_binder();
        if c.severe_binder_classes.contains(&target) && binder < c.min_binder_severe {
            validation.violations.push(GuardrailViolation {
                constraint: format!("min_binder_severe:{target}"),
                actual_value: binder,
                limit: c.min_binder_severe,
                severity: ViolationSeverity::Warning,
            });
        }
        validation
    }
}
