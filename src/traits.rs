// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT

//! Collaborator Traits
//!
//! The optimizer and the kernel never call a concrete property model or cost
//! table directly. They go through these two seams so that a trained model,
//! a lab database or a plain closure can be plugged in.
//!
//! ```text
//! GeneticOptimizer --uses--> PropertyOracle (Trait) <-- EmpiricalOracle | Fn closure
//!                  --uses--> MixMetric (Trait)      <-- CostEngine | SustainabilityEngine | Fn closure
//! ```

use crate::error::Result;
use crate::mix::Composition;
use crate::oracle::PropertySet;

/// Composition → predicted properties.
///
/// Implementations must be pure: the same composition always yields the same
/// answer. An `Err` marks the composition as outside the model's domain; the
/// optimizer treats it as infeasible.
pub trait PropertyOracle: Send + Sync {
    fn predict(&self, mix: &Composition) -> Result<PropertySet>;
}

impl<F> PropertyOracle for F
where
    F: Fn(&Composition) -> Result<PropertySet> + Send + Sync,
{
    fn predict(&self, mix: &Composition) -> Result<PropertySet> {
        self(mix)
    }
}

/// Composition → non-negative scalar (cost per m³, kg CO₂ per m³, ...).
pub trait MixMetric: Send + Sync {
    fn evaluate(&self, mix: &Composition) -> f64;
}

impl<F> MixMetric for F
where
    F: Fn(&Composition) -> f64 + Send + Sync,
{
    fn evaluate(&self, mix: &Composition) -> f64 {
        self(mix)
    }
}
