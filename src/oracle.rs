// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Property sets and the built-in empirical property oracle.

use crate::error::{MixError, Result};
use crate::mix::{Composition, Ingredient};
use crate::science::{StrengthEngine, StrengthParams, TransportEngine, TransportParams};
use crate::traits::PropertyOracle;
use serde::{Deserialize, Serialize};

/// Predicted (or measured) hardened properties of one mix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySet {
    /// Compressive strength, MPa.
    pub resistance: f64,
    /// Apparent chloride diffusion coefficient, ×10⁻¹² m²/s.
    pub chloride_diffusion: f64,
    /// Carbonation depth, mm.
    pub carbonation: f64,
    pub water_binder_ratio: f64,
    /// kg/m³.
    pub total_binder: f64,
}

/// Output clipping windows.
const RESISTANCE_RANGE: (f64, f64) = (0.0, 150.0);
const CHLORIDE_RANGE: (f64, f64) = (0.0, 30.0);
const CARBONATION_RANGE: (f64, f64) = (0.0, 100.0);

/// Closed-form property model: Bolomey strength on a k-value binder with an
/// EN 1992 age factor, plus the transport engine's chloride and carbonation
/// laws. Usable as a stand-in for a trained model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalOracle {
    #[serde(default)]
    pub strength: StrengthParams,
    #[serde(default)]
    pub transport: TransportParams,
}

impl EmpiricalOracle {
    pub fn new(strength: StrengthParams, transport: TransportParams) -> Self {
        EmpiricalOracle {
            strength,
            transport,
        }
    }

    fn check_domain(mix: &Composition) -> Result<()> {
        if let Some((ingredient, value)) = mix.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(MixError::OutOfDomain(format!(
                "{ingredient} must be a non-negative number, got {value}"
            )));
        }
        if mix.total_binder() <= 0.0 {
            return Err(MixError::OutOfDomain("composition has no binder".into()));
        }
        if mix.get(Ingredient::Age) <= 0.0 {
            return Err(MixError::OutOfDomain("curing age must be positive".into()));
        }
        Ok(())
    }
}

impl PropertyOracle for EmpiricalOracle {
    fn predict(&self, mix: &Composition) -> Result<PropertySet> {
        Self::check_domain(mix)?;

        let binder = mix.total_binder();
        let wb = mix.water_binder_ratio();
        let age = mix.get(Ingredient::Age);

        let strength = StrengthEngine::compute_calibrated(
            mix.get(Ingredient::Cement),
            mix.get(Ingredient::Slag),
            mix.get(Ingredient::FlyAsh),
            mix.get(Ingredient::Water),
            mix.get(Ingredient::Superplasticizer),
            age,
            &self.strength,
        );
        let transport = TransportEngine::compute(
            wb,
            mix.get(Ingredient::Slag) / binder,
            mix.get(Ingredient::FlyAsh) / binder,
            age,
            &self.transport,
        );

        Ok(PropertySet {
            resistance: strength
                .compressive_strength
                .clamp(RESISTANCE_RANGE.0, RESISTANCE_RANGE.1),
            chloride_diffusion: transport
                .chloride_diffusion
                .clamp(CHLORIDE_RANGE.0, CHLORIDE_RANGE.1),
            carbonation: transport
                .carbonation_depth
                .clamp(CARBONATION_RANGE.0, CARBONATION_RANGE.1),
            water_binder_ratio: wb,
            total_binder: binder,
        })
    }
}
