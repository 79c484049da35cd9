// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

/// Calibration of the Bolomey strength law.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrengthParams {
    /// Bolomey coefficient K (MPa).
    pub bolomey_k: f64,
    /// EN 206 k-value of ground granulated blast-furnace slag.
    pub k_slag: f64,
    /// EN 206 k-value of fly ash.
    pub k_fly_ash: f64,
    /// Water reduction per kg of superplasticizer (fraction).
    pub sp_water_reduction: f64,
    pub sp_water_reduction_cap: f64,
    /// EN 1992-1-1 cement class coefficient `s` for plain CEM I.
    pub s_plain: f64,
    /// `s` reached at 50 % substitution (slow-hardening blends).
    pub s_blended: f64,
}

impl Default for StrengthParams {
    fn default() -> Self {
        StrengthParams {
            bolomey_k: 24.0,
            k_slag: 0.6,
            k_fly_ash: 0.4,
            sp_water_reduction: 0.012,
            sp_water_reduction_cap: 0.25,
            s_plain: 0.25,
            s_blended: 0.38,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StrengthResult {
    pub compressive_strength: f64, // MPa at the given age
    pub strength_28d: f64,         // MPa
    pub effective_wc: f64,
    pub age_factor: f64,
}

pub struct StrengthEngine;

impl StrengthEngine {
    /// Bolomey: fc = K * (1/WC - 0.5), with w/c clamped to a realistic window.
    pub fn compute_bolomey(wc_ratio: f64, k_factor: f64) -> f64 {
        if wc_ratio <= 0.01 || !wc_ratio.is_finite() {
            return 0.0;
        }
        let wc_clamped = wc_ratio.clamp(0.25, 1.0);
        let fc = k_factor * ((1.0 / wc_clamped) - 0.5);
        fc.clamp(0.0, 120.0)
    }

    /// EN 1992-1-1 3.1.2 `beta_cc(t) = exp(s * (1 - sqrt(28 / t)))`.
    pub fn age_factor(age_days: f64, s: f64) -> f64 {
        if age_days <= 0.0 {
            return 0.0;
        }
        (s * (1.0 - (28.0 / age_days).sqrt())).exp()
    }

    /// Strength with SCM k-values, superplasticizer water reduction and age.
    pub fn compute_calibrated(
        cement: f64,
        slag: f64,
        fly_ash: f64,
        water: f64,
        superplasticizer: f64,
        age_days: f64,
        params: &StrengthParams,
    ) -> StrengthResult {
        let effective_cement = cement + params.k_slag * slag + params.k_fly_ash * fly_ash;
        if effective_cement <= 0.0 {
            return StrengthResult {
                compressive_strength: 0.0,
                strength_28d: 0.0,
                effective_wc: f64::INFINITY,
                age_factor: 0.0,
            };
        }

        let reduction = (params.sp_water_reduction * superplasticizer)
            .clamp(0.0, params.sp_water_reduction_cap);
        let effective_wc = water * (1.0 - reduction) / effective_cement;
        let strength_28d = Self::compute_bolomey(effective_wc, params.bolomey_k);

        let binder = cement + slag + fly_ash;
        let substitution = if binder > 0.0 {
            (slag + fly_ash) / binder
        } else {
            0.0
        };
        let s = params.s_plain
            + (params.s_blended - params.s_plain) * (substitution / 0.5).min(1.0);
        let age_factor = Self::age_factor(age_days, s);

        StrengthResult {
            compressive_strength: strength_28d * age_factor,
            strength_28d,
            effective_wc,
            age_factor,
        }
    }

    /// EN 206 strength class reached by a characteristic cylinder strength.
    pub fn classify_strength(fc: f64) -> &'static str {
        const CLASSES: [(f64, &str); 10] = [
            (50.0, "C50/60"),
            (45.0, "C45/55"),
            (40.0, "C40/50"),
            (35.0, "C35/45"),
            (30.0, "C30/37"),
            (25.0, "C25/30"),
            (20.0, "C20/25"),
            (16.0, "C16/20"),
            (12.0, "C12/15"),
            (8.0, "C8/10"),
        ];
        CLASSES
            .iter()
            .find(|(fck, _)| fc >= *fck)
            .map(|(_, name)| *name)
            .unwrap_or("below C8/10")
    }
}
