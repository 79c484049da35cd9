// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

/// Coefficients of the chloride and carbonation models.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransportParams {
    /// Chloride diffusion of a plain mix at w/b 0.40 and 28 days (×10⁻¹² m²/s).
    pub chloride_reference: f64,
    /// Exponential w/b sensitivity of the diffusion coefficient.
    pub chloride_wb_slope: f64,
    pub slag_refinement: f64,
    pub fly_ash_refinement: f64,
    /// Ageing exponent of a plain mix; SCMs raise it.
    pub ageing_plain: f64,
    pub ageing_blended: f64,
    /// Carbonation rate per unit of w/b above the threshold (mm/√year).
    pub carbonation_slope: f64,
    pub carbonation_wb_threshold: f64,
    /// Extra carbonation rate at full substitution.
    pub carbonation_scm_penalty: f64,
    /// Reported depth is taken at this exposure duration.
    pub exposure_years: f64,
}

impl Default for TransportParams {
    fn default() -> Self {
        TransportParams {
            chloride_reference: 8.0,
            chloride_wb_slope: 6.0,
            slag_refinement: 0.7,
            fly_ash_refinement: 0.5,
            ageing_plain: 0.3,
            ageing_blended: 0.6,
            carbonation_slope: 8.0,
            carbonation_wb_threshold: 0.35,
            carbonation_scm_penalty: 0.6,
            exposure_years: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TransportResult {
    pub chloride_diffusion: f64, // ×10⁻¹² m²/s
    pub carbonation_depth: f64,  // mm
}

pub struct TransportEngine;

impl TransportEngine {
    /// Apparent chloride diffusion coefficient.
    ///
    /// `D = D_ref * exp(a * (w/b - 0.40)) * refinement * (28 / t)^m`
    /// where `refinement` falls with slag and fly ash binder fractions and the
    /// ageing exponent `m` rises with substitution.
    pub fn chloride_diffusion(
        wb_ratio: f64,
        slag_fraction: f64,
        fly_ash_fraction: f64,
        age_days: f64,
        params: &TransportParams,
    ) -> f64 {
        if !wb_ratio.is_finite() || age_days <= 0.0 {
            return 0.0;
        }
        let refinement = (1.0
            - params.slag_refinement * slag_fraction
            - params.fly_ash_refinement * fly_ash_fraction)
            .max(0.2);
        let substitution = (slag_fraction + fly_ash_fraction).clamp(0.0, 1.0);
        let m = params.ageing_plain + (params.ageing_blended - params.ageing_plain) * substitution;

        params.chloride_reference
            * (params.chloride_wb_slope * (wb_ratio - 0.40)).exp()
            * refinement
            * (28.0 / age_days).powf(m)
    }

    /// Carbonation depth `x = K * sqrt(T)` after `exposure_years`.
    ///
    /// Curing shorter than 28 days opens the cover zone and speeds the front.
    pub fn carbonation_depth(
        wb_ratio: f64,
        substitution: f64,
        age_days: f64,
        params: &TransportParams,
    ) -> f64 {
        if !wb_ratio.is_finite() || age_days <= 0.0 {
            return 0.0;
        }
        let rate = params.carbonation_slope
            * (wb_ratio - params.carbonation_wb_threshold).max(0.0)
            * (1.0 + params.carbonation_scm_penalty * substitution.clamp(0.0, 1.0))
            * (28.0 / age_days).powf(0.1);
        rate * params.exposure_years.sqrt()
    }

    pub fn compute(
        wb_ratio: f64,
        slag_fraction: f64,
        fly_ash_fraction: f64,
        age_days: f64,
        params: &TransportParams,
    ) -> TransportResult {
        TransportResult {
            chloride_diffusion: Self::chloride_diffusion(
                wb_ratio,
                slag_fraction,
                fly_ash_fraction,
                age_days,
                params,
            ),
            carbonation_depth: Self::carbonation_depth(
                wb_ratio,
                slag_fraction + fly_ash_fraction,
                age_days,
                params,
            ),
        }
    }
}
