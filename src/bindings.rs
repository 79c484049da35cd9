// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// ExposureBridge: JSON-string entry points for wasm hosts.
//
// Every export takes one JSON document and returns one. Failures come back
// as `{"error": "..."}`, never as a panic across the boundary.

use crate::config::KernelConfig;
use crate::durability_kernel::DurabilityKernel;
use crate::error::Result;
use crate::exposure::{CriteriaTable, Measurements};
use crate::mix::Composition;
use crate::optimization::Objective;
use crate::oracle::{EmpiricalOracle, PropertySet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct ClassifyRequest {
    measurements: Measurements,
    /// Same layout as `CriteriaTable::from_json`; EN 206 when absent.
    #[serde(default)]
    table: Option<serde_json::Value>,
    #[serde(default)]
    config: Option<KernelConfig>,
}

#[derive(Deserialize)]
struct RecommendRequest {
    composition: Composition,
    properties: PropertySet,
    target: String,
}

#[derive(Deserialize)]
struct OptimizeRequest {
    objective: Objective,
    resistance_floor: f64,
    #[serde(default)]
    seed: u64,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    config: Option<KernelConfig>,
}

#[wasm_bindgen]
pub struct ExposureBridge;

#[wasm_bindgen]
impl ExposureBridge {
    /// `{"measurements": {"water_binder_ratio": 0.45, "resistance": 35, ...}}`
    /// -> `ExposureResult`.
    #[wasm_bindgen]
    pub fn classify_json(request_json: &str) -> String {
        respond(Self::classify(request_json))
    }

    /// `{"composition": {...}, "properties": {...}, "target": "XS3"}`
    /// -> `ExposureRecommendation`.
    #[wasm_bindgen]
    pub fn recommend_json(request_json: &str) -> String {
        respond(Self::recommend(request_json))
    }

    /// Runs the genetic optimizer against the built-in empirical oracle.
    ///
    /// `{"objective": "minimize_cost", "resistance_floor": 30, "seed": 42}`
    /// -> `OptimizationResult`, or `null` when nothing feasible was found.
    /// With a `"target"` class the response is a `DesignOutcome` instead.
    #[wasm_bindgen]
    pub fn optimize_json(request_json: &str) -> String {
        respond(Self::optimize(request_json))
    }
}

impl ExposureBridge {
    fn classify(request_json: &str) -> Result<serde_json::Value> {
        let req: ClassifyRequest = serde_json::from_str(request_json)?;
        req.measurements.validate()?;
        let table = match req.table {
            Some(doc) => CriteriaTable::from_json(&doc.to_string())?,
            None => CriteriaTable::en206(),
        };
        let kernel = DurabilityKernel::new(Arc::new(table), req.config.unwrap_or_default())?;
        Ok(serde_json::to_value(kernel.classify(&req.measurements))?)
    }

    fn recommend(request_json: &str) -> Result<serde_json::Value> {
        let req: RecommendRequest = serde_json::from_str(request_json)?;
        let kernel = DurabilityKernel::en206()?;
        let rec = kernel.recommend(&req.composition, &req.properties, &req.target)?;
        Ok(serde_json::to_value(rec)?)
    }

    fn optimize(request_json: &str) -> Result<serde_json::Value> {
        let req: OptimizeRequest = serde_json::from_str(request_json)?;
        let kernel = DurabilityKernel::new(
            Arc::new(CriteriaTable::en206()),
            req.config.unwrap_or_default(),
        )?;
        let oracle = EmpiricalOracle::default();
        match req.target {
            Some(target) => Ok(serde_json::to_value(kernel.design(
                &oracle,
                req.objective,
                req.resistance_floor,
                req.seed,
                &target,
            )?)?),
            None => Ok(serde_json::to_value(kernel.optimizer().optimize(
                &oracle,
                req.objective,
                req.resistance_floor,
                req.seed,
            ))?),
        }
    }
}

fn respond<T: Serialize>(outcome: Result<T>) -> String {
    match outcome {
        Ok(value) => serde_json::to_string(&value).unwrap_or_default(),
        Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
    }
}
