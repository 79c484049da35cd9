// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
use crate::error::Result;
use crate::mix::{Composition, Ingredient};
use crate::traits::MixMetric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostResult {
    pub total_cost: f64, // currency units per m³
    pub breakdown: BTreeMap<Ingredient, f64>,
}

/// Unit-price table (currency per kg). Ingredients without a price cost nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostEngine {
    pub prices: BTreeMap<Ingredient, f64>,
}

impl Default for CostEngine {
    fn default() -> Self {
        use Ingredient::*;
        CostEngine {
            prices: [
                (Cement, 0.12),
                (Slag, 0.04),
                (FlyAsh, 0.03),
                (Water, 0.0001),
                (Superplasticizer, 2.5),
                (CoarseAggregate, 0.015),
                (FineAggregate, 0.015),
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl CostEngine {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, f64> = serde_json::from_str(json)?;
        let mut prices = BTreeMap::new();
        for (name, price) in raw {
            prices.insert(name.parse::<Ingredient>()?, price);
        }
        Ok(CostEngine { prices })
    }

    /// Calculate the total cost of one cubic metre and its per-ingredient split.
    pub fn compute(&self, mix: &Composition) -> CostResult {
        let breakdown: BTreeMap<Ingredient, f64> = mix
            .iter()
            .filter_map(|(ingredient, mass)| {
                self.prices
                    .get(&ingredient)
                    .map(|price| (ingredient, mass.max(0.0) * price))
            })
            .collect();

        CostResult {
            total_cost: breakdown.values().sum(),
            breakdown,
        }
    }
}

impl MixMetric for CostEngine {
    fn evaluate(&self, mix: &Composition) -> f64 {
        self.compute(mix).total_cost
    }
}
