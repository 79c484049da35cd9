// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Per-ingredient search bounds.

use super::{Composition, Ingredient};
use crate::error::{MixError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64, step: f64, default: f64) -> Self {
        Bounds {
            min,
            max,
            step,
            default,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Ingredient → bounds. Iterates in ingredient order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundsTable {
    entries: BTreeMap<Ingredient, Bounds>,
}

impl BoundsTable {
    pub fn new(entries: BTreeMap<Ingredient, Bounds>) -> Result<Self> {
        let table = BoundsTable { entries };
        table.validate()?;
        Ok(table)
    }

    /// Standard ranges for structural concrete.
    pub fn standard() -> Self {
        use Ingredient::*;
        let entries = [
            (Cement, Bounds::new(150.0, 550.0, 10.0, 350.0)),
            (Slag, Bounds::new(0.0, 250.0, 10.0, 0.0)),
            (FlyAsh, Bounds::new(0.0, 200.0, 10.0, 0.0)),
            (Water, Bounds::new(120.0, 220.0, 5.0, 175.0)),
            (Superplasticizer, Bounds::new(0.0, 20.0, 0.5, 0.0)),
            (CoarseAggregate, Bounds::new(800.0, 1200.0, 10.0, 1000.0)),
            (FineAggregate, Bounds::new(600.0, 950.0, 10.0, 800.0)),
            (Age, Bounds::new(1.0, 365.0, 1.0, 28.0)),
        ];
        BoundsTable {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Bounds> = serde_json::from_str(json)?;
        let mut entries = BTreeMap::new();
        for (name, bounds) in raw {
            entries.insert(name.parse::<Ingredient>()?, bounds);
        }
        Self::new(entries)
    }

    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(MixError::invalid("bounds", "table is empty"));
        }
        for (ingredient, b) in &self.entries {
            if !(b.min.is_finite() && b.max.is_finite()) || b.min < 0.0 || b.min > b.max {
                return Err(MixError::invalid(
                    "bounds",
                    format!("{ingredient}: expected 0 <= min <= max, got [{}, {}]", b.min, b.max),
                ));
            }
        }
        Ok(())
    }

    pub fn get(&self, ingredient: Ingredient) -> Option<&Bounds> {
        self.entries.get(&ingredient)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ingredient, &Bounds)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Composition made of every ingredient's default value.
    pub fn defaults(&self) -> Composition {
        self.iter().map(|(i, b)| (i, b.default)).collect()
    }

    /// One individual, each ingredient drawn uniformly within its bounds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Composition {
        self.iter()
            .map(|(i, b)| (i, rng.gen_range(b.min..=b.max)))
            .collect()
    }

    /// Clamp every bounded ingredient of `mix` in place.
    pub fn clip(&self, mix: &mut Composition) {
        for (ingredient, bounds) in self.iter() {
            if mix.contains(ingredient) {
                mix.set(ingredient, bounds.clip(mix.get(ingredient)));
            }
        }
    }

    /// Ingredients of `mix` lying outside their bounds.
    pub fn violations(&self, mix: &Composition) -> Vec<(Ingredient, f64, Bounds)> {
        self.iter()
            .filter(|(i, _)| mix.contains(*i))
            .filter_map(|(i, b)| {
                let value = mix.get(i);
                (!b.contains(value)).then_some((i, value, *b))
            })
            .collect()
    }
}

impl Default for BoundsTable {
    fn default() -> Self {
        Self::standard()
    }
}
