// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
use crate::error::{MixError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Fixed ingredient vocabulary of a mix design.
///
/// Declaration order is the iteration order everywhere (sampling, mutation,
/// serialization), which keeps seeded runs reproducible. Deserialization
/// goes through [`FromStr`], so serde and [`Composition::from_json`] accept
/// the same aliases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Ingredient {
    Cement,
    Slag,
    FlyAsh,
    Water,
    Superplasticizer,
    CoarseAggregate,
    FineAggregate,
    /// Curing age in days.
    Age,
}

impl Ingredient {
    pub const ALL: [Ingredient; 8] = [
        Ingredient::Cement,
        Ingredient::Slag,
        Ingredient::FlyAsh,
        Ingredient::Water,
        Ingredient::Superplasticizer,
        Ingredient::CoarseAggregate,
        Ingredient::FineAggregate,
        Ingredient::Age,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ingredient::Cement => "cement",
            Ingredient::Slag => "slag",
            Ingredient::FlyAsh => "fly_ash",
            Ingredient::Water => "water",
            Ingredient::Superplasticizer => "superplasticizer",
            Ingredient::CoarseAggregate => "coarse_aggregate",
            Ingredient::FineAggregate => "fine_aggregate",
            Ingredient::Age => "age",
        }
    }

    /// Cement plus supplementary binders.
    pub fn is_binder(&self) -> bool {
        matches!(
            self,
            Ingredient::Cement | Ingredient::Slag | Ingredient::FlyAsh
        )
    }

    pub fn is_supplementary(&self) -> bool {
        matches!(self, Ingredient::Slag | Ingredient::FlyAsh)
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ingredient {
    type Err = MixError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cement" | "opc" => Ok(Ingredient::Cement),
            "slag" | "ggbs" => Ok(Ingredient::Slag),
            "fly_ash" | "flyash" => Ok(Ingredient::FlyAsh),
            "water" => Ok(Ingredient::Water),
            "superplasticizer" | "sp" | "admixture" => Ok(Ingredient::Superplasticizer),
            "coarse_aggregate" | "coarse_agg" | "gravel" => Ok(Ingredient::CoarseAggregate),
            "fine_aggregate" | "fine_agg" | "sand" => Ok(Ingredient::FineAggregate),
            "age" | "curing_age" => Ok(Ingredient::Age),
            _ => Err(MixError::UnknownIngredient(s.to_string())),
        }
    }
}

impl TryFrom<String> for Ingredient {
    type Error = MixError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Ingredient quantities of one mix (kg/m³, days for [`Ingredient::Age`]).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Composition {
    quantities: BTreeMap<Ingredient, f64>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Ingredient, f64)>,
    {
        Composition {
            quantities: pairs.into_iter().collect(),
        }
    }

    /// Hydrate from a JSON object such as `{"cement": 350, "water": 175, ...}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, f64> = serde_json::from_str(json)?;
        let mut mix = Composition::new();
        for (name, value) in raw {
            mix.set(name.parse()?, value);
        }
        Ok(mix)
    }

    /// Quantity of `ingredient`, zero when absent.
    pub fn get(&self, ingredient: Ingredient) -> f64 {
        self.quantities.get(&ingredient).copied().unwrap_or(0.0)
    }

    pub fn try_get(&self, ingredient: Ingredient) -> Result<f64> {
        self.quantities
            .get(&ingredient)
            .copied()
            .ok_or(MixError::MissingIngredient(ingredient))
    }

    pub fn set(&mut self, ingredient: Ingredient, value: f64) {
        self.quantities.insert(ingredient, value);
    }

    pub fn with(mut self, ingredient: Ingredient, value: f64) -> Self {
        self.set(ingredient, value);
        self
    }

    pub fn contains(&self, ingredient: Ingredient) -> bool {
        self.quantities.contains_key(&ingredient)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ingredient, f64)> + '_ {
        self.quantities.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Fails on the first ingredient of the vocabulary that is absent.
    pub fn require_complete(&self) -> Result<()> {
        match Ingredient::ALL.iter().find(|i| !self.contains(**i)) {
            Some(missing) => Err(MixError::MissingIngredient(*missing)),
            None => Ok(()),
        }
    }

    /// Cement + slag + fly ash.
    pub fn total_binder(&self) -> f64 {
        Ingredient::ALL
            .iter()
            .filter(|i| i.is_binder())
            .map(|i| self.get(*i))
            .sum()
    }

    /// Water over total binder. Infinite when there is no binder.
    pub fn water_binder_ratio(&self) -> f64 {
        let binder = self.total_binder();
        if binder <= 0.0 {
            f64::INFINITY
        } else {
            self.get(Ingredient::Water) / binder
        }
    }

    /// Share of the binder made of supplementary materials (0-1).
    pub fn substitution_ratio(&self) -> f64 {
        let binder = self.total_binder();
        if binder <= 0.0 {
            return 0.0;
        }
        (self.get(Ingredient::Slag) + self.get(Ingredient::FlyAsh)) / binder
    }

    /// New composition with signed deltas added; quantities never go negative.
    pub fn apply_deltas(&self, deltas: &BTreeMap<Ingredient, f64>) -> Composition {
        let mut next = self.clone();
        for (ingredient, delta) in deltas {
            let value = (next.get(*ingredient) + delta).max(0.0);
            next.set(*ingredient, value);
        }
        next
    }
}

impl FromIterator<(Ingredient, f64)> for Composition {
    fn from_iter<T: IntoIterator<Item = (Ingredient, f64)>>(iter: T) -> Self {
        Composition::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_mix() -> Composition {
        Composition::from_pairs([
            (Ingredient::Cement, 300.0),
            (Ingredient::Slag, 60.0),
            (Ingredient::FlyAsh, 40.0),
            (Ingredient::Water, 180.0),
        ])
    }

    #[test]
    fn test_binder_and_ratio() {
        let mix = reference_mix();
        assert_eq!(mix.total_binder(), 400.0);
        assert!((mix.water_binder_ratio() - 0.45).abs() < 1e-12);
        assert!((mix.substitution_ratio() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_zero_binder_is_infinite_ratio() {
        let mix = Composition::new().with(Ingredient::Water, 150.0);
        assert!(mix.water_binder_ratio().is_infinite());
        assert_eq!(mix.substitution_ratio(), 0.0);
    }

    #[test]
    fn test_apply_deltas_floors_at_zero() {
        let mut deltas = BTreeMap::new();
        deltas.insert(Ingredient::Water, -500.0);
        deltas.insert(Ingredient::Superplasticizer, 2.0);
        let next = reference_mix().apply_deltas(&deltas);
        assert_eq!(next.get(Ingredient::Water), 0.0);
        assert_eq!(next.get(Ingredient::Superplasticizer), 2.0);
    }

    #[test]
    fn test_from_json_accepts_aliases() {
        let mix = Composition::from_json(r#"{"opc": 320, "sand": 700, "flyash": 20}"#).unwrap();
        assert_eq!(mix.get(Ingredient::Cement), 320.0);
        assert_eq!(mix.get(Ingredient::FineAggregate), 700.0);
        assert_eq!(mix.get(Ingredient::FlyAsh), 20.0);

        let err = Composition::from_json(r#"{"unobtainium": 1}"#).unwrap_err();
        assert!(matches!(err, MixError::UnknownIngredient(_)));
    }

    #[test]
    fn test_serde_shares_alias_parsing() {
        let json = r#"{"OPC": 320, "sand": 700, "ggbs": 40, "water": 170}"#;
        let derived: Composition = serde_json::from_str(json).unwrap();
        assert_eq!(derived, Composition::from_json(json).unwrap());
        assert_eq!(derived.get(Ingredient::Slag), 40.0);

        // canonical names on the way out
        let out = serde_json::to_value(&derived).unwrap();
        assert_eq!(out["cement"], 320.0);
        assert_eq!(out["fine_aggregate"], 700.0);

        let err = serde_json::from_str::<Composition>(r#"{"unobtainium": 1}"#).unwrap_err();
        assert!(err.to_string().contains("unobtainium"));
    }

    #[test]
    fn test_require_complete_reports_first_missing() {
        let err = reference_mix().require_complete().unwrap_err();
        assert_eq!(err, MixError::MissingIngredient(Ingredient::Superplasticizer));
    }
}
