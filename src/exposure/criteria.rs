// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! EN 206 exposure classes and the read-only criteria table shared by every
//! compliance engine.

use crate::error::{MixError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// EN 206 exposure class.
///
/// Declared from most to least demanding so that `Ord` follows the standard
/// severity order of the built-in table.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExposureClass {
    XS3,
    XS2,
    XS1,
    XD3,
    XD2,
    XD1,
    XA3,
    XA2,
    XA1,
    XF4,
    XF3,
    XF2,
    XF1,
    XC4,
    XC3,
    XC2,
    XC1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExposureCategory {
    /// XC
    Carbonation,
    /// XD
    Chlorides,
    /// XS
    Seawater,
    /// XF
    FreezeThaw,
    /// XA
    ChemicalAttack,
}

impl ExposureClass {
    /// Every class, most demanding first.
    pub const ALL: [ExposureClass; 17] = [
        ExposureClass::XS3,
        ExposureClass::XS2,
        ExposureClass::XS1,
        ExposureClass::XD3,
        ExposureClass::XD2,
        ExposureClass::XD1,
        ExposureClass::XA3,
        ExposureClass::XA2,
        ExposureClass::XA1,
        ExposureClass::XF4,
        ExposureClass::XF3,
        ExposureClass::XF2,
        ExposureClass::XF1,
        ExposureClass::XC4,
        ExposureClass::XC3,
        ExposureClass::XC2,
        ExposureClass::XC1,
    ];

    pub fn code(&self) -> &'static str {
        use ExposureClass::*;
        match self {
            XS3 => "XS3",
            XS2 => "XS2",
            XS1 => "XS1",
            XD3 => "XD3",
            XD2 => "XD2",
            XD1 => "XD1",
            XA3 => "XA3",
            XA2 => "XA2",
            XA1 => "XA1",
            XF4 => "XF4",
            XF3 => "XF3",
            XF2 => "XF2",
            XF1 => "XF1",
            XC4 => "XC4",
            XC3 => "XC3",
            XC2 => "XC2",
            XC1 => "XC1",
        }
    }

    pub fn category(&self) -> ExposureCategory {
        use ExposureClass::*;
        match self {
            XC1 | XC2 | XC3 | XC4 => ExposureCategory::Carbonation,
            XD1 | XD2 | XD3 => ExposureCategory::Chlorides,
            XS1 | XS2 | XS3 => ExposureCategory::Seawater,
            XF1 | XF2 | XF3 | XF4 => ExposureCategory::FreezeThaw,
            XA1 | XA2 | XA3 => ExposureCategory::ChemicalAttack,
        }
    }

    /// Severity digit within the category (1 = mildest).
    pub fn tier(&self) -> u8 {
        self.code().as_bytes()[2] - b'0'
    }

    /// Chloride-driven corrosion classes (XS, XD).
    pub fn is_chloride_exposure(&self) -> bool {
        matches!(
            self.category(),
            ExposureCategory::Seawater | ExposureCategory::Chlorides
        )
    }
}

impl fmt::Display for ExposureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ExposureClass {
    type Err = MixError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_uppercase();
        ExposureClass::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or_else(|| MixError::UnknownExposureClass(s.to_string()))
    }
}

/// Limits one class imposes on a formulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExposureCriteria {
    pub max_water_binder: f64,
    /// MPa
    pub min_resistance: f64,
    /// ×10⁻¹² m²/s
    #[serde(default)]
    pub max_chloride: Option<f64>,
    /// mm
    #[serde(default)]
    pub max_carbonation: Option<f64>,
    /// %
    #[serde(default)]
    pub min_air: Option<f64>,
    #[serde(default)]
    pub description: String,
}

impl ExposureCriteria {
    fn new(max_water_binder: f64, min_resistance: f64, description: &str) -> Self {
        ExposureCriteria {
            max_water_binder,
            min_resistance,
            max_chloride: None,
            max_carbonation: None,
            min_air: None,
            description: description.to_string(),
        }
    }

    fn chloride(mut self, ceiling: f64) -> Self {
        self.max_chloride = Some(ceiling);
        self
    }

    fn carbonation(mut self, ceiling: f64) -> Self {
        self.max_carbonation = Some(ceiling);
        self
    }

    fn air(mut self, minimum: f64) -> Self {
        self.min_air = Some(minimum);
        self
    }

    /// True when every limit `other` sets is matched or tightened here, so any
    /// formulation satisfying `self` also satisfies `other`.
    pub fn dominates(&self, other: &ExposureCriteria) -> bool {
        fn ceiling_at_least_as_strict(mine: Option<f64>, theirs: Option<f64>) -> bool {
            match (mine, theirs) {
                (_, None) => true,
                (Some(a), Some(b)) => a <= b,
                (None, Some(_)) => false,
            }
        }

        let air = match (self.min_air, other.min_air) {
            (_, None) => true,
            (Some(a), Some(b)) => a >= b,
            (None, Some(_)) => false,
        };

        self.max_water_binder <= other.max_water_binder
            && self.min_resistance >= other.min_resistance
            && ceiling_at_least_as_strict(self.max_chloride, other.max_chloride)
            && ceiling_at_least_as_strict(self.max_carbonation, other.max_carbonation)
            && air
    }
}

#[derive(Deserialize)]
struct CriteriaDocument {
    classes: BTreeMap<String, ExposureCriteria>,
    #[serde(default)]
    severity_order: Option<Vec<String>>,
}

/// Class → criteria, plus the severity order used to pick governing classes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CriteriaTable {
    criteria: BTreeMap<ExposureClass, ExposureCriteria>,
    severity_order: Vec<ExposureClass>,
}

impl CriteriaTable {
    /// `severity_order` defaults to the standard order restricted to the
    /// classes present. A supplied order must list each table class once.
    pub fn new(
        criteria: BTreeMap<ExposureClass, ExposureCriteria>,
        severity_order: Option<Vec<ExposureClass>>,
    ) -> Result<Self> {
        if criteria.is_empty() {
            return Err(MixError::invalid("criteria", "table defines no class"));
        }
        for (class, c) in &criteria {
            if !(c.max_water_binder.is_finite() && c.min_resistance.is_finite()) {
                return Err(MixError::invalid(
                    "criteria",
                    format!("{class}: limits must be finite"),
                ));
            }
        }

        let severity_order = match severity_order {
            Some(order) => {
                let mut seen = order.clone();
                seen.sort();
                seen.dedup();
                let expected: Vec<ExposureClass> = criteria.keys().copied().collect();
                if seen.len() != order.len() || seen != expected {
                    return Err(MixError::invalid(
                        "severity_order",
                        "must list every class of the table exactly once",
                    ));
                }
                order
            }
            None => ExposureClass::ALL
                .iter()
                .copied()
                .filter(|c| criteria.contains_key(c))
                .collect(),
        };

        Ok(CriteriaTable {
            criteria,
            severity_order,
        })
    }

    /// Built-in EN 206 table.
    pub fn en206() -> Self {
        use ExposureClass::*;
        let rows = [
            (XC1, ExposureCriteria::new(0.70, 20.0, "Dry or permanently wet")),
            (XC2, ExposureCriteria::new(0.65, 25.0, "Wet, rarely dry").carbonation(25.0)),
            (XC3, ExposureCriteria::new(0.60, 30.0, "Moderate humidity").carbonation(15.0)),
            (XC4, ExposureCriteria::new(0.55, 30.0, "Cyclic wet and dry").carbonation(8.0)),
            (XD1, ExposureCriteria::new(0.55, 30.0, "Moderate humidity, chlorides").chloride(12.0)),
            (XD2, ExposureCriteria::new(0.50, 35.0, "Wet, rarely dry, chlorides").chloride(8.0)),
            (XD3, ExposureCriteria::new(0.45, 35.0, "Cyclic wet and dry, chlorides").chloride(5.0)),
            (XS1, ExposureCriteria::new(0.50, 35.0, "Airborne salt, no direct contact").chloride(12.0)),
            (XS2, ExposureCriteria::new(0.45, 40.0, "Permanently submerged in seawater").chloride(8.0)),
            (XS3, ExposureCriteria::new(0.40, 45.0, "Tidal, splash and spray zones").chloride(5.0)),
            (XF1, ExposureCriteria::new(0.60, 30.0, "Moderate saturation, no de-icing agent").air(3.0)),
            (XF2, ExposureCriteria::new(0.55, 30.0, "Moderate saturation, de-icing agent").air(3.0)),
            (XF3, ExposureCriteria::new(0.55, 30.0, "High saturation, no de-icing agent").air(4.0)),
            (XF4, ExposureCriteria::new(0.45, 35.0, "High saturation, de-icing agent or seawater").air(4.0)),
            (XA1, ExposureCriteria::new(0.55, 30.0, "Slightly aggressive chemical environment")),
            (XA2, ExposureCriteria::new(0.50, 30.0, "Moderately aggressive chemical environment")),
            (XA3, ExposureCriteria::new(0.45, 35.0, "Highly aggressive chemical environment")),
        ];
        CriteriaTable {
            criteria: rows.into_iter().collect(),
            severity_order: ExposureClass::ALL.to_vec(),
        }
    }

    /// Load a table from
    /// `{"classes": {"XC1": {"max_water_binder": 0.7, "min_resistance": 20, ...}}, "severity_order": [...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: CriteriaDocument = serde_json::from_str(json)?;
        let mut criteria = BTreeMap::new();
        for (code, c) in doc.classes {
            criteria.insert(code.parse::<ExposureClass>()?, c);
        }
        let order = doc
            .severity_order
            .map(|codes| {
                codes
                    .iter()
                    .map(|c| c.parse::<ExposureClass>())
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;
        Self::new(criteria, order)
    }

    /// Restrict the table to `classes`, keeping their relative severity.
    pub fn subset(&self, classes: &[ExposureClass]) -> Result<Self> {
        let mut criteria = BTreeMap::new();
        for class in classes {
            criteria.insert(*class, self.require(*class)?.clone());
        }
        let order = self
            .severity_order
            .iter()
            .copied()
            .filter(|c| criteria.contains_key(c))
            .collect();
        Self::new(criteria, Some(order))
    }

    pub fn get(&self, class: ExposureClass) -> Option<&ExposureCriteria> {
        self.criteria.get(&class)
    }

    pub fn require(&self, class: ExposureClass) -> Result<&ExposureCriteria> {
        self.get(class).ok_or(MixError::ClassNotInTable(class))
    }

    /// Parse a code and check that the table defines it.
    pub fn resolve(&self, code: &str) -> Result<ExposureClass> {
        let class: ExposureClass = code.parse()?;
        self.require(class)?;
        Ok(class)
    }

    pub fn contains(&self, class: ExposureClass) -> bool {
        self.criteria.contains_key(&class)
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Most demanding first.
    pub fn severity_order(&self) -> &[ExposureClass] {
        &self.severity_order
    }

    pub fn by_severity(&self) -> impl Iterator<Item = (ExposureClass, &ExposureCriteria)> + '_ {
        self.severity_order
            .iter()
            .filter_map(|c| self.criteria.get(c).map(|criteria| (*c, criteria)))
    }

    /// 0 for the most demanding class.
    pub fn severity_rank(&self, class: ExposureClass) -> Option<usize> {
        self.severity_order.iter().position(|c| *c == class)
    }

    pub fn most_severe<I>(&self, classes: I) -> Option<ExposureClass>
    where
        I: IntoIterator<Item = ExposureClass>,
    {
        classes
            .into_iter()
            .filter_map(|c| self.severity_rank(c).map(|rank| (rank, c)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, c)| c)
    }

    /// Least demanding class of the table (XC1 for the built-in table).
    pub fn least_demanding(&self) -> ExposureClass {
        self.severity_order
            .last()
            .copied()
            .unwrap_or(ExposureClass::XC1)
    }
}

impl Default for CriteriaTable {
    fn default() -> Self {
        Self::en206()
    }
}
