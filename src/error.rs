// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Crate-wide error type.
//!
//! Only configuration problems surface as errors. Infeasible searches return
//! `None`, and oracle failures on single candidates are absorbed by the
//! optimizer.

use crate::exposure::ExposureClass;
use crate::mix::Ingredient;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MixError {
    #[error("unknown exposure class `{0}`")]
    UnknownExposureClass(String),

    #[error("exposure class {0} is not defined in the criteria table")]
    ClassNotInTable(ExposureClass),

    #[error("unknown ingredient `{0}`")]
    UnknownIngredient(String),

    #[error("composition is missing ingredient {0}")]
    MissingIngredient(Ingredient),

    /// Raised by a property oracle for physically implausible compositions.
    #[error("composition outside the oracle domain: {0}")]
    OutOfDomain(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("no valid samples: all {0} perturbed compositions were rejected by the oracle")]
    NoValidSamples(usize),

    #[error("failed to parse JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for MixError {
    fn from(err: serde_json::Error) -> Self {
        MixError::Json(err.to_string())
    }
}

impl MixError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        MixError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MixError>;
