// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
pub mod cost;
pub mod strength;
pub mod sustainability;
pub mod transport;

pub use cost::{CostEngine, CostResult};
pub use strength::{StrengthEngine, StrengthParams, StrengthResult};
pub use sustainability::{EnvironmentalGrade, SustainabilityEngine, SustainabilityResult};
pub use transport::{TransportEngine, TransportParams, TransportResult};
