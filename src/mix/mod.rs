// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
pub mod bounds;
pub mod composition;

pub use bounds::{Bounds, BoundsTable};
pub use composition::{Composition, Ingredient};
