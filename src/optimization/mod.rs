// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
pub mod genetic;
pub mod monte_carlo;

pub use genetic::{Fitness, GenerationStats, GeneticOptimizer, Objective, OptimizationResult};
pub use monte_carlo::{PropertyUncertainty, SampleStats, UncertaintyPropagator};
