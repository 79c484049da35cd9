// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT

//! Genetic Mix Optimizer
//!
//! Minimises cost or embodied carbon over the bounded composition space,
//! subject to a predicted-resistance floor.
//!
//! One generation:
//! ```text
//! evaluate (oracle) -> update best-so-far -> elites -> tournament x2
//!     -> arithmetic crossover | clone -> gaussian mutation + clip
//! ```
//!
//! Runs are reproducible: all randomness comes from one `StdRng` seeded per
//! run, and ingredients are always visited in the same order.

use crate::config::OptimizerConfig;
use crate::error::Result;
use crate::guardrails::GuardrailEngine;
use crate::mix::{BoundsTable, Composition, Ingredient};
use crate::oracle::PropertySet;
use crate::science::{CostEngine, SustainabilityEngine};
use crate::traits::{MixMetric, PropertyOracle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    MinimizeCost,
    MinimizeCarbon,
}

/// Fitness of one individual. Every feasible score outranks `Infeasible`.
///
/// Equality follows the `total_cmp` order, so `-0.0` and `0.0` differ.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Fitness {
    /// Negated objective value; larger is better.
    Feasible(f64),
    Infeasible,
}

impl Fitness {
    pub fn score(&self) -> Option<f64> {
        match self {
            Fitness::Feasible(s) => Some(*s),
            Fitness::Infeasible => None,
        }
    }

    pub fn is_feasible(&self) -> bool {
        matches!(self, Fitness::Feasible(_))
    }
}

impl PartialEq for Fitness {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fitness {}

impl Ord for Fitness {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Fitness::Feasible(a), Fitness::Feasible(b)) => a.total_cmp(b),
            (Fitness::Feasible(_), Fitness::Infeasible) => Ordering::Greater,
            (Fitness::Infeasible, Fitness::Feasible(_)) => Ordering::Less,
            (Fitness::Infeasible, Fitness::Infeasible) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Fitness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub feasible: usize,
    pub generation_best: Option<f64>,
    /// Never decreases from one generation to the next.
    pub best_so_far: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub mix: Composition,
    pub properties: PropertySet,
    pub cost: f64,
    pub carbon: f64,
    pub resistance_floor: f64,
    pub objective: Objective,
    pub generations: usize,
    /// Cement was raised to the configured floor after the search.
    pub binder_adjusted: bool,
}

#[derive(Debug)]
struct Evaluation {
    fitness: Fitness,
    properties: Option<PropertySet>,
    cost: f64,
    carbon: f64,
}

/// Best feasible individual seen so far.
#[derive(Clone, Debug)]
struct Champion {
    mix: Composition,
    properties: PropertySet,
    fitness: Fitness,
    cost: f64,
    carbon: f64,
}

pub struct GeneticOptimizer {
    config: OptimizerConfig,
    bounds: BoundsTable,
    cost: Arc<dyn MixMetric>,
    carbon: Arc<dyn MixMetric>,
    guardrails: GuardrailEngine,
}

impl GeneticOptimizer {
    /// Uses the built-in cost and carbon tables.
    pub fn new(config: OptimizerConfig, bounds: BoundsTable) -> Result<Self> {
        config.validate()?;
        bounds.validate()?;
        Ok(GeneticOptimizer {
            config,
            bounds,
            cost: Arc::new(CostEngine::default()),
            carbon: Arc::new(SustainabilityEngine::default()),
            guardrails: GuardrailEngine::new(),
        })
    }

    pub fn with_cost_metric(mut self, metric: Arc<dyn MixMetric>) -> Self {
        self.cost = metric;
        self
    }

    pub fn with_carbon_metric(mut self, metric: Arc<dyn MixMetric>) -> Self {
        self.carbon = metric;
        self
    }

    pub fn with_guardrails(mut self, guardrails: GuardrailEngine) -> Self {
        self.guardrails = guardrails;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn bounds(&self) -> &BoundsTable {
        &self.bounds
    }

    /// Best composition meeting `resistance_floor`, or `None` when no
    /// individual ever did.
    pub fn optimize(
        &self,
        oracle: &dyn PropertyOracle,
        objective: Objective,
        resistance_floor: f64,
        seed: u64,
    ) -> Option<OptimizationResult> {
        self.optimize_with_trace(oracle, objective, resistance_floor, seed)
            .0
    }

    pub fn optimize_with_trace(
        &self,
        oracle: &dyn PropertyOracle,
        objective: Objective,
        resistance_floor: f64,
        seed: u64,
    ) -> (Option<OptimizationResult>, Vec<GenerationStats>) {
        let cfg = &self.config;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut population: Vec<Composition> = (0..cfg.population_size)
            .map(|_| self.bounds.sample(&mut rng))
            .collect();

        let mut best: Option<Champion> = None;
        let mut trace = Vec::with_capacity(cfg.generations);

        for generation in 0..cfg.generations {
            let evaluations: Vec<Evaluation> = population
                .iter()
                .map(|mix| self.evaluate(oracle, mix, objective, resistance_floor))
                .collect();
            let fitness: Vec<Fitness> = evaluations.iter().map(|e| e.fitness).collect();

            // first index wins ties
            let generation_best = fitness
                .iter()
                .enumerate()
                .filter(|(_, f)| f.is_feasible())
                .fold(None::<(usize, Fitness)>, |acc, (i, f)| match acc {
                    Some((_, bf)) if *f <= bf => acc,
                    _ => Some((i, *f)),
                });

            if let Some((idx, f)) = generation_best {
                let improves = best.as_ref().map_or(true, |b| f > b.fitness);
                if let (true, Some(properties)) = (improves, evaluations[idx].properties) {
                    best = Some(Champion {
                        mix: population[idx].clone(),
                        properties,
                        fitness: f,
                        cost: evaluations[idx].cost,
                        carbon: evaluations[idx].carbon,
                    });
                }
            }

            let feasible = fitness.iter().filter(|f| f.is_feasible()).count();
            let stats = GenerationStats {
                generation,
                feasible,
                generation_best: generation_best.and_then(|(_, f)| f.score()),
                best_so_far: best.as_ref().and_then(|b| b.fitness.score()),
            };
            debug!(
                generation,
                feasible,
                best_so_far = ?stats.best_so_far,
                "generation evaluated"
            );
            trace.push(stats);

            if feasible == 0 {
                continue;
            }
            population = self.reproduce(&population, &fitness, &mut rng);
        }

        let result = best.map(|champion| self.finalize(oracle, objective, resistance_floor, champion));

        match &result {
            Some(r) => info!(
                objective = ?objective,
                cost = r.cost,
                carbon = r.carbon,
                resistance = r.properties.resistance,
                generations = cfg.generations,
                binder_adjusted = r.binder_adjusted,
                "optimisation finished"
            ),
            None => info!(
                objective = ?objective,
                resistance_floor,
                generations = cfg.generations,
                "optimisation found no feasible mix"
            ),
        }
        (result, trace)
    }

    fn evaluate(
        &self,
        oracle: &dyn PropertyOracle,
        mix: &Composition,
        objective: Objective,
        resistance_floor: f64,
    ) -> Evaluation {
        let infeasible = |properties| Evaluation {
            fitness: Fitness::Infeasible,
            properties,
            cost: 0.0,
            carbon: 0.0,
        };

        let properties = match oracle.predict(mix) {
            Ok(p) => p,
            Err(_) => return infeasible(None),
        };
        if properties.resistance.is_nan() || properties.resistance < resistance_floor {
            return infeasible(Some(properties));
        }

        let cost = self.cost.evaluate(mix);
        let carbon = self.carbon.evaluate(mix);
        let value = match objective {
            Objective::MinimizeCost => cost,
            Objective::MinimizeCarbon => carbon,
        };
        if !value.is_finite() {
            return infeasible(Some(properties));
        }

        Evaluation {
            fitness: Fitness::Feasible(-value),
            properties: Some(properties),
            cost,
            carbon,
        }
    }

    fn reproduce(
        &self,
        population: &[Composition],
        fitness: &[Fitness],
        rng: &mut StdRng,
    ) -> Vec<Composition> {
        let cfg = &self.config;

        // stable sort keeps index order among equal fitness
        let mut ranked: Vec<usize> = (0..population.len()).collect();
        ranked.sort_by(|a, b| fitness[*b].cmp(&fitness[*a]));

        let mut next: Vec<Composition> = ranked
            .iter()
            .take(cfg.elite_size)
            .map(|i| population[*i].clone())
            .collect();

        while next.len() < cfg.population_size {
            let p1 = &population[self.tournament(fitness, rng)];
            let p2 = &population[self.tournament(fitness, rng)];
            let child = if rng.gen::<f64>() < cfg.crossover_rate {
                self.crossover(p1, p2, rng)
            } else {
                p1.clone()
            };
            next.push(self.mutate(child, rng));
        }
        next
    }

    /// k-way tournament with replacement; the first sampled wins ties.
    fn tournament(&self, fitness: &[Fitness], rng: &mut StdRng) -> usize {
        let mut winner = rng.gen_range(0..fitness.len());
        for _ in 1..self.config.tournament_size {
            let challenger = rng.gen_range(0..fitness.len());
            if fitness[challenger] > fitness[winner] {
                winner = challenger;
            }
        }
        winner
    }

    /// Arithmetic crossover, one mixing coefficient per ingredient.
    fn crossover(&self, p1: &Composition, p2: &Composition, rng: &mut StdRng) -> Composition {
        self.bounds
            .iter()
            .map(|(ingredient, _)| {
                let alpha: f64 = rng.gen();
                let value = alpha * p1.get(ingredient) + (1.0 - alpha) * p2.get(ingredient);
                (ingredient, value)
            })
            .collect()
    }

    fn mutate(&self, mut child: Composition, rng: &mut StdRng) -> Composition {
        for (ingredient, bounds) in self.bounds.iter() {
            if rng.gen::<f64>() < self.config.mutation_rate {
                let sigma = self.config.mutation_scale * bounds.span();
                if let Ok(noise) = Normal::new(0.0, sigma) {
                    let value = child.get(ingredient) + noise.sample(rng);
                    child.set(ingredient, bounds.clip(value));
                }
            }
        }
        child
    }

    /// Apply the cement floor to the winner when it passes re-validation.
    fn finalize(
        &self,
        oracle: &dyn PropertyOracle,
        objective: Objective,
        resistance_floor: f64,
        champion: Champion,
    ) -> OptimizationResult {
        let result = |mix: Composition,
                      properties: PropertySet,
                      cost: f64,
                      carbon: f64,
                      binder_adjusted: bool| OptimizationResult {
            mix,
            properties,
            cost,
            carbon,
            resistance_floor,
            objective,
            generations: self.config.generations,
            binder_adjusted,
        };
        let raw = |c: Champion| result(c.mix, c.properties, c.cost, c.carbon, false);

        let floor = match self.config.binder_floor {
            Some(floor) if champion.mix.get(Ingredient::Cement) < floor => floor,
            _ => return raw(champion),
        };

        let adjusted = champion.mix.clone().with(Ingredient::Cement, floor);
        let guard = self.guardrails.validate(&adjusted, &self.bounds);
        match oracle.predict(&adjusted) {
            Ok(properties) if properties.resistance >= resistance_floor && guard.is_valid => {
                let cost = self.cost.evaluate(&adjusted);
                let carbon = self.carbon.evaluate(&adjusted);
                result(adjusted, properties, cost, carbon, true)
            }
            _ => {
                warn!(
                    cement = champion.mix.get(Ingredient::Cement),
                    floor,
                    violations = guard.violations.len(),
                    "binder floor adjustment rejected, keeping raw winner"
                );
                raw(champion)
            }
        }
    }
}
