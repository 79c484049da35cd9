// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT

//! Property tests over the compliance engines and the composition space.

use crate::exposure::{
    ComplianceEngine, CriteriaTable, ExposureClass, Gaussian, Measurements, ProbabilisticEngine,
    UncertainMeasurements,
};
use crate::mix::{BoundsTable, Composition, Ingredient};
use crate::optimization::SampleStats;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn measurements() -> impl Strategy<Value = Measurements> {
    (
        0.25..0.95f64,
        5.0..80.0f64,
        prop::option::of(0.5..25.0f64),
        prop::option::of(0.0..40.0f64),
        prop::option::of(0.0..8.0f64),
    )
        .prop_map(|(wb, fc, cl, carb, air)| Measurements {
            water_binder_ratio: wb,
            resistance: fc,
            chloride: cl,
            carbonation: carb,
            air_content: air,
        })
}

fn gaussian(mean: std::ops::Range<f64>, max_std: f64) -> impl Strategy<Value = Gaussian> {
    (mean, 0.0..max_std).prop_map(|(m, s)| Gaussian::new(m, s))
}

fn uncertain() -> impl Strategy<Value = UncertainMeasurements> {
    (
        gaussian(0.25..0.95, 0.1),
        gaussian(5.0..80.0, 10.0),
        prop::option::of(gaussian(0.5..25.0, 4.0)),
        prop::option::of(gaussian(0.0..40.0, 8.0)),
    )
        .prop_map(|(wb, fc, cl, carb)| UncertainMeasurements {
            water_binder_ratio: wb,
            resistance: fc,
            chloride: cl,
            carbonation: carb,
        })
}

fn en206() -> Arc<CriteriaTable> {
    Arc::new(CriteriaTable::en206())
}

#[test]
fn probabilities_are_bounded_and_inside_their_interval() {
    let engine = ProbabilisticEngine::new(en206());
    proptest!(|(m in uncertain(), level in 0.5..0.999f64)| {
        let r = engine.classify_probabilistic(&m, level).unwrap();
        prop_assert_eq!(r.probabilities.len(), ExposureClass::ALL.len());
        for (class, p) in &r.probabilities {
            prop_assert!((0.0..=1.0).contains(p));
            let ci = r.confidence_intervals[class];
            prop_assert!(ci.lower <= *p && *p <= ci.upper);
            prop_assert!(ci.lower >= 0.0 && ci.upper <= 1.0);
        }
    });
}

#[test]
fn satisfying_a_class_satisfies_every_class_it_dominates() {
    let table = en206();
    let engine = ComplianceEngine::new(Arc::clone(&table));
    proptest!(|(m in measurements())| {
        let result = engine.classify(&m);
        for (a, ca) in table.by_severity() {
            for (b, cb) in table.by_severity() {
                if ca.dominates(cb) && result.satisfies(a) {
                    prop_assert!(result.satisfies(b), "{} satisfied but {} not", a, b);
                }
            }
        }
    });
}

#[test]
fn dominating_class_is_never_more_probable() {
    let table = en206();
    let engine = ProbabilisticEngine::new(Arc::clone(&table));
    proptest!(|(m in uncertain())| {
        for (a, ca) in table.by_severity() {
            for (b, cb) in table.by_severity() {
                if ca.dominates(cb) {
                    let pa = engine.class_probability(ca, &m);
                    let pb = engine.class_probability(cb, &m);
                    prop_assert!(pa <= pb + 1e-12, "p({})={} > p({})={}", a, pa, b, pb);
                }
            }
        }
    });
}

#[test]
fn governing_class_is_most_severe_satisfied_or_default() {
    let table = en206();
    let engine = ComplianceEngine::new(Arc::clone(&table));
    proptest!(|(m in measurements())| {
        let result = engine.classify(&m);
        match table.most_severe(result.satisfied_classes.iter().copied()) {
            Some(class) => {
                prop_assert_eq!(result.governing_class, class);
                prop_assert_eq!(result.satisfied_classes[0], class);
            }
            None => prop_assert_eq!(result.governing_class, table.least_demanding()),
        }
        let evaluated = result.satisfied_classes.len() + result.failed_classes.len();
        prop_assert_eq!(evaluated, table.len());
    });
}

#[test]
fn sampled_compositions_stay_in_bounds() {
    let bounds = BoundsTable::standard();
    proptest!(|(seed in any::<u64>())| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mix = bounds.sample(&mut rng);
        prop_assert!(bounds.violations(&mix).is_empty());
        prop_assert_eq!(mix.len(), bounds.len());
    });
}

#[test]
fn clip_projects_into_bounds() {
    let bounds = BoundsTable::standard();
    proptest!(|(values in prop::collection::vec(-500.0..2000.0f64, Ingredient::ALL.len()))| {
        let mut mix: Composition = Ingredient::ALL.iter().copied().zip(values.iter().copied()).collect();
        bounds.clip(&mut mix);
        prop_assert!(bounds.violations(&mix).is_empty());
        for (ingredient, b) in bounds.iter() {
            let original = values[Ingredient::ALL.iter().position(|i| *i == ingredient).unwrap()];
            if b.contains(original) {
                prop_assert_eq!(mix.get(ingredient), original);
            }
        }
    });
}

#[test]
fn sample_stats_are_ordered() {
    proptest!(|(values in prop::collection::vec(-100.0..100.0f64, 1..200))| {
        let s = SampleStats::from_samples(&values).unwrap();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let eps = 1e-9;
        prop_assert!(min <= s.q05 + eps && s.q05 <= s.q25 + eps && s.q25 <= s.median + eps);
        prop_assert!(s.median <= s.q75 + eps && s.q75 <= s.q95 + eps && s.q95 <= max + eps);
        prop_assert!(min - 1e-9 <= s.mean && s.mean <= max + 1e-9);
        prop_assert!(s.std >= 0.0);
    });
}
