// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT

//! Cross-module compliance scenarios.

use crate::config::{KernelConfig, OptimizerConfig, UncertaintyConfig};
use crate::durability_kernel::DurabilityKernel;
use crate::exposure::{
    Advisor, ComplianceEngine, CriteriaTable, ExposureClass, Gaussian, Measurements, Priority,
    ProbabilisticEngine, UncertainMeasurements,
};
use crate::mix::{Composition, Ingredient};
use crate::optimization::{GeneticOptimizer, Objective};
use crate::oracle::{EmpiricalOracle, PropertySet};
use crate::traits::PropertyOracle;
use serde_json::json;
use std::sync::Arc;

/// `RUST_LOG=en206_mix_core=debug cargo test` shows the engine logs.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_test_writer()
        .try_init();
}

fn small_config() -> KernelConfig {
    KernelConfig {
        optimizer: OptimizerConfig {
            population_size: 30,
            generations: 8,
            elite_size: 3,
            tournament_size: 3,
            ..OptimizerConfig::default()
        },
        uncertainty: UncertaintyConfig {
            samples: 200,
            ..UncertaintyConfig::default()
        },
        ..KernelConfig::default()
    }
}

fn reference_mix() -> Composition {
    Composition::from_json(
        &json!({
            "cement": 350.0, "slag": 0.0, "fly_ash": 0.0, "water": 175.0,
            "superplasticizer": 0.0, "coarse_aggregate": 1000.0,
            "fine_aggregate": 800.0, "age": 28.0
        })
        .to_string(),
    )
    .unwrap()
}

#[test]
fn test_trivial_compliance() {
    let table = Arc::new(CriteriaTable::en206());
    let result = ComplianceEngine::new(table).classify(&Measurements::new(0.45, 35.0));
    assert!(result.satisfies(ExposureClass::XC1));
    // chloride classes need a chloride measurement
    assert!(!result.satisfies(ExposureClass::XD1));
    assert!(result.failed_classes.contains_key(&ExposureClass::XS3));

    let mild = Arc::new(CriteriaTable::en206().subset(&[ExposureClass::XC1]).unwrap());
    let result = ComplianceEngine::new(mild).classify(&Measurements::new(0.45, 35.0));
    assert_eq!(result.satisfied_classes, vec![ExposureClass::XC1]);
    assert_eq!(result.governing_class, ExposureClass::XC1);
    assert!(result.recommendations.is_empty());
}

#[test]
fn test_nothing_satisfied_defaults_to_mildest() {
    let table = Arc::new(CriteriaTable::en206());
    let result = ComplianceEngine::new(table).classify(&Measurements::new(0.9, 10.0));
    assert!(!result.is_compliant());
    assert_eq!(result.governing_class, ExposureClass::XC1);
    // W/B and resistance hints for the three most severe failed classes;
    // the missing chloride value produces no hint
    assert_eq!(result.recommendations.len(), 6);
    let classes: Vec<ExposureClass> = result.recommendations.iter().map(|r| r.class).collect();
    assert!(classes
        .iter()
        .all(|c| [ExposureClass::XS3, ExposureClass::XS2, ExposureClass::XS1].contains(c)));
}

#[test]
fn test_infeasible_optimisation_returns_none() {
    init_tracing();
    let optimizer =
        GeneticOptimizer::new(small_config().optimizer, small_config().bounds).unwrap();
    let result = optimizer.optimize(&EmpiricalOracle::default(), Objective::MinimizeCost, 500.0, 1);
    assert!(result.is_none());
}

#[test]
fn test_advisor_noop_when_target_met() {
    let oracle = EmpiricalOracle::default();
    let mix = reference_mix();
    let props = oracle.predict(&mix).unwrap();

    let rec = Advisor::new(Arc::new(CriteriaTable::en206()))
        .recommend(&mix, &props, "XC1")
        .unwrap();
    assert!(rec.is_noop());
    assert_eq!(rec.priority, Priority::Low);
    assert_eq!(rec.estimated_properties, props);
}

#[test]
fn test_zero_std_at_threshold() {
    let engine = ProbabilisticEngine::new(Arc::new(CriteriaTable::en206()));

    // exactly on the XC1 limits: inclusive comparisons pass
    let on_limit = UncertainMeasurements::new(Gaussian::exact(0.70), Gaussian::exact(20.0));
    let r = engine.classify_probabilistic(&on_limit, 0.95).unwrap();
    assert_eq!(r.probability(ExposureClass::XC1), Some(1.0));
    assert_eq!(r.probability(ExposureClass::XC2), Some(0.0));

    let just_over = UncertainMeasurements::new(Gaussian::exact(0.7001), Gaussian::exact(20.0));
    let r = engine.classify_probabilistic(&just_over, 0.95).unwrap();
    assert_eq!(r.probability(ExposureClass::XC1), Some(0.0));
    for ci in r.confidence_intervals.values() {
        assert!(ci.lower.is_finite() && ci.upper.is_finite());
    }
}

#[test]
fn test_kernel_analyze_reference_mix() {
    let kernel = DurabilityKernel::new(Arc::new(CriteriaTable::en206()), small_config()).unwrap();
    let mix = reference_mix();
    let props = EmpiricalOracle::default().predict(&mix).unwrap();

    let analysis = kernel.analyze(&mix, &props);
    assert!(analysis.current.satisfies(ExposureClass::XC1));
    assert!(analysis.guardrails.is_valid);
    assert!(!analysis.recommendations.is_empty());
    assert!(analysis.recommendations.len() <= 3);
    for rec in &analysis.recommendations {
        assert!(!analysis.current.satisfies(rec.target_class));
        assert!(!rec.is_noop());
    }
    assert!(analysis
        .summary
        .contains(&analysis.current.governing_class.to_string()));
}

#[test]
fn test_kernel_design_attaches_recommendation_on_miss() {
    init_tracing();
    let kernel = DurabilityKernel::new(Arc::new(CriteriaTable::en206()), small_config()).unwrap();
    let oracle = EmpiricalOracle::default();

    let outcome = kernel
        .design(&oracle, Objective::MinimizeCost, 25.0, 11, "XS3")
        .unwrap()
        .unwrap();
    assert_eq!(outcome.target_class, ExposureClass::XS3);
    assert_eq!(outcome.target_met, outcome.exposure.satisfies(ExposureClass::XS3));
    assert_eq!(outcome.recommendation.is_some(), !outcome.target_met);
    assert!(outcome.optimization.properties.resistance >= 25.0);
    assert_eq!(
        outcome.guardrails,
        kernel.validate_for_target(&outcome.optimization.mix, ExposureClass::XS3)
    );
    let lean = outcome.optimization.mix.total_binder() < 360.0;
    assert_eq!(
        outcome
            .guardrails
            .warnings()
            .any(|v| v.constraint == "min_binder_severe:XS3"),
        lean
    );

    let again = kernel
        .design(&oracle, Objective::MinimizeCost, 25.0, 11, "XS3")
        .unwrap()
        .unwrap();
    assert_eq!(again.optimization.mix, outcome.optimization.mix);
}

#[test]
fn test_kernel_assess_reliability() {
    init_tracing();
    let kernel = DurabilityKernel::new(Arc::new(CriteriaTable::en206()), small_config()).unwrap();
    let report = kernel
        .assess_reliability(&EmpiricalOracle::default(), &reference_mix(), 0.95)
        .unwrap();

    assert_eq!(report.uncertainty.valid_samples, 200);
    let p_xc1 = report.classification.probability(ExposureClass::XC1).unwrap();
    assert!(p_xc1 > 0.99, "p(XC1) = {p_xc1}");
    // W/B 0.5 against a 0.40 ceiling
    assert!(report.classification.probability(ExposureClass::XS3).unwrap() < 0.01);
    for (class, p) in &report.classification.probabilities {
        let ci = report.classification.confidence_intervals[class];
        assert!(ci.contains(*p));
    }
}

#[test]
fn test_custom_table_from_json_drives_every_engine() {
    let doc = json!({
        "classes": {
            "XC1": {"max_water_binder": 0.70, "min_resistance": 20.0},
            "XC3": {"max_water_binder": 0.55, "min_resistance": 30.0, "max_carbonation": 20.0},
            "XS1": {"max_water_binder": 0.50, "min_resistance": 35.0, "max_chloride": 15.0}
        }
    });
    let table = CriteriaTable::from_json(&doc.to_string()).unwrap();
    assert_eq!(
        table.severity_order(),
        &[ExposureClass::XS1, ExposureClass::XC3, ExposureClass::XC1]
    );

    let kernel = DurabilityKernel::new(Arc::new(table), KernelConfig::default()).unwrap();
    let props = PropertySet {
        resistance: 36.0,
        chloride_diffusion: 10.0,
        carbonation: 12.0,
        water_binder_ratio: 0.5,
        total_binder: 350.0,
    };
    let result = kernel.classify(&Measurements::from(&props));
    assert_eq!(result.governing_class, ExposureClass::XS1);
    assert_eq!(result.satisfied_classes.len(), 3);

    // classes outside the table are configuration errors
    let err = kernel.recommend(&reference_mix(), &props, "XS3").unwrap_err();
    assert_eq!(err, crate::MixError::ClassNotInTable(ExposureClass::XS3));
}

#[test]
fn test_recommendation_moves_toward_target() {
    let oracle = EmpiricalOracle::default();
    let mix = reference_mix().with(Ingredient::Water, 200.0);
    let props = oracle.predict(&mix).unwrap();
    let advisor = Advisor::new(Arc::new(CriteriaTable::en206()));

    let rec = advisor.recommend(&mix, &props, "XC4").unwrap();
    assert_eq!(rec.priority, Priority::Low);
    assert!(rec.deltas[&Ingredient::Water] < 0.0);
    assert!(rec.estimated_properties.water_binder_ratio < props.water_binder_ratio);
    assert!(rec.estimated_properties.resistance > props.resistance);

    let applied = mix.apply_deltas(&rec.deltas);
    let after = oracle.predict(&applied).unwrap();
    assert!(after.water_binder_ratio < props.water_binder_ratio);
}
