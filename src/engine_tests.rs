//! End-to-end runs through the exporter, the slice builder and the genetic
//! algorithm.

use crate::agreement::ari;
use crate::diagnostics::{DiagnosticLog, Severity};
use crate::engine::{Polarization, PolarizationConfig};
use crate::genetic::GeneticConfig;
use crate::matrix::SignedMatrix;
use crate::quality::QualityFunction;
use crate::slice::{
    DataType, DefaultExporter, Kernel, SliceConfig, SliceNetworks, Statement, TimeUnit,
};
use chrono::{NaiveDate, NaiveDateTime};
use ndarray::Array2;
use std::sync::Arc;

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 9, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn stmt(id: u64, d: u32, org: &str, concept: &str, agree: bool) -> Statement {
    Statement::new(id, day(d), "DNA Statement")
        .with_value("organization", org)
        .with_value("concept", concept)
        .with_value("agreement", agree)
}

fn exporter(statements: Vec<Statement>) -> DefaultExporter {
    DefaultExporter::builder(statements)
        .with_data_type("agreement", DataType::Boolean)
        .build()
}

/// Two camps of three, one for and one against each concept, on `days`.
fn two_camps(days: &[u32]) -> DefaultExporter {
    let mut statements = Vec::new();
    for &d in days {
        for (i, org) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
            for concept in ["tax", "wind"] {
                let id = statements.len() as u64;
                statements.push(stmt(id, d, org, concept, i < 3));
            }
        }
    }
    exporter(statements)
}

fn genetic() -> GeneticConfig {
    GeneticConfig::new()
        .with_num_parents(30)
        .with_num_iterations(150)
        .with_mutation_percentage(0.4)
        .with_seed(11)
}

#[test]
fn test_recovers_two_camps() {
    let config = PolarizationConfig {
        slices: SliceConfig::new(),
        genetic: genetic(),
    };
    let series = Polarization::new(config).run(&two_camps(&[1])).unwrap();
    assert_eq!(series.len(), 1);

    let r = series.get(0).unwrap();
    assert_eq!(r.names(), ["A", "B", "C", "D", "E", "F"]);
    let truth = [0, 0, 0, 1, 1, 1];
    assert!((ari(r.memberships(), &truth) - 1.0).abs() < 1e-12, "{:?}", r.memberships());
    assert!(r.final_max_q() > 0.0);
    assert_eq!(r.max_q().len(), r.sd_q().len());
}

#[test]
fn test_same_nonzero_seed_is_bit_identical() {
    let statements = (0..40)
        .map(|i| {
            let org = format!("org{}", i % 7);
            let concept = ["tax", "wind", "coal"][i % 3];
            stmt(i as u64, 1 + (i as u32 % 9), &org, concept, i % 4 < 2)
        })
        .collect();
    let e = exporter(statements);
    for kernel in [Kernel::Uniform, Kernel::Gaussian] {
        let config = PolarizationConfig {
            slices: SliceConfig::new()
                .with_window(TimeUnit::Days, 4)
                .with_kernel(kernel),
            genetic: GeneticConfig::new()
                .with_num_parents(12)
                .with_num_iterations(30)
                .with_seed(2024),
        };
        let a = Polarization::new(config.clone()).run(&e).unwrap();
        let b = Polarization::new(config).run(&e).unwrap();
        assert_eq!(a.len(), 9);
        assert_eq!(a, b, "{kernel}");
    }
}

#[test]
fn test_zero_slice_is_trivial_and_others_continue() {
    let labels: Vec<String> = ["A", "B", "C", "D", "E", "F"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let zero = SignedMatrix::zeros(labels.clone(), day(1), day(1), day(1));
    let mut triads = Array2::zeros((6, 6));
    for i in 0..6 {
        for j in 0..6 {
            if i != j && (i < 3) == (j < 3) {
                triads[[i, j]] = 1.0;
            }
        }
    }
    let congruence = SignedMatrix::new(labels, triads, day(2), day(2), day(2)).unwrap();
    let conflict = congruence.empty_like();
    let networks: SliceNetworks = vec![
        (zero.clone(), zero),
        (congruence, conflict),
    ]
    .into_iter()
    .collect();

    let config = PolarizationConfig {
        slices: SliceConfig::new(),
        genetic: genetic(),
    };
    let series = Polarization::new(config).run_networks(&networks).unwrap();
    assert_eq!(series.len(), 2);

    let first = series.get(0).unwrap();
    assert_eq!(first.final_max_q(), 0.0);
    assert!(first.memberships().is_empty());
    assert!(first.names().is_empty());
    assert!(first.early_convergence());

    let second = series.get(1).unwrap();
    assert_eq!(second.memberships().len(), 6);
    assert_eq!(second.middle(), day(2));
}

#[test]
fn test_daily_windows_and_small_slices() {
    let orgs = ["A", "B", "C", "D", "E"];
    let statements: Vec<Statement> = (1..=5u32)
        .map(|d| stmt(u64::from(d), d, orgs[d as usize - 1], "tax", d % 2 == 0))
        .collect();
    let e = exporter(statements);

    let run = |indent: bool| {
        let log = Arc::new(DiagnosticLog::new());
        let config = PolarizationConfig {
            slices: SliceConfig::new()
                .with_window(TimeUnit::Days, 2)
                .with_indent(indent),
            genetic: GeneticConfig::new().with_num_iterations(20).with_seed(5),
        };
        let series = Polarization::new(config)
            .with_sink(log.clone())
            .run(&e)
            .unwrap();
        (series, log)
    };

    let (series, log) = run(false);
    assert_eq!(series.len(), 5);
    // Edge slices see only two actors, which cannot be split into two camps.
    assert!(series.get(0).unwrap().memberships().is_empty());
    assert!(series.get(4).unwrap().memberships().is_empty());
    assert_eq!(series.get(2).unwrap().names(), ["B", "C", "D"]);
    assert_eq!(log.at_level(Severity::Warning).len(), 2);

    let (series, log) = run(true);
    assert_eq!(series.len(), 3);
    assert!(series.iter().all(|r| r.memberships().len() == 3));
    assert!(log.is_clean());
    let dates = series.date_parts();
    assert_eq!(dates.dim(), (3, 18));
    assert_eq!(dates[[0, 8]], 2); // middle day of the first slice
}

#[test]
fn test_invalid_configuration_is_repaired() {
    let log = Arc::new(DiagnosticLog::new());
    let config = PolarizationConfig {
        slices: SliceConfig::new().with_window(TimeUnit::Days, 0),
        genetic: GeneticConfig::new()
            .with_num_clusters(1)
            .with_num_parents(0)
            .with_num_iterations(25)
            .with_seed(3),
    };
    let series = Polarization::new(config)
        .with_sink(log.clone())
        .run(&two_camps(&[1]))
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(log.at_level(Severity::Warning).len(), 3);
    let r = series.get(0).unwrap();
    assert!(r.memberships().iter().all(|&m| m < 2));
}

#[test]
fn test_oversized_window_runs_over_whole_range() {
    let config = PolarizationConfig {
        slices: SliceConfig::new().with_window(TimeUnit::Years, u32::MAX),
        genetic: genetic(),
    };
    let series = Polarization::new(config)
        .run(&two_camps(&[1, 5]))
        .unwrap();
    assert_eq!(series.len(), 1);
    let r = series.get(0).unwrap();
    assert_eq!((r.start(), r.stop()), (day(1), day(5)));
    assert_eq!(r.memberships().len(), 6);
}

#[test]
fn test_every_quality_separates_the_camps() {
    for quality in [
        QualityFunction::AbsDiff,
        QualityFunction::EiIndex,
        QualityFunction::Modularity,
    ] {
        let config = PolarizationConfig {
            slices: SliceConfig::new(),
            genetic: genetic().with_quality(quality),
        };
        let series = Polarization::new(config).run(&two_camps(&[1])).unwrap();
        let r = series.get(0).unwrap();
        let truth = [0, 0, 0, 1, 1, 1];
        assert!((ari(r.memberships(), &truth) - 1.0).abs() < 1e-12, "{quality}");
    }
}

#[test]
fn test_stable_camps_over_time() {
    let config = PolarizationConfig {
        slices: SliceConfig::new()
            .with_window(TimeUnit::Days, 2)
            .with_kernel(Kernel::Gaussian),
        genetic: genetic(),
    };
    let series = Polarization::new(config)
        .run(&two_camps(&[1, 2, 3, 4]))
        .unwrap();
    assert_eq!(series.len(), 4);
    assert!(series.names().iter().all(|n| n.len() == 6));
    let stability = series.membership_stability();
    assert_eq!(stability.len(), 3);
    assert!(stability.iter().all(|s| (s - 1.0).abs() < 1e-12), "{stability:?}");
}
