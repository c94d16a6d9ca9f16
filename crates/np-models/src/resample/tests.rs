//! Tests for the resampling engine

use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use super::*;
use crate::base::ModelError;
use crate::lm::OlsSolver;
use np_core::data::{DataFrame, DataFrameBuilder, Index, RowLabel, Series};
use np_core::design::{DesignError, ModelSpec};

// ==================== Test Fixtures ====================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Cohort with the standard covariates and `score = effect * predictor + 0.1 * noise`
fn cohort(n: usize, seed: u64, effect: f64) -> DataFrame {
    cohort_with_index(n, seed, effect, Index::range(n))
}

fn cohort_with_index(n: usize, seed: u64, effect: f64, index: Index) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();

    let age: Vec<f64> = (0..n).map(|_| rng.random_range(8.0..22.0)).collect();
    let age2: Vec<f64> = age.iter().map(|a| a * a).collect();
    let sex: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "F" } else { "M" }).collect();
    let predictor: Vec<f64> = (0..n).map(|_| normal.sample(&mut rng)).collect();
    let score: Vec<f64> = predictor
        .iter()
        .map(|p| effect * p + 0.1 * normal.sample(&mut rng))
        .collect();

    DataFrameBuilder::new()
        .with_column("age", Series::float(age))
        .unwrap()
        .with_column("age2", Series::float(age2))
        .unwrap()
        .with_column("sex", Series::categorical(&sex))
        .unwrap()
        .with_column("predictor", Series::float(predictor))
        .unwrap()
        .with_column("score", Series::float(score))
        .unwrap()
        .with_index(index)
        .build()
        .unwrap()
}

fn spec() -> ModelSpec {
    ModelSpec::standard("score", "predictor")
}

// ==================== Permutation test ====================

#[test]
fn test_permutation_record_keys() {
    let df = cohort(60, 1, 1.0);
    let perms = PermutationSet::random(60, 20, 2);

    let record = run_reg_perms("flanker", &spec(), &df, &perms).unwrap();

    assert_eq!(
        record.keys().collect::<Vec<_>>(),
        vec!["task", "parameter", "score", "t", "full_r2", "partial_r2", "perm_p"]
    );
    assert_eq!(record.text("task"), Some("flanker"));
    assert_eq!(record.text("parameter"), Some("predictor"));
    assert_eq!(record.text("score"), Some("score"));
}

#[test]
fn test_strong_predictor() {
    init_tracing();
    let df = cohort(100, 3, 5.0);
    let perms = PermutationSet::random(100, 100, 4);

    let record = run_reg_perms("nback", &spec(), &df, &perms).unwrap();

    assert!(record.number("full_r2").unwrap() > 0.5);
    assert!(record.number("partial_r2").unwrap() > 0.5);
    assert!(record.number("perm_p").unwrap() < 0.5);
    assert_abs_diff_eq!(record.number("perm_p").unwrap(), 1.0 / 101.0, epsilon = 1e-12);
}

#[test]
fn test_single_permutation_p_value() {
    let df = cohort(50, 5, 0.2);
    for seed in 0..10 {
        let perms = PermutationSet::random(50, 1, seed);
        let record = run_reg_perms("stroop", &spec(), &df, &perms).unwrap();
        let p = record.number("perm_p").unwrap();
        assert!(p == 0.5 || p == 1.0, "unexpected p-value {}", p);
    }
}

#[test]
fn test_permutation_distribution_starts_with_observed() {
    let df = cohort(80, 6, 0.5);
    let design = spec().build(&df).unwrap();
    let perms = PermutationSet::random(80, 30, 7);

    let outcome = PermutationTest::new(&design).run(&perms).unwrap();

    let direct = OlsSolver::from_design(&design.full)
        .unwrap()
        .fit(&design.response)
        .unwrap();
    assert_eq!(outcome.distribution.len(), 31);
    assert_eq!(outcome.distribution[0], direct.t_statistics[design.test_column]);
    assert_eq!(outcome.t, outcome.distribution[0]);
    assert_eq!(outcome.full_r2, direct.r_squared());
}

#[test]
fn test_identity_permutation_reproduces_observed() {
    let df = cohort(40, 8, 0.5);
    let design = spec().build(&df).unwrap();
    let identity = Array2::from_shape_fn((40, 3), |(i, _)| i);
    let perms = PermutationSet::new(identity).unwrap();

    let outcome = PermutationTest::new(&design).run(&perms).unwrap();

    for &t in &outcome.distribution[1..] {
        assert_abs_diff_eq!(t, outcome.t, epsilon = 1e-8);
    }
}

#[test]
fn test_permutation_is_reproducible() {
    let df = cohort(60, 9, 0.3);
    let a = run_reg_perms("task", &spec(), &df, &PermutationSet::random(60, 50, 10)).unwrap();
    let b = run_reg_perms("task", &spec(), &df, &PermutationSet::random(60, 50, 10)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_parallel_matches_sequential_permutation() {
    let df = cohort(70, 11, 0.3);
    let design = spec().build(&df).unwrap();
    let perms = PermutationSet::random(70, 64, 12);

    let parallel = PermutationTest::new(&design)
        .config(ResamplingConfig::default())
        .run(&perms)
        .unwrap();
    let sequential = PermutationTest::new(&design)
        .config(ResamplingConfig::default().sequential())
        .run(&perms)
        .unwrap();

    assert_eq!(parallel, sequential);
}

#[test]
fn test_null_predictor_p_values() {
    let mut total = 0.0;
    let draws = 40;

    for seed in 0..draws {
        let df = cohort(60, 100 + seed, 0.0);
        let perms = PermutationSet::random(60, 99, 500 + seed);
        let p = run_reg_perms("null", &spec(), &df, &perms)
            .unwrap()
            .number("perm_p")
            .unwrap();
        assert!((0.0..=1.0).contains(&p));
        total += p;
    }

    let mean = total / draws as f64;
    assert!(mean > 0.3 && mean < 0.7, "mean p-value {}", mean);
}

#[test]
fn test_keep_distribution_fields() {
    let df = cohort(40, 13, 0.5);
    let perms = PermutationSet::random(40, 12, 14);
    let config = ResamplingConfig::default().with_distribution();

    let record = run_reg_perms_with("task", &spec(), &df, &perms, &config).unwrap();

    assert_eq!(record.len(), 7 + 13);
    assert_eq!(record.number("perm_0000"), record.number("t"));
    assert!(record.get("perm_0012").is_some());
    assert!(record.get("perm_0013").is_none());
}

#[test]
fn test_permutation_set_validation() {
    assert!(PermutationSet::new(array![[0, 1], [1, 0], [2, 2]]).is_ok());

    assert!(matches!(
        PermutationSet::new(array![[0, 1], [1, 1], [2, 2]]),
        Err(ModelError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        PermutationSet::new(array![[0], [3], [2]]),
        Err(ModelError::ShapeMismatch { .. })
    ));

    let random = PermutationSet::random(25, 8, 99);
    assert!(PermutationSet::new(random.indices().clone()).is_ok());
}

#[test]
fn test_permutation_row_count_mismatch() {
    let df = cohort(30, 15, 0.5);
    let perms = PermutationSet::random(29, 5, 16);

    assert!(matches!(
        run_reg_perms("task", &spec(), &df, &perms),
        Err(ModelError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_missing_test_column() {
    let df = cohort(30, 17, 0.5);
    let perms = PermutationSet::random(30, 5, 18);
    let spec = ModelSpec::standard("score", "reaction_time");

    assert!(matches!(
        run_reg_perms("task", &spec, &df, &perms),
        Err(ModelError::Design(DesignError::MissingColumn { .. }))
    ));
}

#[test]
fn test_permutation_ignores_row_labels() {
    let n = 50;
    let shuffled: Vec<RowLabel> = (0..n as RowLabel).map(|i| 1000 + (i * 17) % 50).collect();
    let contiguous = cohort(n, 19, 0.4);
    let labelled = cohort_with_index(n, 19, 0.4, Index::labels(shuffled).unwrap());
    let perms = PermutationSet::random(n, 40, 20);

    assert_eq!(
        run_reg_perms("task", &spec(), &contiguous, &perms).unwrap(),
        run_reg_perms("task", &spec(), &labelled, &perms).unwrap()
    );
}

// ==================== Bootstrap ====================

#[test]
fn test_bootstrap_record() {
    init_tracing();
    let df = cohort(200, 21, 0.5);
    let boots = BootstrapSet::random(df.index(), 10, 22);

    let record = run_reg_boots("flanker", &spec(), &df, &boots).unwrap();

    let keys: Vec<&str> = record.keys().collect();
    assert_eq!(&keys[..6], &["task", "parameter", "score", "t", "full_r2", "partial_r2"]);
    assert_eq!(
        &keys[6..],
        &[
            "boot_t_mean",
            "boot_t_std",
            "boot_t_005",
            "boot_t_025",
            "boot_t_975",
            "boot_t_995",
            "boot_pr2_mean",
            "boot_pr2_std",
            "boot_pr2_005",
            "boot_pr2_025",
            "boot_pr2_975",
            "boot_pr2_995",
        ]
    );

    assert!(!record.number("boot_t_mean").unwrap().is_nan());
    assert!(record.number("boot_t_std").unwrap() >= 0.0);
    assert!(record.number("boot_t_005").unwrap() <= record.number("boot_t_995").unwrap());
}

#[test]
fn test_bootstrap_distribution_shape() {
    let df = cohort(80, 23, 0.5);
    let design = spec().build(&df).unwrap();
    let boots = BootstrapSet::random(&design.index, 15, 24);

    let outcome = BootstrapTest::new(&design).run(&boots).unwrap();

    assert_eq!(outcome.t_distribution.len(), 16);
    assert_eq!(outcome.partial_r2_distribution.len(), 16);
    assert_eq!(outcome.t_distribution[0], outcome.t);
    assert_eq!(outcome.partial_r2_distribution[0], outcome.partial_r2);
}

#[test]
fn test_identity_bootstrap_has_no_spread() {
    let df = cohort(40, 25, 0.5);
    let design = spec().build(&df).unwrap();
    let labels = Array2::from_shape_fn((40, 4), |(i, _)| i as RowLabel);

    let outcome = BootstrapTest::new(&design)
        .run(&BootstrapSet::new(labels))
        .unwrap();

    assert_abs_diff_eq!(outcome.t_summary.mean, outcome.t, epsilon = 1e-8);
    assert_abs_diff_eq!(outcome.t_summary.std, 0.0, epsilon = 1e-8);
    assert_abs_diff_eq!(outcome.partial_r2_summary.q995, outcome.partial_r2, epsilon = 1e-10);
}

#[test]
fn test_bootstrap_unknown_label() {
    let df = cohort(30, 26, 0.5);
    let mut labels = Array2::from_shape_fn((30, 3), |(i, _)| i as RowLabel);
    labels[[4, 2]] = 30;

    assert!(matches!(
        run_reg_boots("task", &spec(), &df, &BootstrapSet::new(labels)),
        Err(ModelError::UnknownRowIdentifier(30))
    ));
}

#[test]
fn test_bootstrap_resample_losing_a_level_fails() {
    let df = cohort(30, 28, 0.5);
    // Column 1 draws only even rows, all of them "F"
    let labels = Array2::from_shape_fn((30, 2), |(i, col)| {
        if col == 0 {
            i as RowLabel
        } else {
            (2 * (i / 2)) as RowLabel
        }
    });

    assert!(matches!(
        run_reg_boots("task", &spec(), &df, &BootstrapSet::new(labels)),
        Err(ModelError::SingularMatrix)
    ));
}

#[test]
fn test_bootstrap_row_count_mismatch() {
    let df = cohort(30, 27, 0.5);
    let labels = Array2::from_shape_fn((20, 3), |(i, _)| i as RowLabel);

    assert!(matches!(
        run_reg_boots("task", &spec(), &df, &BootstrapSet::new(labels)),
        Err(ModelError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_bootstrap_label_invariance() {
    let n = 60;
    let relabel = |i: RowLabel| 1000 + (i * 7) % 60 * 3;
    let gapped: Vec<RowLabel> = (0..n as RowLabel).map(relabel).collect();

    let contiguous = cohort(n, 28, 0.4);
    let labelled = cohort_with_index(n, 28, 0.4, Index::labels(gapped).unwrap());

    let boots = BootstrapSet::random(contiguous.index(), 12, 29);
    let relabelled = BootstrapSet::new(boots.labels().mapv(relabel));

    assert_eq!(
        run_reg_boots("task", &spec(), &contiguous, &boots).unwrap(),
        run_reg_boots("task", &spec(), &labelled, &relabelled).unwrap()
    );
}

#[test]
fn test_bootstrap_random_draws_known_labels() {
    let index = Index::labels(vec![40, 3, 17, 8]).unwrap();
    let boots = BootstrapSet::random(&index, 6, 30);

    assert_eq!(boots.n_rows(), 4);
    assert_eq!(boots.n_resamples(), 6);
    assert!(boots.labels().iter().all(|l| [40, 3, 17, 8].contains(l)));
    assert_eq!(boots.resolve(&index).unwrap().len(), 6);
}

#[test]
fn test_parallel_matches_sequential_bootstrap() {
    let df = cohort(70, 31, 0.3);
    let design = spec().build(&df).unwrap();
    let boots = BootstrapSet::random(&design.index, 24, 32);

    let parallel = BootstrapTest::new(&design).run(&boots).unwrap();
    let sequential = BootstrapTest::new(&design)
        .config(ResamplingConfig::default().sequential())
        .run(&boots)
        .unwrap();

    assert_eq!(parallel, sequential);
}

// ==================== Cancellation & config ====================

#[test]
fn test_cancelled_token() {
    let df = cohort(40, 33, 0.5);
    let design = spec().build(&df).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let perms = PermutationSet::random(40, 20, 34);
    assert!(matches!(
        PermutationTest::new(&design).token(token.clone()).run(&perms),
        Err(ModelError::Cancelled)
    ));

    let boots = BootstrapSet::random(&design.index, 20, 35);
    assert!(matches!(
        BootstrapTest::new(&design)
            .config(ResamplingConfig::default().sequential())
            .token(token)
            .run(&boots),
        Err(ModelError::Cancelled)
    ));
}

#[test]
fn test_token_clones_share_flag() {
    let token = CancellationToken::new();
    let handle = token.clone();
    assert!(token.check().is_ok());

    handle.cancel();
    assert!(token.is_cancelled());

    let expired = CancellationToken::new().with_deadline(std::time::Instant::now());
    assert!(expired.is_cancelled());
}

#[test]
fn test_zero_deadline_rejected() {
    let df = cohort(30, 36, 0.5);
    let perms = PermutationSet::random(30, 5, 37);
    let config = ResamplingConfig::default().with_deadline(std::time::Duration::ZERO);

    assert!(matches!(
        run_reg_perms_with("task", &spec(), &df, &perms, &config),
        Err(ModelError::InvalidConfig { .. })
    ));
}

#[test]
fn test_config_deserialises_with_defaults() {
    let config: ResamplingConfig = serde_json::from_str(r#"{"keep_distribution": true}"#).unwrap();
    assert!(config.parallel);
    assert!(config.keep_distribution);
    assert_eq!(config.deadline, None);
}

// ==================== Records & summaries ====================

#[test]
fn test_result_table() {
    let df = cohort(60, 38, 0.5);
    let mut table = ResultTable::new();

    table.push(
        run_reg_perms("flanker", &spec(), &df, &PermutationSet::random(60, 10, 39)).unwrap(),
    );
    table.push(
        run_reg_boots("flanker", &spec(), &df, &BootstrapSet::random(df.index(), 5, 40)).unwrap(),
    );

    assert_eq!(table.len(), 2);
    let columns = table.columns();
    assert_eq!(columns.len(), 7 + 12);
    assert_eq!(columns[6], "perm_p");
    assert_eq!(columns[7], "boot_t_mean");

    let json = table.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["task"], "flanker");
    assert!(parsed[0]["perm_p"].is_number());
    assert!(parsed[1].get("perm_p").is_none());
}

#[test]
fn test_record_nan_serialises_as_null() {
    let meta = RecordMeta::new("task", "predictor", "score");
    let outcome = PermutationOutcome {
        t: f64::NAN,
        full_r2: 0.5,
        partial_r2: 0.1,
        p_value: f64::NAN,
        distribution: vec![f64::NAN],
    };
    let mut table = ResultTable::new();
    table.push(ResultRecord::permutation(&meta, &outcome, false));

    let parsed: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
    assert!(parsed[0]["t"].is_null());
    assert_eq!(parsed[0]["full_r2"], 0.5);
}

#[test]
fn test_quantile_interpolation() {
    let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
    assert_abs_diff_eq!(quantile(&sorted, 0.0), 1.0);
    assert_abs_diff_eq!(quantile(&sorted, 0.25), 2.0);
    assert_abs_diff_eq!(quantile(&sorted, 0.975), 4.9, epsilon = 1e-12);
    assert_abs_diff_eq!(quantile(&sorted, 1.0), 5.0);
    assert!(quantile(&[], 0.5).is_nan());
}

#[test]
fn test_summary_uses_population_std() {
    let summary = DistributionSummary::from_values(&[4.0, 1.0, 3.0, 2.0]);
    assert_abs_diff_eq!(summary.mean, 2.5);
    assert_abs_diff_eq!(summary.std, 1.25f64.sqrt(), epsilon = 1e-12);
    assert_abs_diff_eq!(summary.q005, 1.015, epsilon = 1e-12);
    assert_abs_diff_eq!(summary.q995, 3.985, epsilon = 1e-12);

    assert!(DistributionSummary::from_values(&[1.0, f64::NAN]).mean.is_nan());
}

#[test]
fn test_p_value_counts_observed() {
    assert_abs_diff_eq!(two_sided_p_value(&[2.0, 0.5, -3.0, 1.0]), 0.5);
    assert_abs_diff_eq!(two_sided_p_value(&[-2.0, 2.0, -2.0]), 1.0);
    assert_abs_diff_eq!(two_sided_p_value(&[5.0]), 1.0);
    assert!(two_sided_p_value(&[f64::NAN, 1.0]).is_nan());
}

// ==================== Properties ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_resampling_invariants(seed in 0u64..10_000, n_resamples in 1usize..25) {
        let df = cohort(40, seed, 0.3);
        let design = spec().build(&df).unwrap();

        let perms = PermutationSet::random(40, n_resamples, seed);
        let outcome = PermutationTest::new(&design).run(&perms).unwrap();
        prop_assert!(outcome.partial_r2 >= -1e-10);
        prop_assert!((0.0..=1.0).contains(&outcome.p_value));
        prop_assert!(outcome.p_value >= 1.0 / (n_resamples as f64 + 1.0) - 1e-12);

        let boots = BootstrapSet::random(&design.index, n_resamples, seed);
        let outcome = BootstrapTest::new(&design).run(&boots).unwrap();
        for summary in [outcome.t_summary, outcome.partial_r2_summary] {
            prop_assert!(summary.q005 <= summary.q025);
            prop_assert!(summary.q025 <= summary.q975);
            prop_assert!(summary.q975 <= summary.q995);
            prop_assert!(summary.std >= 0.0);
        }
        prop_assert!(outcome.partial_r2_distribution.iter().all(|&v| v >= -1e-10));
    }
}
