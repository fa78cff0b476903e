use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use shapley_r2::{Dataset, DecomposerConfig, Result, ShapleyDecomposer, ShapleyError};

const N_ROWS: usize = 60;

/// Correlated regressors `x0..x{k-1}` and a noisy linear response `y`.
fn generated(seed: u64, n_regressors: usize) -> (Dataset, Vec<String>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut normal = || -> f64 { StandardNormal.sample(&mut rng) };

    let common: Vec<f64> = (0..N_ROWS).map(|_| normal()).collect();
    let mut data = Dataset::new();
    let mut names = Vec::new();
    let mut y = vec![0.0; N_ROWS];

    for j in 0..n_regressors {
        let name = format!("x{}", j);
        let column: Vec<f64> = common.iter().map(|c| 0.6 * c + normal()).collect();
        let beta = 1.0 + j as f64 * 0.5;
        for (yi, xi) in y.iter_mut().zip(&column) {
            *yi += beta * xi;
        }
        data.insert(name.clone(), column).unwrap();
        names.push(name);
    }
    for yi in y.iter_mut() {
        *yi += 2.0 * normal();
    }
    data.insert("y", y).unwrap();
    (data, names)
}

#[test]
fn shares_sum_to_full_model_r_squared() -> Result<()> {
    for (seed, n_regressors) in [(7, 2), (11, 3), (19, 5)] {
        let (mut data, names) = generated(seed, n_regressors);
        let decomposer = ShapleyDecomposer::new(&mut data, &names[..], "y", None)?;

        let table = decomposer.contribution_all()?;
        let summed: f64 = names
            .iter()
            .map(|name| decomposer.contribution_of(name).map(|c| c.contribution))
            .sum::<Result<f64>>()?;

        assert_relative_eq!(table.total, table.full_r_squared, max_relative = 1e-9);
        assert_relative_eq!(summed, table.full_r_squared, max_relative = 1e-9);
        assert_relative_eq!(decomposer.full_r_squared()?, table.full_r_squared, max_relative = 1e-12);
    }
    Ok(())
}

#[test]
fn permuting_regressors_keeps_every_share() -> Result<()> {
    let (mut data, names) = generated(23, 4);
    let original = ShapleyDecomposer::new(&mut data, &names[..], "y", None)?.contribution_all()?;

    let mut rng = StdRng::seed_from_u64(5);
    let mut shuffled = names.clone();
    shuffled.shuffle(&mut rng);
    shuffled.reverse();
    let permuted = ShapleyDecomposer::new(&mut data, &shuffled[..], "y", None)?.contribution_all()?;

    for name in &names {
        assert_relative_eq!(
            original.get(name).unwrap(),
            permuted.get(name).unwrap(),
            max_relative = 1e-9
        );
    }
    assert_eq!(
        permuted.iter().map(|(name, _)| name.to_string()).collect::<Vec<_>>(),
        shuffled
    );
    Ok(())
}

#[test]
fn cache_does_not_change_results() -> Result<()> {
    let (mut data, names) = generated(31, 4);
    let cached = ShapleyDecomposer::new(&mut data, &names[..], "y", None)?.contribution_all()?;

    let config = DecomposerConfig {
        cache_fits: false,
        ..DecomposerConfig::default()
    };
    let uncached = ShapleyDecomposer::new(&mut data, &names[..], "y", Some(config))?.contribution_all()?;

    for ((_, a), (_, b)) in cached.iter().zip(uncached.iter()) {
        assert_relative_eq!(a, b, max_relative = 1e-12);
    }
    Ok(())
}

#[test]
fn repeated_runs_are_bit_identical() -> Result<()> {
    let (mut first_data, names) = generated(41, 3);
    let (mut second_data, _) = generated(41, 3);

    let first = ShapleyDecomposer::new(&mut first_data, &names[..], "y", None)?.contribution_all()?;
    let second = ShapleyDecomposer::new(&mut second_data, &names[..], "y", None)?.contribution_all()?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn irrelevant_regressor_gets_a_small_share() -> Result<()> {
    let (mut data, mut names) = generated(53, 2);
    let mut rng = StdRng::seed_from_u64(99);
    let noise: Vec<f64> = (0..N_ROWS).map(|_| -> f64 { StandardNormal.sample(&mut rng) }).collect();
    data.insert("noise", noise)?;
    names.push("noise".to_string());

    let table = ShapleyDecomposer::new(&mut data, &names[..], "y", None)?.contribution_all()?;

    let noise_share = table.get("noise").unwrap();
    assert!(noise_share >= 0.0);
    assert!(noise_share < table.get("x0").unwrap());
    assert!(noise_share < table.get("x1").unwrap());
    Ok(())
}

#[test]
fn additive_scenario_reaches_full_explanation() -> Result<()> {
    let mut data = Dataset::new()
        .with_column("A", vec![1.0, 2.0, 3.0, 4.0, 5.0])?
        .with_column("B", vec![2.0, 1.0, 4.0, 3.0, 6.0])?
        .with_column("y", vec![3.0, 3.0, 7.0, 7.0, 11.0])?;
    let decomposer = ShapleyDecomposer::new(&mut data, &["A", "B"], "y", None)?;

    let a = decomposer.contribution_of("A")?.contribution;
    let b = decomposer.contribution_of("B")?.contribution;

    assert_abs_diff_eq!(decomposer.full_r_squared()?, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(a + b, 1.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn collinear_regressors_raise_computation_error() -> Result<()> {
    let (mut data, _) = generated(61, 1);
    let copy: Vec<f64> = data.numeric("x0").unwrap().to_vec();
    data.insert("x0_copy", copy)?;

    let decomposer = ShapleyDecomposer::new(&mut data, &["x0", "x0_copy"], "y", None)?;

    match decomposer.contribution_all() {
        Err(ShapleyError::Computation { subset, .. }) => assert_eq!(subset, vec!["x0", "x0_copy"]),
        other => panic!("expected a computation error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn non_numeric_value_stops_construction() -> Result<()> {
    let mut data = Dataset::new()
        .with_column("Impressions", vec!["10", "12", "n/a", "15"])?
        .with_column("y", vec![1.0, 2.0, 3.0, 4.0])?;

    let err = ShapleyDecomposer::new(&mut data, &["Impressions"], "y", None).unwrap_err();

    assert!(matches!(err, ShapleyError::Validation { .. }));
    assert!(!data.column("Impressions").unwrap().is_numeric());
    Ok(())
}
