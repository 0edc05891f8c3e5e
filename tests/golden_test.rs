use matrix_profile::{Algorithm, ComputeOptions, MatrixProfile};
use serde::Deserialize;
use std::fs;

#[derive(Deserialize)]
struct GoldenFile {
    cases: Vec<GoldenCase>,
}

#[derive(Deserialize)]
struct GoldenCase {
    name: String,
    a: Vec<f64>,
    b: Option<Vec<f64>>,
    m: usize,
    profile: Vec<f64>,
    profile_index: Vec<usize>,
}

const EPSILON: f64 = 1e-7;

fn load_golden() -> Vec<GoldenCase> {
    let path = "tests/golden_data/reference_profiles.json";
    let data = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Golden data file not found: {path}"));
    let file: GoldenFile = serde_json::from_str(&data).unwrap();
    file.cases
}

fn assert_profile_match(name: &str, got: &[f64], want: &[f64], epsilon: f64) {
    assert_eq!(
        got.len(),
        want.len(),
        "{name}: profile length mismatch: got={} vs want={}",
        got.len(),
        want.len()
    );

    let mut max_diff = 0.0_f64;
    let mut max_diff_idx = 0;
    for (i, (g, w)) in got.iter().zip(want).enumerate() {
        let diff = (g - w).abs();
        if diff > max_diff {
            max_diff = diff;
            max_diff_idx = i;
        }
    }

    assert!(
        max_diff < epsilon,
        "{name}: max diff = {max_diff:.2e} at index {max_diff_idx} \
         (got={}, want={}), epsilon={epsilon:.0e}",
        got[max_diff_idx],
        want[max_diff_idx],
    );
    eprintln!("  {name}: max_diff = {max_diff:.2e} (epsilon = {epsilon:.0e})");
}

fn run_golden(algorithm: Algorithm, parallelism: usize) {
    for case in load_golden() {
        let mut mp = MatrixProfile::new(&case.a, case.b.as_deref(), case.m).unwrap();
        mp.compute(&ComputeOptions::new(algorithm).with_parallelism(parallelism))
            .unwrap();

        let name = format!("{}/{algorithm}/p={parallelism}", case.name);
        assert_profile_match(&name, mp.profile(), &case.profile, EPSILON);
        assert_eq!(mp.profile_index(), &case.profile_index[..], "{name}: index mismatch");
    }
}

#[test]
fn test_golden_stmp() {
    run_golden(Algorithm::Stmp, 1);
}

#[test]
fn test_golden_stamp_full_sample() {
    for p in [1, 3, 8] {
        run_golden(Algorithm::Stamp, p);
    }
}

#[test]
fn test_golden_stomp() {
    for p in [1, 2, 5, 16] {
        run_golden(Algorithm::Stomp, p);
    }
}

#[test]
fn test_golden_mpx() {
    for p in [1, 2, 5, 16] {
        run_golden(Algorithm::Mpx, p);
    }
}

#[test]
fn test_repeating_pulse_rounded() {
    let ts = [0.0, 0.99, 1.0, 0.0, 0.0, 0.98, 1.0, 0.0, 0.0, 0.96, 1.0, 0.0];
    let mut mp = MatrixProfile::self_join(&ts, 4).unwrap();
    mp.compute(&ComputeOptions::new(Algorithm::Stomp).with_parallelism(2))
        .unwrap();
    let rounded: Vec<f64> = mp
        .profile()
        .iter()
        .map(|d| (d * 1000.0).round() / 1000.0)
        .collect();
    assert_eq!(
        rounded,
        vec![0.014, 0.014, 0.029, 0.029, 0.014, 0.014, 0.029, 0.029, 0.029]
    );
    assert_eq!(mp.profile_index(), &[4, 5, 6, 7, 0, 1, 2, 3, 4]);
}
