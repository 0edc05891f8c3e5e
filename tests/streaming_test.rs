use matrix_profile::{Algorithm, ComputeOptions, Error, ErrorKind, MatrixProfile, NO_MATCH};
use serde::Deserialize;
use std::fs;

#[derive(Deserialize)]
struct StreamingGoldenData {
    ts_initial: Vec<f64>,
    ts_stream: Vec<f64>,
    m: usize,
    batch_profile: Vec<f64>,
}

const EPSILON: f64 = 1e-6;

fn load_streaming_golden() -> StreamingGoldenData {
    let path = "tests/golden_data/streaming_profile.json";
    let data = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Golden data file not found: {path}"));
    serde_json::from_str(&data).unwrap()
}

fn stomp(p: usize) -> ComputeOptions {
    ComputeOptions::new(Algorithm::Stomp).with_parallelism(p)
}

fn assert_close(name: &str, got: &[f64], want: &[f64]) {
    assert_eq!(got.len(), want.len(), "{name}: length mismatch");
    for (i, (g, w)) in got.iter().zip(want).enumerate() {
        assert!(
            (g - w).abs() < EPSILON,
            "{name}: mismatch at {i}: streaming={g}, batch={w}"
        );
    }
}

#[test]
fn test_streaming_one_sample_at_a_time() {
    let golden = load_streaming_golden();
    let mut mp = MatrixProfile::self_join(&golden.ts_initial, golden.m).unwrap();
    mp.compute(&stomp(2)).unwrap();

    for &value in &golden.ts_stream {
        let before = mp.len();
        mp.update(&[value]).unwrap();
        assert_eq!(mp.len(), before + 1);
        assert_eq!(mp.profile_index().len(), mp.len());
    }

    assert_close("one-at-a-time", mp.profile(), &golden.batch_profile);

    let full: Vec<f64> = golden
        .ts_initial
        .iter()
        .chain(&golden.ts_stream)
        .copied()
        .collect();
    assert_eq!(mp.a(), &full[..]);
    let mut batch = MatrixProfile::self_join(&full, golden.m).unwrap();
    batch.compute(&stomp(3)).unwrap();
    assert_eq!(mp.profile_index(), batch.profile_index());
}

#[test]
fn test_streaming_in_chunks_matches_batch() {
    let golden = load_streaming_golden();
    let mut mp = MatrixProfile::self_join(&golden.ts_initial, golden.m).unwrap();
    mp.compute(&ComputeOptions::new(Algorithm::Stmp)).unwrap();
    for chunk in golden.ts_stream.chunks(7) {
        mp.update(chunk).unwrap();
    }
    assert_close("chunks", mp.profile(), &golden.batch_profile);

    // a fresh STOMP over the grown series lands on the same profile
    let full = mp.a().to_vec();
    let mut batch = MatrixProfile::self_join(&full, golden.m).unwrap();
    batch.compute(&stomp(4)).unwrap();
    assert_close("recomputed", batch.profile(), mp.profile());
    assert_eq!(mp.profile_index(), batch.profile_index());
}

#[test]
fn test_streaming_ab_join_extends_reference() {
    let a: Vec<f64> = (0..18).map(|i| (i as f64 * 0.55).sin()).collect();
    let b: Vec<f64> = (0..50)
        .map(|i| (i as f64 * 0.4).cos() + 0.2 * (i as f64 * 1.3).sin())
        .collect();
    let m = 6;

    let mut streamed = MatrixProfile::ab_join(&a, &b[..20], m).unwrap();
    streamed.compute(&stomp(2)).unwrap();
    streamed.update(&b[20..]).unwrap();
    assert_eq!(streamed.a(), &a[..]);
    assert_eq!(streamed.b(), &b[..]);

    let mut batch = MatrixProfile::ab_join(&a, &b, m).unwrap();
    batch.compute(&stomp(2)).unwrap();
    assert_close("ab", streamed.profile(), batch.profile());
    assert_eq!(streamed.profile_index(), batch.profile_index());
    assert!(streamed.profile_index().iter().all(|&i| i != NO_MATCH && i < 13));
}

#[test]
fn test_update_commits_samples_before_a_failure() {
    let mut ts: Vec<f64> = (0..12).map(|i| (i as f64 * 0.8).sin()).collect();
    ts.extend([1.5, 1.5, 1.5]);
    let m = 4;
    let mut mp = MatrixProfile::self_join(&ts, m).unwrap();
    mp.compute(&stomp(1)).unwrap();

    // the fifth sample closes the window [1.5, 1.5, 1.5, 1.5]
    let err = mp.update(&[0.2, 1.5, 1.5, 1.5, 1.5, 9.0]).unwrap_err();
    assert!(matches!(err, Error::ZeroVariance));
    assert_eq!(err.kind(), ErrorKind::Computation);
    assert_eq!(mp.a().len(), ts.len() + 4);
    assert_eq!(mp.len(), ts.len() + 4 - m + 1);
    assert_eq!(mp.a().last(), Some(&1.5));
}

#[test]
fn test_update_with_no_samples_is_a_no_op() {
    let ts: Vec<f64> = (0..20).map(|i| (i as f64 * 0.3).sin()).collect();
    let mut mp = MatrixProfile::self_join(&ts, 5).unwrap();
    mp.compute(&stomp(2)).unwrap();
    let before = mp.profile().to_vec();
    mp.update(&[]).unwrap();
    assert_eq!(mp.profile(), &before[..]);
}
