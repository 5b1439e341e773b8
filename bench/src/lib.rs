//! Input generators shared by the benchmarks.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

/// Generates `len` integers drawn uniformly from `min..=max`.
pub fn gen_random_ints(len: usize, min: i64, max: i64, seed: u64) -> Vec<i64> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(min..=max)).collect()
}

/// Joins `vals` with single spaces, as the suite expects them.
pub fn to_int_str(vals: &[i64]) -> String {
    vals.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
