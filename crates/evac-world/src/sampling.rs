//! Seeded random streams and noise helpers.
//!
//! Every generator and evaluator owns its own [`ScenarioRng`]. Nothing in
//! the workspace touches a process-global generator, so two instances built
//! from the same seed replay identical sequences and independent instances
//! can run side by side.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Largest noise half-width actually sampled.
const MAX_NOISE_SPREAD: f64 = 1.0e6;

/// The random stream owned by each generator and evaluator instance.
pub type ScenarioRng = ChaCha8Rng;

/// Build a stream from a 64-bit seed.
pub fn seeded_rng(seed: u64) -> ScenarioRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Derive an independent sub-seed for `stream` from a scenario seed.
///
/// Combines the two values with a mixing multiply and one `xorshift64`
/// round. The same `(seed, stream)` pair always yields the same output.
pub const fn derive_seed(seed: u64, stream: u64) -> u64 {
    let mut state = seed.wrapping_add(stream.wrapping_mul(0x517c_c1b7_2722_0a95));

    // xorshift requires a non-zero state.
    if state == 0 {
        state = 0xdead_beef_cafe_babe;
    }

    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;

    state
}

/// Clamp to `[0, 1]`. NaN maps to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Perturb `value` by a uniform draw from `[-noise_level, noise_level]`
/// and clamp the result to `[0, 1]`.
///
/// A non-finite noise level is treated as no noise; a negative one by its
/// magnitude. The spread is capped so the sampling range stays finite.
pub fn add_noise<R: Rng + ?Sized>(rng: &mut R, value: f64, noise_level: f64) -> f64 {
    let spread = if noise_level.is_finite() {
        noise_level.abs().min(MAX_NOISE_SPREAD)
    } else {
        0.0
    };
    let noise = rng.random_range(-spread..=spread);
    clamp01(value + noise)
}
