//! Breeze noise: a smooth, deterministic scalar signal over time.
//!
//! Three sine octaves with weights 0.6 / 0.3 / 0.1 stand in for value noise.
//! The weights sum to 1, so the output never leaves `[-1, 1]`.

/// Seed used for the ambient wind signal.
pub const WIND_SEED: f64 = 12.34;

/// Octaves as `(frequency per ms, seed multiplier, weight)`.
const OCTAVES: [(f64, f64, f64); 3] = [(0.0007, 1.0, 0.6), (0.0013, 2.1, 0.3), (0.0023, 3.7, 0.1)];

/// Sample the breeze signal at time `t_ms` (milliseconds) for a given seed.
///
/// Pure function of its inputs: identical `(t_ms, seed)` always yield the
/// same value.
///
/// # Examples
///
/// ```
/// use seasonfall::noise::breeze_noise;
///
/// let a = breeze_noise(1_000.0, 12.34);
/// assert_eq!(a, breeze_noise(1_000.0, 12.34));
/// assert!((-1.0..=1.0).contains(&a));
/// ```
pub fn breeze_noise(t_ms: f64, seed: f64) -> f64 {
    let sum: f64 = OCTAVES
        .iter()
        .map(|&(freq, seed_mul, weight)| (t_ms * freq + seed * seed_mul).sin() * weight)
        .sum();
    // Guard against rounding pushing the sum a hair past the unit interval
    sum.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_bounded() {
        for i in 0..20_000 {
            let t = i as f64 * 37.5;
            for seed in [0.0, 1.0, WIND_SEED, -400.25] {
                let v = breeze_noise(t, seed);
                assert!((-1.0..=1.0).contains(&v), "noise({}, {}) = {} out of range", t, seed, v);
            }
        }
    }

    #[test]
    fn test_noise_deterministic() {
        for i in 0..100 {
            let t = i as f64 * 123.0;
            assert_eq!(breeze_noise(t, WIND_SEED), breeze_noise(t, WIND_SEED));
        }
    }

    #[test]
    fn test_noise_at_origin_matches_octave_sum() {
        let expected = 0.6 * (1.0f64).sin() + 0.3 * (2.1f64).sin() + 0.1 * (3.7f64).sin();
        assert!((breeze_noise(0.0, 1.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_noise_is_smooth() {
        // Adjacent frames (16ms apart) never jump by more than the summed slopes allow
        let max_step = 16.0 * (0.0007 * 0.6 + 0.0013 * 0.3 + 0.0023 * 0.1);
        let mut prev = breeze_noise(0.0, WIND_SEED);
        for i in 1..5_000 {
            let v = breeze_noise(i as f64 * 16.0, WIND_SEED);
            assert!((v - prev).abs() <= max_step + 1e-9);
            prev = v;
        }
    }

    #[test]
    fn test_seeds_differ() {
        assert_ne!(breeze_noise(500.0, 0.0), breeze_noise(500.0, WIND_SEED));
    }
}
