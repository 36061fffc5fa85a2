use std::num::NonZeroU32;

use fastrand::Rng;

/// Draw a binomially distributed number of successes, using `trials` independent Bernoulli(`p`) draws.
/// 
/// A draw counts as a success when `rng.f64() < p`: `p <= 0` never succeeds, and `p >= 1` always does.
pub fn sample_binomial(trials: u32, p: f64, rng: &mut Rng) -> u32 {
    (0..trials).fold(0, |successes, _| successes + u32::from(rng.f64() < p))
}

/// Draw an observed SNP-index, given the simulated allele `ratio` of a bulk and its sequencing `depth`.
/// 
/// Returns `Binomial(depth, ratio) / depth`, within `[0, 1]`. A null depth is unrepresentable.
pub fn sample_index(depth: NonZeroU32, ratio: f64, rng: &mut Rng) -> f64 {
    let depth = depth.get();
    f64::from(sample_binomial(depth, ratio, rng)) / f64::from(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn depth(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).expect("Null depth")
    }

    #[test]
    fn index_within_unit_interval() {
        let mut rng = Rng::with_seed(42);
        for d in [1, 3, 40, 250] {
            for ratio in [0.0, 0.1, 0.5, 0.95, 1.0] {
                let index = sample_index(depth(d), ratio, &mut rng);
                assert!((0.0..=1.0).contains(&index), "depth: {d}, ratio: {ratio}, index: {index}");
            }
        }
    }

    #[test]
    fn degenerate_ratios() {
        let mut rng = Rng::with_seed(42);
        assert_eq!(sample_binomial(40, 0.0, &mut rng), 0);
        assert_eq!(sample_binomial(40, 1.0, &mut rng), 40);
        assert!(approx_eq!(f64, sample_index(depth(17), 1.0, &mut rng), 1.0));
        assert!(approx_eq!(f64, sample_index(depth(17), 0.0, &mut rng), 0.0));
    }

    #[test]
    fn index_is_a_multiple_of_the_depth_step() {
        let mut rng = Rng::with_seed(42);
        for _ in 0..100 {
            let index = sample_index(depth(8), 0.5, &mut rng);
            let successes = index * 8.0;
            assert!(approx_eq!(f64, successes, successes.round()));
        }
    }

    #[test]
    fn binomial_mean() {
        let mut rng = Rng::with_seed(42);
        let reps = 5_000;
        let mean = (0..reps).map(|_| f64::from(sample_binomial(100, 0.3, &mut rng))).sum::<f64>() / f64::from(reps);
        assert!(approx_eq!(f64, mean, 30.0, epsilon = 0.5), "binomial mean: {mean}");
    }
}
