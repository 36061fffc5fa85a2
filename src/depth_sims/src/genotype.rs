use std::num::NonZeroU32;

use fastrand::Rng;
use parser::PopulationModel;

/// Probability threshold of a single allele draw. A uniform draw `<= ALLELE_THRESHOLD` is a success.
const ALLELE_THRESHOLD: f64 = 0.5;

/// Draw a simulated pooled allele ratio for one bulk.
/// 
/// # Arguments:
/// - `model`    : population structure of the segregating population.
/// - `pool_size`: number of individuals within the bulk.
/// - `rng`      : random number generator of the current simulation task.
/// 
/// # Behavior
/// - `Ril`: a single uniform draw for the whole pool. Returns exactly `1.0` or `0.0`.
/// - `F2` : each individual contributes `0.5` per successful allele draw (two independent draws),
///          averaged across `pool_size` individuals.
/// 
/// The returned value always lies within `[0, 1]`.
pub fn sample_genotype_ratio(model: PopulationModel, pool_size: NonZeroU32, rng: &mut Rng) -> f64 {
    match model {
        PopulationModel::Ril => match allele_draw(rng) {
            true  => 1.0,
            false => 0.0,
        },
        PopulationModel::F2 => {
            let pool_size = pool_size.get();
            let total: f64 = (0..pool_size).map(|_| f2_individual(rng)).sum();
            total / f64::from(pool_size)
        }
    }
}

fn allele_draw(rng: &mut Rng) -> bool {
    rng.f64() <= ALLELE_THRESHOLD
}

// Diploid contribution of a single F2 individual: 0.0, 0.5 or 1.0
fn f2_individual(rng: &mut Rng) -> f64 {
    let contribution = |draw: bool| if draw { 0.5 } else { 0.0 };
    contribution(allele_draw(rng)) + contribution(allele_draw(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    const SEED: u64 = 9_876_543;

    fn pool(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).expect("Null pool size")
    }

    #[test]
    fn ril_is_binary() {
        let mut rng = Rng::with_seed(SEED);
        for pool_size in [1, 10, 500] {
            for _ in 0..1000 {
                let ratio = sample_genotype_ratio(PopulationModel::Ril, pool(pool_size), &mut rng);
                assert!(ratio == 0.0 || ratio == 1.0, "RIL ratio must be exactly 0 or 1. Got {ratio}");
            }
        }
    }

    #[test]
    fn f2_within_unit_interval() {
        let mut rng = Rng::with_seed(SEED);
        for pool_size in [1, 2, 10, 50] {
            for _ in 0..1000 {
                let ratio = sample_genotype_ratio(PopulationModel::F2, pool(pool_size), &mut rng);
                assert!((0.0..=1.0).contains(&ratio), "F2 ratio out of range: {ratio}");
            }
        }
    }

    #[test]
    fn f2_single_individual_is_a_multiple_of_one_half() {
        let mut rng = Rng::with_seed(SEED);
        for _ in 0..1000 {
            let ratio = sample_genotype_ratio(PopulationModel::F2, pool(1), &mut rng);
            assert!([0.0, 0.5, 1.0].contains(&ratio));
        }
    }

    #[test]
    fn both_models_average_one_half() {
        let reps = 20_000;
        for model in [PopulationModel::Ril, PopulationModel::F2] {
            let mut rng = Rng::with_seed(SEED);
            let mean = (0..reps).map(|_| sample_genotype_ratio(model, pool(10), &mut rng)).sum::<f64>() / f64::from(reps);
            assert!(approx_eq!(f64, mean, 0.5, epsilon = 0.02), "{model} mean ratio: {mean}");
        }
    }

    #[test]
    fn seeded_draws_are_deterministic() {
        let draws = |seed| {
            let mut rng = Rng::with_seed(seed);
            (0..100).map(|_| sample_genotype_ratio(PopulationModel::F2, pool(20), &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draws(SEED), draws(SEED));
    }
}
