//! Level sampling tests.

use rand::{SeedableRng, rngs::SmallRng};
use rstest::rstest;

use crate::hnsw::HnswParams;

#[rstest]
fn ml_of_one_pins_every_node_to_layer_zero() {
    let params = HnswParams::default().with_ml(1);
    let mut rng = SmallRng::seed_from_u64(1);
    assert!((0..1_000).all(|_| params.sample_level(&mut rng) == 0));
}

#[rstest]
fn level_distribution_halves_per_layer_for_ml_two() {
    let params = HnswParams::default();
    let mut rng = SmallRng::seed_from_u64(42);
    let draws = 20_000;
    let mut counts = [0usize; 3];
    for _ in 0..draws {
        let level = params.sample_level(&mut rng);
        counts[level] += 1;
    }
    // P(0) = 1/2, P(1) = 1/4, and level 2 absorbs the capped remainder.
    let expected = [0.5, 0.25, 0.25];
    for (level, (&count, &probability)) in counts.iter().zip(&expected).enumerate() {
        let observed = count as f64 / f64::from(draws);
        assert!(
            (observed - probability).abs() < 0.02,
            "level {level}: observed {observed}, expected {probability}",
        );
    }
}
