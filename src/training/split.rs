use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Shuffles `items` with `seed` and splits off `holdout_fraction` of them.
///
/// Returns `(kept, held_out)`. The held-out size is rounded up, and at least
/// one item is always kept when there is more than one.
pub fn split_holdout<T>(mut items: Vec<T>, holdout_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let total = items.len();
    let mut holdout = (total as f64 * holdout_fraction.clamp(0.0, 1.0)).ceil() as usize;
    if holdout >= total && total > 1 {
        holdout = total - 1;
    }

    let held_out = items.split_off(total - holdout);
    (items, held_out)
}
