//! No-repeat question selection.

use crate::model::{Question, SeenSet};
use crate::shuffle::{shuffle_in_place, RandomSource};

/// Pick up to `n` questions, preferring ones whose key is not in `seen`.
///
/// Unseen and seen questions are shuffled separately; seen ones are only used
/// to fill whatever the unseen side cannot. The result always has
/// `min(n, pool.len())` items.
pub fn select_no_repeat<R>(pool: &[Question], n: usize, seen: &SeenSet, rng: &mut R) -> Vec<Question>
where
    R: RandomSource + ?Sized,
{
    let (mut unseen, mut already_seen): (Vec<Question>, Vec<Question>) =
        pool.iter().cloned().partition(|q| match q.identity_key() {
            Some(key) => !seen.contains(&key),
            None => true,
        });

    shuffle_in_place(&mut unseen, rng);
    shuffle_in_place(&mut already_seen, rng);

    let fresh = unseen.len().min(n);
    let repeats = already_seen.len().min(n - fresh);
    tracing::debug!(
        requested = n,
        pool = pool.len(),
        fresh,
        repeats,
        "selected questions"
    );

    unseen
        .into_iter()
        .take(fresh)
        .chain(already_seen.into_iter().take(repeats))
        .collect()
}
