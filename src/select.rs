use rand::seq::SliceRandom;
use rand::Rng;

use crate::chord::PairKey;
use crate::store::{ChordStore, Result, StoreError};

/// Pick a pair uniformly at random. An empty store (fewer than two known
/// chords) is a defined error, not a panic.
pub fn random_key<R: Rng + ?Sized>(store: &ChordStore, rng: &mut R) -> Result<PairKey> {
    let keys: Vec<&PairKey> = store.scores().keys().collect();
    keys.choose(rng)
        .map(|k| (*k).clone())
        .ok_or(StoreError::NoPairs)
}

/// Pick a pair with a bias toward low high-scores, so the pairs that need
/// the most practice come up most often.
///
/// Rejection sampling: let `target` be the lowest high-score across all
/// pairs. Repeatedly pick a uniform pair `k` and draw `r` in
/// `[0, highscore(k) + offset]`; accept `k` when `r <= target`. A pair at
/// the minimum always accepts with positive probability, so the loop
/// terminates in bounded expected time even though there is no retry cap.
///
/// `offset` widens every draw range equally: large offsets approach
/// uniform selection, offset 0 maximizes the bias toward the worst pairs.
/// The default of 5 is a tunable, not a contract.
pub fn weighted_random<R: Rng + ?Sized>(
    store: &ChordStore,
    rng: &mut R,
    offset: u32,
) -> Result<PairKey> {
    let keys: Vec<&PairKey> = store.scores().keys().collect();
    if keys.is_empty() {
        return Err(StoreError::NoPairs);
    }

    let target = keys.iter().map(|k| store.highscore(k)).min().unwrap_or(0);

    loop {
        let key = keys.choose(rng).unwrap();
        let r = rng.gen_range(0..=store.highscore(key) + offset);
        if r <= target {
            return Ok((*key).clone());
        }
    }
}
