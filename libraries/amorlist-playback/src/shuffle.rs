//! Shuffle algorithms for playlist randomization
//!
//! Both helpers use `SliceRandom::shuffle` (Fisher-Yates), so every
//! permutation is equally likely.

use amorlist_core::Track;
use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle a playlist while keeping the current track audible
///
/// The track at `current` is moved to position 0 and the remaining tracks
/// are put in uniformly random order after it. Exclusion is by position, so
/// a playlist that lists the same track twice keeps both copies.
///
/// Returns the input unchanged when `current` is out of range.
pub fn shuffle_keeping_current<R: Rng + ?Sized>(
    tracks: &[Track],
    current: usize,
    rng: &mut R,
) -> Vec<Track> {
    let Some(current_track) = tracks.get(current) else {
        return tracks.to_vec();
    };

    let mut rest: Vec<Track> = tracks
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != current)
        .map(|(_, t)| t.clone())
        .collect();
    rest.shuffle(rng);

    let mut shuffled = Vec::with_capacity(tracks.len());
    shuffled.push(current_track.clone());
    shuffled.extend(rest);
    shuffled
}

/// Uniform random permutation of a whole playlist ("shuffle all")
pub fn shuffled<R: Rng + ?Sized>(tracks: &[Track], rng: &mut R) -> Vec<Track> {
    let mut out = tracks.to_vec();
    out.shuffle(rng);
    out
}
