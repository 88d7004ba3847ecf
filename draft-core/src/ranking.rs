use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// Maximum number of entries retained per week bucket.
pub const LEADERBOARD_CAPACITY: usize = 10;

/// Sort comparator for ranked scans: score descending, timestamp ascending on
/// equal scores. The tie-break rewards whoever reached the score first and
/// keeps ranking stable across repeated reads.
pub fn rank_ordering(a: (f64, DateTime<Utc>), b: (f64, DateTime<Utc>)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1))
}

/// The slice of an ordered scan past the retained capacity. Empty when the
/// bucket fits; those are the entries a trim deletes.
pub fn beyond_capacity<T>(ranked: &[T]) -> &[T] {
    if ranked.len() > LEADERBOARD_CAPACITY {
        &ranked[LEADERBOARD_CAPACITY..]
    } else {
        &[]
    }
}
