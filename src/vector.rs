//! Interval-class content of a pitch-class set.

use std::fmt;

use serde::Serialize;

use crate::pitch::{PitchClass, PitchClassSet, PITCH_CLASS_COUNT};

/// The total number of distinct interval classes.
pub const INTERVAL_CLASS_COUNT: usize = 6;

/// Returns the interval class between two pitch classes, in `[0, 6]`.
///
/// This is the smaller of the two directed distances between them, and is
/// only 0 when both are the same pitch class.
pub fn interval_class(a: PitchClass, b: PitchClass) -> u8 {
    let d = a.distance_to(b);
    d.min(PITCH_CLASS_COUNT - d)
}

/// Counts of each interval class over all unordered pairs in a set.
///
/// Entry `k - 1` holds the number of pairs whose interval class is `k`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IntervalClassVector([u32; INTERVAL_CLASS_COUNT]);

impl IntervalClassVector {
    /// Compute the interval-class vector of `set`.
    pub fn of(set: &PitchClassSet) -> IntervalClassVector {
        let members = set.as_slice();
        let mut counts = [0; INTERVAL_CLASS_COUNT];

        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                let ic = interval_class(a, b) as usize;
                if ic > 0 {
                    counts[ic - 1] += 1;
                }
            }
        }

        IntervalClassVector(counts)
    }

    /// Returns the count for interval class `ic`, for `ic` in `1..=6`.
    pub fn get(&self, ic: usize) -> Option<u32> {
        ic.checked_sub(1).and_then(|i| self.0.get(i)).copied()
    }

    pub fn counts(&self) -> [u32; INTERVAL_CLASS_COUNT] {
        self.0
    }

    /// Returns the number of pairs counted, `n(n - 1) / 2` for a set of `n`.
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl fmt::Display for IntervalClassVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let counts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", counts.join(" "))
    }
}
