//! Canonical orderings of a pitch-class set.
//!
//! A `NormalForm` is the most compact rotation of a set's ascending order,
//! while a `PrimeForm` names the set class the set belongs to: every
//! transposition and inversion of a set shares the same prime form.
//!
//! ```
//! use pcset::forms::{normal_form, prime_form};
//! use pcset::pitch::PitchClassSet;
//!
//! let set = PitchClassSet::from_values(&[0, 3, 7, 10]);
//!
//! assert_eq!(normal_form(&set).values(), vec![7, 10, 0, 3]);
//! assert_eq!(prime_form(&set).key(), "0,3,5,8");
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::pitch::{write_braced, PitchClass, PitchClassSet, PITCH_CLASS_COUNT};

/// A cyclic reordering of a set's ascending members.
///
/// Each element after the first is raised by octaves until it is no lower
/// than its predecessor, so the sequence never descends and its span is the
/// distance from the first to the last element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rotation(Vec<u8>);

impl Rotation {
    /// Construct the rotation of `set` which starts at index `offset` of its
    /// ascending order. Offsets wrap around the set's cardinality.
    pub fn of(set: &PitchClassSet, offset: usize) -> Rotation {
        let members = set.as_slice();
        if members.is_empty() {
            return Rotation(Vec::new());
        }

        let (tail, head) = members.split_at(offset % members.len());
        let mut unwrapped: Vec<u8> = Vec::with_capacity(members.len());

        for pc in head.iter().chain(tail) {
            let mut value = pc.value();
            if let Some(&previous) = unwrapped.last() {
                while value < previous {
                    value += PITCH_CLASS_COUNT;
                }
            }
            unwrapped.push(value);
        }

        Rotation(unwrapped)
    }

    /// Returns the unwrapped elements, which may exceed 11.
    pub fn elements(&self) -> &[u8] {
        &self.0
    }

    /// Returns the distance from the first to the last element.
    pub fn span(&self) -> u8 {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }

    /// Reduce each element modulo 12, keeping rotation order.
    pub fn reduced(&self) -> Vec<PitchClass> {
        self.0.iter().map(|&v| PitchClass::new(v as i64)).collect()
    }

    /// Transpose so the first element becomes 0.
    pub fn zero_transposed(&self) -> Vec<PitchClass> {
        zero_transpose(&self.reduced())
    }
}

/// Returns every rotation of `set`, in order of increasing starting offset.
pub fn rotations(set: &PitchClassSet) -> impl Iterator<Item = Rotation> + '_ {
    (0..set.len()).map(move |offset| Rotation::of(set, offset))
}

fn zero_transpose(sequence: &[PitchClass]) -> Vec<PitchClass> {
    match sequence.first() {
        Some(&first) => sequence
            .iter()
            .map(|&pc| PitchClass::new(first.distance_to(pc) as i64))
            .collect(),
        None => Vec::new(),
    }
}

/// The most compact rotation of a set, reduced modulo 12.
///
/// The elements are in rotation order and so are not necessarily ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalForm(Vec<PitchClass>);

impl NormalForm {
    pub fn as_slice(&self) -> &[PitchClass] {
        &self.0
    }

    pub fn values(&self) -> Vec<u8> {
        self.0.iter().map(|pc| pc.value()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Transpose so the first element becomes 0.
    pub fn zero_transposed(&self) -> Vec<PitchClass> {
        zero_transpose(&self.0)
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_braced(f, &self.0)
    }
}

/// Find the normal form of `set`.
///
/// The rotation of least span wins. On a tie the rotation with the lowest
/// starting offset is kept.
pub fn normal_form(set: &PitchClassSet) -> NormalForm {
    rotations(set)
        .min_by_key(Rotation::span)
        .map(|rotation| NormalForm(rotation.reduced()))
        .unwrap_or_default()
}

/// The canonical representative of a set class.
///
/// Always begins with 0 (unless empty) and is the same for a set, any of its
/// transpositions and its inversion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PrimeForm(Vec<PitchClass>);

impl PrimeForm {
    pub fn as_slice(&self) -> &[PitchClass] {
        &self.0
    }

    pub fn values(&self) -> Vec<u8> {
        self.0.iter().map(|pc| pc.value()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the comma-joined form used to key catalog entries, e.g. `0,3,7`.
    pub fn key(&self) -> String {
        self.0
            .iter()
            .map(|pc| pc.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for PrimeForm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_braced(f, &self.0)
    }
}

/// Compare two equal-length sequences starting from their last element.
///
/// The first position (from the right) at which they differ decides; the
/// sequence holding the smaller value there orders first. This prefers the
/// sequence most tightly packed towards its end.
pub fn compare_from_right(a: &[PitchClass], b: &[PitchClass]) -> Ordering {
    a.iter().rev().cmp(b.iter().rev())
}

fn joined_digits(sequence: &[PitchClass]) -> String {
    sequence.iter().map(|pc| pc.to_string()).collect()
}

/// The rule used to pick a prime form between competing candidates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrimeFormRule {
    /// Rank every zero-transposed rotation of the set and of its inversion
    /// with `compare_from_right`. This is the canonical rule.
    FromRight,

    /// Zero-transpose the normal forms of the set and of its inversion, and
    /// keep whichever reads smaller once its digits are joined into a string.
    ///
    /// Kept for cross-checking only; it is not invariant under transposition.
    JoinedDigits,
}

/// Find the prime form of `set` using the canonical rule.
pub fn prime_form(set: &PitchClassSet) -> PrimeForm {
    prime_form_by(set, PrimeFormRule::FromRight)
}

/// Find the prime form of `set` using the given `rule`.
///
/// On an exact tie the candidate derived from the set itself is preferred
/// over the one derived from its inversion.
pub fn prime_form_by(set: &PitchClassSet, rule: PrimeFormRule) -> PrimeForm {
    let inverted = set.invert();

    match rule {
        PrimeFormRule::FromRight => {
            rotations(set)
                .chain(rotations(&inverted))
                .map(|rotation| rotation.zero_transposed())
                .reduce(|best, candidate| {
                    match compare_from_right(&candidate, &best) {
                        Ordering::Less => candidate,
                        _ => best,
                    }
                })
                .map(PrimeForm)
                .unwrap_or_default()
        }

        PrimeFormRule::JoinedDigits => {
            let original = normal_form(set).zero_transposed();
            let mirrored = normal_form(&inverted).zero_transposed();

            if joined_digits(&original) <= joined_digits(&mirrored) {
                PrimeForm(original)
            } else {
                PrimeForm(mirrored)
            }
        }
    }
}
