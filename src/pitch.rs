//! Defines the pitch-class primitives every analysis is built from.
//!
//! These can be constructed manually, but often one would want to use the
//! `parser` module in order to generate a set from free-form text.
//!
//! ```
//! use pcset::pitch::{NoteClass, PitchClass, PitchClassSet};
//!
//! // A C minor triad, spelled with a flat third.
//! let set: PitchClassSet = [
//!     NoteClass::C.pitch_class(),
//!     NoteClass::E.pitch_class().shifted(-1),
//!     NoteClass::G.pitch_class(),
//! ].into_iter().collect();
//!
//! assert_eq!(set.values(), vec![0, 3, 7]);
//! assert_eq!(set.invert().values(), vec![0, 5, 9]);
//! assert_eq!(set.complement().len(), 9);
//! assert!(set.contains(PitchClass::new(3)));
//! ```
//!
//! All arithmetic on pitch classes is performed modulo 12.

use std::fmt;

use serde::Serialize;

/// The number of distinct pitch classes in twelve-tone equal temperament.
pub const PITCH_CLASS_COUNT: u8 = 12;

/// A single note letter without accidentals.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoteClass {
    A, B, C, D, E, F, G
}

/// The total number of `NoteClass` elements.
pub const NOTE_CLASS_COUNT: usize = 7;

impl NoteClass {
    /// Construct a `NoteClass` from an uppercase char representation.
    pub fn from_char(input: char) -> Option<NoteClass> {
        use self::NoteClass::*;

        match input {
            'A' => Some(A),
            'B' => Some(B),
            'C' => Some(C),
            'D' => Some(D),
            'E' => Some(E),
            'F' => Some(F),
            'G' => Some(G),
            _   => None
        }
    }

    /// Returns the ordered index of this `NoteClass`.
    pub fn to_int(self) -> usize {
        use self::NoteClass::*;

        match self {
            A => 0,
            B => 1,
            C => 2,
            D => 3,
            E => 4,
            F => 5,
            G => 6
        }
    }

    /// Returns the pitch class of the natural note, with `C` as 0.
    pub fn pitch_class(self) -> PitchClass {
        const NATURALS: [u8; NOTE_CLASS_COUNT] = [
            9, 11, 0, 2, 4, 5, 7,
        ];

        PitchClass(NATURALS[self.to_int()])
    }
}

/// An integer in `[0, 11]` naming a note modulo octave equivalence.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PitchClass(u8);

impl PitchClass {
    /// Construct a `PitchClass`, reducing any integer modulo 12.
    pub fn new(value: i64) -> PitchClass {
        PitchClass(value.rem_euclid(PITCH_CLASS_COUNT as i64) as u8)
    }

    /// Returns the underlying residue.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns this pitch class moved by `semitones`, wrapping at the octave.
    pub fn shifted(self, semitones: i64) -> PitchClass {
        PitchClass::new(self.0 as i64 + semitones)
    }

    /// Returns the mirror image around pitch class 0.
    pub fn inverted(self) -> PitchClass {
        PitchClass::new(PITCH_CLASS_COUNT as i64 - self.0 as i64)
    }

    /// Returns the ascending distance from `self` up to `other`, in `[0, 11]`.
    pub fn distance_to(self, other: PitchClass) -> u8 {
        (other.0 + PITCH_CLASS_COUNT - self.0) % PITCH_CLASS_COUNT
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unordered collection of distinct pitch classes.
///
/// Elements are always held in ascending order without duplicates, so two
/// sets with the same members compare equal regardless of how they were
/// built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PitchClassSet(Vec<PitchClass>);

impl PitchClassSet {
    /// Construct an empty `PitchClassSet`.
    pub fn new() -> PitchClassSet {
        PitchClassSet(Vec::new())
    }

    /// Construct the set of all twelve pitch classes.
    pub fn aggregate() -> PitchClassSet {
        (0..PITCH_CLASS_COUNT as i64).map(PitchClass::new).collect()
    }

    /// Construct a set from raw integers, reducing each modulo 12.
    pub fn from_values(values: &[i64]) -> PitchClassSet {
        values.iter().map(|&v| PitchClass::new(v)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, pc: PitchClass) -> bool {
        self.0.binary_search(&pc).is_ok()
    }

    /// Returns the members in ascending order.
    pub fn as_slice(&self) -> &[PitchClass] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PitchClass> {
        self.0.iter()
    }

    /// Returns the members as plain integers in ascending order.
    pub fn values(&self) -> Vec<u8> {
        self.0.iter().map(|pc| pc.value()).collect()
    }

    /// Move every member by `semitones`.
    pub fn transpose(&self, semitones: i64) -> PitchClassSet {
        self.0.iter().map(|pc| pc.shifted(semitones)).collect()
    }

    /// Reflect every member around pitch class 0, mapping `x` to `12 - x`.
    pub fn invert(&self) -> PitchClassSet {
        self.0.iter().map(|pc| pc.inverted()).collect()
    }

    /// Returns every pitch class absent from this set.
    pub fn complement(&self) -> PitchClassSet {
        PitchClassSet::aggregate()
            .0
            .into_iter()
            .filter(|&pc| !self.contains(pc))
            .collect()
    }
}

impl FromIterator<PitchClass> for PitchClassSet {
    fn from_iter<I: IntoIterator<Item = PitchClass>>(iter: I) -> PitchClassSet {
        let mut members: Vec<PitchClass> = iter.into_iter().collect();
        members.sort_unstable();
        members.dedup();
        PitchClassSet(members)
    }
}

impl<'a> IntoIterator for &'a PitchClassSet {
    type Item = &'a PitchClass;
    type IntoIter = std::slice::Iter<'a, PitchClass>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Writes a brace-enclosed list in the form `{ 0, 4, 7 }`.
pub(crate) fn write_braced(f: &mut fmt::Formatter, members: &[PitchClass]) -> fmt::Result {
    if members.is_empty() {
        return write!(f, "{{ }}");
    }

    write!(f, "{{ ")?;
    for (i, pc) in members.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", pc)?;
    }
    write!(f, " }}")
}

impl fmt::Display for PitchClassSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_braced(f, &self.0)
    }
}
