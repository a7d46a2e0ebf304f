//! # pcset
//!
//! A crate for analyzing pitch-class sets in twelve-tone equal temperament.
//!
//! The `pitch` module contains the set representation and its basic
//! operations (transposition, inversion, complement), while `forms` derives
//! the canonical normal and prime forms used to name set classes. The
//! `analysis` module ties these together with a `catalog` of Forte numbers.

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod parser;
pub mod pitch;
pub mod vector;

pub use analysis::{AnalysisResult, Analyzer, AnalyzerState};
pub use catalog::{AnyCatalog, Catalog, Classification, ForteCode, LocalCatalog, RemoteCatalog};
pub use error::{Error, Result};
pub use forms::{normal_form, prime_form, NormalForm, PrimeForm};
pub use pitch::{PitchClass, PitchClassSet};
pub use vector::IntervalClassVector;
