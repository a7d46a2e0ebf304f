//! Runs the full analysis pipeline for a single request.
//!
//! ```
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! use pcset::analysis::Analyzer;
//! use pcset::catalog::LocalCatalog;
//!
//! let mut analyzer = Analyzer::new(LocalCatalog::standard()?);
//! let result = analyzer.analyze("C E G").await?.expect("non-empty input");
//!
//! assert_eq!(result.prime_form.key(), "0,3,7");
//! assert_eq!(result.classification.code_str(), "3-11");
//! assert_eq!(result.complement_classification.code_str(), "9-11");
//! # Ok::<(), pcset::Error>(())
//! # }).unwrap();
//! ```

use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::{debug, warn};

use crate::catalog::{Catalog, CatalogEntry, Classification};
use crate::error::Result;
use crate::forms::{normal_form, prime_form, prime_form_by, NormalForm, PrimeForm, PrimeFormRule};
use crate::parser::parse_set;
use crate::pitch::PitchClassSet;
use crate::vector::IntervalClassVector;

/// Everything derived from one pitch-class set.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    /// The input set, ascending
    pub parsed: PitchClassSet,

    pub normal_form: NormalForm,

    pub prime_form: PrimeForm,

    pub interval_class_vector: IntervalClassVector,

    /// Catalog classification of `prime_form`, including any Z-mate
    pub classification: Classification,

    /// Pitch classes absent from `parsed`, ascending
    pub complement: PitchClassSet,

    /// Classification of `complement`
    pub complement_classification: Classification,

    /// Whether `complement_classification` came from the catalog rather
    /// than being derived from the original's code
    pub complement_verified: bool,

    /// The prime form chosen by `PrimeFormRule::JoinedDigits`, present only
    /// when it disagrees with `prime_form`
    pub divergent_prime_form: Option<PrimeForm>,
}

impl AnalysisResult {
    pub fn z_relation_mate(&self) -> Option<&str> {
        self.classification.z_mate().map(|mate| mate.as_str())
    }
}

impl Serialize for AnalysisResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AnalysisResult", 10)?;
        state.serialize_field("parsed", &self.parsed)?;
        state.serialize_field("normalForm", &self.normal_form)?;
        state.serialize_field("primeForm", &self.prime_form)?;
        state.serialize_field("intervalClassVector", &self.interval_class_vector)?;
        state.serialize_field("classificationCode", self.classification.code_str())?;
        match self.z_relation_mate() {
            Some(mate) => state.serialize_field("zRelationMate", mate)?,
            None => state.skip_field("zRelationMate")?,
        }
        state.serialize_field("complement", &self.complement)?;
        state.serialize_field(
            "complementClassificationCode",
            self.complement_classification.code_str(),
        )?;
        state.serialize_field("complementVerified", &self.complement_verified)?;
        state.serialize_field("divergentPrimeForm", &self.divergent_prime_form)?;
        state.end()
    }
}

/// Whether an `Analyzer` is in the middle of a request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AnalyzerState {
    Idle,
    Computing,
}

/// Holds an analyzer in `Computing` until dropped, even if the request
/// future is abandoned part way through a lookup.
struct Busy<'a> {
    state: &'a mut AnalyzerState,
}

impl<'a> Busy<'a> {
    fn enter(state: &'a mut AnalyzerState) -> Busy<'a> {
        *state = AnalyzerState::Computing;
        Busy { state }
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        *self.state = AnalyzerState::Idle;
    }
}

/// Analyzes pitch-class sets against a catalog.
///
/// The catalog is shared behind an `Arc`, so any number of analyzers may be
/// built over the same reference data.
#[derive(Debug)]
pub struct Analyzer<C> {
    catalog: Arc<C>,
    state: AnalyzerState,
}

impl<C: Catalog> Analyzer<C> {
    /// Construct an `Analyzer` which owns its catalog.
    pub fn new(catalog: C) -> Analyzer<C> {
        Analyzer::with_shared(Arc::new(catalog))
    }

    /// Construct an `Analyzer` over a catalog shared with others.
    pub fn with_shared(catalog: Arc<C>) -> Analyzer<C> {
        Analyzer { catalog, state: AnalyzerState::Idle }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn state(&self) -> AnalyzerState {
        self.state
    }

    /// Parse `input` and derive its full analysis.
    ///
    /// Returns `Ok(None)` when the input holds no tokens. A parse or lookup
    /// failure aborts the request, and no partial result is returned. The
    /// analyzer is idle again once this returns or the future is dropped.
    pub async fn analyze(&mut self, input: &str) -> Result<Option<AnalysisResult>> {
        let _busy = Busy::enter(&mut self.state);
        Self::run(&*self.catalog, input).await
    }

    async fn run(catalog: &C, input: &str) -> Result<Option<AnalysisResult>> {
        let parsed = parse_set(input)?;
        if parsed.is_empty() {
            debug!("no pitch classes given");
            return Ok(None);
        }

        let normal_form = normal_form(&parsed);
        let prime_form = prime_form(&parsed);
        debug!(%normal_form, %prime_form, "derived canonical forms");

        let alternate = prime_form_by(&parsed, PrimeFormRule::JoinedDigits);
        let divergent_prime_form = if alternate != prime_form {
            warn!(set = %parsed, %prime_form, %alternate, "prime-form rules disagree");
            Some(alternate)
        } else {
            None
        };

        let interval_class_vector = IntervalClassVector::of(&parsed);
        let complement = parsed.complement();

        let classification = catalog.resolve(&prime_form).await?;
        let (complement_classification, complement_verified) =
            Self::classify_complement(catalog, &classification, &complement).await?;

        Ok(Some(AnalysisResult {
            parsed,
            normal_form,
            prime_form,
            interval_class_vector,
            classification,
            complement,
            complement_classification,
            complement_verified,
            divergent_prime_form,
        }))
    }

    /// Classify the complement by looking up its own prime form, falling
    /// back to renaming the original's code when the catalog has no entry.
    async fn classify_complement(
        catalog: &C,
        original: &Classification,
        complement: &PitchClassSet,
    ) -> Result<(Classification, bool)> {
        let code = match original.code() {
            Some(code) => code,
            None => return Ok((Classification::Unclassified, false)),
        };

        let looked_up = catalog.resolve(&prime_form(complement)).await?;
        if looked_up.is_classified() {
            return Ok((looked_up, true));
        }

        let derived = match code.complement_code() {
            Some(code) => Classification::Classified(CatalogEntry { code, z_mate: None }),
            None => Classification::Unclassified,
        };
        Ok((derived, false))
    }
}
