//! Vocabulary lookup trait definition.
//!
//! Controlled-vocabulary resolution (countries, languages, regions) and
//! DOI-to-dataset cross-referencing are pure lookups from the pipeline's
//! perspective; the data source behind them is a collaborator concern.

/// Sentinel ISO-639-3 code substituted for language values the lookup
/// cannot resolve. Unresolvable values are never dropped and never fail
/// the record.
pub const UNKNOWN_LANGUAGE: &str = "und";

/// The controlled vocabularies a raw value can be resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularyKind {
    /// Exact ISO country-code match, resolved to the ISO-2 code.
    Country,
    /// Fuzzy country-name match, resolved to the ISO-2 code.
    CountryName,
    /// Language by English title, native title or ISO code, resolved to
    /// the ISO-639-3 code.
    Language,
}

/// Pure, side-effect-free lookups against controlled vocabularies.
pub trait VocabularyLookup: Send + Sync {
    /// Resolve a raw value against a vocabulary, returning the canonical
    /// code or `None` when the value is not part of the vocabulary.
    fn resolve(&self, raw_value: &str, kind: VocabularyKind) -> Option<String>;

    /// The region a country code belongs to, if known.
    fn region_of(&self, country_code: &str) -> Option<String>;

    /// Dataset keys cross-referenced by a DOI, empty when none are known.
    fn datasets_for_doi(&self, doi: &str) -> Vec<String>;
}
