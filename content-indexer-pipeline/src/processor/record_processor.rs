//! Record processor implementation.
//!
//! Transforms one raw source record into a target document plus the pending
//! tag mutations derived from its related entries. The processor is a pure
//! stage: mutations are collected here and executed later by the linker, so
//! transformation stays testable without a live search backend.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::errors::PipelineError;
use crate::linker::LinkRules;
use crate::processor::normalize::camel_case_fields;
use crate::processor::vocabulary::{VocabularyKind, VocabularyLookup, UNKNOWN_LANGUAGE};
use content_indexer_shared::{CollectionKind, ContentCollection, SourceRecord, TagMutation, TargetDocument};

// Source fields consumed by the processor
const TAGS_FIELD: &str = "tags";
const YEAR_FIELD: &str = "year";
const MONTH_FIELD: &str = "month";
const DAY_FIELD: &str = "day";
const TYPE_FIELD: &str = "type";
const LANGUAGE_FIELD: &str = "language";

// Fields produced by the processor
const CONTENT_TYPE_FIELD: &str = "contentType";
const LITERATURE_TYPE_FIELD: &str = "literatureType";
const CREATED_AT_FIELD: &str = "createdAt";
const COUNTRIES_OF_RESEARCHER_FIELD: &str = "countriesOfResearcher";
const COUNTRIES_OF_COVERAGE_FIELD: &str = "countriesOfCoverage";
const GBIF_REGION_FIELD: &str = "gbifRegion";
const GBIF_DOI_FIELD: &str = "gbifDOI";

/// Prefix marking a tag value as a DOI cross-reference.
const GBIF_DOI_TAG: &str = "gbifDOI:";

/// Result of processing one source record.
#[derive(Debug)]
pub struct ProcessedRecord {
    /// The document to index in the collection's working index.
    pub document: TargetDocument,
    /// Pending cross-reference mutations against other collections' indices.
    pub mutations: Vec<TagMutation>,
}

/// Processor that transforms source records into target documents.
pub struct RecordProcessor {
    collection: ContentCollection,
    vocabulary: Arc<dyn VocabularyLookup>,
    link_rules: LinkRules,
    tag_field: String,
}

impl RecordProcessor {
    /// Create a processor for one collection.
    pub fn new(
        collection: ContentCollection,
        vocabulary: Arc<dyn VocabularyLookup>,
        link_rules: LinkRules,
    ) -> Self {
        let tag_field = collection.tag_field();
        Self {
            collection,
            vocabulary,
            link_rules,
            tag_field,
        }
    }

    /// Transform one source record.
    ///
    /// An `Err` means this record is skipped; it never aborts the run.
    pub fn process(&self, record: &SourceRecord) -> Result<ProcessedRecord, PipelineError> {
        let mut payload = record.fields.clone();
        if !payload.is_object() {
            return Err(PipelineError::transform(format!(
                "record {} payload is not an object",
                record.id
            )));
        }

        camel_case_fields(&mut payload);
        // camel_case_fields preserves the object shape checked above
        let mut fields = match payload {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        self.apply_replacements(&record.id, &mut fields)?;

        if self.collection.kind == CollectionKind::Literature && fields.contains_key(TAGS_FIELD) {
            self.enrich_from_tags(&mut fields);
        }

        fields.insert(
            CONTENT_TYPE_FIELD.to_string(),
            json!(self.collection.content_type_value()),
        );

        let document = TargetDocument {
            id: record.id.clone(),
            fields,
        };

        let mutations = self
            .link_rules
            .mutations_for(record, &self.tag_field, &record.id);

        debug!(
            record_id = %record.id,
            mutations = mutations.len(),
            "Processed record"
        );

        Ok(ProcessedRecord {
            document,
            mutations,
        })
    }

    /// Schema-specific field renames, vocabulary substitutions and derived
    /// fields.
    fn apply_replacements(
        &self,
        record_id: &str,
        fields: &mut Map<String, Value>,
    ) -> Result<(), PipelineError> {
        if self.collection.kind == CollectionKind::Literature {
            if let Some(type_value) = fields.remove(TYPE_FIELD) {
                fields.insert(LITERATURE_TYPE_FIELD.to_string(), type_value);
            }
        }

        if let Some(raw_language) = fields.get(LANGUAGE_FIELD).and_then(Value::as_str) {
            let code = match self.vocabulary.resolve(raw_language, VocabularyKind::Language) {
                Some(code) => code,
                None => {
                    warn!(
                        record_id = %record_id,
                        language = %raw_language,
                        "Replacing unknown language with sentinel"
                    );
                    UNKNOWN_LANGUAGE.to_string()
                }
            };
            fields.insert(LANGUAGE_FIELD.to_string(), json!(code));
        }

        if let Some(created_at) = derive_created_at(fields)? {
            fields.insert(CREATED_AT_FIELD.to_string(), json!(created_at));
        }

        Ok(())
    }

    /// Partition literature tag values into country, region and dataset
    /// enrichment fields. All four output fields use set semantics.
    fn enrich_from_tags(&self, fields: &mut Map<String, Value>) {
        let mut countries_of_researcher = BTreeSet::new();
        let mut countries_of_coverage = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut datasets = BTreeSet::new();

        let tags = fields
            .get(TAGS_FIELD)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for tag in tags.iter().filter_map(Value::as_str) {
            if let Some(doi) = tag.strip_prefix(GBIF_DOI_TAG) {
                datasets.extend(self.vocabulary.datasets_for_doi(doi));
            } else {
                if let Some(code) = self.vocabulary.resolve(tag, VocabularyKind::Country) {
                    countries_of_researcher.insert(code);
                }
                if let Some(code) = self.vocabulary.resolve(tag, VocabularyKind::CountryName) {
                    if let Some(region) = self.vocabulary.region_of(&code) {
                        regions.insert(region);
                    }
                    countries_of_coverage.insert(code);
                }
            }
        }

        fields.insert(
            COUNTRIES_OF_RESEARCHER_FIELD.to_string(),
            json!(countries_of_researcher),
        );
        fields.insert(
            COUNTRIES_OF_COVERAGE_FIELD.to_string(),
            json!(countries_of_coverage),
        );
        fields.insert(GBIF_REGION_FIELD.to_string(), json!(regions));
        fields.insert(GBIF_DOI_FIELD.to_string(), json!(datasets));
    }
}

/// Assemble `createdAt` from the `year`, `month` and `day` fields.
///
/// Missing month and day default to 1. Out-of-range day values are
/// tolerated through date arithmetic (day − 1 added to the first of the
/// month) because some sources report invalid days of month.
fn derive_created_at(fields: &Map<String, Value>) -> Result<Option<String>, PipelineError> {
    let year = match fields.get(YEAR_FIELD) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => parse_integer(value, YEAR_FIELD)?,
    };
    let year = i32::try_from(year)
        .map_err(|_| PipelineError::transform(format!("year {} out of range", year)))?;

    let month = date_component(fields, MONTH_FIELD)?;
    let day = date_component(fields, DAY_FIELD)?;

    let month = u32::try_from(month)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| PipelineError::transform(format!("invalid month {}", month)))?;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| PipelineError::transform(format!("invalid date {}-{}", year, month)))?;
    let offset = Duration::try_days(day - 1)
        .ok_or_else(|| PipelineError::transform(format!("day {} out of range", day)))?;
    let date = first_of_month
        .checked_add_signed(offset)
        .ok_or_else(|| PipelineError::transform(format!("day {} out of range", day)))?;

    Ok(Some(format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))))
}

/// Integer value of a month/day field, defaulting to 1 when absent.
fn date_component(fields: &Map<String, Value>, field: &str) -> Result<i64, PipelineError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(1),
        Some(value) => parse_integer(value, field),
    }
}

fn parse_integer(value: &Value, field: &str) -> Result<i64, PipelineError> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| PipelineError::transform(format!("non-integer {} field", field))),
        Value::String(text) => text
            .parse()
            .map_err(|_| PipelineError::transform(format!("unparsable {} field: {}", field, text))),
        _ => Err(PipelineError::transform(format!(
            "unexpected {} field type",
            field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_indexer_shared::{EntryRef, RelatedEntries};

    struct StaticVocabulary;

    impl VocabularyLookup for StaticVocabulary {
        fn resolve(&self, raw_value: &str, kind: VocabularyKind) -> Option<String> {
            match kind {
                VocabularyKind::Country => match raw_value {
                    "DK" => Some("DK".to_string()),
                    "CR" => Some("CR".to_string()),
                    _ => None,
                },
                VocabularyKind::CountryName => match raw_value {
                    "Denmark" => Some("DK".to_string()),
                    "Costa Rica" => Some("CR".to_string()),
                    _ => None,
                },
                VocabularyKind::Language => match raw_value {
                    "English" | "en" | "eng" => Some("eng".to_string()),
                    "Spanish" | "es" | "spa" => Some("spa".to_string()),
                    _ => None,
                },
            }
        }

        fn region_of(&self, country_code: &str) -> Option<String> {
            match country_code {
                "DK" => Some("EUROPE".to_string()),
                "CR" => Some("LATIN_AMERICA".to_string()),
                _ => None,
            }
        }

        fn datasets_for_doi(&self, doi: &str) -> Vec<String> {
            if doi == "10.15468/abc" {
                vec!["ds-1".to_string(), "ds-2".to_string()]
            } else {
                Vec::new()
            }
        }
    }

    fn literature_processor() -> RecordProcessor {
        RecordProcessor::new(
            ContentCollection::literature("mendeley", "Literature"),
            Arc::new(StaticVocabulary),
            LinkRules::new(Vec::new()),
        )
    }

    fn news_processor(link_targets: Vec<String>) -> RecordProcessor {
        RecordProcessor::new(
            ContentCollection::cms("ct-news", "News"),
            Arc::new(StaticVocabulary),
            LinkRules::new(link_targets),
        )
    }

    #[test]
    fn test_camel_cases_and_stamps_content_type() {
        let record = SourceRecord::new(
            "r1",
            "ct-news",
            json!({ "page_title": "hello", "body_text": "world" }),
        );

        let processed = news_processor(Vec::new()).process(&record).unwrap();

        assert_eq!(processed.document.fields["pageTitle"], json!("hello"));
        assert_eq!(processed.document.content_type(), Some("news"));
        assert!(processed.mutations.is_empty());
    }

    #[test]
    fn test_literature_type_rename() {
        let record = SourceRecord::new("r1", "mendeley", json!({ "type": "journal" }));

        let processed = literature_processor().process(&record).unwrap();

        assert_eq!(processed.document.fields["literatureType"], json!("journal"));
        assert!(!processed.document.fields.contains_key("type"));
        assert_eq!(processed.document.content_type(), Some("literature"));
    }

    #[test]
    fn test_language_resolution_and_sentinel() {
        let processor = literature_processor();

        let resolved = processor
            .process(&SourceRecord::new("r1", "mendeley", json!({ "language": "English" })))
            .unwrap();
        assert_eq!(resolved.document.fields["language"], json!("eng"));

        let unknown = processor
            .process(&SourceRecord::new("r2", "mendeley", json!({ "language": "Klingon" })))
            .unwrap();
        assert_eq!(unknown.document.fields["language"], json!(UNKNOWN_LANGUAGE));
    }

    #[test]
    fn test_created_at_defaults_missing_month_and_day() {
        let record = SourceRecord::new("r1", "mendeley", json!({ "year": 2020 }));

        let processed = literature_processor().process(&record).unwrap();

        assert_eq!(
            processed.document.fields["createdAt"],
            json!("2020-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn test_created_at_tolerates_invalid_day() {
        let record = SourceRecord::new(
            "r1",
            "mendeley",
            json!({ "year": "2020", "month": "2", "day": "31" }),
        );

        let processed = literature_processor().process(&record).unwrap();

        // Feb 1 2020 + 30 days
        assert_eq!(
            processed.document.fields["createdAt"],
            json!("2020-03-02T00:00:00.000Z")
        );
    }

    #[test]
    fn test_invalid_month_fails_the_record() {
        let record = SourceRecord::new("r1", "mendeley", json!({ "year": 2020, "month": 13 }));

        let result = literature_processor().process(&record);

        assert!(matches!(result, Err(PipelineError::TransformError(_))));
    }

    #[test]
    fn test_tag_enrichment() {
        let record = SourceRecord::new(
            "r1",
            "mendeley",
            json!({ "tags": ["DK", "Denmark", "gbifDOI:10.15468/abc", "not a country"] }),
        );

        let processed = literature_processor().process(&record).unwrap();
        let fields = &processed.document.fields;

        assert_eq!(fields["countriesOfResearcher"], json!(["DK"]));
        assert_eq!(fields["countriesOfCoverage"], json!(["DK"]));
        assert_eq!(fields["gbifRegion"], json!(["EUROPE"]));
        assert_eq!(fields["gbifDOI"], json!(["ds-1", "ds-2"]));
    }

    #[test]
    fn test_non_object_payload_is_a_transform_error() {
        let record = SourceRecord::new("r1", "ct-news", json!("garbage"));

        let result = news_processor(Vec::new()).process(&record);

        assert!(matches!(result, Err(PipelineError::TransformError(_))));
    }

    #[test]
    fn test_collects_mutations_for_linkable_related_entries() {
        let record = SourceRecord::new("news-1", "ct-news", json!({ "title": "t" })).with_related(
            vec![RelatedEntries::List(vec![
                EntryRef {
                    id: "a1".to_string(),
                    content_type_id: "ct-article".to_string(),
                    collection_name: "Article".to_string(),
                },
                EntryRef {
                    id: "e1".to_string(),
                    content_type_id: "ct-event".to_string(),
                    collection_name: "Event".to_string(),
                },
            ])],
        );

        let processed = news_processor(vec!["ct-article".to_string()])
            .process(&record)
            .unwrap();

        assert_eq!(processed.mutations.len(), 1);
        let mutation = &processed.mutations[0];
        assert_eq!(mutation.target_alias, "article");
        assert_eq!(mutation.target_document_id, "a1");
        assert_eq!(mutation.tag_field, "newsTag");
        assert_eq!(mutation.tag_value, "news-1");
    }
}
