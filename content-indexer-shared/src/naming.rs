//! Naming rules for indices, aliases and document fields.
//!
//! Collection names arrive as human-readable titles ("Data Use", "News").
//! Index names must be lowercase without whitespace; field names use
//! lowerCamelCase. These rules are pure functions so they can be tested
//! without a running search engine.

/// Alias shared by every promoted content index, across all collections.
pub const CONTENT_ALIAS: &str = "content";

/// Derive the serving alias name from a collection name.
///
/// Strips whitespace runs (and a colon immediately preceding them) and
/// lowercases the result: "Data Use" becomes "datause".
pub fn index_alias_name(collection_name: &str) -> String {
    collection_name
        .split_whitespace()
        .map(|word| word.trim_end_matches(':'))
        .collect::<String>()
        .to_lowercase()
}

/// Translate a sentence-style name into lowerCamelCase.
///
/// "Data Use" becomes "dataUse"; "News" becomes "news". Used for the
/// `contentType` stamp and for deriving tag field names.
pub fn field_name_format(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, word) in name
        .split_whitespace()
        .map(|word| word.trim_end_matches(':'))
        .filter(|word| !word.is_empty())
        .enumerate()
    {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(&chars.as_str().to_lowercase());
            }
        }
    }
    out
}

/// Convert a snake_case field name to lowerCamelCase.
///
/// Names without underscores are returned unchanged, so already-camelCased
/// input is stable under repeated application.
pub fn snake_to_camel(field_name: &str) -> String {
    if !field_name.contains('_') {
        return field_name.to_string();
    }
    let mut out = String::with_capacity(field_name.len());
    let mut upper_next = false;
    for c in field_name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
