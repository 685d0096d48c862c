//! Field-name normalization.

use serde_json::Value;

use content_indexer_shared::naming::snake_to_camel;

/// Source field renamed to `updatedAt` instead of plain camelCasing.
const LAST_MODIFIED_FIELD: &str = "last_modified";

/// Field written in place of `last_modified`.
const UPDATED_AT_FIELD: &str = "updatedAt";

/// Rename every field from snake_case to lowerCamelCase, recursively
/// through nested objects and arrays. `last_modified` becomes `updatedAt`.
pub fn camel_case_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            for (field_name, mut node) in entries {
                camel_case_fields(&mut node);
                let renamed = if field_name == LAST_MODIFIED_FIELD {
                    UPDATED_AT_FIELD.to_string()
                } else {
                    snake_to_camel(&field_name)
                };
                map.insert(renamed, node);
            }
        }
        Value::Array(items) => {
            for item in items {
                camel_case_fields(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_renames_recursively() {
        let mut value = json!({
            "source_type": "journal",
            "nested_object": { "inner_field": 1 },
            "item_list": [ { "deep_field": true }, "plain" ]
        });

        camel_case_fields(&mut value);

        assert_eq!(
            value,
            json!({
                "sourceType": "journal",
                "nestedObject": { "innerField": 1 },
                "itemList": [ { "deepField": true }, "plain" ]
            })
        );
    }

    #[test]
    fn test_last_modified_becomes_updated_at() {
        let mut value = json!({ "last_modified": "2020-01-01" });
        camel_case_fields(&mut value);
        assert_eq!(value, json!({ "updatedAt": "2020-01-01" }));
    }

    #[test]
    fn test_already_camel_cased_fields_are_stable() {
        let mut value = json!({ "createdAt": "x", "year": 2020 });
        camel_case_fields(&mut value);
        assert_eq!(value, json!({ "createdAt": "x", "year": 2020 }));
    }
}
