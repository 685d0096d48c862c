//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{
        IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesGetAliasParts,
        IndicesPutAliasParts,
    },
    BulkParts, OpenSearch, UpdateParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::opensearch::scripts::tag_append_script;
use crate::types::{BulkItemResult, BulkOperation, BulkSummary};
use content_indexer_shared::TagMutation;

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// use content_indexer_repository::OpenSearchClient;
/// let client = OpenSearchClient::new("http://localhost:9200")?;
/// let indices = client.indices_for_alias("news").await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    pub fn new(url: &str) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch client");

        Ok(Self { client })
    }

    /// Turn a bulk response body into a per-item summary.
    ///
    /// Items are matched to the submitted operations positionally, as the
    /// engine guarantees response order mirrors request order.
    fn parse_bulk_response(operations: &[BulkOperation], body: &Value) -> BulkSummary {
        let items = body["items"].as_array();
        let mut results = Vec::with_capacity(operations.len());
        let mut succeeded = 0;
        let mut failed = 0;

        for (position, operation) in operations.iter().enumerate() {
            let item = items
                .and_then(|items| items.get(position))
                .map(|item| &item["index"]);

            let error = item.and_then(|item| {
                item.get("error").filter(|e| !e.is_null()).map(|e| {
                    SearchError::bulk(format!(
                        "{}: {}",
                        e["type"].as_str().unwrap_or("unknown"),
                        e["reason"].as_str().unwrap_or("no reason given")
                    ))
                })
            });

            match error {
                Some(error) => {
                    failed += 1;
                    results.push(BulkItemResult {
                        id: operation.id.clone(),
                        success: false,
                        error: Some(error),
                    });
                }
                None => {
                    succeeded += 1;
                    results.push(BulkItemResult {
                        id: operation.id.clone(),
                        success: true,
                        error: None,
                    });
                }
            }
        }

        BulkSummary {
            total: operations.len(),
            succeeded,
            failed,
            results,
        }
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(mapping.clone())
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Index creation failed");
            return Err(SearchError::index_creation(format!(
                "Create of {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Created index");
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::index_deletion(e.to_string()))?;

        let status = response.status_code();
        // 404 is acceptable - the index may already be gone
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Index deletion failed");
            return Err(SearchError::index_deletion(format!(
                "Delete of {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Deleted index");
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Ok(response.status_code().is_success())
    }

    async fn indices_for_alias(&self, alias: &str) -> Result<Vec<String>, SearchError> {
        let response = self
            .client
            .indices()
            .get_alias(IndicesGetAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| SearchError::alias(e.to_string()))?;

        // An alias that was never created resolves to no indices
        if response.status_code().as_u16() == 404 {
            return Ok(Vec::new());
        }

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SearchError::alias(format!(
                "Get alias {} failed with status {}: {}",
                alias, status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let indices = body
            .as_object()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default();

        Ok(indices)
    }

    async fn put_alias(&self, index: &str, alias: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .put_alias(IndicesPutAliasParts::IndexName(&[index], alias))
            .send()
            .await
            .map_err(|e| SearchError::alias(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, alias = %alias, status = %status, body = %error_body, "Alias update failed");
            return Err(SearchError::alias(format!(
                "Aliasing {} as {} failed with status {}: {}",
                index, alias, status, error_body
            )));
        }

        info!(index = %index, alias = %alias, "Alias updated");
        Ok(())
    }

    async fn bulk_index(
        &self,
        index: &str,
        operations: &[BulkOperation],
    ) -> Result<BulkSummary, SearchError> {
        if operations.is_empty() {
            return Ok(BulkSummary::empty());
        }

        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(operations.len() * 2);
        for operation in operations {
            body.push(json!({ "index": { "_id": operation.id } }).into());
            body.push(operation.document.clone().into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::bulk(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchError::bulk(format!(
                "Bulk against {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let summary = Self::parse_bulk_response(operations, &response_body);
        debug!(
            index = %index,
            total = summary.total,
            failed = summary.failed,
            "Bulk request completed"
        );
        Ok(summary)
    }

    async fn apply_tag(&self, mutation: &TagMutation) -> Result<(), SearchError> {
        let script = tag_append_script(&mutation.tag_field);

        let response = self
            .client
            .update(UpdateParts::IndexId(
                &mutation.target_alias,
                &mutation.target_document_id,
            ))
            .body(json!({
                "script": {
                    "source": script,
                    "lang": "painless",
                    "params": { "tag": mutation.tag_value }
                }
            }))
            .send()
            .await
            .map_err(|e| SearchError::update(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(SearchError::not_found(format!(
                "{}/{}",
                mutation.target_alias, mutation.target_document_id
            )));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                alias = %mutation.target_alias,
                doc_id = %mutation.target_document_id,
                status = %status,
                body = %error_body,
                "Tag update failed"
            );
            return Err(SearchError::update(format!(
                "Tag update on {}/{} failed with status {}: {}",
                mutation.target_alias, mutation.target_document_id, status, error_body
            )));
        }

        debug!(
            alias = %mutation.target_alias,
            doc_id = %mutation.target_document_id,
            field = %mutation.tag_field,
            "Tag applied"
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(body["status"].as_str() != Some("red"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operations() -> Vec<BulkOperation> {
        vec![
            BulkOperation::index("a", json!({"title": "first"})),
            BulkOperation::index("b", json!({"title": "second"})),
        ]
    }

    #[test]
    fn test_parse_bulk_response_all_success() {
        let body = json!({
            "took": 3,
            "errors": false,
            "items": [
                { "index": { "_id": "a", "status": 201 } },
                { "index": { "_id": "b", "status": 201 } }
            ]
        });

        let summary = OpenSearchClient::parse_bulk_response(&operations(), &body);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
        assert!(summary.is_complete_success());
    }

    #[test]
    fn test_parse_bulk_response_partial_failure() {
        let body = json!({
            "took": 3,
            "errors": true,
            "items": [
                { "index": { "_id": "a", "status": 201 } },
                { "index": { "_id": "b", "status": 400, "error": {
                    "type": "mapper_parsing_exception",
                    "reason": "failed to parse field [createdAt]"
                } } }
            ]
        });

        let summary = OpenSearchClient::parse_bulk_response(&operations(), &body);

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        let first_failure = summary.first_failure().unwrap();
        assert!(first_failure.to_string().contains("mapper_parsing_exception"));
    }

    #[test]
    fn test_parse_bulk_response_missing_items() {
        let body = json!({ "took": 0, "errors": false });

        let summary = OpenSearchClient::parse_bulk_response(&operations(), &body);

        // No per-item results means no reported failures either way
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
    }
}
