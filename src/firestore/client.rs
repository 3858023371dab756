use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use super::value::{fields_from_json, fields_to_json};
use super::{DocumentStore, FieldValue, Fields, StoredDocument};
use crate::auth::TokenSource;
use crate::error::ServiceError;

const SERVICE: &str = "firestore";
const PRODUCTION_BASE: &str = "https://firestore.googleapis.com";
const LIST_PAGE_SIZE: u32 = 300;

/// Firestore REST v1 client for the `(default)` database
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    tokens: Arc<TokenSource>,
}

impl FirestoreClient {
    pub fn new(http: reqwest::Client, project_id: impl Into<String>, tokens: Arc<TokenSource>) -> Self {
        Self::with_base_url(http, PRODUCTION_BASE, project_id, tokens)
    }

    /// Emulator or test server, e.g. `http://localhost:8080`
    pub fn with_base_url(
        http: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        tokens: Arc<TokenSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            tokens,
        }
    }

    /// `projects/{p}/databases/(default)/documents`
    fn root_path(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn documents_url(&self) -> String {
        format!("{}/v1/{}", self.base_url, self.root_path())
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url(), collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url(), collection, id)
    }

    async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, ServiceError> {
        let token = self.tokens.bearer().await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ServiceError> {
        let response = builder.send().await.map_err(|e| ServiceError::transport(SERVICE, e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::from_response(SERVICE, status.as_u16(), &body))
    }

    async fn send_json(builder: RequestBuilder) -> Result<Value, ServiceError> {
        Self::send(builder)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| ServiceError::decode(SERVICE, e.to_string()))
    }
}

/// Decode a REST `Document` resource
fn parse_document(doc: &Value) -> Result<StoredDocument, ServiceError> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ServiceError::decode(SERVICE, "document without name"))?;
    let id = name.rsplit('/').next().unwrap_or(name).to_string();

    let fields = match doc.get("fields") {
        Some(f) => fields_from_json(f).map_err(|e| ServiceError::decode(SERVICE, e.to_string()))?,
        None => Fields::new(),
    };
    Ok(StoredDocument { id, fields })
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, ServiceError> {
        let url = self.collection_url(collection);
        let body = json!({ "fields": fields_to_json(&fields) });

        let created = Self::send_json(self.request(Method::POST, &url).await?.json(&body)).await?;
        let doc = parse_document(&created)?;
        debug!("Added {}/{}", collection, doc.id);
        Ok(doc.id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), ServiceError> {
        let url = self.document_url(collection, id);
        Self::send(self.request(Method::DELETE, &url).await?).await?;
        debug!("Deleted {}/{}", collection, id);
        Ok(())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: FieldValue,
        limit: Option<u32>,
    ) -> Result<Vec<StoredDocument>, ServiceError> {
        let url = format!("{}:runQuery", self.documents_url());
        let mut structured = json!({
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": value.to_json()
                }
            }
        });
        if let Some(limit) = limit {
            structured["limit"] = json!(limit);
        }

        let body = json!({ "structuredQuery": structured });
        let response = Self::send_json(self.request(Method::POST, &url).await?.json(&body)).await?;

        // Stream of results; entries without `document` only carry read metadata
        let results = response
            .as_array()
            .ok_or_else(|| ServiceError::decode(SERVICE, "runQuery did not return an array"))?;
        results
            .iter()
            .filter_map(|entry| entry.get("document"))
            .map(parse_document)
            .collect()
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, ServiceError> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut builder = self
                .request(Method::GET, &url)
                .await?
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                builder = builder.query(&[("pageToken", token.as_str())]);
            }

            let page = Self::send_json(builder).await?;
            if let Some(docs) = page.get("documents").and_then(Value::as_array) {
                for doc in docs {
                    documents.push(parse_document(doc)?);
                }
            }

            page_token = page
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }

        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, ServiceError> {
        let url = self.document_url(collection, id);
        match Self::send_json(self.request(Method::GET, &url).await?).await {
            Ok(doc) => parse_document(&doc).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn update_fields(&self, collection: &str, id: &str, fields: Fields) -> Result<(), ServiceError> {
        let url = self.document_url(collection, id);
        let mut params: Vec<(&str, &str)> = fields
            .keys()
            .map(|name| ("updateMask.fieldPaths", name.as_str()))
            .collect();
        // Never create the document as a side effect
        params.push(("currentDocument.exists", "true"));

        let body = json!({ "fields": fields_to_json(&fields) });
        Self::send(self.request(Method::PATCH, &url).await?.query(&params).json(&body)).await?;
        debug!("Updated {}/{} ({} fields)", collection, id, fields.len());
        Ok(())
    }
}
