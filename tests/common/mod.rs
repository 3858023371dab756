#![allow(dead_code)]

//! In-process stand-in for the Identity Toolkit and Firestore REST APIs.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use gym_admin::auth::TokenSource;
use gym_admin::firestore::FirestoreClient;
use gym_admin::identity::IdentityToolkitClient;

pub const PROJECT: &str = "demo-gym-match";

/// Firestore list pages are capped so paging gets exercised
const MAX_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone)]
pub struct FakeAccount {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub custom_attributes: Option<String>,
}

#[derive(Default)]
struct FakeState {
    accounts: Vec<FakeAccount>,
    // collection -> (id, fields) in insertion order
    documents: BTreeMap<String, Vec<(String, Value)>>,
    next_id: u64,
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeGoogle {
    pub base_url: String,
    state: Shared,
}

impl FakeGoogle {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind fake server")?;

        let state: Shared = Arc::new(Mutex::new(FakeState::default()));
        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        })
    }

    pub fn identity_client(&self) -> IdentityToolkitClient {
        IdentityToolkitClient::with_base_url(
            reqwest::Client::new(),
            self.base_url.clone(),
            PROJECT,
            Arc::new(TokenSource::emulator()),
        )
    }

    pub fn firestore_client(&self) -> FirestoreClient {
        FirestoreClient::with_base_url(
            reqwest::Client::new(),
            self.base_url.clone(),
            PROJECT,
            Arc::new(TokenSource::emulator()),
        )
    }

    pub fn accounts(&self) -> Vec<FakeAccount> {
        self.state.lock().unwrap().accounts.clone()
    }

    /// Claims of an account, decoded from the stored attribute string
    pub fn claims_of(&self, email: &str) -> Option<Value> {
        self.accounts()
            .into_iter()
            .find(|a| a.email == email)
            .and_then(|a| a.custom_attributes)
            .and_then(|s| serde_json::from_str(&s).ok())
    }

    pub fn documents(&self, collection: &str) -> Vec<(String, Value)> {
        self.state
            .lock()
            .unwrap()
            .documents
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn count_with_gym(&self, collection: &str, gym_id: &str) -> usize {
        self.documents(collection)
            .iter()
            .filter(|(_, fields)| fields["gymId"]["stringValue"] == gym_id)
            .count()
    }

    pub fn insert(&self, collection: &str, id: &str, fields: Value) {
        self.state
            .lock()
            .unwrap()
            .documents
            .entry(collection.to_string())
            .or_default()
            .push((id.to_string(), fields));
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = json!({ "error": { "code": status.as_u16(), "message": message } });
    (status, Json(body)).into_response()
}

fn document_json(collection: &str, id: &str, fields: &Value) -> Value {
    json!({
        "name": format!("projects/{}/databases/(default)/documents/{}/{}", PROJECT, collection, id),
        "fields": fields,
    })
}

fn query_params(uri: &Uri) -> Vec<(String, String)> {
    uri.query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

async fn handle(State(state): State<Shared>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    dispatch(&state, &method, &uri, &headers, &body)
}

fn dispatch(state: &Shared, method: &Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));
    if !authorized {
        return error(StatusCode::UNAUTHORIZED, "missing bearer token");
    }

    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(_) => return error(StatusCode::BAD_REQUEST, "INVALID_JSON"),
        }
    };

    let path = uri.path().to_string();
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let mut state = state.lock().unwrap();

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["v1", "projects", _, "accounts"]) => sign_up(&mut state, &body),
        ("POST", ["v1", "projects", _, "accounts:update"]) => update_account(&mut state, &body),
        ("POST", ["v1", "projects", _, "accounts:lookup"]) => lookup(&state, &body),
        ("POST", ["v1", "projects", _, "databases", _, "documents:runQuery"]) => run_query(&state, &body),
        ("POST", ["v1", "projects", _, "databases", _, "documents", collection]) => {
            add_document(&mut state, collection, &body)
        }
        ("GET", ["v1", "projects", _, "databases", _, "documents", collection]) => {
            list_documents(&state, collection, &query_params(uri))
        }
        ("GET", ["v1", "projects", _, "databases", _, "documents", collection, id]) => {
            match find(&state, collection, id) {
                Some(fields) => Json(document_json(collection, id, &fields)).into_response(),
                None => error(StatusCode::NOT_FOUND, "Document not found"),
            }
        }
        ("DELETE", ["v1", "projects", _, "databases", _, "documents", collection, id]) => {
            if let Some(docs) = state.documents.get_mut(*collection) {
                docs.retain(|(doc_id, _)| doc_id.as_str() != *id);
            }
            Json(json!({})).into_response()
        }
        ("PATCH", ["v1", "projects", _, "databases", _, "documents", collection, id]) => {
            patch_document(&mut state, collection, id, &query_params(uri), &body)
        }
        _ => error(StatusCode::NOT_FOUND, "no such route"),
    }
}

fn sign_up(state: &mut FakeState, body: &Value) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if state.accounts.iter().any(|a| a.email == email) {
        return error(StatusCode::BAD_REQUEST, "EMAIL_EXISTS");
    }
    let uid = format!("uid{}", state.accounts.len() + 1);
    state.accounts.push(FakeAccount {
        uid: uid.clone(),
        email: email.clone(),
        display_name: body["displayName"].as_str().unwrap_or_default().to_string(),
        custom_attributes: None,
    });
    Json(json!({ "localId": uid, "email": email })).into_response()
}

fn update_account(state: &mut FakeState, body: &Value) -> Response {
    let uid = body["localId"].as_str().unwrap_or_default();
    match state.accounts.iter_mut().find(|a| a.uid == uid) {
        Some(account) => {
            account.custom_attributes = body["customAttributes"].as_str().map(str::to_string);
            Json(json!({ "localId": uid })).into_response()
        }
        None => error(StatusCode::BAD_REQUEST, "USER_NOT_FOUND"),
    }
}

fn lookup(state: &FakeState, body: &Value) -> Response {
    let emails: Vec<&str> = body["email"]
        .as_array()
        .map(|a| a.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let users: Vec<Value> = state
        .accounts
        .iter()
        .filter(|a| emails.contains(&a.email.as_str()))
        .map(|a| json!({ "localId": a.uid, "email": a.email, "displayName": a.display_name }))
        .collect();

    if users.is_empty() {
        Json(json!({ "kind": "identitytoolkit#GetAccountInfoResponse" })).into_response()
    } else {
        Json(json!({ "users": users })).into_response()
    }
}

fn find(state: &FakeState, collection: &str, id: &str) -> Option<Value> {
    state
        .documents
        .get(collection)?
        .iter()
        .find(|(doc_id, _)| doc_id == id)
        .map(|(_, fields)| fields.clone())
}

fn add_document(state: &mut FakeState, collection: &str, body: &Value) -> Response {
    state.next_id += 1;
    let id = format!("auto{:05}", state.next_id);
    let fields = body.get("fields").cloned().unwrap_or_else(|| json!({}));
    state
        .documents
        .entry(collection.to_string())
        .or_default()
        .push((id.clone(), fields.clone()));
    Json(document_json(collection, &id, &fields)).into_response()
}

fn list_documents(state: &FakeState, collection: &str, params: &[(String, String)]) -> Response {
    let param = |name: &str| params.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone());
    let page_size = param("pageSize")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(MAX_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);
    let offset = param("pageToken").and_then(|v| v.parse::<usize>().ok()).unwrap_or(0);

    let docs = state.documents.get(collection).cloned().unwrap_or_default();
    let page: Vec<Value> = docs
        .iter()
        .skip(offset)
        .take(page_size)
        .map(|(id, fields)| document_json(collection, id, fields))
        .collect();

    let mut response = json!({});
    if !page.is_empty() {
        response["documents"] = json!(page);
    }
    if offset + page_size < docs.len() {
        response["nextPageToken"] = json!((offset + page_size).to_string());
    }
    Json(response).into_response()
}

fn patch_document(
    state: &mut FakeState,
    collection: &str,
    id: &str,
    params: &[(String, String)],
    body: &Value,
) -> Response {
    let must_exist = params.iter().any(|(k, v)| k == "currentDocument.exists" && v == "true");
    let mask: Vec<&str> = params
        .iter()
        .filter(|(k, _)| k == "updateMask.fieldPaths")
        .map(|(_, v)| v.as_str())
        .collect();

    let docs = state.documents.entry(collection.to_string()).or_default();
    let index = match docs.iter().position(|(doc_id, _)| doc_id == id) {
        Some(index) => index,
        None if must_exist => return error(StatusCode::NOT_FOUND, "Document not found"),
        None => {
            docs.push((id.to_string(), json!({})));
            docs.len() - 1
        }
    };
    let fields = &mut docs[index].1;

    for path in mask {
        match body["fields"].get(path) {
            Some(value) => fields[path] = value.clone(),
            None => {
                if let Some(obj) = fields.as_object_mut() {
                    obj.remove(path);
                }
            }
        }
    }
    let fields = fields.clone();
    Json(document_json(collection, id, &fields)).into_response()
}

fn run_query(state: &FakeState, body: &Value) -> Response {
    let query = &body["structuredQuery"];
    let collection = query["from"][0]["collectionId"].as_str().unwrap_or_default();
    let filter = &query["where"]["fieldFilter"];
    let field = filter["field"]["fieldPath"].as_str().unwrap_or_default();
    let expected = &filter["value"];
    let limit = query["limit"].as_u64().map(|l| l as usize).unwrap_or(usize::MAX);

    let results: Vec<Value> = state
        .documents
        .get(collection)
        .map(|docs| {
            docs.iter()
                .filter(|(_, fields)| &fields[field] == expected)
                .take(limit)
                .map(|(id, fields)| json!({ "document": document_json(collection, id, fields), "readTime": "2026-10-18T00:00:00Z" }))
                .collect()
        })
        .unwrap_or_default();

    if results.is_empty() {
        // Firestore still answers with one metadata-only entry
        return Json(json!([{ "readTime": "2026-10-18T00:00:00Z" }])).into_response();
    }
    Json(Value::Array(results)).into_response()
}
