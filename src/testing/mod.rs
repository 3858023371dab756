use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use crate::error::ServiceError;
use crate::firestore::{DocumentStore, FieldValue, Fields, StoredDocument};
use crate::identity::{AccountRecord, AuthAdmin, CreateOutcome, NewAccount, RoleClaims};

fn injected(service: &'static str, what: &str) -> ServiceError {
    ServiceError::Api {
        service,
        status: 500,
        code: Some("INTERNAL".into()),
        message: format!("injected failure: {}", what),
    }
}

/// In-memory document store keyed by collection, ids in insertion order
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, Vec<StoredDocument>>>,
    next_id: Mutex<u64>,
    failing_deletes: Mutex<HashSet<String>>,
    failing_adds: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `delete` fail for this document id
    pub fn fail_delete_of(&self, id: &str) {
        self.failing_deletes.lock().unwrap().insert(id.to_string());
    }

    /// Make every `add` into this collection fail
    pub fn fail_adds_to(&self, collection: &str) {
        self.failing_adds.lock().unwrap().insert(collection.to_string());
    }

    pub fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn count_where(&self, collection: &str, field: &str, value: &str) -> usize {
        self.documents(collection)
            .iter()
            .filter(|d| d.str_field(field) == Some(value))
            .count()
    }

    pub fn insert_with_id(&self, collection: &str, id: &str, fields: Fields) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.to_string(),
                fields,
            });
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, ServiceError> {
        if self.failing_adds.lock().unwrap().contains(collection) {
            return Err(injected("firestore", collection));
        }
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("doc{:04}", *next)
        };
        self.insert_with_id(collection, &id, fields);
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), ServiceError> {
        if self.failing_deletes.lock().unwrap().contains(id) {
            return Err(injected("firestore", id));
        }
        if let Some(docs) = self.collections.lock().unwrap().get_mut(collection) {
            docs.retain(|d| d.id != id);
        }
        Ok(())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: FieldValue,
        limit: Option<u32>,
    ) -> Result<Vec<StoredDocument>, ServiceError> {
        let matches = self
            .documents(collection)
            .into_iter()
            .filter(|d| d.get(field) == Some(&value));
        Ok(match limit {
            Some(n) => matches.take(n as usize).collect(),
            None => matches.collect(),
        })
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, ServiceError> {
        Ok(self.documents(collection))
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, ServiceError> {
        Ok(self.documents(collection).into_iter().find(|d| d.id == id))
    }

    async fn update_fields(&self, collection: &str, id: &str, fields: Fields) -> Result<(), ServiceError> {
        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| ServiceError::from_response("firestore", 404, "{}"))?;
        doc.fields.extend(fields);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryAccount {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub claims: Option<RoleClaims>,
}

/// In-memory auth service with email uniqueness
#[derive(Default)]
pub struct MemoryAuth {
    accounts: Mutex<Vec<MemoryAccount>>,
    failing_emails: Mutex<HashSet<String>>,
    unlisted_emails: Mutex<HashSet<String>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create_of(&self, email: &str) {
        self.failing_emails.lock().unwrap().insert(email.to_string());
    }

    /// Account still conflicts on create but lookups no longer find it
    pub fn unlist(&self, email: &str) {
        self.unlisted_emails.lock().unwrap().insert(email.to_string());
    }

    pub fn accounts(&self) -> Vec<MemoryAccount> {
        self.accounts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthAdmin for MemoryAuth {
    async fn create_account(&self, account: &NewAccount) -> CreateOutcome {
        if self.failing_emails.lock().unwrap().contains(&account.email) {
            return CreateOutcome::Failed(injected("identitytoolkit", &account.email));
        }
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.email == account.email) {
            return CreateOutcome::Conflict;
        }
        let uid = format!("uid{}", accounts.len() + 1);
        accounts.push(MemoryAccount {
            uid: uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            claims: None,
        });
        CreateOutcome::Created { uid }
    }

    async fn set_role_claims(&self, uid: &str, claims: &RoleClaims) -> Result<(), ServiceError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| a.uid == uid)
            .ok_or_else(|| ServiceError::from_response("identitytoolkit", 400, r#"{"error":{"message":"USER_NOT_FOUND"}}"#))?;
        account.claims = Some(claims.clone());
        Ok(())
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<AccountRecord>, ServiceError> {
        if self.unlisted_emails.lock().unwrap().contains(email) {
            return Ok(None);
        }
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .map(|a| AccountRecord {
                uid: a.uid.clone(),
                email: a.email.clone(),
                display_name: Some(a.display_name.clone()),
            }))
    }
}
