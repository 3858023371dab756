//! Document store access.
//!
//! Services work against [`DocumentStore`]; [`client::FirestoreClient`] is the
//! Firestore REST implementation.

pub mod client;
pub mod value;

use async_trait::async_trait;

use crate::error::ServiceError;
pub use client::FirestoreClient;
pub use value::{FieldValue, Fields};

pub const USERS: &str = "users";
pub const SESSIONS: &str = "sessions";
pub const WORKOUT_LOGS: &str = "workoutLogs";
pub const GYMS: &str = "gyms";

/// Field every tenant-owned document carries
pub const TENANT_FIELD: &str = "gymId";

/// A document read back from a collection
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Fields,
}

impl StoredDocument {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert with a generated id, returning the id
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, ServiceError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), ServiceError>;

    /// Documents whose `field` equals `value`
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: FieldValue,
        limit: Option<u32>,
    ) -> Result<Vec<StoredDocument>, ServiceError>;

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, ServiceError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, ServiceError>;

    /// Set the given fields on an existing document, leaving the others untouched
    async fn update_fields(&self, collection: &str, id: &str, fields: Fields) -> Result<(), ServiceError>;
}
