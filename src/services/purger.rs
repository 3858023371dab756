use serde::Serialize;
use tracing::{error, info};

use crate::firestore::{DocumentStore, FieldValue, SESSIONS, TENANT_FIELD, USERS, WORKOUT_LOGS};

/// Children before the members they reference
pub const PURGE_ORDER: [&str; 3] = [WORKOUT_LOGS, SESSIONS, USERS];

#[derive(Debug, Clone, Serialize)]
pub struct CollectionPurge {
    pub collection: String,
    pub deleted: usize,
    pub failed: usize,
    /// Set when the collection could not be queried at all
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PurgeReport {
    pub gym_id: String,
    pub collections: Vec<CollectionPurge>,
}

impl PurgeReport {
    pub fn deleted(&self, collection: &str) -> usize {
        self.collections
            .iter()
            .find(|c| c.collection == collection)
            .map(|c| c.deleted)
            .unwrap_or(0)
    }

    pub fn total_deleted(&self) -> usize {
        self.collections.iter().map(|c| c.deleted).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.collections.iter().any(|c| c.failed > 0 || c.error.is_some())
    }
}

/// Deletes every document tagged with one gym id, one document at a time
pub struct DataPurger<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    gym_id: String,
}

impl<'a, S: DocumentStore + ?Sized> DataPurger<'a, S> {
    pub fn new(store: &'a S, gym_id: impl Into<String>) -> Self {
        Self {
            store,
            gym_id: gym_id.into(),
        }
    }

    pub async fn purge(&self) -> PurgeReport {
        let mut report = PurgeReport {
            gym_id: self.gym_id.clone(),
            collections: Vec::new(),
        };
        for collection in PURGE_ORDER {
            report.collections.push(self.purge_collection(collection).await);
        }
        report
    }

    async fn purge_collection(&self, collection: &str) -> CollectionPurge {
        let mut result = CollectionPurge {
            collection: collection.to_string(),
            deleted: 0,
            failed: 0,
            error: None,
        };

        info!(collection, gym_id = %self.gym_id, "Deleting documents");
        let documents = match self
            .store
            .query_eq(collection, TENANT_FIELD, FieldValue::from(self.gym_id.as_str()), None)
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                error!(collection, "Query failed: {}", e);
                result.error = Some(e.to_string());
                return result;
            }
        };

        for doc in documents {
            match self.store.delete(collection, &doc.id).await {
                Ok(()) => result.deleted += 1,
                Err(e) => {
                    error!(collection, id = %doc.id, "Delete failed: {}", e);
                    result.failed += 1;
                }
            }
        }

        info!(collection, deleted = result.deleted, failed = result.failed, "Collection purged");
        result
    }
}
