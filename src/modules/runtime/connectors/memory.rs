//! In-memory document store

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use portfolio_core::{PageRequest, PortfolioError};
use portfolio_types::Collection;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::traits::{DocumentStore, UpdateOutcome};

/// Process-local store keeping each collection as a vector in insertion order
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Put `_id` first, generating one when the document has none
    fn with_id(document: Document) -> (Bson, Document) {
        let id = document
            .get("_id")
            .cloned()
            .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));

        let mut stored = Document::new();
        stored.insert("_id", id.clone());
        for (key, value) in document {
            if key != "_id" {
                stored.insert(key, value);
            }
        }
        (id, stored)
    }

    fn matches(document: &Document, filter: &Document) -> bool {
        filter
            .iter()
            .all(|(key, value)| document.get(key) == Some(value))
    }

    fn to_usize(n: u64) -> usize {
        usize::try_from(n).unwrap_or(usize::MAX)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn count(&self, collection: Collection) -> Result<u64, PortfolioError> {
        let collections = self.collections.read().await;
        let len = collections.get(&collection).map_or(0, Vec::len);
        Ok(len as u64)
    }

    async fn find(
        &self,
        collection: Collection,
        window: Option<PageRequest>,
    ) -> Result<Vec<Document>, PortfolioError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let (skip, limit) = match window {
            Some(page) => (Self::to_usize(page.skip()), Self::to_usize(page.limit())),
            None => (0, usize::MAX),
        };
        Ok(documents.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, PortfolioError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| Self::matches(d, &filter)))
            .cloned())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Bson, PortfolioError> {
        let (id, stored) = Self::with_id(document);
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push(stored);
        Ok(id)
    }

    async fn insert_unique(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Option<Bson>, PortfolioError> {
        // Check and insert happen under the same write lock
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        if let Some(key) = collection.unique_key() {
            if let Some(value) = document.get(key) {
                if documents.iter().any(|d| d.get(key) == Some(value)) {
                    return Ok(None);
                }
            }
        }

        let (id, stored) = Self::with_id(document);
        documents.push(stored);
        Ok(Some(id))
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome, PortfolioError> {
        let mut collections = self.collections.write().await;
        let target = Bson::ObjectId(id);
        let Some(document) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.get("_id") == Some(&target)))
        else {
            return Ok(UpdateOutcome::default());
        };

        let mut modified = false;
        for (key, value) in fields {
            if document.get(&key) != Some(&value) {
                document.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        id: ObjectId,
    ) -> Result<u64, PortfolioError> {
        let mut collections = self.collections.write().await;
        let target = Bson::ObjectId(id);
        let Some(documents) = collections.get_mut(&collection) else {
            return Ok(0);
        };

        match documents.iter().position(|d| d.get("_id") == Some(&target)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn health_check(&self) -> Result<(), PortfolioError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), PortfolioError> {
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_insert_assigns_object_id_first() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Projects, doc! { "title": "Site" })
            .await
            .unwrap();
        assert!(matches!(id, Bson::ObjectId(_)));

        let docs = store.find(Collection::Projects, None).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].keys().next().map(String::as_str), Some("_id"));
        assert_eq!(docs[0].get("_id"), Some(&id));
    }

    #[tokio::test]
    async fn test_find_window_uses_insertion_order() {
        let store = MemoryStore::new();
        for n in 0..12_i32 {
            store
                .insert_one(Collection::Contacts, doc! { "n": n })
                .await
                .unwrap();
        }

        let page = store
            .find(Collection::Contacts, Some(PageRequest::new(3, 5)))
            .await
            .unwrap();
        let ns: Vec<i32> = page.iter().map(|d| d.get_i32("n").unwrap()).collect();
        assert_eq!(ns, vec![10, 11]);
        assert_eq!(store.count(Collection::Contacts).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_insert_unique_rejects_taken_key() {
        let store = MemoryStore::new();
        let first = store
            .insert_unique(Collection::Users, doc! { "email": "a@b.io" })
            .await
            .unwrap();
        let second = store
            .insert_unique(Collection::Users, doc! { "email": "a@b.io" })
            .await
            .unwrap();
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(store.count(Collection::Users).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_insert_unique_inserts_once() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_unique(Collection::Users, doc! { "email": "race@b.io" })
                    .await
                    .unwrap()
            }));
        }

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
        assert_eq!(store.count(Collection::Users).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_sets_fields_only() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Projects, doc! { "title": "Site", "stars": 1_i32 })
            .await
            .unwrap();
        let oid = id.as_object_id().unwrap();

        let outcome = store
            .update_one(Collection::Projects, oid, doc! { "published": true })
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });

        let outcome = store
            .update_one(Collection::Projects, oid, doc! { "published": true })
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 0 });

        let doc = store
            .find_one(Collection::Projects, doc! { "_id": oid })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.get_str("title").unwrap(), "Site");
        assert_eq!(doc.get_i32("stars").unwrap(), 1);
        assert!(doc.get_bool("published").unwrap());
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = MemoryStore::new();
        let outcome = store
            .update_one(Collection::Projects, ObjectId::new(), doc! { "a": 1_i32 })
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::default());
        assert_eq!(
            store
                .delete_one(Collection::Projects, ObjectId::new())
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_delete_removes_document() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Projects, doc! { "title": "Old" })
            .await
            .unwrap();
        let oid = id.as_object_id().unwrap();

        assert_eq!(store.delete_one(Collection::Projects, oid).await.unwrap(), 1);
        assert_eq!(store.count(Collection::Projects).await.unwrap(), 0);
    }
}
