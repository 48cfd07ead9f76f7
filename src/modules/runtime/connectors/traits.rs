//! Document store trait definition

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use portfolio_core::{PageRequest, PortfolioError};
use portfolio_types::Collection;

/// Counts reported by an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Trait for document stores
///
/// Collections are addressed by logical name. Reads return documents in the
/// store's natural (insertion) order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Number of documents in a collection
    async fn count(&self, collection: Collection) -> Result<u64, PortfolioError>;

    /// Documents of a collection, optionally restricted to one page
    async fn find(
        &self,
        collection: Collection,
        window: Option<PageRequest>,
    ) -> Result<Vec<Document>, PortfolioError>;

    /// First document whose fields equal every field of `filter`
    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, PortfolioError>;

    /// Insert a document and return its `_id`
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Bson, PortfolioError>;

    /// Insert a document unless one with the same unique key already exists
    ///
    /// The check and the insert are a single atomic operation. Returns
    /// `None` when the key is taken.
    async fn insert_unique(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Option<Bson>, PortfolioError>;

    /// `$set` the given fields on the document with this `_id`
    async fn update_one(
        &self,
        collection: Collection,
        id: ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome, PortfolioError>;

    /// Delete the document with this `_id`, returning the number removed
    async fn delete_one(&self, collection: Collection, id: ObjectId)
        -> Result<u64, PortfolioError>;

    /// Check if the store is reachable
    async fn health_check(&self) -> Result<(), PortfolioError>;

    /// Close the store and release resources
    async fn close(&self) -> Result<(), PortfolioError>;

    /// Get the store type name
    fn store_type(&self) -> &'static str;
}
