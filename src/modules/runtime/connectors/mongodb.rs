//! MongoDB document store

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::TryStreamExt;
use mongodb::{
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{ClientOptions, FindOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, Collection as MongoCollection, Database, IndexModel,
};
use portfolio_core::{DatabaseConfig, PageRequest, PortfolioError};
use portfolio_types::Collection;
use tracing::{debug, error, warn};

use super::traits::{DocumentStore, UpdateOutcome};

/// Server error code for unique index violations
const DUPLICATE_KEY: i32 = 11000;

/// MongoDB store: one long-lived client, collections resolved by name.
pub struct MongoStore {
    client: Client,
    database: Database,
    /// Collections whose unique key has no unique index behind it
    unindexed: Vec<Collection>,
}

impl MongoStore {
    /// Connect, verify the deployment answers and ensure unique indexes
    ///
    /// A unique index that cannot be built does not fail the connection.
    /// Inserts into that collection fall back to a lookup before inserting.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, PortfolioError> {
        let uri = config.connection_uri()?;
        let mut options = ClientOptions::parse(&uri).await.map_err(|e| {
            PortfolioError::Database(format!("MongoDB options parse failed: {}", e))
        })?;
        options.min_pool_size = options.min_pool_size.or(Some(config.pool.min_pool_size()));
        options.max_pool_size = options.max_pool_size.or(Some(config.pool.max_pool_size()));
        options.connect_timeout = options.connect_timeout.or(Some(config.connect_timeout()));
        options.server_selection_timeout = options
            .server_selection_timeout
            .or(Some(config.connect_timeout()));
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = Client::with_options(options).map_err(|e| {
            PortfolioError::Database(format!("MongoDB client creation failed: {}", e))
        })?;
        let mut store = Self::from_client(client, &config.name);
        store.health_check().await?;
        store.unindexed = store.ensure_indexes().await;
        Ok(store)
    }

    fn from_client(client: Client, database: &str) -> Self {
        let database = client.database(database);
        Self {
            client,
            database,
            unindexed: Vec::new(),
        }
    }

    fn collection(&self, collection: Collection) -> MongoCollection<Document> {
        self.database.collection(collection.name())
    }

    /// Back every collection's unique key with a unique index
    ///
    /// Returns the collections left without one.
    async fn ensure_indexes(&self) -> Vec<Collection> {
        let mut unindexed = Vec::new();
        for collection in Collection::all() {
            let Some(key) = collection.unique_key() else {
                continue;
            };

            let mut keys = Document::new();
            keys.insert(key, 1_i32);
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build();

            match self.collection(*collection).create_index(index, None).await {
                Ok(_) => debug!("Unique index on {}.{} is in place", collection, key),
                Err(e) => {
                    error!(
                        "Failed to ensure unique index on {}.{}, inserts are no longer atomic: {}",
                        collection, key, e
                    );
                    unindexed.push(*collection);
                }
            }
        }
        unindexed
    }

    /// Whether a document with the same unique key value is already stored
    async fn key_taken(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<bool, PortfolioError> {
        let Some(key) = collection.unique_key() else {
            return Ok(false);
        };
        let Some(value) = document.get(key) else {
            return Ok(false);
        };

        let mut filter = Document::new();
        filter.insert(key, value.clone());
        Ok(self.find_one(collection, filter).await?.is_some())
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(ref e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn op_error(op: &str, collection: Collection, err: MongoError) -> PortfolioError {
    PortfolioError::Database(format!("{} on {} failed: {}", op, collection, err))
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn count(&self, collection: Collection) -> Result<u64, PortfolioError> {
        self.collection(collection)
            .count_documents(doc! {}, None)
            .await
            .map_err(|e| op_error("count", collection, e))
    }

    async fn find(
        &self,
        collection: Collection,
        window: Option<PageRequest>,
    ) -> Result<Vec<Document>, PortfolioError> {
        let mut options = FindOptions::default();
        if let Some(page) = window {
            options.skip = Some(page.skip().min(i64::MAX as u64));
            options.limit = Some(i64::try_from(page.limit()).unwrap_or(i64::MAX));
        }

        let cursor = self
            .collection(collection)
            .find(doc! {}, options)
            .await
            .map_err(|e| op_error("find", collection, e))?;
        cursor
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| op_error("find", collection, e))
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, PortfolioError> {
        self.collection(collection)
            .find_one(filter, None)
            .await
            .map_err(|e| op_error("find_one", collection, e))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Bson, PortfolioError> {
        let result = self
            .collection(collection)
            .insert_one(document, None)
            .await
            .map_err(|e| op_error("insert", collection, e))?;
        Ok(result.inserted_id)
    }

    async fn insert_unique(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Option<Bson>, PortfolioError> {
        if self.unindexed.contains(&collection) {
            warn!("Inserting into {} without a unique index", collection);
            if self.key_taken(collection, &document).await? {
                return Ok(None);
            }
        }

        match self.collection(collection).insert_one(document, None).await {
            Ok(result) => Ok(Some(result.inserted_id)),
            Err(e) if is_duplicate_key(&e) => Ok(None),
            Err(e) => Err(op_error("insert", collection, e)),
        }
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome, PortfolioError> {
        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": fields }, None)
            .await
            .map_err(|e| op_error("update", collection, e))?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        id: ObjectId,
    ) -> Result<u64, PortfolioError> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| op_error("delete", collection, e))?;
        Ok(result.deleted_count)
    }

    async fn health_check(&self) -> Result<(), PortfolioError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| PortfolioError::Database(format!("MongoDB ping failed: {}", e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), PortfolioError> {
        self.client.clone().shutdown().await;
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        "mongodb"
    }
}
