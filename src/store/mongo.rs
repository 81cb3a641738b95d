//! MongoDB-backed garment collection.
//!
//! The driver's `Client` keeps its own connection pool, so "acquiring" a
//! connection means checking the server answers a `ping` and handing out a
//! collection handle. An unreachable server fails `acquire` after the
//! configured server-selection timeout instead of hanging the request.
//!
//! Reads go through an untyped `Collection<Document>`. The database enforces
//! no schema, so a document that does not decode as a [`Garment`] is logged
//! and skipped rather than failing the whole query.

use futures::TryStreamExt;
use mongodb::bson::{self, Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tracing::{debug, info, trace, warn};

use super::{Connection, Filter, Store, StoreError};
use crate::config::MongoConfig;
use crate::garment::Garment;

pub struct MongoStore {
    database: Database,
    collection: Collection<Document>,
}

impl MongoStore {
    /// Builds the client. No network traffic happens until the first
    /// `acquire`, so this succeeds even while the database is down.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(config.uri.as_str()).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.server_selection_timeout = Some(config.server_selection_timeout);

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        let collection = database.collection::<Document>(&config.collection);

        info!(
            database = %config.database,
            collection = %config.collection,
            "MongoDB client configured"
        );
        Ok(Self { database, collection })
    }
}

impl Store for MongoStore {
    type Conn = MongoConnection;

    async fn acquire(&self) -> Result<MongoConnection, StoreError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        trace!("mongodb connection acquired");
        Ok(MongoConnection { collection: self.collection.clone() })
    }
}

pub struct MongoConnection {
    collection: Collection<Document>,
}

impl Connection for MongoConnection {
    async fn find(&self, filter: &Filter) -> Result<Vec<Garment>, StoreError> {
        let query = to_document(filter);
        debug!(%query, "find");
        let cursor = self.collection.find(query).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(decode_all(documents))
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Garment>, StoreError> {
        let query = to_document(filter);
        debug!(%query, "find_one");
        let document = self.collection.find_one(query).await?;
        Ok(document.and_then(decode))
    }

    async fn insert(&self, garment: &Garment) -> Result<(), StoreError> {
        self.collection.clone_with_type::<Garment>().insert_one(garment).await?;
        Ok(())
    }

    async fn set_price(&self, code: i64, price: f64) -> Result<u64, StoreError> {
        let result = self
            .collection
            .update_one(doc! { "codigo": code }, doc! { "$set": { "precio": price } })
            .await?;
        Ok(result.matched_count)
    }

    async fn delete(&self, code: i64) -> Result<u64, StoreError> {
        let result = self.collection.delete_one(doc! { "codigo": code }).await?;
        Ok(result.deleted_count)
    }

    async fn release(self) {
        // The handle goes back to the driver's pool when dropped.
        trace!("mongodb connection released");
    }
}

/// Decodes a stored document, or logs and drops it when it is off-schema.
fn decode(document: Document) -> Option<Garment> {
    match bson::from_document::<Garment>(document) {
        Ok(garment) => Some(garment),
        Err(e) => {
            warn!(error = %e, "skipping document that is not a garment");
            None
        }
    }
}

fn decode_all(documents: Vec<Document>) -> Vec<Garment> {
    documents.into_iter().filter_map(decode).collect()
}

/// Translates a [`Filter`] into a MongoDB query document.
fn to_document(filter: &Filter) -> Document {
    match filter {
        Filter::All => doc! {},
        Filter::Code(code) => doc! { "codigo": *code },
        Filter::NameContains(text) => doc! { "nombre": contains(text) },
        Filter::CategoryContains(text) => doc! { "categoria": contains(text) },
        Filter::MinPrice(bound) => doc! { "precio": { "$gte": *bound } },
    }
}

/// Case-insensitive substring match. The text is escaped so user input is
/// never interpreted as a pattern.
fn contains(text: &str) -> Document {
    doc! { "$regex": regex::escape(text), "$options": "i" }
}
