//! # Schema Catalog
//!
//! Every service payload schema, registered once under its schema name.
//!
//! | Module       | Schemas                                                     |
//! |--------------|-------------------------------------------------------------|
//! | [`kvstore`]  | `KVElementReq`, `KVElementResp`, `InsertKVValuesReq`, ...    |
//! | [`accounts`] | `SessionResp`, `NewLoginReq`, `InsertBlobResp`              |
//! | [`messaging`]| `RabbitMessage`, `EmailMessage`, `WebSocketReq`, ...        |
//! | [`contact`]  | `ContactByEmailReq`, `NewMessageReq`, `MessagesResp`, ...   |
//! | [`bookings`] | `NewEventReq`, `EventResp`, `ReviewsResp`, ...              |
//!
//! The catalog is built once and is cheap to share: schemas are
//! reference-counted and immutable.

pub mod accounts;
pub mod bookings;
pub mod contact;
pub mod kvstore;
pub mod messaging;

use indexmap::IndexMap;
use serde_json::Value;

use doolally_core::{json_schema, validate, Schema, SchemaError};

use crate::error::CatalogError;

/// All service schemas, keyed by name in registration order.
#[derive(Debug, Clone)]
pub struct Catalog {
    schemas: IndexMap<String, Schema>,
}

impl Catalog {
    pub fn new() -> Result<Self, SchemaError> {
        let mut schemas = IndexMap::new();
        let groups = [
            kvstore::schemas()?,
            accounts::schemas()?,
            messaging::schemas()?,
            contact::schemas(),
            bookings::schemas()?,
        ];
        for schema in groups.into_iter().flatten() {
            schemas.insert(schema.name().to_string(), schema);
        }
        tracing::debug!(schemas = schemas.len(), "schema catalog built");
        Ok(Self { schemas })
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Look up `name`, failing with [`CatalogError::UnknownSchema`].
    pub fn schema(&self, name: &str) -> Result<&Schema, CatalogError> {
        self.get(name)
            .ok_or_else(|| CatalogError::UnknownSchema(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Validate `value` against the schema called `name`.
    pub fn validate(&self, name: &str, value: &Value) -> Result<(), CatalogError> {
        let schema = self.schema(name)?;
        validate(value, schema).map_err(|source| CatalogError::Rejected {
            schema: name.to_string(),
            source,
        })
    }

    /// The JSON-Schema document for the schema called `name`.
    pub fn json_schema(&self, name: &str) -> Result<Value, CatalogError> {
        self.schema(name).map(json_schema)
    }
}
