//! # doolally-schemas — Service Payload Schemas
//!
//! The request and response payloads exchanged by the key/value store, the
//! session and login services, the message queue and websocket bridge, and
//! the contact, booking and review endpoints, declared with
//! [`doolally_core`] and collected in a [`Catalog`].
//!
//! [`validators`] holds the string side-constraints the payloads share:
//! fixed-length hex ids, email addresses, phone numbers, dates, times and
//! https URLs.
//!
//! ```
//! use doolally_schemas::Catalog;
//! use serde_json::json;
//!
//! let catalog = Catalog::new().unwrap();
//! let err = catalog
//!     .validate("InsertKVValuesReq", &json!({"values": [{"key": "zz"}]}))
//!     .unwrap_err();
//! assert_eq!(err.validation().unwrap().path(), "/values/0/key");
//! ```

pub mod catalog;
pub mod error;
pub mod validators;

pub use catalog::Catalog;
pub use error::CatalogError;
