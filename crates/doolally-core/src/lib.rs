//! # doolally-core — Streaming JSON Structure Validation
//!
//! Validates already-decoded JSON documents against declarative schemas and
//! derives JSON-Schema documents from the same declarations.
//!
//! ## How a Document Is Walked
//!
//! The document is flattened into a stream of tokens ([`Tokenizer`]). The
//! root schema pulls tokens one at a time, handing each key or index to the
//! field declared for it. Atomic fields judge the value in hand; collection
//! fields keep pulling; unions try their members in declaration order. A
//! [`Context`] tracks which field is active at which path so that the first
//! violation is reported precisely:
//!
//! ```text
//! [/values/0/key:String(min_length=32,max_length=32)] - string too short 2 < 32
//! ```
//!
//! ## Modules
//!
//! - [`token`]: the tokenizer and its path stack.
//! - [`context`]: the active-field stack and error factory.
//! - [`field`]: atomic, collection and union fields, validators.
//! - [`schema`]: named object schemas, the builder, inheritance.
//! - [`validate`](mod@validate): entry points and dispatch.
//! - [`emit`]: JSON-Schema generation.
//! - [`error`]: error types.
//!
//! ## Example
//!
//! ```
//! use doolally_core::{validate, FieldExt, NumberField, Schema, StringField};
//! use serde_json::json;
//!
//! let person = Schema::builder("Person")
//!     .field("name", StringField::new().required())
//!     .field("age", NumberField::new().unsigned().integer().required())
//!     .build();
//!
//! assert!(validate(&json!({"name": "Ann", "age": 30}), &person).is_ok());
//!
//! let err = validate(&json!({"name": "Ann", "age": -1}), &person).unwrap_err();
//! assert_eq!(err.to_string(), "[/age:Number(unsigned,int)] - negative number invalid -1");
//! ```

pub mod context;
pub mod emit;
pub mod error;
pub mod field;
pub mod schema;
pub mod token;
pub mod validate;

pub use context::Context;
pub use emit::json_schema;
pub use error::{DoolallyError, ErrorKind, SchemaError, ValidationError};
pub use field::{
    union_with_null, AnyAtomic, AnyCollection, AnyField, Atomic, BoolField, Collection, Field,
    FieldExt, FieldKind, IntegerEnum, NullField, NumberField, SchemaLessObject, StaticTypeArray,
    StaticTypeObject, StringEnum, StringField, TagObject, Union, Validator,
};
pub use schema::{to_camel_case, Schema, SchemaBuilder};
pub use token::{json_kind, PathSegment, Shape, Token, Tokenizer};
pub use validate::{validate, validate_field};
