//! Container fields: arrays and objects.
//!
//! Every collection validator starts by consuming exactly one token, the
//! collection's `Start`, and finishes having consumed its matching `End`.
//! Elements are dispatched with the context pushed so errors raised
//! underneath carry the element's path.

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use super::{AnyField, Bounds, Field, StringField};
use crate::context::Context;
use crate::error::{DoolallyError, SchemaError, ValidationError};
use crate::schema::Schema;
use crate::token::{json_kind, Shape, Token, Tokenizer};
use crate::validate::dispatch;

/// A JSON array or object field.
#[derive(Debug, Clone)]
pub enum Collection {
    Array(StaticTypeArray),
    Tags(TagObject),
    Map(StaticTypeObject),
    SchemaLess(SchemaLessObject),
    Any(AnyCollection),
    Schema(Schema),
}

impl Collection {
    pub(crate) fn validate<'s, 'v>(
        &'s self,
        ctx: &mut Context<'s, 'v>,
        tokens: &mut Tokenizer<'v>,
    ) -> Result<&'v Value, DoolallyError> {
        match self {
            Self::Array(field) => field.validate(ctx, tokens),
            Self::Tags(field) => field.validate(ctx, tokens),
            Self::Map(field) => field.validate(ctx, tokens),
            Self::SchemaLess(field) => field.inner.validate(ctx, tokens),
            Self::Any(field) => field.validate(ctx, tokens),
            Self::Schema(schema) => schema.validate_object(ctx, tokens),
        }
    }

    /// Error message for a primitive found where this collection belongs.
    pub(crate) fn mismatch(&self, value: &Value) -> String {
        match self.shape() {
            Some(shape) => format!("expected {}, received {}", shape.name(), json_kind(value)),
            None => format!("expected a collection, received {}", json_kind(value)),
        }
    }

    fn shape(&self) -> Option<Shape> {
        match self {
            Self::Array(_) => Some(Shape::Array),
            Self::Any(_) => None,
            _ => Some(Shape::Object),
        }
    }

    pub(crate) fn kind_name(&self) -> &str {
        match self {
            Self::Array(_) => "StaticTypeArray",
            Self::Tags(_) => "TagObject",
            Self::Map(_) => "StaticTypeObject",
            Self::SchemaLess(_) => "SchemaLessObject",
            Self::Any(_) => "AnyCollection",
            Self::Schema(schema) => schema.name(),
        }
    }

    pub(crate) fn type_info(&self, recurse: bool) -> String {
        let name = self.kind_name();
        let tags = match self {
            Self::Schema(schema) => return schema.type_info(recurse),
            // AnyCollection has nothing nested to elide.
            Self::Any(field) => field.bounds.tags(),
            _ if recurse => return format!("{name}(..)"),
            Self::Array(field) => {
                let mut tags = field.bounds.tags();
                tags.push(field.element.type_info(true));
                tags
            }
            Self::Tags(field) => field.bounds.tags(),
            Self::Map(field) => {
                let mut tags = field.bounds.tags();
                if field.unique_items {
                    tags.push("unique".to_string());
                }
                tags.push(field.element.type_info(true));
                tags
            }
            Self::SchemaLess(field) => field.inner.bounds.tags(),
        };
        format!("{name}({})", tags.join(","))
    }

    pub(crate) fn fragment(&self) -> Map<String, Value> {
        match self {
            Self::Array(field) => {
                let mut out = Map::new();
                out.insert("type".into(), json!("array"));
                out.insert("items".into(), field.element.jsonschema().clone());
                field.bounds.emit(&mut out, "minItems", "maxItems");
                out
            }
            Self::Tags(field) => {
                let mut out = object_fragment(json!({"type": "string"}));
                field.bounds.emit(&mut out, "minProperties", "maxProperties");
                out
            }
            Self::Map(field) => field.fragment(),
            Self::SchemaLess(field) => field.inner.fragment(),
            Self::Any(field) => {
                let mut out = Map::new();
                out.insert("type".into(), json!(["array", "object"]));
                field.bounds.emit(&mut out, "minItems", "maxItems");
                field.bounds.emit(&mut out, "minProperties", "maxProperties");
                out
            }
            Self::Schema(schema) => schema.fragment(),
        }
    }
}

fn object_fragment(additional: Value) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("type".into(), json!("object"));
    out.insert("properties".into(), json!({}));
    out.insert("additionalProperties".into(), additional);
    out
}

/// Number of direct children of a collection.
pub(crate) fn collection_len(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(entries) => entries.len(),
        _ => 0,
    }
}

/// Consume the opening token of a collection of the given shape.
pub(crate) fn leading_token<'v>(
    ctx: &Context<'_, 'v>,
    tokens: &mut Tokenizer<'v>,
    shape: Shape,
) -> Result<&'v Value, DoolallyError> {
    match tokens.next_token()? {
        Token::Start(found, value) if found == shape => Ok(value),
        Token::Start(_, value) | Token::Element(_, value) => Err(ctx
            .type_error(format!(
                "expected {}, received {}",
                shape.name(),
                json_kind(value)
            ))
            .into()),
        Token::End(found) => Err(DoolallyError::contract(format!(
            "expected {} start, found {} end",
            shape.name(),
            found.name()
        ))),
    }
}

fn unexpected_start() -> DoolallyError {
    DoolallyError::contract("collection start without a preceding element")
}

impl Bounds {
    pub(crate) fn check(&self, ctx: &Context<'_, '_>, len: usize) -> Result<(), ValidationError> {
        if len < self.min {
            return Err(ctx.value_error(format!("collection too short {len} < {}", self.min)));
        }
        if let Some(max) = self.max {
            if len > max {
                return Err(ctx.value_error(format!("collection too long {len} > {max}")));
            }
        }
        Ok(())
    }

    fn tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if self.min != 0 {
            tags.push(format!("min_length={}", self.min));
        }
        if let Some(max) = self.max {
            tags.push(format!("max_length={max}"));
        }
        tags
    }

    pub(crate) fn emit(&self, out: &mut Map<String, Value>, min_key: &str, max_key: &str) {
        if self.min != 0 {
            out.insert(min_key.into(), json!(self.min));
        }
        if let Some(max) = self.max {
            out.insert(max_key.into(), json!(max));
        }
    }
}

macro_rules! bounded {
    ($ty:ty, $($path:ident).+) => {
        impl $ty {
            /// Reject collections with fewer than `min` children.
            pub fn min_length(mut self, min: usize) -> Self {
                self.$($path).+.set_min(min);
                self
            }

            /// Reject collections with more than `max` children.
            pub fn max_length(mut self, max: usize) -> Self {
                self.$($path).+.set_max(max);
                self
            }
        }
    };
}

bounded!(StaticTypeArray, bounds);
bounded!(TagObject, bounds);
bounded!(StaticTypeObject, bounds);
bounded!(SchemaLessObject, inner.bounds);
bounded!(AnyCollection, bounds);

/// An array whose elements all match one field.
#[derive(Debug, Clone)]
pub struct StaticTypeArray {
    element: Box<Field>,
    bounds: Bounds,
}

impl StaticTypeArray {
    pub fn new(element: impl Into<Field>) -> Self {
        Self {
            element: Box::new(element.into()),
            bounds: Bounds::default(),
        }
    }

    /// The field every element must match.
    pub fn element(&self) -> &Field {
        &self.element
    }

    fn validate<'s, 'v>(
        &'s self,
        ctx: &mut Context<'s, 'v>,
        tokens: &mut Tokenizer<'v>,
    ) -> Result<&'v Value, DoolallyError> {
        let collection = leading_token(ctx, tokens, Shape::Array)?;
        self.bounds.check(ctx, collection_len(collection))?;

        let element: &'s Field = &self.element;
        loop {
            match tokens.next_token()? {
                Token::End(_) => break,
                Token::Element(segment, value) => {
                    ctx.scoped(segment, element, |ctx| dispatch(element, ctx, tokens, value))?;
                }
                Token::Start(..) => return Err(unexpected_start()),
            }
        }
        Ok(collection)
    }
}

/// An object whose values are all strings. Keys are unconstrained.
#[derive(Debug, Clone)]
pub struct TagObject {
    value_field: Box<Field>,
    bounds: Bounds,
}

impl Default for TagObject {
    fn default() -> Self {
        Self {
            value_field: Box::new(StringField::new().into()),
            bounds: Bounds::default(),
        }
    }
}

impl TagObject {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate<'s, 'v>(
        &'s self,
        ctx: &mut Context<'s, 'v>,
        tokens: &mut Tokenizer<'v>,
    ) -> Result<&'v Value, DoolallyError> {
        let collection = leading_token(ctx, tokens, Shape::Object)?;
        self.bounds.check(ctx, collection_len(collection))?;

        loop {
            match tokens.next_token()? {
                Token::End(_) => break,
                Token::Element(segment, value) => {
                    ctx.scoped(segment, &self.value_field, |ctx| match value {
                        Value::String(_) => Ok(()),
                        other => Err(ctx.type_error(format!(
                            "TagObject values must be string not {}",
                            json_kind(other)
                        ))),
                    })?;
                }
                Token::Start(..) => return Err(unexpected_start()),
            }
        }
        Ok(collection)
    }
}

/// An object with arbitrary keys whose values all match one field.
#[derive(Debug, Clone)]
pub struct StaticTypeObject {
    element: Box<Field>,
    unique_items: bool,
    bounds: Bounds,
}

impl StaticTypeObject {
    pub fn new(element: impl Into<Field>) -> Self {
        Self {
            element: Box::new(element.into()),
            unique_items: false,
            bounds: Bounds::default(),
        }
    }

    /// Reject objects in which two keys map to the same value.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UniqueItemsRequiresAtomic`] unless the element
    /// field is atomic.
    pub fn unique_items(mut self) -> Result<Self, SchemaError> {
        if !self.element.is_atomic() {
            return Err(SchemaError::UniqueItemsRequiresAtomic {
                element: self.element.type_info(false),
            });
        }
        self.unique_items = true;
        Ok(self)
    }

    /// The field every value must match.
    pub fn element(&self) -> &Field {
        &self.element
    }

    fn validate<'s, 'v>(
        &'s self,
        ctx: &mut Context<'s, 'v>,
        tokens: &mut Tokenizer<'v>,
    ) -> Result<&'v Value, DoolallyError> {
        let collection = leading_token(ctx, tokens, Shape::Object)?;
        self.bounds.check(ctx, collection_len(collection))?;

        let element: &'s Field = &self.element;
        let mut seen = HashSet::new();
        loop {
            match tokens.next_token()? {
                Token::End(_) => break,
                Token::Element(segment, value) => {
                    ctx.scoped(segment, element, |ctx| -> Result<(), DoolallyError> {
                        dispatch(element, ctx, tokens, value)?;
                        if self.unique_items && !seen.insert(unique_key(value)) {
                            return Err(ctx.value_error(format!("duplicate value {value}")).into());
                        }
                        Ok(())
                    })?;
                }
                Token::Start(..) => return Err(unexpected_start()),
            }
        }
        Ok(collection)
    }

    fn fragment(&self) -> Map<String, Value> {
        let mut out = object_fragment(self.element.jsonschema().clone());
        self.bounds.emit(&mut out, "minProperties", "maxProperties");
        if self.unique_items {
            out.insert("uniqueItems".into(), json!(true));
        }
        out
    }
}

/// Equality key for `unique_items`. Numbers compare by value, so `1` and
/// `1.0` collide; everything else compares by its JSON text.
fn unique_key(value: &Value) -> String {
    let Value::Number(number) = value else {
        return value.to_string();
    };
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        // Below 2^63 the cast is exact for integral values.
        Some(f) if f.fract() == 0.0 && f.abs() < 9_223_372_036_854_775_808.0 => (f as i64).to_string(),
        _ => number.to_string(),
    }
}

/// An object with arbitrary keys and arbitrary values.
#[derive(Debug, Clone)]
pub struct SchemaLessObject {
    inner: StaticTypeObject,
}

impl Default for SchemaLessObject {
    fn default() -> Self {
        Self {
            inner: StaticTypeObject::new(AnyField::new()),
        }
    }
}

impl SchemaLessObject {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Any array or object. Contents are skipped, only the size is checked.
#[derive(Debug, Clone, Default)]
pub struct AnyCollection {
    bounds: Bounds,
}

impl AnyCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate<'v>(
        &self,
        ctx: &Context<'_, 'v>,
        tokens: &mut Tokenizer<'v>,
    ) -> Result<&'v Value, DoolallyError> {
        let collection = match tokens.next_token()? {
            Token::Start(_, value) => value,
            Token::Element(_, value) => {
                return Err(ctx
                    .type_error(format!("expected a collection, received {}", json_kind(value)))
                    .into())
            }
            Token::End(_) => return Err(DoolallyError::contract("expected collection start, found end")),
        };
        self.bounds.check(ctx, collection_len(collection))?;
        tokens.drain_collection()?;
        Ok(collection)
    }
}
