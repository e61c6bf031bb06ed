//! Unions: a field accepting any one of several member shapes.
//!
//! Members are split into an atomic bucket and a collection bucket at
//! construction. At validation time the value's own shape picks the bucket
//! and members are tried in declaration order; the first one that accepts
//! wins. Collection members are tried against a forked tokenizer so a
//! failed attempt never disturbs the outer stream.

use serde_json::{json, Map, Value};
use tracing::trace;

use super::{AnyAtomic, AnyCollection, Field, FieldKind, NullField};
use crate::context::Context;
use crate::error::{DoolallyError, SchemaError};
use crate::token::{json_kind, Token, Tokenizer};

const EXHAUSTED: &str = "no element_field in union passes validation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Declared,
    Any,
}

/// A field accepting any one of its members.
#[derive(Debug, Clone)]
pub struct Union {
    atomic: Vec<Field>,
    collection: Vec<Field>,
    flavor: Flavor,
}

impl Union {
    /// Build a union from `members`, in order of preference.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NestedUnion`] if a member is itself a union.
    pub fn new(members: impl IntoIterator<Item = Field>) -> Result<Self, SchemaError> {
        let mut union = Self {
            atomic: Vec::new(),
            collection: Vec::new(),
            flavor: Flavor::Declared,
        };

        for member in members {
            match member.kind() {
                FieldKind::Atomic(_) => union.atomic.push(member),
                FieldKind::Collection(_) => union.collection.push(member),
                FieldKind::Union(_) => {
                    return Err(SchemaError::NestedUnion {
                        member: member.type_info(false),
                    })
                }
            }
        }
        Ok(union)
    }

    pub(crate) fn any() -> Self {
        Self {
            atomic: vec![AnyAtomic::new().into()],
            collection: vec![AnyCollection::new().into()],
            flavor: Flavor::Any,
        }
    }

    /// Members in the order they are tried: atomic ones first, then
    /// collections, each in declaration order.
    pub fn members(&self) -> impl Iterator<Item = &Field> {
        self.atomic.iter().chain(self.collection.iter())
    }

    pub(crate) fn validate_atomic(&self, ctx: &Context<'_, '_>, value: &Value) -> Result<(), DoolallyError> {
        for member in &self.atomic {
            match member.validate_atomic(ctx, value) {
                Ok(()) => return Ok(()),
                Err(DoolallyError::Validation(err)) => {
                    trace!(branch = %member, error = %err, "union branch rejected");
                }
                Err(err) => return Err(err),
            }
        }
        Err(ctx.value_error(EXHAUSTED).into())
    }

    pub(crate) fn validate_collection<'s, 'v>(
        &'s self,
        ctx: &mut Context<'s, 'v>,
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

        for member in &self.collection {
            let mut fork = Tokenizer::with_path(collection, tokens.path().to_vec())?;
            match member.validate_collection(ctx, &mut fork) {
                Ok(()) => {
                    tokens.drain_collection()?;
                    return Ok(collection);
                }
                Err(DoolallyError::Validation(err)) => {
                    trace!(branch = %member, error = %err, "union branch rejected");
                }
                Err(err) => return Err(err),
            }
        }
        Err(ctx.value_error(EXHAUSTED).into())
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self.flavor {
            Flavor::Declared => "Union",
            Flavor::Any => "Any",
        }
    }

    pub(crate) fn type_info(&self, recurse: bool) -> String {
        let name = self.kind_name();
        if self.flavor == Flavor::Any {
            return format!("{name}()");
        }
        if recurse {
            return format!("{name}(..)");
        }
        let members: Vec<String> = self.members().map(|member| member.type_info(false)).collect();
        format!("{name}({})", members.join(", "))
    }

    pub(crate) fn fragment(&self) -> Map<String, Value> {
        let mut out = Map::new();
        match self.flavor {
            Flavor::Any => {
                out.insert(
                    "type".into(),
                    json!(["number", "integer", "string", "boolean", "null", "object", "array"]),
                );
            }
            Flavor::Declared => {
                let members: Vec<Value> = self.members().map(|member| member.jsonschema().clone()).collect();
                out.insert("anyOf".into(), Value::Array(members));
            }
        }
        out
    }
}

/// A union of `members` plus a trailing [`NullField`] branch: the key must
/// be present but its value may be `null`.
///
/// # Errors
///
/// Returns [`SchemaError::NestedUnion`] if a member is itself a union.
pub fn union_with_null(members: impl IntoIterator<Item = Field>) -> Result<Union, SchemaError> {
    Union::new(members.into_iter().chain(std::iter::once(NullField::new().into())))
}

/// Any JSON value at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyField;

impl AnyField {
    pub fn new() -> Self {
        Self
    }
}
