//! # Validation Driver
//!
//! Entry points that wire a document, a tokenizer and a context together,
//! plus the dispatch rule shared by every collection: a union is routed by
//! the shape of the value in hand, anything else by its own kind.

use serde_json::Value;
use tracing::debug;

use crate::context::Context;
use crate::error::DoolallyError;
use crate::field::{Field, FieldKind};
use crate::schema::Schema;
use crate::token::{Shape, Tokenizer};

/// Validate `value` against `schema`.
///
/// The walk stops at the first violation. Neither argument is modified, so
/// repeating the call always gives the same answer.
///
/// # Errors
///
/// [`DoolallyError::Validation`] when the document is rejected.
/// [`DoolallyError::Contract`] signals an engine defect.
pub fn validate(value: &Value, schema: &Schema) -> Result<(), DoolallyError> {
    let root = Field::from(schema.clone());
    let outcome = Tokenizer::new(value)
        .map_err(DoolallyError::from)
        .and_then(|mut tokens| {
            let mut ctx = Context::with_root(&root);
            root.validate_collection(&mut ctx, &mut tokens)
        });

    match &outcome {
        Ok(()) => debug!(schema = schema.name(), "document accepted"),
        Err(err) => debug!(schema = schema.name(), error = %err, "document rejected"),
    }
    outcome
}

/// Validate `value` against a single field. Unlike [`validate`], the root
/// may be a primitive.
///
/// # Errors
///
/// As for [`validate`].
pub fn validate_field(value: &Value, field: &Field) -> Result<(), DoolallyError> {
    let mut ctx = Context::with_root(field);
    match Tokenizer::new(value) {
        Ok(mut tokens) => dispatch(field, &mut ctx, &mut tokens, value),
        Err(_) => dispatch_primitive(field, &ctx, value),
    }
}

/// Validate the element `value`, whose token has just been produced by
/// `tokens`. When `value` is a collection its `Start` token is next.
pub(crate) fn dispatch<'s, 'v>(
    field: &'s Field,
    ctx: &mut Context<'s, 'v>,
    tokens: &mut Tokenizer<'v>,
    value: &'v Value,
) -> Result<(), DoolallyError> {
    if Shape::of(value).is_none() {
        return dispatch_primitive(field, ctx, value);
    }

    match field.kind() {
        // Reports the type mismatch without touching the stream.
        FieldKind::Atomic(_) => field.validate_atomic(ctx, value),
        FieldKind::Collection(_) | FieldKind::Union(_) => field.validate_collection(ctx, tokens),
    }
}

fn dispatch_primitive(field: &Field, ctx: &Context<'_, '_>, value: &Value) -> Result<(), DoolallyError> {
    match field.kind() {
        FieldKind::Atomic(_) | FieldKind::Union(_) => field.validate_atomic(ctx, value),
        FieldKind::Collection(collection) => Err(ctx.type_error(collection.mismatch(value)).into()),
    }
}
