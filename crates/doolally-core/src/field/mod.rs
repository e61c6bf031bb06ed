//! # Element Fields
//!
//! The declarative vocabulary of schemas. A [`Field`] describes what is
//! acceptable at one position of a document: a shared set of metadata
//! (required flag, title, description, custom validator) around a closed
//! [`FieldKind`].
//!
//! ## Kinds
//!
//! - [`Atomic`]: primitives, validated by looking at the value alone.
//! - [`Collection`]: arrays and objects, validated by pulling tokens.
//! - [`Union`]: one of several atomic or collection members, resolved by
//!   trial in declaration order.
//!
//! ## Building Fields
//!
//! Kind structs are built with consuming setters and converted into a
//! [`Field`] with `into()`. Metadata is attached through [`FieldExt`]:
//!
//! ```
//! use doolally_core::{FieldExt, NumberField, StringField};
//!
//! let name = StringField::new().min_length(1).required();
//! let age = NumberField::new().unsigned().integer().described("age in years");
//! assert!(name.is_required());
//! assert!(!age.is_required());
//! ```
//!
//! Fields are immutable once built. The only interior state is the
//! write-once JSON-Schema cache behind [`Field::jsonschema`].

mod atomic;
mod collection;
mod union;

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};

use crate::context::Context;
use crate::emit;
use crate::error::{DoolallyError, ValidationError};
use crate::schema::Schema;
use crate::token::Tokenizer;

pub use atomic::{AnyAtomic, Atomic, BoolField, IntegerEnum, NullField, NumberField, StringEnum, StringField};
pub(crate) use collection::{collection_len, leading_token};
pub use collection::{AnyCollection, Collection, SchemaLessObject, StaticTypeArray, StaticTypeObject, TagObject};
pub use union::{union_with_null, AnyField, Union};

type ValidatorFn = dyn Fn(&Context<'_, '_>, &Value) -> Result<(), ValidationError> + Send + Sync;

/// A custom side-constraint, run after a field's structural checks pass.
///
/// The callback receives the active [`Context`] so it can build errors that
/// carry the current path, and the raw value (for collections, the whole
/// array or object).
#[derive(Clone)]
pub struct Validator(Arc<ValidatorFn>);

impl Validator {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Context<'_, '_>, &Value) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run `self`, then `next` if `self` accepted.
    pub fn chain(self, next: Validator) -> Self {
        Self::from_fn(move |ctx, value| {
            self.check(ctx, value)?;
            next.check(ctx, value)
        })
    }

    pub fn check(&self, ctx: &Context<'_, '_>, value: &Value) -> Result<(), ValidationError> {
        (self.0)(ctx, value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// Min/max child count for collections. `max == None` is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Bounds {
    min: usize,
    max: Option<usize>,
}

impl Bounds {
    pub(crate) fn set_min(&mut self, min: usize) {
        self.min = min;
    }

    pub(crate) fn set_max(&mut self, max: usize) {
        self.max = Some(max);
    }
}

#[derive(Debug, Clone, Default)]
struct FieldMeta {
    required: bool,
    title: Option<String>,
    description: Option<String>,
    validator: Option<Validator>,
}

/// The closed set of field kinds.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Atomic(Atomic),
    Collection(Collection),
    Union(Union),
}

/// A field: a kind plus shared metadata.
#[derive(Debug, Clone)]
pub struct Field {
    meta: FieldMeta,
    kind: FieldKind,
    document: OnceLock<Value>,
}

impl Field {
    fn new(kind: FieldKind) -> Self {
        Self {
            meta: FieldMeta::default(),
            kind,
            document: OnceLock::new(),
        }
    }

    /// Whether an enclosing schema must see this field.
    pub fn is_required(&self) -> bool {
        self.meta.required
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.meta.description.as_deref()
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self.kind, FieldKind::Atomic(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, FieldKind::Collection(_))
    }

    pub fn is_union(&self) -> bool {
        matches!(self.kind, FieldKind::Union(_))
    }

    /// The nested schema, if this field is one.
    pub fn as_schema(&self) -> Option<&Schema> {
        match &self.kind {
            FieldKind::Collection(Collection::Schema(schema)) => Some(schema),
            _ => None,
        }
    }

    /// Short human-readable description of the field, e.g.
    /// `StaticTypeArray(Number())`. With `recurse` set, nested structure is
    /// elided to `..`.
    pub fn type_info(&self, recurse: bool) -> String {
        match &self.kind {
            FieldKind::Atomic(atomic) => atomic.type_info(),
            FieldKind::Collection(collection) => collection.type_info(recurse),
            FieldKind::Union(union) => union.type_info(recurse),
        }
    }

    /// The JSON-Schema document for this field. Computed on first access
    /// and cached for the lifetime of the field.
    pub fn jsonschema(&self) -> &Value {
        self.document.get_or_init(|| {
            let schema = self.as_schema();
            let title = self
                .title()
                .or(schema.map(Schema::name))
                .unwrap_or("title");
            let description = self
                .description()
                .or(schema.map(Schema::description))
                .unwrap_or_else(|| self.kind_name());
            emit::wrap(self.fragment(), title, description)
        })
    }

    pub(crate) fn kind_name(&self) -> &str {
        match &self.kind {
            FieldKind::Atomic(atomic) => atomic.kind_name(),
            FieldKind::Collection(collection) => collection.kind_name(),
            FieldKind::Union(union) => union.kind_name(),
        }
    }

    pub(crate) fn fragment(&self) -> Map<String, Value> {
        match &self.kind {
            FieldKind::Atomic(atomic) => atomic.fragment(),
            FieldKind::Collection(collection) => collection.fragment(),
            FieldKind::Union(union) => union.fragment(),
        }
    }

    /// Validate a primitive against this field.
    pub(crate) fn validate_atomic(&self, ctx: &Context<'_, '_>, value: &Value) -> Result<(), DoolallyError> {
        match &self.kind {
            FieldKind::Atomic(atomic) => atomic.validate(ctx, value)?,
            FieldKind::Union(union) => union.validate_atomic(ctx, value)?,
            FieldKind::Collection(_) => {
                return Err(DoolallyError::contract(format!(
                    "validate_atomic called on collection field {self}"
                )))
            }
        }
        self.run_validator(ctx, value)
    }

    /// Validate the collection whose `Start` token is next in `tokens`.
    pub(crate) fn validate_collection<'s, 'v>(
        &'s self,
        ctx: &mut Context<'s, 'v>,
        tokens: &mut Tokenizer<'v>,
    ) -> Result<(), DoolallyError> {
        let collection = match &self.kind {
            FieldKind::Collection(collection) => collection.validate(ctx, tokens)?,
            FieldKind::Union(union) => union.validate_collection(ctx, tokens)?,
            FieldKind::Atomic(_) => {
                return Err(DoolallyError::contract(format!(
                    "validate_collection called on atomic field {self}"
                )))
            }
        };
        self.run_validator(ctx, collection)
    }

    fn run_validator(&self, ctx: &Context<'_, '_>, value: &Value) -> Result<(), DoolallyError> {
        if let Some(validator) = &self.meta.validator {
            validator.check(ctx, value)?;
        }
        Ok(())
    }

    fn with_meta(mut self, update: impl FnOnce(&mut FieldMeta)) -> Self {
        update(&mut self.meta);
        self.document = OnceLock::new();
        self
    }

    pub(crate) fn with_title(self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.with_meta(|meta| meta.title = Some(title))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_info(false))
    }
}

/// Metadata setters available on every field and field kind.
///
/// Each setter converts into a [`Field`], so kind-specific setters must be
/// called first.
pub trait FieldExt: Into<Field> + Sized {
    /// Mark the field as required in its enclosing schema.
    fn required(self) -> Field {
        self.into().with_meta(|meta| meta.required = true)
    }

    /// Mark the field as optional (the default).
    fn optional(self) -> Field {
        self.into().with_meta(|meta| meta.required = false)
    }

    /// Set the title. Inside a schema the title doubles as the wire name.
    fn titled(self, title: impl Into<String>) -> Field {
        self.into().with_title(title)
    }

    fn described(self, description: impl Into<String>) -> Field {
        let description = description.into();
        self.into().with_meta(|meta| meta.description = Some(description))
    }

    /// Attach a custom validator. A second call chains after the first.
    fn validated_by(self, validator: Validator) -> Field {
        self.into().with_meta(|meta| {
            meta.validator = Some(match meta.validator.take() {
                Some(existing) => existing.chain(validator),
                None => validator,
            });
        })
    }
}

impl<T: Into<Field>> FieldExt for T {}

macro_rules! into_field {
    ($($ty:ty => $wrap:expr),+ $(,)?) => {
        $(
            impl From<$ty> for Field {
                fn from(kind: $ty) -> Self {
                    Field::new($wrap(kind))
                }
            }
        )+
    };
}

into_field! {
    StringField => |f| FieldKind::Atomic(Atomic::String(f)),
    NumberField => |f| FieldKind::Atomic(Atomic::Number(f)),
    BoolField => |f| FieldKind::Atomic(Atomic::Bool(f)),
    NullField => |f| FieldKind::Atomic(Atomic::Null(f)),
    AnyAtomic => |f| FieldKind::Atomic(Atomic::Any(f)),
    StringEnum => |f| FieldKind::Atomic(Atomic::StringEnum(f)),
    IntegerEnum => |f| FieldKind::Atomic(Atomic::IntegerEnum(f)),
    StaticTypeArray => |f| FieldKind::Collection(Collection::Array(f)),
    TagObject => |f| FieldKind::Collection(Collection::Tags(f)),
    StaticTypeObject => |f| FieldKind::Collection(Collection::Map(f)),
    SchemaLessObject => |f| FieldKind::Collection(Collection::SchemaLess(f)),
    AnyCollection => |f| FieldKind::Collection(Collection::Any(f)),
    Schema => |f| FieldKind::Collection(Collection::Schema(f)),
    Union => FieldKind::Union,
    AnyField => |_| FieldKind::Union(Union::any()),
}
