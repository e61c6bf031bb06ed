//! # Schemas
//!
//! A [`Schema`] is a named, fixed-shape object: an ordered set of declared
//! fields keyed by wire name, plus the set of names that must be present.
//!
//! ## Declaring a Schema
//!
//! ```
//! use doolally_core::{FieldExt, NumberField, Schema, StringField};
//!
//! let person = Schema::builder("Person")
//!     .field("name", StringField::new().required())
//!     .field("birth_year", NumberField::new().integer())
//!     .build();
//!
//! assert_eq!(person.to_string(), "Person(name(required,String()), birthYear(optional,Number(int)))");
//! ```
//!
//! Declared names are converted to camelCase wire names (`birth_year` →
//! `birthYear`) unless the field carries an explicit title, which is used
//! verbatim.
//!
//! ## Inheritance
//!
//! [`SchemaBuilder::extends`] copies a base schema's fields in first. A field
//! declared again under the same wire name replaces the inherited one in
//! place, so document order follows the base.
//!
//! ## Sharing
//!
//! Schemas are immutable and cheap to clone: the body sits behind an `Arc`
//! and is shared across threads.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::{IndexMap, IndexSet};
use serde_json::{json, Map, Value};

use crate::context::Context;
use crate::emit;
use crate::error::DoolallyError;
use crate::field::{collection_len, leading_token, Bounds, Field, Validator};
use crate::token::{PathSegment, Shape, Token, Tokenizer};
use crate::validate::dispatch;

struct SchemaInner {
    name: String,
    description: String,
    fields: IndexMap<String, Field>,
    required: IndexSet<String>,
    bounds: Bounds,
    validator: Option<Validator>,
    document: OnceLock<Value>,
}

/// A named object with a fixed set of declared fields.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

impl Schema {
    /// Start declaring a schema called `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            description: None,
            bases: Vec::new(),
            fields: Vec::new(),
            bounds: Bounds::default(),
            validator: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Free-text description; the name when none was given.
    pub fn description(&self) -> &str {
        &self.inner.description
    }

    /// Declared fields in document order, keyed by wire name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.inner.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Look up a field by wire name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.inner.fields.get(name)
    }

    /// Wire names of the required fields, in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.inner.required.iter().map(String::as_str)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.inner.required.contains(name)
    }

    pub fn len(&self) -> usize {
        self.inner.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fields.is_empty()
    }

    /// `Name(field(required,Type()), ..)` for small schemas,
    /// `Name(num_required=R,num_optional=O)` otherwise.
    pub fn type_info(&self, recurse: bool) -> String {
        let name = self.name();
        if recurse {
            return format!("{name}(..)");
        }

        if self.inner.fields.len() <= 3 {
            let fields: Vec<String> = self
                .fields()
                .map(|(key, field)| {
                    let presence = if self.is_required(key) { "required" } else { "optional" };
                    format!("{key}({presence},{})", field.type_info(true))
                })
                .collect();
            return format!("{name}({})", fields.join(", "));
        }

        let required = self.inner.required.len();
        let optional = self.inner.fields.len() - required;
        format!("{name}(num_required={required},num_optional={optional})")
    }

    /// The JSON-Schema document for this schema, computed once.
    pub fn jsonschema(&self) -> &Value {
        self.inner
            .document
            .get_or_init(|| emit::wrap(self.fragment(), self.name(), self.description()))
    }

    pub(crate) fn fragment(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .fields()
            .map(|(key, field)| (key.to_string(), field.jsonschema().clone()))
            .collect();

        let mut out = Map::new();
        out.insert("type".into(), json!("object"));
        out.insert("required".into(), json!(self.required_fields().collect::<Vec<_>>()));
        out.insert("properties".into(), Value::Object(properties));
        out.insert("additionalProperties".into(), json!(false));
        out
    }

    pub(crate) fn validate_object<'s, 'v>(
        &'s self,
        ctx: &mut Context<'s, 'v>,
        tokens: &mut Tokenizer<'v>,
    ) -> Result<&'v Value, DoolallyError> {
        let collection = leading_token(ctx, tokens, Shape::Object)?;
        self.inner.bounds.check(ctx, collection_len(collection))?;

        let mut seen: HashSet<&str> = HashSet::new();
        loop {
            match tokens.next_token()? {
                Token::End(_) => break,
                Token::Element(segment, value) => {
                    let PathSegment::Key(key) = segment else {
                        return Err(DoolallyError::contract(format!(
                            "object element without a key: {segment}"
                        )));
                    };
                    let Some(field) = self.inner.fields.get(key) else {
                        return Err(ctx.type_error(format!("unrecognised key ({key})")).into());
                    };
                    seen.insert(key);
                    ctx.scoped(segment, field, |ctx| dispatch(field, ctx, tokens, value))?;
                }
                Token::Start(..) => {
                    return Err(DoolallyError::contract(
                        "collection start without a preceding element",
                    ))
                }
            }
        }

        if let Some(missing) = self.required_fields().find(|name| !seen.contains(name)) {
            return Err(ctx.value_error(format!("missing required field {missing}")).into());
        }

        if let Some(validator) = &self.inner.validator {
            validator.check(ctx, collection)?;
        }
        Ok(collection)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.inner.name)
            .field("fields", &self.inner.fields.keys().collect::<Vec<_>>())
            .field("required", &self.inner.required)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_info(false))
    }
}

/// Collects the declaration of a [`Schema`].
#[must_use]
pub struct SchemaBuilder {
    name: String,
    description: Option<String>,
    bases: Vec<Schema>,
    fields: Vec<(String, Field)>,
    bounds: Bounds,
    validator: Option<Validator>,
}

impl SchemaBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Inherit every field of `base`. Bases are merged in call order,
    /// before any field declared on this builder.
    pub fn extends(mut self, base: &Schema) -> Self {
        self.bases.push(base.clone());
        self
    }

    /// Declare a field. `name` is converted to camelCase unless the field
    /// has an explicit title.
    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.fields.push((name.into(), field.into()));
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.bounds.set_min(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.bounds.set_max(max);
        self
    }

    /// Whole-object validator, run after every field and the required set
    /// have been checked.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(match self.validator.take() {
            Some(existing) => existing.chain(validator),
            None => validator,
        });
        self
    }

    pub fn build(self) -> Schema {
        let mut fields: IndexMap<String, Field> = IndexMap::new();
        for base in &self.bases {
            for (key, field) in base.fields() {
                fields.insert(key.to_string(), field.clone());
            }
        }

        for (name, field) in self.fields {
            let key = match field.title() {
                Some(title) => title.to_string(),
                None => to_camel_case(&name),
            };
            let field = if field.title().is_none() && field.as_schema().is_none() {
                field.with_title(key.clone())
            } else {
                field
            };
            fields.insert(key, field);
        }

        let required = fields
            .iter()
            .filter(|(_, field)| field.is_required())
            .map(|(key, _)| key.clone())
            .collect();

        Schema {
            inner: Arc::new(SchemaInner {
                description: self.description.unwrap_or_else(|| self.name.clone()),
                name: self.name,
                fields,
                required,
                bounds: self.bounds,
                validator: self.validator,
                document: OnceLock::new(),
            }),
        }
    }
}

/// `expiry_time` → `expiryTime`. The first segment is kept as is; each
/// later segment is title-cased: a letter is upper-cased when it follows a
/// non-letter and lower-cased otherwise.
pub fn to_camel_case(name: &str) -> String {
    let mut parts = name.split('_');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut after_letter = false;
        for c in part.chars() {
            if c.is_alphabetic() {
                if after_letter {
                    out.extend(c.to_lowercase());
                } else {
                    out.extend(c.to_uppercase());
                }
                after_letter = true;
            } else {
                out.push(c);
                after_letter = false;
            }
        }
    }
    out
}
