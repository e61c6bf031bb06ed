//! Leaf fields: values that never contain other values.
//!
//! Atomic validation only inspects the value it is handed; it never touches
//! the token stream.

use std::collections::BTreeSet;

use serde_json::{json, Map, Number, Value};

use crate::context::Context;
use crate::emit;
use crate::error::ValidationError;

/// A JSON primitive field.
#[derive(Debug, Clone, PartialEq)]
pub enum Atomic {
    String(StringField),
    Number(NumberField),
    Bool(BoolField),
    Null(NullField),
    Any(AnyAtomic),
    StringEnum(StringEnum),
    IntegerEnum(IntegerEnum),
}

impl Atomic {
    pub(crate) fn validate(&self, ctx: &Context<'_, '_>, value: &Value) -> Result<(), ValidationError> {
        match self {
            Self::String(field) => field.validate(ctx, value),
            Self::Number(field) => field.validate(ctx, value),
            Self::Bool(_) => expect_kind(ctx, value.is_boolean(), "boolean"),
            Self::Null(_) => expect_kind(ctx, value.is_null(), "null"),
            Self::Any(_) => expect_kind(
                ctx,
                !matches!(value, Value::Array(_) | Value::Object(_)),
                "number,string,boolean,null",
            ),
            Self::StringEnum(field) => field.validate(ctx, value),
            Self::IntegerEnum(field) => field.validate(ctx, value),
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "String",
            Self::Number(_) => "Number",
            Self::Bool(_) => "Bool",
            Self::Null(_) => "Null",
            Self::Any(_) => "AnyAtomic",
            Self::StringEnum(_) => "StringEnum",
            Self::IntegerEnum(_) => "IntegerEnum",
        }
    }

    pub(crate) fn type_info(&self) -> String {
        let tags = match self {
            Self::String(field) => field.tags(),
            Self::Number(field) => field.tags(),
            Self::IntegerEnum(field) => field.number().tags(),
            Self::Bool(_) | Self::Null(_) | Self::Any(_) | Self::StringEnum(_) => Vec::new(),
        };
        format!("{}({})", self.kind_name(), tags.join(","))
    }

    pub(crate) fn fragment(&self) -> Map<String, Value> {
        match self {
            Self::String(field) => field.fragment(),
            Self::Number(field) => field.fragment(),
            Self::Bool(_) => type_only("boolean"),
            Self::Null(_) => type_only("null"),
            Self::Any(_) => {
                let mut out = Map::new();
                out.insert(
                    "type".into(),
                    json!(["number", "integer", "string", "boolean", "null"]),
                );
                out
            }
            Self::StringEnum(field) => field.fragment(),
            Self::IntegerEnum(field) => field.fragment(),
        }
    }
}

fn type_only(kind: &str) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("type".into(), Value::String(kind.into()));
    out
}

fn expect_kind(ctx: &Context<'_, '_>, matches: bool, expected: &str) -> Result<(), ValidationError> {
    if matches {
        Ok(())
    } else {
        Err(ctx.type_error(format!("expected type in ({expected})")))
    }
}

/// Render a bound the way a human would write it: `0`, not `0.0`.
pub(crate) fn format_bound(bound: f64) -> String {
    match emit::number(bound) {
        Value::Number(number) => number.to_string(),
        _ => bound.to_string(),
    }
}

/// A JSON string, optionally length-bounded. Length is counted in Unicode
/// scalar values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringField {
    min_length: usize,
    max_length: Option<usize>,
}

impl StringField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    fn validate(&self, ctx: &Context<'_, '_>, value: &Value) -> Result<(), ValidationError> {
        let Value::String(text) = value else {
            return Err(ctx.type_error("expected type in (string)"));
        };

        let len = text.chars().count();
        if len < self.min_length {
            return Err(ctx.value_error(format!("string too short {len} < {}", self.min_length)));
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(ctx.value_error(format!("string too long {len} > {max}")));
            }
        }
        Ok(())
    }

    fn tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if self.min_length != 0 {
            tags.push(format!("min_length={}", self.min_length));
        }
        if let Some(max) = self.max_length {
            tags.push(format!("max_length={max}"));
        }
        tags
    }

    fn fragment(&self) -> Map<String, Value> {
        let mut out = type_only("string");
        if self.min_length != 0 {
            out.insert("minLength".into(), json!(self.min_length));
        }
        if let Some(max) = self.max_length {
            out.insert("maxLength".into(), json!(max));
        }
        out
    }
}

/// A JSON number. Booleans are not numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberField {
    signed: bool,
    integer: bool,
    min_value: Option<f64>,
    max_value: Option<f64>,
}

impl Default for NumberField {
    fn default() -> Self {
        Self {
            signed: true,
            integer: false,
            min_value: None,
            max_value: None,
        }
    }
}

impl NumberField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject negative values.
    pub fn unsigned(mut self) -> Self {
        self.signed = false;
        self
    }

    /// Reject values with a fractional part.
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    pub fn min_value(mut self, min: impl Into<f64>) -> Self {
        self.min_value = Some(min.into());
        self
    }

    pub fn max_value(mut self, max: impl Into<f64>) -> Self {
        self.max_value = Some(max.into());
        self
    }

    fn validate(&self, ctx: &Context<'_, '_>, value: &Value) -> Result<(), ValidationError> {
        let Value::Number(number) = value else {
            return Err(ctx.type_error("expected type in (number)"));
        };
        self.check(ctx, number)
    }

    fn check(&self, ctx: &Context<'_, '_>, number: &Number) -> Result<(), ValidationError> {
        let value = number.as_f64().unwrap_or(f64::NAN);

        if !self.signed && value < 0.0 {
            return Err(ctx.value_error(format!("negative number invalid {number}")));
        }

        if self.integer && value.fract() != 0.0 {
            return Err(ctx.value_error(format!("expected int, received {number}")));
        }

        if let Some(min) = self.min_value {
            if value < min {
                return Err(ctx.value_error(format!(
                    "number below min {number} < {}",
                    format_bound(min)
                )));
            }
        }

        if let Some(max) = self.max_value {
            if value > max {
                return Err(ctx.value_error(format!(
                    "number above max {number} > {}",
                    format_bound(max)
                )));
            }
        }
        Ok(())
    }

    fn tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if !self.signed {
            tags.push("unsigned".to_string());
        }
        if self.integer {
            tags.push("int".to_string());
        }
        if let Some(min) = self.min_value {
            tags.push(format!("min_value={}", format_bound(min)));
        }
        if let Some(max) = self.max_value {
            tags.push(format!("max_value={}", format_bound(max)));
        }
        tags
    }

    fn fragment(&self) -> Map<String, Value> {
        let mut out = type_only(if self.integer { "integer" } else { "number" });
        if let Some(min) = self.min_value {
            out.insert("minimum".into(), emit::number(min));
        }
        if let Some(max) = self.max_value {
            out.insert("maximum".into(), emit::number(max));
        }
        if !out.contains_key("minimum") && !self.signed {
            out.insert("minimum".into(), json!(0));
        }
        out
    }
}

/// Exactly `true` or `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolField;

impl BoolField {
    pub fn new() -> Self {
        Self
    }
}

/// Exactly `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullField;

impl NullField {
    pub fn new() -> Self {
        Self
    }
}

/// Any JSON primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyAtomic;

impl AnyAtomic {
    pub fn new() -> Self {
        Self
    }
}

/// `f` as an `i64`, or `None` when it lies outside the `i64` range.
fn exact_i64(f: f64) -> Option<i64> {
    // -2^63 and 2^63: both exact in f64.
    const MIN: f64 = -9_223_372_036_854_775_808.0;
    const MAX: f64 = 9_223_372_036_854_775_808.0;
    (f >= MIN && f < MAX).then(|| f as i64)
}

/// A string drawn from a fixed whitelist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringEnum {
    whitelist: BTreeSet<String>,
}

impl StringEnum {
    pub fn new<I, S>(whitelist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            whitelist: whitelist.into_iter().map(Into::into).collect(),
        }
    }

    /// The accepted values, sorted.
    pub fn whitelist(&self) -> impl Iterator<Item = &str> {
        self.whitelist.iter().map(String::as_str)
    }

    fn validate(&self, ctx: &Context<'_, '_>, value: &Value) -> Result<(), ValidationError> {
        let Value::String(text) = value else {
            return Err(ctx.type_error("expected type in (string)"));
        };
        if !self.whitelist.contains(text) {
            return Err(ctx.value_error(format!("value ({text}) not in whitelist")));
        }
        Ok(())
    }

    fn fragment(&self) -> Map<String, Value> {
        let mut out = type_only("string");
        out.insert(
            "enum".into(),
            emit::enum_preview(self.whitelist.iter().map(|s| json!(s)), 5),
        );
        out
    }
}

/// An integer drawn from a fixed whitelist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegerEnum {
    unsigned: bool,
    whitelist: BTreeSet<i64>,
}

impl IntegerEnum {
    pub fn new(whitelist: impl IntoIterator<Item = i64>) -> Self {
        Self {
            unsigned: false,
            whitelist: whitelist.into_iter().collect(),
        }
    }

    /// Reject negative values.
    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// The accepted values, sorted.
    pub fn whitelist(&self) -> impl Iterator<Item = i64> + '_ {
        self.whitelist.iter().copied()
    }

    fn number(&self) -> NumberField {
        let number = NumberField::new().integer();
        if self.unsigned {
            number.unsigned()
        } else {
            number
        }
    }

    fn validate(&self, ctx: &Context<'_, '_>, value: &Value) -> Result<(), ValidationError> {
        let Value::Number(number) = value else {
            return Err(ctx.type_error("expected type in (number)"));
        };
        self.number().check(ctx, number)?;

        let member = number
            .as_i64()
            .or_else(|| number.as_f64().and_then(exact_i64))
            .is_some_and(|n| self.whitelist.contains(&n));
        if !member {
            return Err(ctx.value_error(format!("value ({number}) not in whitelist")));
        }
        Ok(())
    }

    fn fragment(&self) -> Map<String, Value> {
        let mut out = type_only("integer");
        out.insert(
            "enum".into(),
            emit::enum_preview(self.whitelist.iter().map(|n| json!(n)), 10),
        );
        out
    }
}
