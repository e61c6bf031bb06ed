//! # JSON-Schema Emission
//!
//! Every field kind renders a structural fragment (`type`, bounds, `items`,
//! `properties`, `anyOf`, ...). The helpers here wrap a fragment with the
//! documentation keys and format numbers and enum previews consistently.
//!
//! Emission is one-way: nothing here reads documents back.

use serde_json::{Map, Number, Value};

use crate::schema::Schema;

/// The JSON-Schema document for `schema`.
pub fn json_schema(schema: &Schema) -> Value {
    schema.jsonschema().clone()
}

/// Append `title` and `description` to a fragment.
pub(crate) fn wrap(mut fragment: Map<String, Value>, title: &str, description: &str) -> Value {
    fragment.insert("title".into(), Value::String(title.into()));
    fragment.insert("description".into(), Value::String(description.into()));
    Value::Object(fragment)
}

/// Integral values become JSON integers so bounds read `0`, not `0.0`.
pub(crate) fn number(value: f64) -> Value {
    // 2^53: beyond this an f64 no longer holds every integer.
    const EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() <= EXACT {
        return Value::Number(Number::from(value as i64));
    }
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// The enum keyword for a sorted whitelist: every entry while there are
/// fewer than `limit`, otherwise the first five followed by `".."`.
pub(crate) fn enum_preview(sorted: impl ExactSizeIterator<Item = Value>, limit: usize) -> Value {
    if sorted.len() < limit {
        return Value::Array(sorted.collect());
    }
    let mut preview: Vec<Value> = sorted.take(5).collect();
    preview.push(Value::String("..".into()));
    Value::Array(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(0.0), json!(0));
        assert_eq!(number(-90.0), json!(-90));
        assert_eq!(number(0.5), json!(0.5));
        assert_eq!(number(f64::NAN), Value::Null);
    }

    #[test]
    fn test_wrap_appends_documentation_keys() {
        let mut fragment = Map::new();
        fragment.insert("type".into(), json!("null"));
        assert_eq!(
            wrap(fragment, "t", "d"),
            json!({"type": "null", "title": "t", "description": "d"})
        );
    }

    #[test]
    fn test_enum_preview_limit() {
        let four = ["a", "b", "c", "d"].map(|s| json!(s));
        assert_eq!(enum_preview(four.into_iter(), 5), json!(["a", "b", "c", "d"]));
        let five = ["a", "b", "c", "d", "e"].map(|s| json!(s));
        assert_eq!(
            enum_preview(five.into_iter(), 5),
            json!(["a", "b", "c", "d", "e", ".."])
        );
    }
}
