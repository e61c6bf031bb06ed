//! # Tokenizer
//!
//! Flattens a decoded JSON collection into a single-pass stream of
//! structural events. Validators pull tokens one at a time, so a schema can
//! reject a document at the first offending element without ever looking at
//! the rest of it.
//!
//! ## Token Grammar
//!
//! ```text
//! collection := Start(shape, collection) element* End(shape)
//! element    := Element(segment, value) collection?
//! ```
//!
//! An `Element` whose value is itself an array or object is immediately
//! followed by that collection's `Start` ... `End` run.
//!
//! ## Path Stack
//!
//! The tokenizer keeps the path from the root to the current element. A
//! segment is pushed when its `Element` token is produced and popped once
//! the element (and any nested collection beneath it) has been fully
//! consumed, so the path length always equals the current nesting depth.

use std::fmt;
use std::iter::Enumerate;
use std::slice;

use serde_json::{map, Value};

use crate::error::{DoolallyError, ErrorKind, ValidationError};

/// The two collection shapes JSON knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `[` ... `]`
    Array,
    /// `{` ... `}`
    Object,
}

impl Shape {
    /// The shape of `value`, or `None` for primitives.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Array(_) => Some(Self::Array),
            Value::Object(_) => Some(Self::Object),
            _ => None,
        }
    }

    /// Lower-case JSON name of the shape.
    pub fn name(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Lower-case JSON kind name of a value, used in error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One step of a path from the root of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathSegment<'v> {
    /// The document root; renders as the empty string.
    Root,
    /// Position inside an array.
    Index(usize),
    /// Key inside an object.
    Key(&'v str),
}

impl fmt::Display for PathSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => Ok(()),
            Self::Index(index) => write!(f, "{index}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

/// Join path segments with `/`.
pub(crate) fn join_path(segments: impl IntoIterator<Item = impl fmt::Display>) -> String {
    segments
        .into_iter()
        .map(|segment| segment.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Render a path measured from the document root: `/a/0/b`, or the empty
/// string for the root itself. Matches [`Context::path`](crate::Context::path).
pub(crate) fn rooted_path(segments: &[PathSegment<'_>]) -> String {
    join_path(std::iter::once(&PathSegment::Root).chain(segments))
}

/// A structural event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'v> {
    /// A collection opens. Carries the whole collection.
    Start(Shape, &'v Value),
    /// An array index or object key, with its value.
    Element(PathSegment<'v>, &'v Value),
    /// A collection closes.
    End(Shape),
}

enum Entries<'v> {
    Array(Enumerate<slice::Iter<'v, Value>>),
    Object(map::Iter<'v>),
}

struct Frame<'v> {
    shape: Shape,
    entries: Entries<'v>,
    // The last element produced was a primitive whose segment is still on
    // the path stack.
    leaf_open: bool,
}

impl<'v> Frame<'v> {
    fn open(value: &'v Value) -> Option<Self> {
        let (shape, entries) = match value {
            Value::Array(items) => (Shape::Array, Entries::Array(items.iter().enumerate())),
            Value::Object(object) => (Shape::Object, Entries::Object(object.iter())),
            _ => return None,
        };
        Some(Self {
            shape,
            entries,
            leaf_open: false,
        })
    }

    fn next_entry(&mut self) -> Option<(PathSegment<'v>, &'v Value)> {
        match &mut self.entries {
            Entries::Array(items) => items
                .next()
                .map(|(index, value)| (PathSegment::Index(index), value)),
            Entries::Object(entries) => entries
                .next()
                .map(|(key, value)| (PathSegment::Key(key.as_str()), value)),
        }
    }
}

/// Single-pass, non-seekable token stream over a JSON collection.
///
/// Iterating yields [`Token`]s until the root collection's `End` has been
/// produced; after that the iterator is exhausted.
pub struct Tokenizer<'v> {
    pending: Option<&'v Value>,
    frames: Vec<Frame<'v>>,
    path: Vec<PathSegment<'v>>,
    current: Option<Token<'v>>,
}

impl<'v> Tokenizer<'v> {
    /// Tokenize `root`, which must be an array or an object.
    ///
    /// # Errors
    ///
    /// Returns a type error when `root` is a primitive.
    pub fn new(root: &'v Value) -> Result<Self, ValidationError> {
        Self::with_path(root, Vec::new())
    }

    /// Tokenize `root` as if it were found at `path` inside a larger
    /// document. Used to build look-ahead tokenizers that report the same
    /// locations as the stream they were forked from.
    ///
    /// # Errors
    ///
    /// Returns a type error when `root` is a primitive.
    pub fn with_path(root: &'v Value, path: Vec<PathSegment<'v>>) -> Result<Self, ValidationError> {
        if Shape::of(root).is_none() {
            return Err(ValidationError::new(
                ErrorKind::Type,
                rooted_path(&path),
                None,
                format!("json must be array or object, not {}", json_kind(root)),
            ));
        }

        Ok(Self {
            pending: Some(root),
            frames: Vec::new(),
            path,
            current: None,
        })
    }

    /// The path from the root to the current element.
    pub fn path(&self) -> &[PathSegment<'v>] {
        &self.path
    }

    /// The current path rendered as `/a/0/b`.
    pub fn path_string(&self) -> String {
        rooted_path(&self.path)
    }

    /// The most recently produced token.
    pub fn current(&self) -> Option<&Token<'v>> {
        self.current.as_ref()
    }

    /// Like [`Iterator::next`], but running past the end of the stream is
    /// a contract violation rather than a normal outcome.
    pub(crate) fn next_token(&mut self) -> Result<Token<'v>, DoolallyError> {
        self.next()
            .ok_or_else(|| DoolallyError::contract("token stream exhausted"))
    }

    /// Discard the collection whose `Start` token was just produced,
    /// leaving the cursor just past its matching `End`.
    ///
    /// # Errors
    ///
    /// Returns [`DoolallyError::Contract`] if the previous token was not a
    /// collection start.
    pub fn drain_collection(&mut self) -> Result<(), DoolallyError> {
        if !matches!(self.current, Some(Token::Start(..))) {
            return Err(DoolallyError::contract(
                "drain_collection not called on collection",
            ));
        }

        let mut depth = 1usize;
        while depth > 0 {
            match self.next_token()? {
                Token::Start(..) => depth += 1,
                Token::End(_) => depth -= 1,
                Token::Element(..) => {}
            }
        }
        Ok(())
    }

    fn advance(&mut self) -> Option<Token<'v>> {
        if let Some(collection) = self.pending.take() {
            let frame = Frame::open(collection)?;
            let shape = frame.shape;
            self.frames.push(frame);
            return Some(Token::Start(shape, collection));
        }

        let nested = self.frames.len() > 1;
        let frame = self.frames.last_mut()?;
        if std::mem::take(&mut frame.leaf_open) {
            self.path.pop();
        }

        match frame.next_entry() {
            Some((segment, value)) => {
                self.path.push(segment);
                if Shape::of(value).is_some() {
                    self.pending = Some(value);
                } else {
                    frame.leaf_open = true;
                }
                Some(Token::Element(segment, value))
            }
            None => {
                let shape = frame.shape;
                self.frames.pop();
                // The owning element's segment goes with the collection.
                if nested {
                    self.path.pop();
                }
                Some(Token::End(shape))
            }
        }
    }
}

impl<'v> Iterator for Tokenizer<'v> {
    type Item = Token<'v>;

    fn next(&mut self) -> Option<Token<'v>> {
        let token = self.advance()?;
        self.current = Some(token);
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tokenizes_flat_array() {
        let data = json!(["a", "b", "c"]);
        let tokens: Vec<Token<'_>> = Tokenizer::new(&data).unwrap().collect();
        assert_eq!(
            tokens,
            vec![
                Token::Start(Shape::Array, &data),
                Token::Element(PathSegment::Index(0), &data[0]),
                Token::Element(PathSegment::Index(1), &data[1]),
                Token::Element(PathSegment::Index(2), &data[2]),
                Token::End(Shape::Array),
            ]
        );
    }

    #[test]
    fn exhausted_after_root_end() {
        let data = json!([]);
        let mut t = Tokenizer::new(&data).unwrap();
        assert!(matches!(t.next(), Some(Token::Start(Shape::Array, _))));
        assert_eq!(t.next(), Some(Token::End(Shape::Array)));
        assert_eq!(t.next(), None);
        assert!(matches!(t.next_token(), Err(DoolallyError::Contract(_))));
    }

    #[test]
    fn nested_collection_follows_its_element() {
        let data = json!({"hello": [1, 2], "world": ["a", "b"]});
        let mut t = Tokenizer::new(&data).unwrap();
        assert_eq!(t.next(), Some(Token::Start(Shape::Object, &data)));
        assert_eq!(
            t.next(),
            Some(Token::Element(PathSegment::Key("hello"), &data["hello"]))
        );
        assert_eq!(t.next(), Some(Token::Start(Shape::Array, &data["hello"])));
        t.drain_collection().unwrap();
        assert_eq!(
            t.next(),
            Some(Token::Element(PathSegment::Key("world"), &data["world"]))
        );
    }

    #[test]
    fn path_tracks_depth() {
        let data = json!({"values": [{"key": "zz"}]});
        let mut t = Tokenizer::new(&data).unwrap();
        t.next(); // {
        assert_eq!(t.path_string(), "");
        t.next(); // values
        assert_eq!(t.path_string(), "/values");
        t.next(); // [
        assert_eq!(t.path_string(), "/values");
        t.next(); // 0
        assert_eq!(t.path_string(), "/values/0");
        t.next(); // {
        t.next(); // key
        assert_eq!(t.path_string(), "/values/0/key");
        assert_eq!(t.next(), Some(Token::End(Shape::Object)));
        assert_eq!(t.path_string(), "/values");
        assert_eq!(t.next(), Some(Token::End(Shape::Array)));
        assert_eq!(t.path_string(), "");
        assert_eq!(t.next(), Some(Token::End(Shape::Object)));
        assert!(t.path().is_empty());
    }

    #[test]
    fn primitive_root_is_rejected() {
        let data = json!("just a string");
        let err = Tokenizer::new(&data).err().unwrap();
        assert!(err.is_type_error());
        assert_eq!(err.to_string(), "[] - json must be array or object, not string");
    }

    #[test]
    fn drain_requires_collection_start() {
        let data = json!([1, [2, 3]]);
        let mut t = Tokenizer::new(&data).unwrap();
        t.next(); // [
        t.next(); // 0
        let err = t.drain_collection().unwrap_err();
        assert!(matches!(err, DoolallyError::Contract(_)));
    }

    #[test]
    fn drain_skips_nested_collections() {
        let data = json!([[1, {"a": [2]}], 3]);
        let mut t = Tokenizer::new(&data).unwrap();
        t.next(); // [
        t.next(); // 0
        t.next(); // [
        t.drain_collection().unwrap();
        assert_eq!(t.next(), Some(Token::Element(PathSegment::Index(1), &data[1])));
        assert_eq!(t.next(), Some(Token::End(Shape::Array)));
        assert_eq!(t.next(), None);
    }

    #[test]
    fn forked_tokenizer_keeps_outer_path() {
        let data = json!({"outer": {"inner": true}});
        let prefix = vec![PathSegment::Key("outer")];
        let mut t = Tokenizer::with_path(&data["outer"], prefix).unwrap();
        t.next(); // {
        t.next(); // inner
        assert_eq!(t.path_string(), "/outer/inner");
        assert_eq!(t.next(), Some(Token::End(Shape::Object)));
        // The borrowed prefix is never popped by the fork.
        assert_eq!(t.path_string(), "/outer");
    }

    #[test]
    fn forked_tokenizer_reports_prefixed_errors() {
        let data = json!(1);
        let err = Tokenizer::with_path(&data, vec![PathSegment::Key("a"), PathSegment::Index(3)])
            .err()
            .unwrap();
        assert_eq!(err.path(), "/a/3");
        assert_eq!(err.to_string(), "[/a/3] - json must be array or object, not number");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-z]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn json_collection() -> impl Strategy<Value = Value> {
        json_value().prop_map(|value| match value {
            Value::Array(_) | Value::Object(_) => value,
            other => Value::Array(vec![other]),
        })
    }

    proptest! {
        /// Starts and ends balance, and the stream ends after the root closes.
        #[test]
        fn stream_is_balanced(value in json_collection()) {
            let mut t = Tokenizer::new(&value).unwrap();
            let mut depth = 0i64;
            let mut closed_root = false;
            while let Some(token) = t.next() {
                prop_assert!(!closed_root, "token after the root closed");
                match token {
                    Token::Start(..) => depth += 1,
                    Token::End(_) => {
                        depth -= 1;
                        closed_root = depth == 0;
                    }
                    Token::Element(..) => prop_assert!(depth > 0),
                }
            }
            prop_assert!(closed_root);
            prop_assert_eq!(depth, 0);
        }

        /// At every element the path length equals the nesting depth.
        #[test]
        fn path_length_matches_depth(value in json_collection()) {
            let mut t = Tokenizer::new(&value).unwrap();
            let mut depth = 0usize;
            while let Some(token) = t.next() {
                match token {
                    Token::Start(..) => depth += 1,
                    Token::End(_) => {
                        depth -= 1;
                        prop_assert_eq!(t.path().len(), depth.saturating_sub(1));
                    }
                    Token::Element(segment, _) => {
                        prop_assert_eq!(t.path().len(), depth);
                        prop_assert_eq!(t.path().last(), Some(&segment));
                    }
                }
            }
            prop_assert!(t.path().is_empty());
        }

        /// Draining the root consumes the whole stream.
        #[test]
        fn draining_root_exhausts_stream(value in json_collection()) {
            let mut t = Tokenizer::new(&value).unwrap();
            prop_assert!(matches!(t.next(), Some(Token::Start(..))));
            t.drain_collection().unwrap();
            prop_assert_eq!(t.next(), None);
        }
    }
}
