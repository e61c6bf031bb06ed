//! # Validation Context
//!
//! A stack of `(path segment, active field)` pairs maintained alongside the
//! tokenizer. Where the tokenizer knows *where* in the document the cursor
//! is, the context knows *which field* is judging that position, so errors
//! can name both.
//!
//! The context is also the error factory handed to custom [`Validator`]s:
//! a validator builds its rejection with [`Context::value_error`] and gets
//! the correct location for free.
//!
//! [`Validator`]: crate::field::Validator

use crate::error::{ErrorKind, ValidationError};
use crate::field::Field;
use crate::token::{join_path, PathSegment};

/// Stack of active fields, one frame per nesting level.
#[derive(Debug, Default)]
pub struct Context<'s, 'v> {
    frames: Vec<(PathSegment<'v>, &'s Field)>,
}

impl<'s, 'v> Context<'s, 'v> {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose root frame is `field`.
    pub fn with_root(field: &'s Field) -> Self {
        let mut ctx = Self::new();
        ctx.push(PathSegment::Root, field);
        ctx
    }

    /// Make `field` the active field at `segment`.
    pub fn push(&mut self, segment: PathSegment<'v>, field: &'s Field) {
        self.frames.push((segment, field));
    }

    /// Drop the innermost frame.
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Number of frames on the stack.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The innermost active field.
    pub fn field(&self) -> Option<&'s Field> {
        self.frames.last().map(|(_, field)| *field)
    }

    /// Run `f` with `field` pushed at `segment`. The frame is popped before
    /// returning, whatever `f` returned.
    pub fn scoped<T>(
        &mut self,
        segment: PathSegment<'v>,
        field: &'s Field,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.push(segment, field);
        let out = f(self);
        self.pop();
        out
    }

    /// Current path, e.g. `/values/0/key`.
    pub fn path(&self) -> String {
        join_path(self.frames.iter().map(|(segment, _)| segment))
    }

    /// Build an error of `kind` at the current position.
    pub fn error(&self, kind: ErrorKind, message: impl Into<String>) -> ValidationError {
        let expected = self.field().map(|field| field.type_info(false));
        ValidationError::new(kind, self.path(), expected, message.into())
    }

    /// Build a type error at the current position.
    pub fn type_error(&self, message: impl Into<String>) -> ValidationError {
        self.error(ErrorKind::Type, message)
    }

    /// Build a value error at the current position.
    pub fn value_error(&self, message: impl Into<String>) -> ValidationError {
        self.error(ErrorKind::Value, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{NumberField, StringField};

    #[test]
    fn error_names_innermost_field() {
        let field: Field = StringField::new().into();
        let mut ctx = Context::new();
        ctx.push(PathSegment::Key("hello"), &field);
        let err = ctx.value_error("testing error");
        assert_eq!(err.to_string(), "[hello:String()] - testing error");
    }

    #[test]
    fn root_frame_renders_leading_slash() {
        let root: Field = StringField::new().into();
        let leaf: Field = NumberField::new().into();
        let mut ctx = Context::with_root(&root);
        ctx.push(PathSegment::Key("values"), &leaf);
        ctx.push(PathSegment::Index(0), &leaf);
        assert_eq!(ctx.path(), "/values/0");
        assert_eq!(ctx.depth(), 3);
    }

    #[test]
    fn scoped_pops_on_error() {
        let root: Field = StringField::new().into();
        let leaf: Field = NumberField::new().into();
        let mut ctx = Context::with_root(&root);
        let result: Result<(), ValidationError> = ctx.scoped(PathSegment::Key("age"), &leaf, |ctx| {
            Err(ctx.type_error("expected type in (number)"))
        });
        let err = result.unwrap_err();
        assert_eq!(err.path(), "/age");
        assert_eq!(err.expected(), Some("Number()"));
        assert!(err.is_type_error());
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn empty_context_has_no_field_info() {
        let ctx = Context::new();
        let err = ctx.type_error("nothing active");
        assert_eq!(err.to_string(), "[] - nothing active");
    }
}
