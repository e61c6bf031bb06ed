use doolally_core::{DoolallyError, SchemaError, ValidationError};
use thiserror::Error;

/// Errors from looking up and validating against catalog schemas.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    #[error("document rejected by {schema}")]
    Rejected {
        schema: String,
        #[source]
        source: DoolallyError,
    },

    #[error("invalid schema definition: {0}")]
    Definition(#[from] SchemaError),
}

impl CatalogError {
    /// True when a document was judged and found wanting.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { source, .. } if source.is_rejection())
    }

    /// The first violation, for rejections.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Rejected { source, .. } => source.as_validation(),
            _ => None,
        }
    }
}
