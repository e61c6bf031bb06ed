//! `doolally validate <NAME> [PATH]`: validate one document.
//!
//! Exit status 0 when the document conforms, 2 when it is rejected. Every
//! other failure (unreadable input, unknown schema) surfaces as an error.

use std::io::Write;

use anyhow::Result;
use doolally_schemas::{Catalog, CatalogError};
use serde_json::Value;

/// Exit status for a rejected document.
pub const REJECTED: u8 = 2;

pub fn run_validate(catalog: &Catalog, name: &str, document: &Value, out: &mut dyn Write) -> Result<u8> {
    match catalog.validate(name, document) {
        Ok(()) => {
            tracing::info!(schema = name, "document accepted");
            writeln!(out, "ok")?;
            Ok(0)
        }
        Err(err) if err.is_rejection() => {
            let reason = rejection_line(&err);
            tracing::warn!(schema = name, error = %reason, "document rejected");
            writeln!(out, "{reason}")?;
            Ok(REJECTED)
        }
        Err(err) => Err(err.into()),
    }
}

fn rejection_line(err: &CatalogError) -> String {
    match err.validation() {
        Some(violation) => violation.to_string(),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(name: &str, document: Value) -> (Result<u8>, String) {
        let catalog = Catalog::new().unwrap();
        let mut out = Vec::new();
        let result = run_validate(&catalog, name, &document, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn conforming_document() {
        let (result, out) = run(
            "NewReviewReq",
            json!({"review": "lovely", "eventId": "ZXZlbnQtaWQtMDAwMQ"}),
        );
        assert_eq!(result.unwrap(), 0);
        assert_eq!(out, "ok\n");
    }

    #[test]
    fn rejected_document_prints_violation() {
        let (result, out) = run("InsertKVValuesReq", json!({"values": [{"key": "zz"}]}));
        assert_eq!(result.unwrap(), REJECTED);
        assert_eq!(
            out,
            "[/values/0/key:String(min_length=32,max_length=32)] - string too short 2 < 32\n"
        );
    }

    #[test]
    fn primitive_root_is_a_rejection() {
        let (result, out) = run("InsertBlobResp", json!(42));
        assert_eq!(result.unwrap(), REJECTED);
        assert!(out.contains("json must be array or object, not number"));
    }

    #[test]
    fn unknown_schema_is_an_error() {
        let (result, out) = run("Nope", json!({}));
        assert!(result.is_err());
        assert!(out.is_empty());
    }
}
