//! `doolally schema <NAME>`: print the emitted JSON-Schema document.

use std::io::Write;

use anyhow::Result;
use doolally_schemas::Catalog;

pub fn run_schema(catalog: &Catalog, name: &str, pretty: bool, out: &mut dyn Write) -> Result<u8> {
    let document = catalog.json_schema(name)?;
    let text = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    writeln!(out, "{text}")?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn prints_compact_document() {
        let catalog = Catalog::new().unwrap();
        let mut out = Vec::new();
        run_schema(&catalog, "InsertBlobResp", false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        let doc: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["title"], "InsertBlobResp");
        assert_eq!(doc["required"][0], "blobId");
    }

    #[test]
    fn pretty_output_preserves_key_order() {
        let catalog = Catalog::new().unwrap();
        let mut out = Vec::new();
        run_schema(&catalog, "KVElementReq", true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().count() > 1);
        let key = text.find("\"key\"").unwrap();
        let expiry = text.find("\"expiryTime\"").unwrap();
        assert!(key < expiry);
    }

    #[test]
    fn unknown_schema_is_an_error() {
        let catalog = Catalog::new().unwrap();
        let mut out = Vec::new();
        let err = run_schema(&catalog, "Nope", true, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "unknown schema: Nope");
        assert!(out.is_empty());
    }
}
