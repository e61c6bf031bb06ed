//! `doolally list`: catalog schemas with their field counts.

use std::io::Write;

use anyhow::Result;
use doolally_core::Schema;
use doolally_schemas::Catalog;

/// One line per schema: name, required/optional counts, description.
pub fn run_list(catalog: &Catalog, out: &mut dyn Write) -> Result<u8> {
    for schema in catalog.iter() {
        writeln!(out, "{}", summary(schema))?;
    }
    writeln!(out)?;
    writeln!(out, "Total: {} schemas", catalog.len())?;
    Ok(0)
}

fn summary(schema: &Schema) -> String {
    let required = schema.required_fields().count();
    let optional = schema.len() - required;
    let counts = format!("({required} required, {optional} optional)");
    if schema.description() == schema.name() {
        format!("{:<24} {counts}", schema.name())
    } else {
        format!("{:<24} {counts:<26} {}", schema.name(), schema.description())
    }
}
