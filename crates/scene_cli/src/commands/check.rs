use anyhow::{Context, Result};
use scene_parser::parse_schema_file;
use scene_validator::load_schema;
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(schema_path: &str, format: &str) -> Result<()> {
    info!("Checking scene schema: {}", schema_path);

    let path = Path::new(schema_path);
    let raw = parse_schema_file(path)
        .with_context(|| format!("Failed to parse schema file: {}", schema_path))?;

    // Structural defects (cycles, dangling dependencies) surface here
    let schema =
        load_schema(&raw).with_context(|| format!("Invalid scene schema: {}", schema_path))?;

    match format {
        "json" => output::print_schema_json(&schema)?,
        _ => {
            output::print_success("Scene schema is valid");
            output::print_schema_summary(&schema);
        }
    }

    Ok(())
}
