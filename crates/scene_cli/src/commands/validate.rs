use anyhow::{Context, Result};
use clap::Args;
use scene_core::{DocumentValidator, ValidationOptions};
use scene_parser::{parse_config_file, parse_documents_file, parse_schema_file};
use scene_validator::{SceneValidator, load_schema};
use std::path::Path;
use tracing::info;

use crate::output;

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the schema file (JSON, YAML or TOML)
    pub schema: String,

    /// Scene document files, validated as one sequence in argument order
    #[arg(required = true)]
    pub documents: Vec<String>,

    /// Enable strict validation mode (fail on warnings)
    #[arg(short, long)]
    pub strict: bool,

    /// Accept back-references to later scenes
    #[arg(long)]
    pub allow_forward_refs: bool,

    /// Number of worker threads (1 validates sequentially)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Do not report natural-language restrictions as warnings
    #[arg(long)]
    pub no_advisories: bool,

    /// Warn when a present field's declared dependency is absent
    #[arg(long)]
    pub dependency_coverage: bool,

    /// Engine configuration file (JSON, YAML or TOML); flags override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format: text, json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn execute(args: &ValidateArgs) -> Result<()> {
    info!("Validating scenes against schema: {}", args.schema);

    let raw = parse_schema_file(Path::new(&args.schema))
        .with_context(|| format!("Failed to parse schema file: {}", args.schema))?;
    let schema =
        load_schema(&raw).with_context(|| format!("Invalid scene schema: {}", args.schema))?;

    let options = resolve_options(args)?;
    info!("Strict mode: {}", options.strict);

    let mut documents = Vec::new();
    for document_path in &args.documents {
        let scenes = parse_documents_file(Path::new(document_path))
            .with_context(|| format!("Failed to parse scene file: {}", document_path))?;
        info!("Loaded {} scenes from {}", scenes.len(), document_path);
        documents.extend(scenes);
    }

    let validator = SceneValidator::new(schema).with_options(options);
    let report = validator.validate_sequence(&documents);

    output::print_validation_report(&report, &args.format)?;

    if !report.passed {
        std::process::exit(1);
    }

    Ok(())
}

/// Reads the configuration file, if any, and applies command-line overrides.
fn resolve_options(args: &ValidateArgs) -> Result<ValidationOptions> {
    let mut options = match &args.config {
        Some(config_path) => parse_config_file(Path::new(config_path))
            .with_context(|| format!("Failed to parse config file: {}", config_path))?,
        None => ValidationOptions::default(),
    };

    if args.strict {
        options.strict = true;
    }
    if args.allow_forward_refs {
        options.allow_forward_references = true;
    }
    if let Some(workers) = args.workers {
        options.workers = Some(workers);
    }
    if args.no_advisories {
        options.include_advisories = false;
    }
    if args.dependency_coverage {
        options.check_dependency_coverage = true;
    }

    Ok(options)
}
