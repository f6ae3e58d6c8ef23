use anyhow::Result;
use colored::*;
use scene_core::{Finding, ValidationReport};
use scene_validator::{FieldNode, SchemaModel, Visibility, rule_counts};
use serde_json::json;

pub fn print_validation_report(report: &ValidationReport, format: &str) -> Result<()> {
    match format {
        "json" => print_json_report(report)?,
        _ => print_text_report(report),
    }
    Ok(())
}

fn print_text_report(report: &ValidationReport) {
    println!("\n{}", "═".repeat(60));
    println!("{}", "  SCENE VALIDATION REPORT".bold());
    println!("{}", "═".repeat(60));

    if report.passed {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    if report.cancelled {
        println!("\n{}", "Validation was cancelled before every scene was checked".yellow());
    }

    let errors: Vec<&Finding> = report.errors().collect();
    if !errors.is_empty() {
        println!("\n{}", "Errors:".red().bold());
        for (i, error) in errors.iter().enumerate() {
            println!("  {}. {}", i + 1, error.to_string().red());
        }
    }

    let warnings: Vec<&Finding> = report.warnings().collect();
    if !warnings.is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for (i, warning) in warnings.iter().enumerate() {
            println!("  {}. {}", i + 1, warning.to_string().yellow());
        }
    }

    let counts = rule_counts(&report.findings);
    if !counts.is_empty() {
        println!("\n{}", "By rule:".bold());
        for (rule, count) in &counts {
            println!("  {:<24}{}", rule.as_str(), count);
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  Scenes validated: {}", report.stats.documents_validated);
    println!("  Fields checked:   {}", report.stats.fields_checked);
    println!("  Total errors:     {}", report.stats.errors);
    println!("  Total warnings:   {}", report.stats.warnings);
    println!("  Duration:         {} ms", report.stats.duration_ms);
    println!("{}", "═".repeat(60));
}

fn print_json_report(report: &ValidationReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn print_schema_summary(schema: &SchemaModel) {
    let identifiers: Vec<&str> = schema.unique_fields().map(|n| n.path.as_str()).collect();
    let references: Vec<String> = schema
        .reference_fields()
        .filter_map(|n| {
            n.references
                .map(|target| format!("{} -> {}", n.path, schema.node(target).path))
        })
        .collect();
    let advisories: usize = schema.nodes().iter().map(|n| n.advisories.len()).sum();

    println!("\nSchema Summary:");
    println!(
        "  Fields:      {} ({} top-level)",
        schema.len(),
        schema.roots().count()
    );
    println!("  Identifiers: {}", list_or_none(&identifiers));
    println!("  References:  {}", list_or_none(&references));
    println!("  Advisories:  {}", advisories);

    println!("\n{}", "Top-level Fields:".bold());
    for node in schema.roots() {
        let required = if node.required { "required" } else { "optional" };
        println!(
            "  {:<20} {:<8} {:<9} {:<12} {}",
            node.name,
            node.field_type.as_str(),
            required,
            node.priority.to_string(),
            visibility_label(&node.visibility)
        );
    }

    println!("\n{}", "Evaluation Order:".bold());
    for (i, node) in schema.evaluation_order().enumerate() {
        println!("  {}. {}", i + 1, node.path);
    }
}

pub fn print_schema_json(schema: &SchemaModel) -> Result<()> {
    let fields: Vec<_> = schema.roots().map(field_json).collect();
    let output = json!({
        "fields": schema.len(),
        "topLevel": fields,
        "identifiers": schema.unique_fields().map(|n| n.path.as_str()).collect::<Vec<_>>(),
        "references": schema
            .reference_fields()
            .filter_map(|n| n.references.map(|target| json!({
                "field": n.path,
                "target": schema.node(target).path,
            })))
            .collect::<Vec<_>>(),
        "evaluationOrder": schema.evaluation_order().map(|n| n.path.as_str()).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn field_json(node: &FieldNode) -> serde_json::Value {
    json!({
        "name": node.name,
        "type": node.field_type.as_str(),
        "required": node.required,
        "priority": node.priority.to_string(),
        "visibility": visibility_label(&node.visibility),
        "subfields": node.children.len(),
    })
}

fn visibility_label(visibility: &Visibility) -> String {
    match visibility {
        Visibility::Always => "always".to_string(),
        Visibility::Conditional(Some(_)) => "conditional (rule)".to_string(),
        Visibility::Conditional(None) => "conditional".to_string(),
        Visibility::Descriptive(text) => text.clone(),
    }
}

fn list_or_none<T: AsRef<str>>(items: &[T]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}
