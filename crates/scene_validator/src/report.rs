//! Report aggregation.
//!
//! Findings from every document and every rule are merged into one list,
//! sorted by (document index, field path, severity, rule id) and
//! deduplicated. The sort key extends to the message and related documents
//! so that the order is total and output is byte-identical across runs.

use indexmap::IndexMap;
use scene_core::{Finding, RuleId};
use std::cmp::Ordering;

/// Sorts and deduplicates findings.
pub fn aggregate(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by(compare);
    findings.dedup();
    findings
}

fn compare(a: &Finding, b: &Finding) -> Ordering {
    a.document_index
        .cmp(&b.document_index)
        .then_with(|| a.field_path.cmp(&b.field_path))
        .then_with(|| a.severity.cmp(&b.severity))
        .then_with(|| a.rule_id.as_str().cmp(b.rule_id.as_str()))
        .then_with(|| a.message.cmp(&b.message))
        .then_with(|| a.related_documents.cmp(&b.related_documents))
}

/// Number of findings per rule, ordered by rule id.
pub fn rule_counts(findings: &[Finding]) -> IndexMap<RuleId, usize> {
    let mut counts: IndexMap<RuleId, usize> = IndexMap::new();
    for finding in findings {
        *counts.entry(finding.rule_id).or_default() += 1;
    }
    counts.sort_by(|a, _, b, _| a.as_str().cmp(b.as_str()));
    counts
}
