//! Schema loading and normalization.
//!
//! Turns raw field records into an indexed `SchemaModel`: the field tree is
//! flattened into an arena in declaration order, restrictions and format
//! descriptions are classified into structured predicates, and dependency,
//! reference and condition paths are resolved into graph edges. Any
//! structural defect aborts loading with a `SchemaError`.

use crate::graph::DependencyGraph;
use crate::{
    CompiledPattern, FieldId, FieldNode, FieldType, OptionPolicy, PatternRule, Predicate, Priority,
    Restriction, SchemaModel, Visibility, classify_restriction, pattern_from_format,
};
use indexmap::IndexMap;
use scene_core::{Condition, FieldConstraint, RawField, Result, SchemaError};
use tracing::{debug, info, warn};

/// Where a structured predicate was declared.
#[derive(Debug, Clone)]
enum Origin {
    /// Explicit `constraints` entry; failures are schema errors
    Declared,
    /// Recognised restriction text; failures downgrade it to advisory
    Inferred(String),
}

/// Cross-field links that can only be resolved once every field is known.
#[derive(Debug, Default)]
struct Pending {
    dependencies: Vec<String>,
    reference: Option<(String, Origin)>,
    requires: Vec<(Vec<String>, Origin)>,
    condition: Option<Condition>,
}

/// Loads a raw schema into an indexed, immutable model.
///
/// # Example
///
/// ```rust
/// use scene_core::FieldBuilder;
/// use scene_validator::load_schema;
///
/// let raw = vec![
///     FieldBuilder::new("SceneID", "string").required(true).restriction("No duplicates across timeline").build(),
///     FieldBuilder::new("Pacing", "object")
///         .subfield(FieldBuilder::new("Tempo", "string").build())
///         .build(),
///     FieldBuilder::new("Duration", "string").depends_on("Tempo").build(),
/// ];
///
/// let schema = load_schema(&raw).unwrap();
/// assert_eq!(schema.len(), 4);
/// assert!(schema.lookup("SceneID").unwrap().unique);
/// assert_eq!(schema.lookup("Duration").unwrap().dependencies.len(), 1);
/// ```
pub fn load_schema(raw: &[RawField]) -> Result<SchemaModel> {
    let mut loader = Loader::default();
    for field in raw {
        loader.add(field, None)?;
    }
    let model = loader.link()?;

    info!(
        "Loaded scene schema: {} fields ({} top-level)",
        model.len(),
        model.roots.len()
    );
    debug!(
        "Evaluation order: {}",
        model
            .evaluation_order()
            .map(|node| node.path.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(model)
}

#[derive(Default)]
struct Loader {
    nodes: Vec<FieldNode>,
    roots: Vec<FieldId>,
    by_path: IndexMap<String, FieldId>,
    pending: Vec<Pending>,
}

impl Loader {
    /// Adds a field and its subfields in pre-order.
    fn add(&mut self, raw: &RawField, parent: Option<FieldId>) -> Result<FieldId> {
        let parent_path = parent.map(|id| self.nodes[id.0].path.clone());
        let name = raw.name.trim();
        if name.is_empty() || name.contains('.') || name.contains('[') {
            return Err(SchemaError::malformed(
                parent_path.unwrap_or_else(|| "<root>".to_string()),
                format!("invalid field name '{}'", raw.name),
            ));
        }

        let path = match &parent_path {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name.to_string(),
        };

        let field_type = FieldType::parse(&raw.field_type).ok_or_else(|| SchemaError::UnknownType {
            field: path.clone(),
            type_tag: raw.field_type.clone(),
        })?;

        if !raw.subfields.is_empty() && !field_type.is_container() {
            return Err(SchemaError::malformed(
                &path,
                format!("subfields declared on a {} field", field_type),
            ));
        }

        if self.by_path.contains_key(&path) {
            return Err(SchemaError::DuplicateField(path));
        }

        let id = FieldId(self.nodes.len());
        let mut pending = Pending {
            dependencies: raw.metadata.dependencies.clone(),
            condition: raw.metadata.visible_when.clone(),
            ..Pending::default()
        };

        let mut rules = Vec::new();
        if let Some(pattern) = &raw.pattern {
            rules.push(PatternRule::Regex(pattern.clone()));
        }
        for text in [&raw.format, &raw.input_format, &raw.value_format]
            .into_iter()
            .flatten()
        {
            if let Some(rule) = pattern_from_format(text) {
                rules.push(rule);
            }
        }

        let mut unique = false;
        let mut strict_options = false;
        let mut advisories = Vec::new();

        for text in &raw.metadata.restrictions {
            match classify_restriction(text) {
                Restriction::Structured { text, predicate } => match predicate {
                    Predicate::Unique => unique = true,
                    Predicate::References(target) => {
                        pending.reference = Some((target, Origin::Inferred(text)));
                    }
                    // Enforced through the forward-reference policy
                    Predicate::NoForwardReference => {}
                    Predicate::StrictOptions => strict_options = true,
                    Predicate::Pattern(rule) => rules.push(rule),
                    Predicate::RequiresSubfields(names) => {
                        pending.requires.push((names, Origin::Inferred(text)));
                    }
                },
                Restriction::Advisory(text) => advisories.push(text),
            }
        }

        for constraint in &raw.constraints {
            match constraint {
                FieldConstraint::Unique => unique = true,
                FieldConstraint::References { target } => {
                    pending.reference = Some((target.clone(), Origin::Declared));
                }
                FieldConstraint::Pattern { regex } => rules.push(PatternRule::Regex(regex.clone())),
                FieldConstraint::StrictOptions => strict_options = true,
                FieldConstraint::RequiresSubfields { fields } => {
                    pending.requires.push((fields.clone(), Origin::Declared));
                }
            }
        }

        let mut patterns: Vec<CompiledPattern> = Vec::with_capacity(rules.len());
        for rule in rules {
            if patterns.iter().any(|p| p.rule() == &rule) {
                continue;
            }
            let compiled = CompiledPattern::compile(rule).map_err(|e| SchemaError::InvalidPattern {
                field: path.clone(),
                message: e.to_string(),
            })?;
            patterns.push(compiled);
        }

        let option_policy = match raw.strict_options {
            Some(true) => OptionPolicy::Strict,
            Some(false) => OptionPolicy::Advisory,
            None if strict_options => OptionPolicy::Strict,
            None => OptionPolicy::Advisory,
        };

        self.nodes.push(FieldNode {
            id,
            name: name.to_string(),
            path: path.clone(),
            parent,
            children: Vec::new(),
            field_type,
            required: raw.required,
            options: raw.options.clone(),
            option_policy,
            allow_custom: raw.allow_custom,
            patterns,
            unique,
            references: None,
            advisories,
            dependencies: Vec::new(),
            priority: Priority::parse(raw.metadata.priority.as_deref()),
            visibility: Visibility::from_metadata(raw.metadata.visibility.as_deref(), None),
            label: raw.label.clone(),
        });
        self.pending.push(pending);
        self.by_path.insert(path, id);
        if parent.is_none() {
            self.roots.push(id);
        }

        for sub in &raw.subfields {
            let child = self.add(sub, Some(id))?;
            self.nodes[id.0].children.push(child);
        }

        Ok(id)
    }

    /// Resolves a field reference by exact path, then by unique last segment.
    fn resolve(&self, field: &str, reference: &str) -> Result<FieldId> {
        let reference = reference.trim();
        if let Some(id) = self.by_path.get(reference) {
            return Ok(*id);
        }

        let suffix = format!(".{}", reference);
        let candidates: Vec<(&String, &FieldId)> = self
            .by_path
            .iter()
            .filter(|(path, _)| path.ends_with(&suffix))
            .collect();

        match candidates.as_slice() {
            [] => Err(SchemaError::dangling(field, reference)),
            [(_, id)] => Ok(**id),
            _ => Err(SchemaError::AmbiguousDependency {
                field: field.to_string(),
                reference: reference.to_string(),
                candidates: candidates.iter().map(|(path, _)| (*path).clone()).collect(),
            }),
        }
    }

    fn condition_path(&self, owner: &str, path: &str, reads: &mut Vec<FieldId>) -> Result<String> {
        let id = self
            .resolve(owner, path)
            .map_err(|e| SchemaError::InvalidCondition {
                field: owner.to_string(),
                message: e.to_string(),
            })?;
        reads.push(id);
        Ok(self.nodes[id.0].path.clone())
    }

    /// Rewrites every path in a condition to its canonical dotted form.
    fn canonicalize(
        &self,
        owner: &str,
        condition: &Condition,
        reads: &mut Vec<FieldId>,
    ) -> Result<Condition> {
        Ok(match condition {
            Condition::Present(field) => {
                Condition::Present(self.condition_path(owner, field, reads)?)
            }
            Condition::Equals { field, value } => Condition::Equals {
                field: self.condition_path(owner, field, reads)?,
                value: value.clone(),
            },
            Condition::OneOf { field, values } => Condition::OneOf {
                field: self.condition_path(owner, field, reads)?,
                values: values.clone(),
            },
            Condition::All(items) => Condition::All(
                items
                    .iter()
                    .map(|item| self.canonicalize(owner, item, reads))
                    .collect::<Result<_>>()?,
            ),
            Condition::Any(items) => Condition::Any(
                items
                    .iter()
                    .map(|item| self.canonicalize(owner, item, reads))
                    .collect::<Result<_>>()?,
            ),
            Condition::Not(inner) => {
                Condition::Not(Box::new(self.canonicalize(owner, inner, reads)?))
            }
        })
    }

    /// Resolves cross-field links and computes the evaluation order.
    fn link(mut self) -> Result<SchemaModel> {
        let pending = std::mem::take(&mut self.pending);
        let mut graph = DependencyGraph::new(self.nodes.len());

        for (index, links) in pending.into_iter().enumerate() {
            let id = FieldId(index);
            let path = self.nodes[index].path.clone();

            let mut dependencies = Vec::with_capacity(links.dependencies.len());
            for reference in &links.dependencies {
                let target = self.resolve(&path, reference)?;
                if !dependencies.contains(&target) {
                    dependencies.push(target);
                }
                graph.add_edge(id, target);
            }
            self.nodes[index].dependencies = dependencies;

            if let Some((target, origin)) = links.reference {
                match (self.resolve(&path, &target), origin) {
                    (Ok(target), _) => {
                        self.nodes[index].references = Some(target);
                        if target != id {
                            graph.add_edge(id, target);
                        }
                    }
                    (Err(e), Origin::Declared) => return Err(e),
                    (Err(e), Origin::Inferred(text)) => {
                        warn!("Treating restriction on '{}' as advisory: {}", path, e);
                        self.nodes[index].advisories.push(text);
                    }
                }
            }

            for (names, origin) in links.requires {
                let children: Option<Vec<FieldId>> = names
                    .iter()
                    .map(|name| self.by_path.get(&format!("{}.{}", path, name)).copied())
                    .collect();
                match (children, origin) {
                    (Some(children), _) => {
                        for child in children {
                            self.nodes[child.0].required = true;
                        }
                    }
                    (None, Origin::Declared) => {
                        return Err(SchemaError::malformed(
                            &path,
                            format!("required subfields not declared: {}", names.join(", ")),
                        ));
                    }
                    (None, Origin::Inferred(text)) => {
                        warn!(
                            "Treating restriction on '{}' as advisory: subfields {} not declared",
                            path,
                            names.join(", ")
                        );
                        self.nodes[index].advisories.push(text);
                    }
                }
            }

            if let Some(condition) = links.condition {
                let mut reads = Vec::new();
                let canonical = self.canonicalize(&path, &condition, &mut reads)?;
                for read in reads {
                    if read != id {
                        graph.add_edge(id, read);
                    }
                }
                self.nodes[index].visibility = Visibility::Conditional(Some(canonical));
            }
        }

        let order = graph.topological_order().map_err(|cycle| SchemaError::DependencyCycle {
            cycle: cycle
                .into_iter()
                .map(|id| self.nodes[id.0].path.clone())
                .collect(),
        })?;

        Ok(SchemaModel {
            nodes: self.nodes,
            roots: self.roots,
            by_path: self.by_path,
            order,
        })
    }
}
