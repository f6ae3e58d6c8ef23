//! Dependency graph resolution.
//!
//! Each field links to the fields it depends on. Dependencies are soft
//! coupling, used only to sequence consistency-rule evaluation, but a cycle
//! is a structural schema defect and is reported at load time.

use crate::FieldId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Directed graph from each field to the fields it depends on.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: Vec<Vec<FieldId>>,
}

impl DependencyGraph {
    /// Creates a graph with `len` nodes and no edges.
    pub fn new(len: usize) -> Self {
        Self {
            edges: vec![Vec::new(); len],
        }
    }

    /// Records that `from` depends on `to`. Repeated edges are ignored.
    pub fn add_edge(&mut self, from: FieldId, to: FieldId) {
        let targets = &mut self.edges[from.0];
        if !targets.contains(&to) {
            targets.push(to);
        }
    }

    /// Direct dependencies of a node, in insertion order.
    pub fn dependencies(&self, id: FieldId) -> &[FieldId] {
        &self.edges[id.0]
    }

    /// Computes an order placing every node after all of its dependencies.
    ///
    /// Uses a three-color depth-first traversal. Roots are visited in index
    /// order and dependencies in insertion order, so the result is
    /// deterministic. On a cycle, returns the nodes along it with the first
    /// node repeated at the end.
    pub fn topological_order(&self) -> Result<Vec<FieldId>, Vec<FieldId>> {
        let mut marks = vec![Mark::Unvisited; self.edges.len()];
        let mut order = Vec::with_capacity(self.edges.len());
        let mut stack = Vec::new();

        for index in 0..self.edges.len() {
            if marks[index] == Mark::Unvisited {
                self.visit(FieldId(index), &mut marks, &mut stack, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        id: FieldId,
        marks: &mut [Mark],
        stack: &mut Vec<FieldId>,
        order: &mut Vec<FieldId>,
    ) -> Result<(), Vec<FieldId>> {
        marks[id.0] = Mark::InProgress;
        stack.push(id);

        for &dep in &self.edges[id.0] {
            match marks[dep.0] {
                Mark::Unvisited => self.visit(dep, marks, stack, order)?,
                Mark::InProgress => {
                    let start = stack.iter().position(|n| *n == dep).unwrap_or(0);
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(dep);
                    return Err(cycle);
                }
                Mark::Done => {}
            }
        }

        stack.pop();
        marks[id.0] = Mark::Done;
        order.push(id);
        Ok(())
    }
}
