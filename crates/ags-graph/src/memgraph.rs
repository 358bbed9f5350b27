//! In-memory interpreter for graph statements.
//!
//! Applies statements to plain maps with the same merge/detach semantics the
//! store provides, so mutation behavior is testable without a running graph.

use std::collections::HashMap;

use ags_core::FieldValue;

use crate::model::{Label, RelType};
use crate::statement::{GraphStatement, PropertyMap};

type NodeKey = (Label, String);

#[derive(Debug, Default)]
pub struct MemGraph {
    nodes: HashMap<NodeKey, PropertyMap>,
    edges: Vec<(NodeKey, RelType, NodeKey)>,
}

impl MemGraph {
    pub fn apply_all(&mut self, statements: &[GraphStatement]) -> Result<(), String> {
        for statement in statements {
            self.apply(statement)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, statement: &GraphStatement) -> Result<(), String> {
        match statement {
            GraphStatement::UpsertNode {
                label,
                id,
                properties,
            } => {
                let props = properties
                    .iter()
                    .filter(|(name, value)| name.as_str() != "id" && **value != FieldValue::Null)
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                self.nodes.insert((*label, id.clone()), props);
            }
            GraphStatement::MergeProperties {
                label,
                id,
                properties,
            } => {
                let node = self.nodes.entry((*label, id.clone())).or_default();
                for (name, value) in properties {
                    if name == "id" {
                        continue;
                    }
                    if *value == FieldValue::Null {
                        node.shift_remove(name);
                    } else {
                        node.insert(name.clone(), value.clone());
                    }
                }
            }
            GraphStatement::RemoveProperty {
                label,
                id,
                property,
            } => {
                if let Some(node) = self.nodes.get_mut(&(*label, id.clone())) {
                    node.shift_remove(property);
                }
            }
            GraphStatement::DeleteNode { label, id, detach } => {
                let key = (*label, id.clone());
                if !self.nodes.contains_key(&key) {
                    return Ok(());
                }
                let has_edges = self
                    .edges
                    .iter()
                    .any(|(parent, _, child)| *parent == key || *child == key);
                if has_edges && !*detach {
                    return Err(format!("cannot delete node {id}: relationships remain"));
                }
                self.edges
                    .retain(|(parent, _, child)| *parent != key && *child != key);
                self.nodes.remove(&key);
            }
            GraphStatement::DeleteSubtree { label, id } => {
                let start = (*label, id.clone());
                if !self.nodes.contains_key(&start) {
                    return Ok(());
                }
                let mut reached = vec![start.clone()];
                let mut queue = vec![start];
                while let Some(current) = queue.pop() {
                    for (parent, _, child) in &self.edges {
                        if *parent == current && !reached.contains(child) {
                            reached.push(child.clone());
                            queue.push(child.clone());
                        }
                    }
                }
                self.edges
                    .retain(|(parent, _, child)| !reached.contains(parent) && !reached.contains(child));
                self.nodes.retain(|key, _| !reached.contains(key));
            }
            GraphStatement::ClearLabel { label } => {
                self.edges
                    .retain(|(parent, _, child)| parent.0 != *label && child.0 != *label);
                self.nodes.retain(|(node_label, _), _| node_label != label);
            }
            GraphStatement::MergeEdge {
                parent,
                child,
                rel,
                parent_id,
                child_id,
            } => {
                let from = (*parent, parent_id.clone());
                let to = (*child, child_id.clone());
                if !self.nodes.contains_key(&from) || !self.nodes.contains_key(&to) {
                    return Ok(());
                }
                let edge = (from, *rel, to);
                if !self.edges.contains(&edge) {
                    self.edges.push(edge);
                }
            }
        }
        Ok(())
    }

    pub fn node(&self, label: Label, id: &str) -> Option<&PropertyMap> {
        self.nodes.get(&(label, id.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge(&self, parent: (Label, &str), rel: RelType, child: (Label, &str)) -> bool {
        self.edges.iter().any(|(from, edge_rel, to)| {
            from.0 == parent.0
                && from.1 == parent.1
                && *edge_rel == rel
                && to.0 == child.0
                && to.1 == child.1
        })
    }
}
