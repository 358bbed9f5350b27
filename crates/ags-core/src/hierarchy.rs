//! Hierarchy materialization.
//!
//! Turns a flat, relation-linked record set into an ordered tree: sub-level
//! records are excluded entirely, children come from each record's relation
//! field, roots are the records nobody references, and every sibling list is
//! sorted by `(order, name)` with missing order sorting last.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{Record, CATEGORY_FIELD, SYMBOL_FIELD};

/// A node of the materialized tree.
///
/// Ephemeral: rebuilt from records on every request and consumed by the
/// full-tree replace path, never persisted. Leaf nodes serialize without a
/// `children` attribute, and the ordering key is not part of the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(
        rename = "Symbol",
        alias = "symbol",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub symbol: Option<String>,
    #[serde(
        rename = "Category",
        alias = "category",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

/// Build the ordered tree from a flat record list.
///
/// A record referenced by more than one parent is expanded fully under each
/// of them. Relation data is not guaranteed acyclic; an edge that would
/// revisit a node already on the current expansion path is dropped.
pub fn build_hierarchy(records: &[Record]) -> Vec<TreeNode> {
    let kept: Vec<&Record> = records.iter().filter(|r| !r.is_sub_level()).collect();
    let by_id: HashMap<&str, &Record> = kept.iter().map(|r| (r.id.as_str(), *r)).collect();

    // Child lists restricted to surviving ids, plus the set of every id that
    // got attached somewhere.
    let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut attached: HashSet<&str> = HashSet::new();
    for &record in &kept {
        let Some(ids) = record.relation_ids() else {
            continue;
        };
        let entries = children_of.entry(record.id.as_str()).or_default();
        for child_id in ids {
            if by_id.contains_key(child_id.as_str()) {
                attached.insert(child_id.as_str());
                entries.push(child_id.as_str());
            }
        }
    }

    let mut roots: Vec<(f64, TreeNode)> = kept
        .iter()
        .copied()
        .filter(|record| !attached.contains(record.id.as_str()))
        .map(|record| {
            let mut path = HashSet::new();
            (record.order(), expand(record, &by_id, &children_of, &mut path))
        })
        .collect();
    sort_siblings(&mut roots);
    roots.into_iter().map(|(_, node)| node).collect()
}

fn expand<'a>(
    record: &'a Record,
    by_id: &HashMap<&'a str, &'a Record>,
    children_of: &HashMap<&'a str, Vec<&'a str>>,
    path: &mut HashSet<&'a str>,
) -> TreeNode {
    path.insert(record.id.as_str());
    let mut children: Vec<(f64, TreeNode)> = Vec::new();
    if let Some(child_ids) = children_of.get(record.id.as_str()) {
        for &child_id in child_ids {
            if path.contains(child_id) {
                debug!(id = %child_id, "relation cycle detected; dropping edge");
                continue;
            }
            let child = by_id[child_id];
            children.push((child.order(), expand(child, by_id, children_of, path)));
        }
    }
    path.remove(record.id.as_str());
    sort_siblings(&mut children);

    TreeNode {
        id: record.id.clone(),
        name: record.title().unwrap_or_default().to_string(),
        symbol: record.field_str(SYMBOL_FIELD).map(str::to_owned),
        category: record.field_str(CATEGORY_FIELD).map(str::to_owned),
        children: children.into_iter().map(|(_, node)| node).collect(),
    }
}

/// Sort by `(order ascending, name ascending)`; missing order is +∞.
fn sort_siblings(nodes: &mut [(f64, TreeNode)]) {
    nodes.sort_by(|(a_order, a), (b_order, b)| {
        a_order.total_cmp(b_order).then_with(|| a.name.cmp(&b.name))
    });
}
