//! Full-tree replacement of graph subtrees.
//!
//! Used by full backfills and "replace this subtree" updates: the old root
//! and everything reachable from it is detach-deleted, then the tree is
//! recreated depth-first with labels assigned purely by depth.

use anyhow::Result;
use tracing::{info, warn};

use ags_core::{FieldValue, TreeNode};

use crate::model::Label;
use crate::mutate::GraphMutator;
use crate::statement::{GraphStatement, PropertyMap};

/// Trees deeper than this are pruned; external sources are not trusted to
/// stay within the three named ranks.
const MAX_DEPTH: usize = 64;

/// Node/edge counts from a replace run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceStats {
    pub nodes: usize,
    pub relationships: usize,
}

/// Statements that drop a root's existing subtree and recreate it.
pub fn subtree_statements(root: &TreeNode) -> Vec<GraphStatement> {
    let mut statements = vec![GraphStatement::DeleteSubtree {
        label: Label::from_depth(0),
        id: root.id.clone(),
    }];
    push_subtree(root, 0, None, &mut statements);
    statements
}

/// Statements that wipe every managed label and recreate all roots.
pub fn full_refresh_statements(roots: &[TreeNode]) -> Vec<GraphStatement> {
    let mut statements: Vec<GraphStatement> = Label::ALL
        .into_iter()
        .map(|label| GraphStatement::ClearLabel { label })
        .collect();
    for root in roots {
        push_subtree(root, 0, None, &mut statements);
    }
    statements
}

fn push_subtree(
    node: &TreeNode,
    depth: usize,
    parent: Option<(Label, String)>,
    out: &mut Vec<GraphStatement>,
) {
    if depth > MAX_DEPTH {
        warn!(id = %node.id, depth, "tree deeper than supported; pruning");
        return;
    }
    let label = Label::from_depth(depth);

    let mut properties = PropertyMap::new();
    properties.insert("name".to_string(), FieldValue::Text(node.name.clone()));
    if let Some(symbol) = &node.symbol {
        properties.insert("symbol".to_string(), FieldValue::Text(symbol.clone()));
    }
    if let Some(category) = &node.category {
        properties.insert("category".to_string(), FieldValue::Text(category.clone()));
    }
    out.push(GraphStatement::MergeProperties {
        label,
        id: node.id.clone(),
        properties,
    });

    if let Some((parent_label, parent_id)) = parent {
        out.push(GraphStatement::MergeEdge {
            parent: parent_label,
            child: label,
            rel: label.child_relation(),
            parent_id,
            child_id: node.id.clone(),
        });
    }

    for child in &node.children {
        push_subtree(child, depth + 1, Some((label, node.id.clone())), out);
    }
}

/// Replace each root's subtree in the graph.
pub async fn replace_roots(mutator: &GraphMutator, roots: &[TreeNode]) -> Result<ReplaceStats> {
    let mut stats = ReplaceStats::default();
    for root in roots {
        let statements = subtree_statements(root);
        count(&statements, &mut stats);
        mutator.apply(&statements).await?;
    }
    info!(
        roots = roots.len(),
        nodes = stats.nodes,
        relationships = stats.relationships,
        "tree replace complete"
    );
    Ok(stats)
}

/// Wipe every managed label, then recreate the given roots. Disaster
/// recovery only, never the steady-state path.
pub async fn full_refresh(mutator: &GraphMutator, roots: &[TreeNode]) -> Result<ReplaceStats> {
    let statements = full_refresh_statements(roots);
    let mut stats = ReplaceStats::default();
    count(&statements, &mut stats);
    mutator.apply(&statements).await?;
    info!(
        roots = roots.len(),
        nodes = stats.nodes,
        relationships = stats.relationships,
        "full graph refresh complete"
    );
    Ok(stats)
}

fn count(statements: &[GraphStatement], stats: &mut ReplaceStats) {
    for statement in statements {
        match statement {
            GraphStatement::MergeProperties { .. } => stats.nodes += 1,
            GraphStatement::MergeEdge { .. } => stats.relationships += 1,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memgraph::MemGraph;
    use crate::model::RelType;

    fn leaf(id: &str, name: &str) -> TreeNode {
        TreeNode {
            id: id.to_string(),
            name: name.to_string(),
            symbol: None,
            category: None,
            children: Vec::new(),
        }
    }

    fn branch(id: &str, name: &str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            children,
            ..leaf(id, name)
        }
    }

    #[test]
    fn test_plan_deletes_before_recreating() {
        let root = branch("c1", "Existence", vec![leaf("g1", "Body")]);
        let statements = subtree_statements(&root);

        assert!(matches!(
            &statements[0],
            GraphStatement::DeleteSubtree { label: Label::Conjunction, id } if id == "c1"
        ));
        assert!(matches!(
            &statements[1],
            GraphStatement::MergeProperties { label: Label::Conjunction, id, .. } if id == "c1"
        ));
        assert!(matches!(
            &statements[2],
            GraphStatement::MergeProperties { label: Label::Group, id, .. } if id == "g1"
        ));
        assert!(matches!(
            &statements[3],
            GraphStatement::MergeEdge { rel: RelType::HasGroup, parent_id, child_id, .. }
                if parent_id == "c1" && child_id == "g1"
        ));
    }

    #[test]
    fn test_depth_past_last_rank_collapses_onto_area() {
        let root = branch(
            "c1",
            "Root",
            vec![branch(
                "g1",
                "Mid",
                vec![branch("a1", "Leaf", vec![leaf("a2", "Deeper")])],
            )],
        );
        let statements = subtree_statements(&root);

        let deep_merge = statements
            .iter()
            .find(|statement| {
                matches!(statement, GraphStatement::MergeProperties { id, .. } if id == "a2")
            })
            .unwrap();
        assert!(matches!(
            deep_merge,
            GraphStatement::MergeProperties { label: Label::Area, .. }
        ));

        let deep_edge = statements
            .iter()
            .find(|statement| {
                matches!(statement, GraphStatement::MergeEdge { child_id, .. } if child_id == "a2")
            })
            .unwrap();
        assert!(matches!(
            deep_edge,
            GraphStatement::MergeEdge {
                parent: Label::Area,
                child: Label::Area,
                rel: RelType::HasArea,
                ..
            }
        ));
    }

    #[test]
    fn test_replace_drops_children_no_longer_present() {
        let mut graph = MemGraph::default();
        let before = branch("c1", "Root", vec![leaf("g1", "Old"), leaf("g2", "Kept")]);
        graph.apply_all(&subtree_statements(&before)).unwrap();
        assert!(graph.node(Label::Group, "g1").is_some());

        let after = branch("c1", "Root", vec![leaf("g2", "Kept")]);
        graph.apply_all(&subtree_statements(&after)).unwrap();

        assert!(graph.node(Label::Group, "g1").is_none());
        assert!(graph.node(Label::Group, "g2").is_some());
        assert!(graph.has_edge(
            (Label::Conjunction, "c1"),
            RelType::HasGroup,
            (Label::Group, "g2")
        ));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_full_refresh_wipes_managed_labels_first() {
        let mut graph = MemGraph::default();
        graph
            .apply_all(&subtree_statements(&branch(
                "old-root",
                "Old",
                vec![leaf("old-group", "OldGroup")],
            )))
            .unwrap();

        let statements = full_refresh_statements(&[branch("c1", "New", vec![leaf("g1", "G")])]);
        graph.apply_all(&statements).unwrap();

        assert!(graph.node(Label::Conjunction, "old-root").is_none());
        assert!(graph.node(Label::Group, "old-group").is_none());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_runaway_depth_is_pruned() {
        let mut node = leaf("deepest", "Deepest");
        for index in (0..80).rev() {
            node = branch(&format!("n{index}"), "N", vec![node]);
        }
        let statements = subtree_statements(&node);
        let merges = statements
            .iter()
            .filter(|statement| matches!(statement, GraphStatement::MergeProperties { .. }))
            .count();
        assert_eq!(merges, MAX_DEPTH + 1);
    }
}
