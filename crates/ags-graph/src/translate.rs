//! Translation of change events into graph statements.

use ags_core::{ChangeEvent, ChangeOperation};

use crate::model::Label;
use crate::statement::GraphStatement;

/// Map one change event onto idempotent graph statements.
///
/// Pure: no store access, no clock, no configuration beyond the delete
/// policy. Re-applying the resulting statements converges on the same graph
/// state, which is what makes at-least-once delivery safe.
pub fn translate(event: &ChangeEvent, label: Label, detach_delete: bool) -> Vec<GraphStatement> {
    match event.operation {
        ChangeOperation::Insert | ChangeOperation::Replace => {
            let properties = event
                .full_record
                .as_ref()
                .map(|record| record.fields.clone())
                .unwrap_or_default();
            vec![GraphStatement::UpsertNode {
                label,
                id: event.record_id.clone(),
                properties,
            }]
        }
        ChangeOperation::Update => {
            let mut statements = vec![GraphStatement::MergeProperties {
                label,
                id: event.record_id.clone(),
                properties: event.updated_fields.clone(),
            }];
            for property in &event.removed_fields {
                statements.push(GraphStatement::RemoveProperty {
                    label,
                    id: event.record_id.clone(),
                    property: property.clone(),
                });
            }
            statements
        }
        ChangeOperation::Delete => vec![GraphStatement::DeleteNode {
            label,
            id: event.record_id.clone(),
            detach: detach_delete,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memgraph::MemGraph;
    use crate::model::RelType;
    use ags_core::{FieldValue, Record};
    use indexmap::IndexMap;

    fn insert_event(record: Record) -> ChangeEvent {
        ChangeEvent {
            operation: ChangeOperation::Insert,
            record_id: record.id.clone(),
            full_record: Some(record),
            updated_fields: IndexMap::new(),
            removed_fields: Vec::new(),
        }
    }

    fn replace_event(record: Record) -> ChangeEvent {
        ChangeEvent {
            operation: ChangeOperation::Replace,
            ..insert_event(record)
        }
    }

    fn update_event(
        id: &str,
        updated: &[(&str, FieldValue)],
        removed: &[&str],
    ) -> ChangeEvent {
        ChangeEvent {
            operation: ChangeOperation::Update,
            record_id: id.to_string(),
            full_record: None,
            updated_fields: updated
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            removed_fields: removed.iter().map(|name| name.to_string()).collect(),
        }
    }

    fn delete_event(id: &str) -> ChangeEvent {
        ChangeEvent {
            operation: ChangeOperation::Delete,
            record_id: id.to_string(),
            full_record: None,
            updated_fields: IndexMap::new(),
            removed_fields: Vec::new(),
        }
    }

    #[test]
    fn test_insert_becomes_a_single_upsert() {
        let record =
            Record::new("a1").with_field("Name", FieldValue::Title("Health".to_string()));
        let statements = translate(&insert_event(record), Label::Area, true);
        assert_eq!(statements.len(), 1);
        assert!(matches!(
            &statements[0],
            GraphStatement::UpsertNode { label: Label::Area, id, properties }
                if id == "a1" && properties.contains_key("Name")
        ));
    }

    #[test]
    fn test_update_becomes_merge_plus_removals() {
        let event = update_event(
            "a1",
            &[("Name", FieldValue::Title("X".to_string()))],
            &["OldTag", "Older"],
        );
        let statements = translate(&event, Label::Area, true);
        assert_eq!(statements.len(), 3);
        assert!(matches!(&statements[0], GraphStatement::MergeProperties { .. }));
        assert!(matches!(
            &statements[1],
            GraphStatement::RemoveProperty { property, .. } if property == "OldTag"
        ));
        assert!(matches!(
            &statements[2],
            GraphStatement::RemoveProperty { property, .. } if property == "Older"
        ));
    }

    #[test]
    fn test_delete_carries_the_configured_detach_flag() {
        let statements = translate(&delete_event("a1"), Label::Area, false);
        assert!(matches!(
            &statements[0],
            GraphStatement::DeleteNode { detach: false, .. }
        ));
    }

    #[test]
    fn test_reapplying_an_insert_is_idempotent() {
        let record = Record::new("a1")
            .with_field("Name", FieldValue::Title("Health".to_string()))
            .with_field("#", FieldValue::Number(2.0));
        let statements = translate(&insert_event(record), Label::Area, true);

        let mut graph = MemGraph::default();
        graph.apply_all(&statements).unwrap();
        graph.apply_all(&statements).unwrap();

        assert_eq!(graph.node_count(), 1);
        let node = graph.node(Label::Area, "a1").unwrap();
        assert_eq!(node.get("Name"), Some(&FieldValue::Title("Health".to_string())));
        assert_eq!(node.get("#"), Some(&FieldValue::Number(2.0)));
    }

    #[test]
    fn test_replace_overwrites_stale_properties() {
        let mut graph = MemGraph::default();
        let original = Record::new("a1")
            .with_field("Name", FieldValue::Title("Health".to_string()))
            .with_field("Stale", FieldValue::Text("old".to_string()));
        graph
            .apply_all(&translate(&insert_event(original), Label::Area, true))
            .unwrap();

        let replacement =
            Record::new("a1").with_field("Name", FieldValue::Title("Renamed".to_string()));
        graph
            .apply_all(&translate(&replace_event(replacement), Label::Area, true))
            .unwrap();

        let node = graph.node(Label::Area, "a1").unwrap();
        assert_eq!(node.get("Name"), Some(&FieldValue::Title("Renamed".to_string())));
        assert!(node.get("Stale").is_none());
    }

    #[test]
    fn test_update_merges_and_removes_without_touching_the_rest() {
        let mut graph = MemGraph::default();
        let record = Record::new("a1")
            .with_field("Name", FieldValue::Title("Health".to_string()))
            .with_field("OldTag", FieldValue::Text("tag".to_string()))
            .with_field("Keep", FieldValue::Text("kept".to_string()));
        graph
            .apply_all(&translate(&insert_event(record), Label::Area, true))
            .unwrap();

        let event = update_event(
            "a1",
            &[("Name", FieldValue::Title("X".to_string()))],
            &["OldTag"],
        );
        graph
            .apply_all(&translate(&event, Label::Area, true))
            .unwrap();

        let node = graph.node(Label::Area, "a1").unwrap();
        assert_eq!(node.get("Name"), Some(&FieldValue::Title("X".to_string())));
        assert!(node.get("OldTag").is_none());
        assert_eq!(node.get("Keep"), Some(&FieldValue::Text("kept".to_string())));
    }

    #[test]
    fn test_update_creates_a_missing_node() {
        let mut graph = MemGraph::default();
        let event = update_event("new", &[("Name", FieldValue::Title("N".to_string()))], &[]);
        graph
            .apply_all(&translate(&event, Label::Group, true))
            .unwrap();
        assert!(graph.node(Label::Group, "new").is_some());
    }

    #[test]
    fn test_delete_with_detach_removes_node_and_edge() {
        let mut graph = MemGraph::default();
        seed_parent_child(&mut graph);

        graph
            .apply_all(&translate(&delete_event("g1"), Label::Group, true))
            .unwrap();

        assert!(graph.node(Label::Group, "g1").is_none());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_delete_without_detach_blocks_while_edges_remain() {
        let mut graph = MemGraph::default();
        seed_parent_child(&mut graph);

        let result = graph.apply_all(&translate(&delete_event("g1"), Label::Group, false));
        assert!(result.is_err());
        assert!(graph.node(Label::Group, "g1").is_some());
        assert_eq!(graph.edge_count(), 1);
    }

    fn seed_parent_child(graph: &mut MemGraph) {
        let parent = Record::new("c1").with_field("Name", FieldValue::Title("C".to_string()));
        let child = Record::new("g1").with_field("Name", FieldValue::Title("G".to_string()));
        graph
            .apply_all(&translate(&insert_event(parent), Label::Conjunction, true))
            .unwrap();
        graph
            .apply_all(&translate(&insert_event(child), Label::Group, true))
            .unwrap();
        graph
            .apply(&GraphStatement::MergeEdge {
                parent: Label::Conjunction,
                child: Label::Group,
                rel: RelType::HasGroup,
                parent_id: "c1".to_string(),
                child_id: "g1".to_string(),
            })
            .unwrap();
        assert_eq!(graph.edge_count(), 1);
    }
}
