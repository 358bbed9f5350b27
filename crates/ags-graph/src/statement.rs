//! Graph mutation statements and their Cypher rendering.
//!
//! Every statement re-applies cleanly: node writes go through MERGE, removals
//! go through MATCH and no-op on absent targets. Labels and relationship
//! types are enum-derived; property names are validated and backtick-quoted;
//! property values always travel as bolt parameters.

use anyhow::{bail, Result};
use indexmap::IndexMap;
use neo4rs::Query;

use ags_core::FieldValue;

use crate::model::{Label, RelType};

/// Properties attached to a node statement, in field order.
pub type PropertyMap = IndexMap<String, FieldValue>;

/// One idempotent graph mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphStatement {
    /// MERGE by id and overwrite every non-id property.
    UpsertNode {
        label: Label,
        id: String,
        properties: PropertyMap,
    },
    /// MERGE by id and merge the given properties, leaving others untouched.
    /// A missing node is created, never an error.
    MergeProperties {
        label: Label,
        id: String,
        properties: PropertyMap,
    },
    /// Remove one property; a no-op when the node or property is absent.
    RemoveProperty {
        label: Label,
        id: String,
        property: String,
    },
    /// Delete one node by id. With `detach`, incident edges go first;
    /// without it the store rejects deletion while edges remain.
    DeleteNode {
        label: Label,
        id: String,
        detach: bool,
    },
    /// Detach-delete a node and everything reachable over outgoing edges.
    DeleteSubtree { label: Label, id: String },
    /// Detach-delete every node carrying a managed label.
    ClearLabel { label: Label },
    /// MERGE a typed edge between two existing nodes.
    MergeEdge {
        parent: Label,
        child: Label,
        rel: RelType,
        parent_id: String,
        child_id: String,
    },
}

impl GraphStatement {
    /// Rendered Cypher text, without parameter values.
    pub fn cypher(&self) -> Result<String> {
        self.render().map(|(text, _)| text)
    }

    /// Build the parameterized driver query.
    pub fn to_query(&self) -> Result<Query> {
        let (text, params) = self.render()?;
        let mut query = Query::new(text);
        for (name, value) in &params {
            query = bind(query, name, value);
        }
        Ok(query)
    }

    fn render(&self) -> Result<(String, Vec<(String, FieldValue)>)> {
        match self {
            Self::UpsertNode {
                label,
                id,
                properties,
            } => {
                let mut assignments = vec!["n = {id: $id}".to_string()];
                let mut params = vec![("id".to_string(), FieldValue::Text(id.clone()))];
                collect_assignments(properties, &mut assignments, &mut params)?;
                Ok((
                    format!(
                        "MERGE (n:{} {{id: $id}}) SET {}",
                        label.as_str(),
                        assignments.join(", ")
                    ),
                    params,
                ))
            }
            Self::MergeProperties {
                label,
                id,
                properties,
            } => {
                let mut assignments = Vec::new();
                let mut params = vec![("id".to_string(), FieldValue::Text(id.clone()))];
                collect_assignments(properties, &mut assignments, &mut params)?;
                let text = if assignments.is_empty() {
                    format!("MERGE (n:{} {{id: $id}})", label.as_str())
                } else {
                    format!(
                        "MERGE (n:{} {{id: $id}}) SET {}",
                        label.as_str(),
                        assignments.join(", ")
                    )
                };
                Ok((text, params))
            }
            Self::RemoveProperty {
                label,
                id,
                property,
            } => {
                if property == "id" {
                    bail!("the id property cannot be removed");
                }
                Ok((
                    format!(
                        "MATCH (n:{} {{id: $id}}) REMOVE n.{}",
                        label.as_str(),
                        quoted(property)?
                    ),
                    vec![("id".to_string(), FieldValue::Text(id.clone()))],
                ))
            }
            Self::DeleteNode { label, id, detach } => {
                let delete = if *detach { "DETACH DELETE" } else { "DELETE" };
                Ok((
                    format!("MATCH (n:{} {{id: $id}}) {} n", label.as_str(), delete),
                    vec![("id".to_string(), FieldValue::Text(id.clone()))],
                ))
            }
            Self::DeleteSubtree { label, id } => Ok((
                format!(
                    "MATCH (n:{} {{id: $id}})-[*0..]->(m) DETACH DELETE m",
                    label.as_str()
                ),
                vec![("id".to_string(), FieldValue::Text(id.clone()))],
            )),
            Self::ClearLabel { label } => Ok((
                format!("MATCH (n:{}) DETACH DELETE n", label.as_str()),
                Vec::new(),
            )),
            Self::MergeEdge {
                parent,
                child,
                rel,
                parent_id,
                child_id,
            } => Ok((
                format!(
                    "MATCH (p:{} {{id: $pid}}), (c:{} {{id: $cid}}) MERGE (p)-[:{}]->(c)",
                    parent.as_str(),
                    child.as_str(),
                    rel.as_str()
                ),
                vec![
                    ("pid".to_string(), FieldValue::Text(parent_id.clone())),
                    ("cid".to_string(), FieldValue::Text(child_id.clone())),
                ],
            )),
        }
    }
}

fn collect_assignments(
    properties: &PropertyMap,
    assignments: &mut Vec<String>,
    params: &mut Vec<(String, FieldValue)>,
) -> Result<()> {
    for (index, (name, value)) in properties.iter().enumerate() {
        // The merge key is authoritative; a field literally named "id" must
        // not overwrite it.
        if name == "id" {
            continue;
        }
        let name = quoted(name)?;
        match value {
            FieldValue::Null => assignments.push(format!("n.{name} = null")),
            _ => {
                let param = format!("p{index}");
                assignments.push(format!("n.{name} = ${param}"));
                params.push((param, value.clone()));
            }
        }
    }
    Ok(())
}

fn bind(query: Query, name: &str, value: &FieldValue) -> Query {
    match value {
        FieldValue::Title(text) | FieldValue::Text(text) | FieldValue::Select(text) => {
            query.param(name, text.as_str())
        }
        FieldValue::Number(number) => query.param(name, *number),
        FieldValue::Flag(flag) => query.param(name, *flag),
        FieldValue::Relation(ids) => query.param(name, ids.clone()),
        FieldValue::Null => query,
    }
}

/// Backtick-quote a property name after rejecting anything that could break
/// out of the quoting.
fn quoted(name: &str) -> Result<String> {
    if name.is_empty() || name.contains('`') || name.chars().any(char::is_control) {
        bail!("property name cannot appear in a query: {name:?}");
    }
    Ok(format!("`{name}`"))
}
