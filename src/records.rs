use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Relationship,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Relationship => "relationship",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Text(String),
    Raw(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(value) => write!(f, "{value}"),
            ParamValue::Text(value) => write!(f, "'{value}'"),
            ParamValue::Raw(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, ParamValue)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.0.push((key.into(), value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn to_payload(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub node_type: String,
    pub name: String,
    pub params: Params,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRecord {
    pub rel_type: String,
    pub source: String,
    pub target: String,
    pub name: String,
    pub params: Params,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphRecord {
    Node(NodeRecord),
    Relationship(RelationshipRecord),
}

impl GraphRecord {
    pub fn name(&self) -> &str {
        match self {
            GraphRecord::Node(node) => &node.name,
            GraphRecord::Relationship(rel) => &rel.name,
        }
    }

    pub fn to_wire(&self) -> GraphProperties {
        match self {
            GraphRecord::Node(node) => GraphProperties {
                entity_type: node.node_type.clone(),
                source: None,
                target: None,
                name: node.name.clone(),
                params: node.params.to_payload(),
            },
            GraphRecord::Relationship(rel) => GraphProperties {
                entity_type: rel.rel_type.clone(),
                source: Some(rel.source.clone()),
                target: Some(rel.target.clone()),
                name: rel.name.clone(),
                params: rel.params.to_payload(),
            },
        }
    }
}

impl From<NodeRecord> for GraphRecord {
    fn from(node: NodeRecord) -> Self {
        GraphRecord::Node(node)
    }
}

impl From<RelationshipRecord> for GraphRecord {
    fn from(rel: RelationshipRecord) -> Self {
        GraphRecord::Relationship(rel)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphProperties {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub name: String,
    pub params: String,
}
