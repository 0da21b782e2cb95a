use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::error::EtlError;
use crate::records::{EntityKind, GraphRecord, NodeRecord, RelationshipRecord};
use crate::twingraph::{CreatedEntity, DELETE_ALL_QUERY, TwinGraphClient, decode_created};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub cleared: bool,
    pub nodes: usize,
    pub relationships: usize,
}

pub struct GraphWriter<'a, T: TwinGraphClient> {
    client: &'a T,
}

impl<'a, T: TwinGraphClient> GraphWriter<'a, T> {
    pub fn new(client: &'a T) -> Self {
        Self { client }
    }

    pub fn write(
        &self,
        dataset_id: &str,
        nodes: Vec<NodeRecord>,
        relationships: Vec<RelationshipRecord>,
    ) -> Result<WriteSummary, EtlError> {
        let cleared = self.client.dataset_status(dataset_id)?;
        if cleared {
            info!(dataset = dataset_id, "dataset already populated, clearing it");
            self.client.run_query(dataset_id, DELETE_ALL_QUERY)?;
        }

        let node_records: Vec<GraphRecord> = nodes.into_iter().map(GraphRecord::from).collect();
        let reply = self
            .client
            .create_entities(dataset_id, EntityKind::Node, &node_records)?;
        let created = decode_created(&reply)?;
        info!(
            dataset = dataset_id,
            sent = node_records.len(),
            created = created.len(),
            "created nodes"
        );

        let ids = store_ids(&created);
        let relationship_records: Vec<GraphRecord> = remap_endpoints(relationships, &ids)?
            .into_iter()
            .map(GraphRecord::from)
            .collect();
        // Only node replies carry store ids.
        self.client
            .create_entities(dataset_id, EntityKind::Relationship, &relationship_records)?;
        info!(
            dataset = dataset_id,
            sent = relationship_records.len(),
            "created relationships"
        );

        Ok(WriteSummary {
            cleared,
            nodes: node_records.len(),
            relationships: relationship_records.len(),
        })
    }
}

// A domain id created twice maps to its last store id.
pub fn store_ids(created: &[CreatedEntity]) -> HashMap<String, String> {
    created
        .iter()
        .map(|entity| (entity.domain_id.clone(), entity.store_id.clone()))
        .collect()
}

pub fn remap_endpoints(
    relationships: Vec<RelationshipRecord>,
    ids: &HashMap<String, String>,
) -> Result<Vec<RelationshipRecord>, EtlError> {
    relationships
        .into_iter()
        .map(|rel| {
            let lookup = |endpoint: &str| {
                ids.get(endpoint)
                    .cloned()
                    .ok_or_else(|| EtlError::UnknownEndpoint {
                        relationship: rel.name.clone(),
                        endpoint: endpoint.to_string(),
                    })
            };
            let source = lookup(&rel.source)?;
            let target = lookup(&rel.target)?;
            Ok(RelationshipRecord {
                source,
                target,
                ..rel
            })
        })
        .collect()
}
