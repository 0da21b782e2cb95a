use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::EtlError;
use crate::platform::{PlatformClient, PlatformHttpClient};
use crate::records::{EntityKind, GraphProperties, GraphRecord};

pub const DELETE_ALL_QUERY: &str = "MATCH (n) DETACH DELETE n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEntity {
    pub store_id: String,
    pub domain_id: String,
}

pub trait TwinGraphClient {
    fn dataset_status(&self, dataset_id: &str) -> Result<bool, EtlError>;
    fn run_query(&self, dataset_id: &str, query: &str) -> Result<(), EtlError>;
    fn create_entities(
        &self,
        dataset_id: &str,
        kind: EntityKind,
        records: &[GraphRecord],
    ) -> Result<String, EtlError>;
}

impl<T: TwinGraphClient + ?Sized> TwinGraphClient for &T {
    fn dataset_status(&self, dataset_id: &str) -> Result<bool, EtlError> {
        (**self).dataset_status(dataset_id)
    }

    fn run_query(&self, dataset_id: &str, query: &str) -> Result<(), EtlError> {
        (**self).run_query(dataset_id, query)
    }

    fn create_entities(
        &self,
        dataset_id: &str,
        kind: EntityKind,
        records: &[GraphRecord],
    ) -> Result<String, EtlError> {
        (**self).create_entities(dataset_id, kind, records)
    }
}

#[derive(Serialize)]
struct TwinGraphQuery<'a> {
    query: &'a str,
}

impl TwinGraphClient for PlatformHttpClient {
    fn dataset_status(&self, dataset_id: &str) -> Result<bool, EtlError> {
        Ok(self.find_dataset(dataset_id)?.is_populated())
    }

    fn run_query(&self, dataset_id: &str, query: &str) -> Result<(), EtlError> {
        let url = format!("{}/datasets/{dataset_id}/twingraph", self.organization_url());
        debug!(url, query, "POST");
        self.send(self.http().post(&url).json(&TwinGraphQuery { query }))?;
        Ok(())
    }

    fn create_entities(
        &self,
        dataset_id: &str,
        kind: EntityKind,
        records: &[GraphRecord],
    ) -> Result<String, EtlError> {
        let url = format!(
            "{}/datasets/{dataset_id}/twingraph/{kind}",
            self.organization_url()
        );
        let body: Vec<GraphProperties> = records.iter().map(GraphRecord::to_wire).collect();
        debug!(url, count = body.len(), "POST");
        let response = self.send(self.http().post(&url).json(&body))?;
        response
            .text()
            .map_err(|err| EtlError::ApiHttp(err.to_string()))
    }
}

// Node replies arrive as `[...][...]`, one array per store batch, sometimes
// wrapped in a JSON string. Items without `a.id` and `a.properties.id` are skipped.
pub fn decode_created(body: &str) -> Result<Vec<CreatedEntity>, EtlError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('"') {
        let inner: String = serde_json::from_str(trimmed)
            .map_err(|err| EtlError::ApiDecode(format!("create response: {err}")))?;
        return decode_created(&inner);
    }

    let mut created = Vec::new();
    for batch in serde_json::Deserializer::from_str(trimmed).into_iter::<Vec<Value>>() {
        let batch = batch.map_err(|err| EtlError::ApiDecode(format!("create response: {err}")))?;
        created.extend(batch.iter().filter_map(created_entity));
    }
    Ok(created)
}

fn created_entity(item: &Value) -> Option<CreatedEntity> {
    let entity = item.get("a")?;
    Some(CreatedEntity {
        store_id: scalar_to_string(entity.get("id")?)?,
        domain_id: scalar_to_string(entity.get("properties")?.get("id")?)?,
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
