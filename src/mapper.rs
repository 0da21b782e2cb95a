use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::domain::ResolvedParameters;
use crate::error::EtlError;
use crate::records::{NodeRecord, ParamValue, Params, RelationshipRecord};

pub const CUSTOMER_TABLE: &str = "Nodes/Customer.csv";
pub const SATISFACTION_TABLE: &str = "Edges/arc_Satisfaction.csv";
pub const BAR_VERTEX_TABLE: &str = "Edges/Bar_vertex.csv";

pub const CUSTOMER_TYPE: &str = "Customer";
pub const SATISFACTION_TYPE: &str = "satisfaction";
pub const BAR_VERTEX_TYPE: &str = "bar_vertex";

pub const BAR_TYPE: &str = "Bar";
pub const BAR_NAME: &str = "MyBar";
pub const NUM_WAITERS: &str = "num_waiters";
pub const RESTOCK_QUANTITY: &str = "restock_quantity";
pub const STOCK: &str = "stock";

#[derive(Debug, Deserialize)]
struct CustomerRow {
    id: String,
    #[serde(rename = "Satisfaction")]
    satisfaction: String,
    #[serde(rename = "SurroundingSatisfaction")]
    surrounding_satisfaction: String,
    #[serde(rename = "Thirsty")]
    thirsty: String,
}

#[derive(Debug, Deserialize)]
struct EdgeRow {
    source: String,
    target: String,
    name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceRecords {
    pub customers: Vec<NodeRecord>,
    pub satisfactions: Vec<RelationshipRecord>,
    pub bar_vertices: Vec<RelationshipRecord>,
}

pub fn read_reference(root: &Path) -> Result<ReferenceRecords, EtlError> {
    let customers = read_customers(&root.join(CUSTOMER_TABLE))?;
    info!(count = customers.len(), "found 'Customer' list");
    let satisfactions = read_edges(&root.join(SATISFACTION_TABLE), SATISFACTION_TYPE)?;
    info!(count = satisfactions.len(), "found 'Customer satisfaction' relation");
    let bar_vertices = read_edges(&root.join(BAR_VERTEX_TABLE), BAR_VERTEX_TYPE)?;
    info!(count = bar_vertices.len(), "found 'Bar vertex' relation");
    Ok(ReferenceRecords {
        customers,
        satisfactions,
        bar_vertices,
    })
}

pub fn read_customers(path: &Path) -> Result<Vec<NodeRecord>, EtlError> {
    Ok(read_rows::<CustomerRow>(path)?
        .into_iter()
        .map(|row| NodeRecord {
            node_type: CUSTOMER_TYPE.to_string(),
            params: Params::new()
                .with("Name", ParamValue::Text(row.id.clone()))
                .with("Satisfaction", ParamValue::Raw(row.satisfaction))
                .with(
                    "SurroundingSatisfaction",
                    ParamValue::Raw(row.surrounding_satisfaction),
                )
                .with("Thirsty", ParamValue::Raw(row.thirsty)),
            name: row.id,
        })
        .collect())
}

pub fn read_edges(path: &Path, rel_type: &str) -> Result<Vec<RelationshipRecord>, EtlError> {
    Ok(read_rows::<EdgeRow>(path)?
        .into_iter()
        .map(|row| RelationshipRecord {
            rel_type: rel_type.to_string(),
            source: row.source,
            target: row.target,
            name: row.name,
            params: edge_placeholder_params(),
        })
        .collect())
}

fn edge_placeholder_params() -> Params {
    Params::new().with("a", ParamValue::Text("a".to_string()))
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, EtlError> {
    if !path.is_file() {
        return Err(EtlError::MissingFile(path.to_path_buf()));
    }
    let csv_err = |err: csv::Error| EtlError::Csv {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    reader
        .deserialize::<T>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)
}

pub fn build_bar_record(parameters: &ResolvedParameters) -> Result<NodeRecord, EtlError> {
    Ok(NodeRecord {
        node_type: BAR_TYPE.to_string(),
        name: BAR_NAME.to_string(),
        params: Params::new()
            .with("NbWaiters", ParamValue::Int(parameters.require_int(NUM_WAITERS)?))
            .with(
                "RestockQty",
                ParamValue::Int(parameters.require_int(RESTOCK_QUANTITY)?),
            )
            .with("Stock", ParamValue::Int(parameters.require_int(STOCK)?)),
    })
}
