#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use camino::Utf8PathBuf;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use csm_twingraph_etl::config::EtlConfig;
use csm_twingraph_etl::domain::{RunParameter, WorkspaceFile};
use csm_twingraph_etl::error::EtlError;
use csm_twingraph_etl::platform::{Dataset, PlatformClient, Runner};
use csm_twingraph_etl::records::{EntityKind, GraphRecord};
use csm_twingraph_etl::twingraph::TwinGraphClient;

#[derive(Default)]
pub struct MockPlatform {
    pub runner: Runner,
    pub datasets: HashMap<String, Dataset>,
    pub files: Vec<(String, Vec<u8>)>,
    pub downloads: Mutex<Vec<String>>,
}

impl MockPlatform {
    pub fn with_dataset(mut self, id: &str, storage_prefix: Option<&str>) -> Self {
        let dataset: Dataset = match storage_prefix {
            Some(prefix) => serde_json::from_value(serde_json::json!({
                "id": id,
                "connector": {
                    "parametersValues": {"AZURE_STORAGE_CONTAINER_BLOB_PREFIX": prefix}
                }
            }))
            .unwrap(),
            None => serde_json::from_value(serde_json::json!({"id": id})).unwrap(),
        };
        self.datasets.insert(id.to_string(), dataset);
        self
    }

    pub fn with_file(mut self, name: &str, content: &[u8]) -> Self {
        self.files.push((name.to_string(), content.to_vec()));
        self
    }

    pub fn downloaded(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

impl PlatformClient for MockPlatform {
    fn get_runner(&self, _runner_id: &str) -> Result<Runner, EtlError> {
        Ok(self.runner.clone())
    }

    fn find_dataset(&self, dataset_id: &str) -> Result<Dataset, EtlError> {
        self.datasets
            .get(dataset_id)
            .cloned()
            .ok_or_else(|| EtlError::ApiStatus {
                status: 404,
                message: format!("dataset {dataset_id} not found"),
            })
    }

    fn list_workspace_files(&self) -> Result<Vec<WorkspaceFile>, EtlError> {
        Ok(self
            .files
            .iter()
            .map(|(name, _)| WorkspaceFile {
                file_name: name.clone(),
            })
            .collect())
    }

    fn download_workspace_file(&self, file_name: &str) -> Result<Vec<u8>, EtlError> {
        self.downloads.lock().unwrap().push(file_name.to_string());
        self.files
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| EtlError::ApiStatus {
                status: 404,
                message: format!("file {file_name} not found"),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphCall {
    Status,
    Query(String),
    Create(EntityKind, Vec<GraphRecord>),
}

// Node replies assign `id-<n>` store ids in request order.
#[derive(Default)]
pub struct MockGraph {
    pub populated: bool,
    pub relationship_reply: String,
    pub calls: Mutex<Vec<GraphCall>>,
}

impl MockGraph {
    pub fn populated() -> Self {
        Self {
            populated: true,
            ..Self::default()
        }
    }

    pub fn with_relationship_reply(mut self, reply: &str) -> Self {
        self.relationship_reply = reply.to_string();
        self
    }

    pub fn calls(&self) -> Vec<GraphCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self, kind: EntityKind) -> Vec<Vec<GraphRecord>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GraphCall::Create(k, records) if k == kind => Some(records),
                _ => None,
            })
            .collect()
    }
}

impl TwinGraphClient for MockGraph {
    fn dataset_status(&self, _dataset_id: &str) -> Result<bool, EtlError> {
        self.calls.lock().unwrap().push(GraphCall::Status);
        Ok(self.populated)
    }

    fn run_query(&self, _dataset_id: &str, query: &str) -> Result<(), EtlError> {
        self.calls
            .lock()
            .unwrap()
            .push(GraphCall::Query(query.to_string()));
        Ok(())
    }

    fn create_entities(
        &self,
        _dataset_id: &str,
        kind: EntityKind,
        records: &[GraphRecord],
    ) -> Result<String, EtlError> {
        self.calls
            .lock()
            .unwrap()
            .push(GraphCall::Create(kind, records.to_vec()));
        if kind == EntityKind::Relationship {
            return Ok(self.relationship_reply.clone());
        }
        let created: Vec<serde_json::Value> = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                serde_json::json!({"a": {"id": format!("id-{i}"), "properties": {"id": record.name()}}})
            })
            .collect();
        Ok(serde_json::to_string(&created).unwrap())
    }
}

pub fn test_config(parameters_dir: &Path) -> EtlConfig {
    EtlConfig {
        api_url: "https://api.example.com".to_string(),
        api_scope: "http://example.com/.default".to_string(),
        organization_id: "o-org".to_string(),
        workspace_id: "w-ws".to_string(),
        runner_id: "r-run".to_string(),
        parameters_dir: Utf8PathBuf::from_path_buf(parameters_dir.to_path_buf()).unwrap(),
    }
}

pub fn literal(id: &str, value: &str) -> RunParameter {
    RunParameter::new(id, value, "int")
}

pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

pub const CUSTOMERS_CSV: &str = "id,Satisfaction,SurroundingSatisfaction,Thirsty\n\
Customer1,0,0,false\n\
Customer2,3,1,true\n";

pub const SATISFACTION_CSV: &str = "source,target,name\nCustomer1,Customer2,arc_from_Customer1_to_Customer2\n";

pub const BAR_VERTEX_CSV: &str = "source,target,name\nMyBar,Customer1,arc_from_MyBar_to_Customer1\n";

pub fn brewery_zip_bytes(scratch: &Path) -> Vec<u8> {
    let path = scratch.join("brewery_instance.zip");
    write_zip(
        &path,
        &[
            ("reference/Nodes/Customer.csv", CUSTOMERS_CSV),
            ("reference/Edges/arc_Satisfaction.csv", SATISFACTION_CSV),
            ("reference/Edges/Bar_vertex.csv", BAR_VERTEX_CSV),
        ],
    );
    fs::read(&path).unwrap()
}
