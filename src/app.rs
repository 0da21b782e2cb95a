use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::archive::extract_instance;
use crate::config::EtlConfig;
use crate::error::EtlError;
use crate::mapper::{build_bar_record, read_reference};
use crate::platform::PlatformClient;
use crate::resolver::{ParameterResolver, WorkspaceFileIndex};
use crate::twingraph::TwinGraphClient;
use crate::writer::{GraphWriter, WriteSummary};

pub const BAR_INSTANCE: &str = "bar_instance";

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub runner_id: String,
    pub target_dataset: String,
    pub resolved_parameters: usize,
    pub skipped_parameters: Vec<String>,
    pub write: WriteSummary,
}

pub struct App<P: PlatformClient, G: TwinGraphClient> {
    config: EtlConfig,
    platform: P,
    graph: G,
}

impl<P: PlatformClient, G: TwinGraphClient> App<P, G> {
    pub fn new(config: EtlConfig, platform: P, graph: G) -> Self {
        Self {
            config,
            platform,
            graph,
        }
    }

    pub fn run(&self) -> Result<RunSummary, EtlError> {
        info!(runner = %self.config.runner_id, "starting the ETL run");

        let runner = self.platform.get_runner(&self.config.runner_id)?;
        info!(parameters = runner.parameters_values.len(), "loaded run data");
        let target_dataset = runner.target_dataset()?.to_string();
        self.platform.find_dataset(&target_dataset)?;
        info!(dataset = %target_dataset, "loaded target dataset info");

        let index = WorkspaceFileIndex::fetch(&self.platform)?;
        let resolution =
            ParameterResolver::new(&self.platform, &index, &self.config.parameters_dir)
                .resolve(&runner.parameters_values)?;
        info!(
            resolved = resolution.parameters.len(),
            skipped = resolution.skipped.len(),
            "all parameters are loaded"
        );

        let bar = build_bar_record(&resolution.parameters)?;
        let instance_dir = resolution.parameters.require(BAR_INSTANCE)?;
        let reference_root = extract_instance(Path::new(instance_dir))?;
        let reference = read_reference(&reference_root)?;

        let nodes = std::iter::once(bar).chain(reference.customers).collect();
        let relationships = reference
            .satisfactions
            .into_iter()
            .chain(reference.bar_vertices)
            .collect();

        info!(dataset = %target_dataset, "writing data into target dataset");
        let write = GraphWriter::new(&self.graph).write(&target_dataset, nodes, relationships)?;
        info!(
            nodes = write.nodes,
            relationships = write.relationships,
            cleared = write.cleared,
            "ETL run finished"
        );

        Ok(RunSummary {
            runner_id: self.config.runner_id.clone(),
            target_dataset,
            resolved_parameters: resolution.parameters.len(),
            skipped_parameters: resolution.skipped,
            write,
        })
    }
}
