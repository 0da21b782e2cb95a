use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use crate::domain::{ResolvedParameter, ResolvedParameters, RunParameter, WorkspaceFile};
use crate::error::EtlError;
use crate::platform::{PlatformClient, WORKSPACE_FILE_MARKER};

#[derive(Debug, Clone, Default)]
pub struct WorkspaceFileIndex {
    files: Vec<WorkspaceFile>,
}

impl WorkspaceFileIndex {
    pub fn new(files: Vec<WorkspaceFile>) -> Self {
        Self { files }
    }

    pub fn fetch<P: PlatformClient>(client: &P) -> Result<Self, EtlError> {
        let files = client.list_workspace_files()?;
        info!(count = files.len(), "loaded workspace file index");
        Ok(Self::new(files))
    }

    pub fn matching<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a WorkspaceFile> {
        self.files
            .iter()
            .filter(move |file| file.file_name.starts_with(prefix))
    }
}

pub fn workspace_file_prefix(storage_prefix: Option<&str>) -> Option<String> {
    let storage_prefix = storage_prefix.filter(|prefix| !prefix.is_empty())?;
    if !storage_prefix.contains(WORKSPACE_FILE_MARKER) {
        return None;
    }
    Some(storage_prefix.replace(&format!("{WORKSPACE_FILE_MARKER}/"), ""))
}

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub parameters: ResolvedParameters,
    pub skipped: Vec<String>,
}

pub struct ParameterResolver<'a, P: PlatformClient> {
    client: &'a P,
    index: &'a WorkspaceFileIndex,
    parameters_dir: &'a Utf8Path,
}

impl<'a, P: PlatformClient> ParameterResolver<'a, P> {
    pub fn new(client: &'a P, index: &'a WorkspaceFileIndex, parameters_dir: &'a Utf8Path) -> Self {
        Self {
            client,
            index,
            parameters_dir,
        }
    }

    pub fn resolve(&self, parameters: &[RunParameter]) -> Result<Resolution, EtlError> {
        let mut resolution = Resolution::default();
        for parameter in parameters {
            info!(
                parameter = %parameter.parameter_id,
                value = %parameter.value,
                "found parameter"
            );
            let value = if parameter.is_dataset() {
                match self.download_dataset(parameter)? {
                    Some(dir) => dir.into_string(),
                    None => {
                        warn!(
                            parameter = %parameter.parameter_id,
                            "parameter is not a downloadable dataset, skipping it"
                        );
                        resolution.skipped.push(parameter.parameter_id.clone());
                        continue;
                    }
                }
            } else {
                parameter.value.clone()
            };
            resolution.parameters.insert(
                parameter.parameter_id.clone(),
                ResolvedParameter {
                    value,
                    var_type: parameter.var_type.clone(),
                },
            );
        }
        Ok(resolution)
    }

    fn download_dataset(&self, parameter: &RunParameter) -> Result<Option<Utf8PathBuf>, EtlError> {
        let dir_name = parameter_dir_name(&parameter.parameter_id)?;
        let dataset = self.client.find_dataset(&parameter.value)?;
        let Some(prefix) = workspace_file_prefix(dataset.storage_prefix()) else {
            return Ok(None);
        };
        info!(parameter = %parameter.parameter_id, "parameter is a downloadable dataset");

        let target_dir = self.parameters_dir.join(dir_name);
        fs::create_dir_all(target_dir.as_std_path())
            .map_err(|err| EtlError::Filesystem(format!("create {target_dir}: {err}")))?;

        let files: Vec<&WorkspaceFile> = self.index.matching(&prefix).collect();
        if files.len() > 1 {
            info!(count = files.len(), "files found in the dataset, downloading those");
        } else {
            info!(count = files.len(), "file found in the dataset, downloading it");
        }

        for file in files {
            let bytes = self.client.download_workspace_file(&file.file_name)?;
            let destination = target_dir.join(file.local_name());
            fs::write(destination.as_std_path(), &bytes)
                .map_err(|err| EtlError::Filesystem(format!("write {destination}: {err}")))?;
            info!(file = %file, path = %destination, bytes = bytes.len(), "downloaded workspace file");
        }
        Ok(Some(target_dir))
    }
}

// The id names a single directory under the parameters root.
fn parameter_dir_name(parameter_id: &str) -> Result<&str, EtlError> {
    if parameter_id.is_empty()
        || parameter_id == "."
        || parameter_id == ".."
        || parameter_id.contains(['/', '\\'])
    {
        return Err(EtlError::InvalidConfig(format!(
            "parameter id {parameter_id:?} is not a plain directory name"
        )));
    }
    Ok(parameter_id)
}
