use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::error::EtlError;

pub const DATASET_VAR_TYPE: &str = "%DATASETID%";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunParameter {
    pub parameter_id: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub var_type: String,
}

impl RunParameter {
    pub fn new(
        parameter_id: impl Into<String>,
        value: impl Into<String>,
        var_type: impl Into<String>,
    ) -> Self {
        Self {
            parameter_id: parameter_id.into(),
            value: value.into(),
            var_type: var_type.into(),
        }
    }

    pub fn is_dataset(&self) -> bool {
        self.var_type == DATASET_VAR_TYPE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParameter {
    pub value: String,
    pub var_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedParameters {
    entries: BTreeMap<String, ResolvedParameter>,
}

impl ResolvedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parameter_id: impl Into<String>, parameter: ResolvedParameter) {
        self.entries.insert(parameter_id.into(), parameter);
    }

    pub fn get(&self, parameter_id: &str) -> Option<&ResolvedParameter> {
        self.entries.get(parameter_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn require(&self, parameter_id: &str) -> Result<&str, EtlError> {
        self.entries
            .get(parameter_id)
            .map(|param| param.value.as_str())
            .ok_or_else(|| EtlError::MissingParameter(parameter_id.to_string()))
    }

    pub fn require_int(&self, parameter_id: &str) -> Result<i64, EtlError> {
        let value = self.require(parameter_id)?;
        parse_integer(value).ok_or_else(|| EtlError::InvalidInteger {
            parameter: parameter_id.to_string(),
            value: value.to_string(),
        })
    }
}

fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceFile {
    pub file_name: String,
}

impl WorkspaceFile {
    pub fn local_name(&self) -> &str {
        self.file_name
            .rsplit('/')
            .next()
            .unwrap_or(self.file_name.as_str())
    }
}

impl fmt::Display for WorkspaceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name)
    }
}
