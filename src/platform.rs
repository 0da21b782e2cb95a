use std::collections::BTreeMap;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::EtlConfig;
use crate::domain::{RunParameter, WorkspaceFile};
use crate::error::EtlError;

pub const STORAGE_PREFIX_KEY: &str = "AZURE_STORAGE_CONTAINER_BLOB_PREFIX";
pub const WORKSPACE_FILE_MARKER: &str = "%WORKSPACE_FILE%";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runner {
    #[serde(default)]
    pub dataset_list: Vec<String>,
    #[serde(default)]
    pub parameters_values: Vec<RunParameter>,
}

impl Runner {
    pub fn target_dataset(&self) -> Result<&str, EtlError> {
        self.dataset_list
            .first()
            .map(String::as_str)
            .ok_or(EtlError::NoTargetDataset)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConnector {
    #[serde(default)]
    pub parameters_values: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub connector: Option<DatasetConnector>,
    #[serde(default)]
    pub status: Value,
}

impl Dataset {
    pub fn storage_prefix(&self) -> Option<&str> {
        self.connector
            .as_ref()?
            .parameters_values
            .get(STORAGE_PREFIX_KEY)?
            .as_str()
    }

    pub fn is_populated(&self) -> bool {
        match &self.status {
            Value::Null => false,
            Value::Bool(flag) => *flag,
            Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
            Value::String(text) => !text.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        }
    }
}

pub trait PlatformClient {
    fn get_runner(&self, runner_id: &str) -> Result<Runner, EtlError>;
    fn find_dataset(&self, dataset_id: &str) -> Result<Dataset, EtlError>;
    fn list_workspace_files(&self) -> Result<Vec<WorkspaceFile>, EtlError>;
    fn download_workspace_file(&self, file_name: &str) -> Result<Vec<u8>, EtlError>;
}

impl<P: PlatformClient + ?Sized> PlatformClient for &P {
    fn get_runner(&self, runner_id: &str) -> Result<Runner, EtlError> {
        (**self).get_runner(runner_id)
    }

    fn find_dataset(&self, dataset_id: &str) -> Result<Dataset, EtlError> {
        (**self).find_dataset(dataset_id)
    }

    fn list_workspace_files(&self) -> Result<Vec<WorkspaceFile>, EtlError> {
        (**self).list_workspace_files()
    }

    fn download_workspace_file(&self, file_name: &str) -> Result<Vec<u8>, EtlError> {
        (**self).download_workspace_file(file_name)
    }
}

#[derive(Clone)]
pub struct PlatformHttpClient {
    client: Client,
    organization_url: String,
    workspace_id: String,
}

impl PlatformHttpClient {
    pub fn new(config: &EtlConfig, access_token: &str) -> Result<Self, EtlError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("csm-twingraph-etl/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| EtlError::InvalidConfig(err.to_string()))?,
        );
        let mut bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|err| EtlError::InvalidConfig(format!("access token: {err}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| EtlError::ApiHttp(err.to_string()))?;

        Ok(Self {
            client,
            organization_url: format!(
                "{}/organizations/{}",
                config.api_url, config.organization_id
            ),
            workspace_id: config.workspace_id.clone(),
        })
    }

    pub(crate) fn organization_url(&self) -> &str {
        &self.organization_url
    }

    fn workspace_url(&self) -> String {
        format!("{}/workspaces/{}", self.organization_url, self.workspace_id)
    }

    pub(crate) fn send(&self, request: RequestBuilder) -> Result<Response, EtlError> {
        let response = request
            .send()
            .map_err(|err| EtlError::ApiHttp(err.to_string()))?;
        handle_status(response)
    }

    pub(crate) fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, EtlError> {
        debug!(url, "GET");
        let response = self.send(self.client.get(url))?;
        response
            .json::<T>()
            .map_err(|err| EtlError::ApiDecode(format!("{url}: {err}")))
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }
}

fn handle_status(response: Response) -> Result<Response, EtlError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response
        .text()
        .unwrap_or_else(|_| "platform request failed".to_string());
    Err(EtlError::ApiStatus { status, message })
}

impl PlatformClient for PlatformHttpClient {
    fn get_runner(&self, runner_id: &str) -> Result<Runner, EtlError> {
        self.get_json(&format!("{}/runners/{runner_id}", self.workspace_url()))
    }

    fn find_dataset(&self, dataset_id: &str) -> Result<Dataset, EtlError> {
        self.get_json(&format!("{}/datasets/{dataset_id}", self.organization_url))
    }

    fn list_workspace_files(&self) -> Result<Vec<WorkspaceFile>, EtlError> {
        self.get_json(&format!("{}/files", self.workspace_url()))
    }

    fn download_workspace_file(&self, file_name: &str) -> Result<Vec<u8>, EtlError> {
        let url = format!("{}/files/download", self.workspace_url());
        debug!(url, file_name, "GET");
        let response = self.send(self.client.get(&url).query(&[("file_name", file_name)]))?;
        let bytes = response
            .bytes()
            .map_err(|err| EtlError::ApiHttp(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}
