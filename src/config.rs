use camino::Utf8PathBuf;

use crate::error::EtlError;

pub const ENV_API_SCOPE: &str = "CSM_API_SCOPE";
pub const ENV_API_URL: &str = "CSM_API_URL";
pub const ENV_ORGANIZATION_ID: &str = "CSM_ORGANIZATION_ID";
pub const ENV_WORKSPACE_ID: &str = "CSM_WORKSPACE_ID";
pub const ENV_RUNNER_ID: &str = "CSM_RUNNER_ID";
pub const ENV_PARAMETERS_PATH: &str = "CSM_PARAMETERS_ABSOLUTE_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    pub api_url: String,
    pub api_scope: String,
    pub organization_id: String,
    pub workspace_id: String,
    pub runner_id: String,
    pub parameters_dir: Utf8PathBuf,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn from_env() -> Result<EtlConfig, EtlError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    pub fn resolve<F>(lookup: F) -> Result<EtlConfig, EtlError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = required(&lookup, ENV_API_URL)?
            .trim_end_matches('/')
            .to_string();
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(EtlError::InvalidConfig(format!(
                "{ENV_API_URL} must be an http(s) URL, got {api_url}"
            )));
        }

        Ok(EtlConfig {
            api_url,
            api_scope: required(&lookup, ENV_API_SCOPE)?,
            organization_id: required(&lookup, ENV_ORGANIZATION_ID)?,
            workspace_id: required(&lookup, ENV_WORKSPACE_ID)?,
            runner_id: required(&lookup, ENV_RUNNER_ID)?,
            parameters_dir: Utf8PathBuf::from(required(&lookup, ENV_PARAMETERS_PATH)?),
        })
    }
}

pub(crate) fn required<F>(lookup: &F, key: &str) -> Result<String, EtlError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| EtlError::MissingEnv(key.to_string()))
}
