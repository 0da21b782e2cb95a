use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EtlError {
    #[error("missing environment variable {0}")]
    MissingEnv(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("token request failed: {0}")]
    AuthHttp(String),

    #[error("token endpoint returned status {status}: {message}")]
    AuthStatus { status: u16, message: String },

    #[error("platform request failed: {0}")]
    ApiHttp(String),

    #[error("platform returned status {status}: {message}")]
    ApiStatus { status: u16, message: String },

    #[error("unexpected platform response: {0}")]
    ApiDecode(String),

    #[error("runner has no target dataset in its dataset list")]
    NoTargetDataset,

    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("parameter {parameter} is not an integer: {value}")]
    InvalidInteger { parameter: String, value: String },

    #[error("archive not found: {0}")]
    MissingArchive(PathBuf),

    #[error("invalid archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("input file not found: {0}")]
    MissingFile(PathBuf),

    #[error("malformed CSV in {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("relationship {relationship} references unknown node {endpoint}")]
    UnknownEndpoint {
        relationship: String,
        endpoint: String,
    },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
