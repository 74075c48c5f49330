use crate::error::{DatasourceError, Result};
use crate::fs::OpenOptions;
use parquet_codec::OptionMap;
use serde::{Deserialize, Serialize};

/// One path or a list of paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paths {
    One(String),
    Many(Vec<String>),
}

impl Paths {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Paths::One(path) => vec![path],
            Paths::Many(paths) => paths,
        }
    }
}

/// Construction-time datasource configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasourceConfig {
    pub paths: Paths,
    /// Read options; `use_threads` is taken by the datasource, the rest go
    /// to the decoder
    #[serde(default)]
    pub read_table_args: OptionMap,
    #[serde(default)]
    pub open_args: OpenOptions,
}

impl DatasourceConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| DatasourceError::configuration(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| DatasourceError::configuration(e.to_string()))
    }
}
