//! Keyword-style codec options
//!
//! Read and write options arrive as a loose name → value mapping (the way a
//! datasource forwards user keyword arguments). They are parsed into typed
//! [`ReadOptions`] / [`WriteOptions`] here; unknown names and values of the
//! wrong shape are rejected with [`CodecError::InvalidArgument`].

use crate::{CodecError, Result};
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::metadata::KeyValue;
use parquet::file::properties::{WriterProperties, WriterVersion};
use serde_json::Value;

/// Option name → value mapping passed through from the datasource
pub type OptionMap = serde_json::Map<String, Value>;

pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Typed decode options
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadOptions {
    /// Top-level columns to keep; `None` keeps all
    pub columns: Option<Vec<String>>,
    pub batch_size: Option<usize>,
    /// Row groups to decode; `None` decodes all
    pub row_groups: Option<Vec<usize>>,
}

impl ReadOptions {
    pub fn from_options(options: &OptionMap) -> Result<Self> {
        let mut parsed = ReadOptions::default();
        for (name, value) in options {
            match name.as_str() {
                "columns" => parsed.columns = Some(string_list(name, value)?),
                "batch_size" => parsed.batch_size = Some(positive_usize(name, value)?),
                "row_groups" => {
                    let groups = value
                        .as_array()
                        .ok_or_else(|| type_error(name, "an array of integers", value))?
                        .iter()
                        .map(|v| {
                            v.as_u64()
                                .map(|n| n as usize)
                                .ok_or_else(|| type_error(name, "an array of integers", value))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    parsed.row_groups = Some(groups);
                }
                other => {
                    return Err(CodecError::invalid_argument(format!(
                        "Unknown decode option '{}'",
                        other
                    )))
                }
            }
        }
        Ok(parsed)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }
}

/// Typed encode options
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    pub compression: Compression,
    pub max_row_group_size: Option<usize>,
    pub data_page_size: Option<usize>,
    pub write_statistics: bool,
    pub use_dictionary: bool,
    pub writer_version: WriterVersion,
    pub key_value_metadata: Vec<(String, String)>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            max_row_group_size: None,
            data_page_size: None,
            write_statistics: true,
            use_dictionary: true,
            writer_version: WriterVersion::PARQUET_1_0,
            key_value_metadata: Vec::new(),
        }
    }
}

impl WriteOptions {
    pub fn from_options(options: &OptionMap) -> Result<Self> {
        let mut parsed = WriteOptions::default();
        let mut codec_name: Option<String> = None;
        let mut level: Option<i64> = None;

        for (name, value) in options {
            match name.as_str() {
                "compression" => {
                    let codec = value
                        .as_str()
                        .ok_or_else(|| type_error(name, "a string", value))?;
                    codec_name = Some(codec.to_ascii_lowercase());
                }
                "compression_level" => {
                    level = Some(
                        value
                            .as_i64()
                            .ok_or_else(|| type_error(name, "an integer", value))?,
                    );
                }
                "row_group_size" => parsed.max_row_group_size = Some(positive_usize(name, value)?),
                "data_page_size" => parsed.data_page_size = Some(positive_usize(name, value)?),
                "write_statistics" => parsed.write_statistics = boolean(name, value)?,
                "use_dictionary" => parsed.use_dictionary = boolean(name, value)?,
                "writer_version" => {
                    parsed.writer_version = match value.as_str() {
                        Some("1.0") => WriterVersion::PARQUET_1_0,
                        Some("2.0") => WriterVersion::PARQUET_2_0,
                        _ => return Err(type_error(name, "\"1.0\" or \"2.0\"", value)),
                    }
                }
                "metadata" => {
                    let object = value
                        .as_object()
                        .ok_or_else(|| type_error(name, "an object of strings", value))?;
                    parsed.key_value_metadata = object
                        .iter()
                        .map(|(k, v)| {
                            v.as_str()
                                .map(|s| (k.clone(), s.to_string()))
                                .ok_or_else(|| type_error(name, "an object of strings", value))
                        })
                        .collect::<Result<Vec<_>>>()?;
                }
                other => {
                    return Err(CodecError::invalid_argument(format!(
                        "Unknown encode option '{}'",
                        other
                    )))
                }
            }
        }

        if codec_name.is_some() || level.is_some() {
            parsed.compression = parse_compression(codec_name.as_deref(), level)?;
        }
        Ok(parsed)
    }

    /// Build parquet writer properties from these options
    pub fn to_writer_properties(&self) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_compression(self.compression)
            .set_dictionary_enabled(self.use_dictionary)
            .set_writer_version(self.writer_version);

        if !self.write_statistics {
            builder =
                builder.set_statistics_enabled(parquet::file::properties::EnabledStatistics::None);
        }
        if let Some(size) = self.max_row_group_size {
            builder = builder.set_max_row_group_size(size);
        }
        if let Some(size) = self.data_page_size {
            builder = builder.set_data_page_size_limit(size);
        }
        if !self.key_value_metadata.is_empty() {
            let kvs = self
                .key_value_metadata
                .iter()
                .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
                .collect();
            builder = builder.set_key_value_metadata(Some(kvs));
        }
        builder.build()
    }
}

/// Parse a compression codec name with an optional level
///
/// A level is only accepted together with a codec that takes one.
pub fn parse_compression(name: Option<&str>, level: Option<i64>) -> Result<Compression> {
    let Some(name) = name else {
        return match level {
            Some(_) => Err(CodecError::invalid_argument(
                "compression_level requires an explicit compression codec",
            )),
            None => Ok(Compression::SNAPPY),
        };
    };

    let no_level = |compression: Compression| match level {
        Some(l) => Err(CodecError::invalid_argument(format!(
            "Compression codec '{}' does not take a level, got {}",
            name, l
        ))),
        None => Ok(compression),
    };

    match name {
        "none" | "uncompressed" => no_level(Compression::UNCOMPRESSED),
        "snappy" => no_level(Compression::SNAPPY),
        "lz4" => no_level(Compression::LZ4_RAW),
        "gzip" => {
            let level = match level {
                Some(l) => {
                    let l = u32::try_from(l).map_err(|_| {
                        CodecError::invalid_argument(format!("Invalid gzip level: {}", l))
                    })?;
                    GzipLevel::try_new(l)?
                }
                None => GzipLevel::default(),
            };
            Ok(Compression::GZIP(level))
        }
        "zstd" => {
            let level = match level {
                Some(l) => {
                    let l = i32::try_from(l).map_err(|_| {
                        CodecError::invalid_argument(format!("Invalid zstd level: {}", l))
                    })?;
                    ZstdLevel::try_new(l)?
                }
                None => ZstdLevel::default(),
            };
            Ok(Compression::ZSTD(level))
        }
        other => Err(CodecError::invalid_argument(format!(
            "Unknown compression codec '{}'",
            other
        ))),
    }
}

fn type_error(name: &str, expected: &str, got: &Value) -> CodecError {
    CodecError::invalid_argument(format!(
        "Option '{}' must be {}, got {}",
        name, expected, got
    ))
}

fn positive_usize(name: &str, value: &Value) -> Result<usize> {
    value
        .as_u64()
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .ok_or_else(|| type_error(name, "a positive integer", value))
}

fn boolean(name: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| type_error(name, "a boolean", value))
}

fn string_list(name: &str, value: &Value) -> Result<Vec<String>> {
    value
        .as_array()
        .ok_or_else(|| type_error(name, "an array of strings", value))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| type_error(name, "an array of strings", value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> OptionMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_read_options() {
        let opts = ReadOptions::from_options(&map(json!({
            "columns": ["id", "name"],
            "batch_size": 128,
            "row_groups": [0, 2],
        })))
        .unwrap();

        assert_eq!(opts.columns, Some(vec!["id".to_string(), "name".to_string()]));
        assert_eq!(opts.batch_size(), 128);
        assert_eq!(opts.row_groups, Some(vec![0, 2]));
    }

    #[test]
    fn test_read_options_defaults() {
        let opts = ReadOptions::from_options(&OptionMap::new()).unwrap();
        assert_eq!(opts, ReadOptions::default());
        assert_eq!(opts.batch_size(), DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_unknown_decode_option() {
        let err = ReadOptions::from_options(&map(json!({"use_threads": true}))).unwrap_err();
        assert!(err.to_string().contains("Unknown decode option 'use_threads'"));
    }

    #[test]
    fn test_bad_batch_size() {
        let err = ReadOptions::from_options(&map(json!({"batch_size": 0}))).unwrap_err();
        assert!(matches!(err, CodecError::InvalidArgument(_)));
    }

    #[test]
    fn test_write_options() {
        let opts = WriteOptions::from_options(&map(json!({
            "compression": "ZSTD",
            "compression_level": 3,
            "row_group_size": 1000,
            "write_statistics": false,
            "writer_version": "2.0",
            "metadata": {"origin": "test"},
        })))
        .unwrap();

        assert_eq!(opts.compression, Compression::ZSTD(ZstdLevel::try_new(3).unwrap()));
        assert_eq!(opts.max_row_group_size, Some(1000));
        assert!(!opts.write_statistics);
        assert_eq!(opts.writer_version, WriterVersion::PARQUET_2_0);
        assert_eq!(
            opts.key_value_metadata,
            vec![("origin".to_string(), "test".to_string())]
        );

        let props = opts.to_writer_properties();
        assert_eq!(props.max_row_group_size(), 1000);
    }

    #[test]
    fn test_write_options_reject_unknown() {
        let err = WriteOptions::from_options(&map(json!({"compresion": "snappy"}))).unwrap_err();
        assert!(err.to_string().contains("Unknown encode option 'compresion'"));
    }

    #[test]
    fn test_parse_compression() {
        assert_eq!(parse_compression(None, None).unwrap(), Compression::SNAPPY);
        assert_eq!(
            parse_compression(Some("none"), None).unwrap(),
            Compression::UNCOMPRESSED
        );
        assert_eq!(parse_compression(Some("lz4"), None).unwrap(), Compression::LZ4_RAW);
        assert!(parse_compression(Some("lzo"), None).is_err());
        assert!(parse_compression(Some("gzip"), Some(42)).is_err());
        assert!(parse_compression(None, Some(3)).is_err());
        assert!(parse_compression(Some("snappy"), Some(3)).is_err());
        assert!(matches!(
            parse_compression(Some("zstd"), Some(3)).unwrap(),
            Compression::ZSTD(_)
        ));
    }
}
