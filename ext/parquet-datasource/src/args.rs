//! Write-time option resolution
//!
//! Write options may depend on state that only exists on the worker running
//! the write, so callers can hand over a producer instead of a mapping. The
//! producer runs at the moment of writing, once per write call.

use crate::error::{BoxError, DatasourceError, Result};
use parquet_codec::OptionMap;
use std::fmt;
use std::sync::Arc;

/// Zero-argument function producing write options
pub type OptionProducer = dyn Fn() -> std::result::Result<OptionMap, BoxError> + Send + Sync;

/// Write options as given by the caller: a mapping or a producer of one
#[derive(Clone)]
pub enum WriteOptionSpec {
    Concrete(OptionMap),
    Deferred(Arc<OptionProducer>),
}

impl Default for WriteOptionSpec {
    fn default() -> Self {
        WriteOptionSpec::Concrete(OptionMap::new())
    }
}

impl fmt::Debug for WriteOptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOptionSpec::Concrete(map) => f.debug_tuple("Concrete").field(map).finish(),
            WriteOptionSpec::Deferred(_) => f.write_str("Deferred(<producer>)"),
        }
    }
}

impl From<OptionMap> for WriteOptionSpec {
    fn from(map: OptionMap) -> Self {
        WriteOptionSpec::Concrete(map)
    }
}

impl WriteOptionSpec {
    pub fn deferred<F>(producer: F) -> Self
    where
        F: Fn() -> std::result::Result<OptionMap, BoxError> + Send + Sync + 'static,
    {
        WriteOptionSpec::Deferred(Arc::new(producer))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, WriteOptionSpec::Deferred(_))
    }

    /// Produce the concrete options, with `explicit` entries overriding
    pub fn resolve(&self, explicit: &OptionMap) -> Result<OptionMap> {
        let mut resolved = match self {
            WriteOptionSpec::Concrete(map) => map.clone(),
            WriteOptionSpec::Deferred(producer) => {
                producer().map_err(DatasourceError::OptionProducer)?
            }
        };

        for (key, value) in explicit {
            resolved.insert(key.clone(), value.clone());
        }
        Ok(resolved)
    }
}

/// Resolve `spec` against explicitly passed options
pub fn resolve_kwargs(spec: &WriteOptionSpec, explicit: &OptionMap) -> Result<OptionMap> {
    spec.resolve(explicit)
}
