//! Dataset metadata and the provenance keys stamped into it.

use crate::dataset::DatasetRef;
use crate::params::ParamRecord;
use std::collections::HashMap;
use std::sync::Arc;

/// Key holding `"<TypeName>.<method>"` of the producing transformer.
pub const TRANSFORMER_KEY: &str = "transformer";
/// Key holding the producing transformer's parameter record.
pub const PARAMS_KEY: &str = "params";
/// Key holding the dataset arguments of the producing call, in call order.
pub const PREVIOUS_KEY: &str = "previous";

/// A metadata value.
#[derive(Debug, Clone)]
pub enum MetaValue {
    Json(serde_json::Value),
    Params(Arc<ParamRecord>),
    Datasets(Vec<DatasetRef>),
}

impl MetaValue {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            MetaValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_params(&self) -> Option<&Arc<ParamRecord>> {
        match self {
            MetaValue::Params(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_datasets(&self) -> Option<&[DatasetRef]> {
        match self {
            MetaValue::Datasets(d) => Some(d.as_slice()),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for MetaValue {
    fn from(value: serde_json::Value) -> Self {
        MetaValue::Json(value)
    }
}

/// String-keyed metadata mapping carried by every dataset.
///
/// Cloning is shallow: parameter records and dataset links are shared `Arc`s.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    entries: HashMap<String, MetaValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetaValue>,
    ) -> Option<MetaValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or overwrite every entry of `other`.
    pub fn update(&mut self, other: impl IntoIterator<Item = (String, MetaValue)>) {
        self.entries.extend(other);
    }

    pub fn json(&self, key: &str) -> Option<&serde_json::Value> {
        self.get(key).and_then(MetaValue::as_json)
    }

    /// `"<TypeName>.<method>"` of the transformer that produced this dataset.
    pub fn transformer(&self) -> Option<&str> {
        self.json(TRANSFORMER_KEY).and_then(serde_json::Value::as_str)
    }

    pub fn params(&self) -> Option<&Arc<ParamRecord>> {
        self.get(PARAMS_KEY).and_then(MetaValue::as_params)
    }

    pub fn previous(&self) -> Option<&[DatasetRef]> {
        self.get(PREVIOUS_KEY).and_then(MetaValue::as_datasets)
    }

    pub fn has_provenance(&self) -> bool {
        self.transformer().is_some()
    }
}
