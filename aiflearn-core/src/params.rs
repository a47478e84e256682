//! Constructor parameter records.
//!
//! A [`ParamRecord`] captures the configuration options a transformer was built
//! with. It is taken once at construction time and shared by reference with every
//! dataset the transformer produces.

use crate::error::TransformError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration-option name to value, as given at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamRecord {
    values: BTreeMap<String, serde_json::Value>,
}

impl ParamRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, builder style.
    pub fn with(mut self, name: &str, value: impl Serialize) -> Result<Self, TransformError> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn set(&mut self, name: &str, value: impl Serialize) -> Result<(), TransformError> {
        self.values
            .insert(name.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Capture every field of a serializable config struct as a parameter.
    ///
    /// The struct must serialize to a JSON object; `None` fields become `null`.
    pub fn from_config<C: Serialize>(config: &C) -> Result<Self, TransformError> {
        match serde_json::to_value(config)? {
            serde_json::Value::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            other => Err(TransformError::invalid_params(format!(
                "expected a map of named parameters, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Deserialize the record back into a typed config struct.
    pub fn to_config<C: DeserializeOwned>(&self) -> Result<C, TransformError> {
        let map: serde_json::Map<String, serde_json::Value> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| TransformError::invalid_params(e.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    /// Typed lookup. `Ok(None)` when the parameter is absent.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, TransformError> {
        self.values
            .get(name)
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| TransformError::invalid_params(format!("{name}: {e}")))
            })
            .transpose()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
