//! Dataset contract and an in-memory structured dataset.
//!
//! The core only needs a dataset to expose a replaceable metadata mapping. Any
//! type implementing [`Dataset`] can flow through a transformer and be stamped
//! with provenance.

use crate::error::TransformError;
use crate::metadata::{MetaValue, Metadata};
use std::fmt::Debug;
use std::sync::Arc;

/// A value carrying a metadata mapping that can be read and replaced.
///
/// Metadata is never mutated behind the shared `Arc`: writers clone the map,
/// update the clone and install it with [`Dataset::set_metadata`].
pub trait Dataset: Debug + Send + Sync + 'static {
    fn metadata(&self) -> &Arc<Metadata>;

    fn set_metadata(&mut self, metadata: Arc<Metadata>);
}

/// A dataset held by reference inside provenance records.
pub type DatasetRef = Arc<dyn Dataset>;

/// Produce a shared snapshot of a dataset for provenance links.
pub trait ShareDataset {
    fn share(&self) -> DatasetRef;
}

impl<D: Dataset + Clone> ShareDataset for D {
    fn share(&self) -> DatasetRef {
        Arc::new(self.clone())
    }
}

/// In-memory tabular dataset: features, labels and protected attributes.
///
/// All columns are `Arc`-backed so clones are shallow.
#[derive(Debug, Clone)]
pub struct StructuredDataset {
    feature_names: Arc<Vec<String>>,
    features: Arc<Vec<Vec<f64>>>,
    labels: Arc<Vec<f64>>,
    protected_attribute_names: Arc<Vec<String>>,
    metadata: Arc<Metadata>,
}

impl StructuredDataset {
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<f64>,
    ) -> Result<Self, TransformError> {
        validate_rows(&feature_names, &features, labels.len())?;
        Ok(Self {
            feature_names: Arc::new(feature_names),
            features: Arc::new(features),
            labels: Arc::new(labels),
            protected_attribute_names: Arc::new(Vec::new()),
            metadata: Arc::new(Metadata::new()),
        })
    }

    /// Mark feature columns as protected attributes.
    pub fn with_protected_attributes(mut self, names: Vec<String>) -> Result<Self, TransformError> {
        if let Some(missing) = names.iter().find(|n| !self.feature_names.contains(n)) {
            return Err(TransformError::invalid_dataset(format!(
                "protected attribute '{missing}' is not a feature"
            )));
        }
        self.protected_attribute_names = Arc::new(names);
        Ok(self)
    }

    /// Same dataset with replaced labels. Metadata is shared with `self`.
    pub fn with_labels(&self, labels: Vec<f64>) -> Result<Self, TransformError> {
        if labels.len() != self.row_count() {
            return Err(TransformError::invalid_dataset(format!(
                "expected {} labels, got {}",
                self.row_count(),
                labels.len()
            )));
        }
        Ok(Self {
            labels: Arc::new(labels),
            ..self.clone()
        })
    }

    /// Same dataset with replaced feature rows. Metadata is shared with `self`.
    pub fn with_features(&self, features: Vec<Vec<f64>>) -> Result<Self, TransformError> {
        validate_rows(&self.feature_names, &features, self.labels.len())?;
        Ok(Self {
            features: Arc::new(features),
            ..self.clone()
        })
    }

    /// Copy-on-write insert of a single metadata entry.
    pub fn with_metadata_entry(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        let mut metadata = Metadata::clone(&self.metadata);
        metadata.insert(key, value);
        self.metadata = Arc::new(metadata);
        self
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn protected_attribute_names(&self) -> &[String] {
        &self.protected_attribute_names
    }

    /// Column values of a protected attribute, `None` if it is not protected.
    pub fn protected_attribute(&self, name: &str) -> Option<Vec<f64>> {
        if !self.protected_attribute_names.iter().any(|n| n == name) {
            return None;
        }
        let idx = self.feature_names.iter().position(|n| n == name)?;
        Some(self.features.iter().map(|row| row[idx]).collect())
    }

    pub fn row_count(&self) -> usize {
        self.labels.len()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }
}

impl Dataset for StructuredDataset {
    fn metadata(&self) -> &Arc<Metadata> {
        &self.metadata
    }

    fn set_metadata(&mut self, metadata: Arc<Metadata>) {
        self.metadata = metadata;
    }
}

fn validate_rows(
    feature_names: &[String],
    features: &[Vec<f64>],
    label_count: usize,
) -> Result<(), TransformError> {
    if features.len() != label_count {
        return Err(TransformError::invalid_dataset(format!(
            "{} feature rows but {} labels",
            features.len(),
            label_count
        )));
    }
    if let Some((i, row)) = features
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != feature_names.len())
    {
        return Err(TransformError::invalid_dataset(format!(
            "row {i} has {} values, expected {}",
            row.len(),
            feature_names.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credit() -> StructuredDataset {
        StructuredDataset::new(
            vec!["age".into(), "sex".into()],
            vec![vec![25.0, 0.0], vec![40.0, 1.0], vec![31.0, 1.0]],
            vec![1.0, 0.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_new_validates_label_count() {
        let err = StructuredDataset::new(vec!["a".into()], vec![vec![1.0]], vec![]).unwrap_err();
        assert!(matches!(err, TransformError::InvalidDataset(_)));
    }

    #[test]
    fn test_new_validates_row_width() {
        let err = StructuredDataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0], vec![3.0]],
            vec![0.0, 1.0],
        )
        .unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 values"));
    }

    #[test]
    fn test_protected_attribute_column() {
        let ds = credit().with_protected_attributes(vec!["sex".into()]).unwrap();
        assert_eq!(ds.protected_attribute("sex"), Some(vec![0.0, 1.0, 1.0]));
        assert_eq!(ds.protected_attribute("age"), None);
    }

    #[test]
    fn test_unknown_protected_attribute_rejected() {
        let err = credit()
            .with_protected_attributes(vec!["race".into()])
            .unwrap_err();
        assert!(err.to_string().contains("'race'"));
    }

    #[test]
    fn test_with_labels_shares_metadata() {
        let ds = credit().with_metadata_entry("source", serde_json::json!("german"));
        let relabeled = ds.with_labels(vec![0.0, 0.0, 0.0]).unwrap();
        assert!(Arc::ptr_eq(ds.metadata(), relabeled.metadata()));
        assert_eq!(relabeled.labels(), &[0.0, 0.0, 0.0]);
        assert_eq!(ds.labels(), &[1.0, 0.0, 1.0]);
        assert!(ds.with_labels(vec![1.0]).is_err());
    }

    #[test]
    fn test_with_metadata_entry_copies_on_write() {
        let ds = credit();
        let before = Arc::clone(ds.metadata());
        let tagged = ds.clone().with_metadata_entry("k", serde_json::json!(1));
        assert!(Arc::ptr_eq(ds.metadata(), &before));
        assert!(ds.metadata().is_empty());
        assert_eq!(tagged.metadata().json("k"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn test_share_snapshots_metadata() {
        let ds = credit();
        let shared = ds.share();
        assert!(Arc::ptr_eq(ds.metadata(), shared.metadata()));
    }
}
