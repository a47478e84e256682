//! # aiflearn-core — Transformer contract & provenance tracking
//!
//! Conventions layer for the aiflearn fairness toolkit. Every algorithm, whether it
//! pre-processes data, mitigates bias during training or post-processes predictions,
//! is a [`Transformer`]: it consumes a [`Dataset`] and produces a new one through
//! `fit` / `predict` / `transform` / `fit_predict` / `fit_transform`.
//!
//! Transformers are registered with [`Tracked`], which stamps every produced dataset
//! with a provenance record under the metadata keys `transformer`, `params` and
//! `previous`. Following `previous` links reconstructs the full pipeline behind a
//! dataset (see [`lineage`]).

pub mod config;
pub mod dataset;
pub mod error;
pub mod lineage;
pub mod metadata;
pub mod params;
pub mod provenance;
pub mod transformer;

// Re-exports
pub use config::{load_config, CoreConfig, ProvenanceConfig};
pub use dataset::{Dataset, DatasetRef, ShareDataset, StructuredDataset};
pub use error::{Operation, TransformError};
pub use lineage::LineageStep;
pub use metadata::{MetaValue, Metadata, PARAMS_KEY, PREVIOUS_KEY, TRANSFORMER_KEY};
pub use params::ParamRecord;
pub use provenance::{CallArgs, Origin, ProvenanceRecord, Stampable};
pub use transformer::{require_fitted, Tracked, Transformer};
