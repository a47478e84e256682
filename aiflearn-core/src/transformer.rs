//! The transformer lifecycle contract.
//!
//! Concrete algorithms implement [`Transformer`]: they hold their constructor
//! [`ParamRecord`] and override whichever of `fit` / `predict` / `transform`
//! they support. Callers go through [`Tracked`], which routes every lifecycle
//! call through [`provenance::wrap`] so each produced dataset records what
//! made it and from which inputs.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use aiflearn_core::{Dataset, ParamRecord, StructuredDataset, Transformer, TransformError};
//!
//! struct Relabel {
//!     params: Arc<ParamRecord>,
//!     label: f64,
//! }
//!
//! impl Relabel {
//!     fn new(label: f64) -> Result<Self, TransformError> {
//!         let params = ParamRecord::new().with("label", label)?;
//!         Ok(Self { params: Arc::new(params), label })
//!     }
//! }
//!
//! impl Transformer for Relabel {
//!     type Dataset = StructuredDataset;
//!
//!     fn params(&self) -> &Arc<ParamRecord> {
//!         &self.params
//!     }
//!
//!     fn transform(&self, dataset: &StructuredDataset) -> Result<StructuredDataset, TransformError> {
//!         dataset.with_labels(vec![self.label; dataset.row_count()])
//!     }
//! }
//!
//! # fn main() -> Result<(), TransformError> {
//! let data = StructuredDataset::new(vec!["x".into()], vec![vec![0.0]], vec![0.0])?;
//! let mut relabel = Relabel::new(1.0)?.tracked();
//! let out = relabel.fit_transform(&data)?;
//! assert_eq!(out.metadata().transformer(), Some("Relabel.transform"));
//! # Ok(())
//! # }
//! ```

use crate::dataset::Dataset;
use crate::error::{Operation, TransformError};
use crate::params::ParamRecord;
use crate::provenance::{self, CallArgs, Origin, Stampable};
use std::sync::Arc;

/// A process that acts on a dataset and produces a new, derived dataset.
///
/// Covers pre-processing, in-processing and post-processing algorithms. The
/// methods here are raw hooks; use them through [`Tracked`] so outputs are
/// stamped with provenance.
pub trait Transformer: Send + Sync {
    type Dataset: Dataset + Clone;

    /// Parameter record captured at construction.
    fn params(&self) -> &Arc<ParamRecord>;

    /// Type name recorded in provenance, without module path or generics.
    fn name(&self) -> &'static str
    where
        Self: Sized,
    {
        short_type_name::<Self>()
    }

    /// Train on `dataset`. The default learns nothing.
    fn fit(&mut self, _dataset: &Self::Dataset) -> Result<(), TransformError> {
        Ok(())
    }

    /// Dataset with labels predicted by this transformer.
    fn predict(&self, _dataset: &Self::Dataset) -> Result<Self::Dataset, TransformError>
    where
        Self: Sized,
    {
        Err(TransformError::unsupported(Operation::Predict, self.name()))
    }

    /// Dataset with features, labels or both modified by this transformer.
    fn transform(&self, _dataset: &Self::Dataset) -> Result<Self::Dataset, TransformError>
    where
        Self: Sized,
    {
        Err(TransformError::unsupported(Operation::Transform, self.name()))
    }

    /// Register this transformer for provenance tracking.
    fn tracked(self) -> Tracked<Self>
    where
        Self: Sized,
    {
        Tracked::new(self)
    }
}

/// A registered transformer whose lifecycle calls stamp provenance.
#[derive(Debug, Clone)]
pub struct Tracked<T> {
    inner: T,
}

impl<T: Transformer> Tracked<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    pub fn params(&self) -> &Arc<ParamRecord> {
        self.inner.params()
    }

    fn origin(&self) -> Origin {
        Origin::new(self.inner.name(), Arc::clone(self.inner.params()))
    }

    /// Train on `dataset` and return `self` for chaining.
    pub fn fit(&mut self, dataset: &T::Dataset) -> Result<&mut Self, TransformError> {
        let origin = self.origin();
        let inner = &mut self.inner;
        provenance::wrap(
            &origin,
            Operation::Fit.as_str(),
            &CallArgs::single(dataset),
            || inner.fit(dataset),
        )?;
        Ok(self)
    }

    pub fn predict(&self, dataset: &T::Dataset) -> Result<T::Dataset, TransformError> {
        provenance::wrap(
            &self.origin(),
            Operation::Predict.as_str(),
            &CallArgs::single(dataset),
            || self.inner.predict(dataset),
        )
    }

    pub fn transform(&self, dataset: &T::Dataset) -> Result<T::Dataset, TransformError> {
        provenance::wrap(
            &self.origin(),
            Operation::Transform.as_str(),
            &CallArgs::single(dataset),
            || self.inner.transform(dataset),
        )
    }

    /// `fit(dataset)` followed by `predict(dataset)`. Provenance names `predict`.
    pub fn fit_predict(&mut self, dataset: &T::Dataset) -> Result<T::Dataset, TransformError> {
        self.fit(dataset)?.predict(dataset)
    }

    /// `fit(dataset)` followed by `transform(dataset)`. Provenance names `transform`.
    pub fn fit_transform(&mut self, dataset: &T::Dataset) -> Result<T::Dataset, TransformError> {
        self.fit(dataset)?.transform(dataset)
    }

    /// Stamp an algorithm-specific method the same way as the lifecycle ones.
    pub fn invoke<R, F>(&mut self, method: &str, args: &CallArgs<'_>, call: F) -> R
    where
        R: Stampable,
        F: FnOnce(&mut T) -> R,
    {
        let origin = self.origin();
        let inner = &mut self.inner;
        provenance::wrap(&origin, method, args, || call(inner))
    }
}

/// Return the fitted state or a [`TransformError::NotFitted`] naming `transformer`.
///
/// Opt-in for transformers whose `predict`/`transform` need a prior `fit`.
pub fn require_fitted<'a, S>(
    state: Option<&'a S>,
    transformer: &str,
) -> Result<&'a S, TransformError> {
    state.ok_or_else(|| TransformError::not_fitted(transformer))
}

/// `std::any::type_name` without module path or generic arguments.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::StructuredDataset;

    struct Passive {
        params: Arc<ParamRecord>,
    }

    impl Transformer for Passive {
        type Dataset = StructuredDataset;

        fn params(&self) -> &Arc<ParamRecord> {
            &self.params
        }
    }

    struct Generic<X> {
        params: Arc<ParamRecord>,
        _marker: std::marker::PhantomData<X>,
    }

    impl<X: Send + Sync> Transformer for Generic<X> {
        type Dataset = StructuredDataset;

        fn params(&self) -> &Arc<ParamRecord> {
            &self.params
        }
    }

    fn data() -> StructuredDataset {
        StructuredDataset::new(vec!["x".into()], vec![vec![1.0]], vec![0.0]).unwrap()
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Passive>(), "Passive");
        assert_eq!(short_type_name::<Generic<Vec<String>>>(), "Generic");
        assert_eq!(short_type_name::<u32>(), "u32");
    }

    #[test]
    fn test_name_strips_generics() {
        let t = Generic::<f64> {
            params: Arc::new(ParamRecord::new()),
            _marker: std::marker::PhantomData,
        };
        assert_eq!(t.tracked().name(), "Generic");
    }

    #[test]
    fn test_default_fit_is_identity() {
        let mut tracked = Passive {
            params: Arc::new(ParamRecord::new()),
        }
        .tracked();
        let before: *const Tracked<Passive> = &tracked;
        let after: *const Tracked<Passive> = tracked.fit(&data()).unwrap();
        assert!(std::ptr::eq(before, after));
    }

    #[test]
    fn test_default_predict_and_transform_unsupported() {
        let mut tracked = Passive {
            params: Arc::new(ParamRecord::new()),
        }
        .tracked();
        let err = tracked.predict(&data()).unwrap_err();
        assert!(matches!(
            err,
            TransformError::Unsupported {
                operation: Operation::Predict,
                ..
            }
        ));
        assert!(err.to_string().contains("'transform' or 'fit_predict'"));

        let err = tracked.fit_transform(&data()).unwrap_err();
        assert!(err.to_string().contains("'predict' or 'fit_transform'"));
        assert!(err.to_string().contains("Passive"));
    }

    #[test]
    fn test_require_fitted() {
        let missing: Option<&Vec<f64>> = None;
        let err = require_fitted(missing, "Calibrated").unwrap_err();
        assert!(matches!(err, TransformError::NotFitted { .. }));

        let weights = vec![0.5];
        assert_eq!(require_fitted(Some(&weights), "Calibrated").unwrap(), &weights);
    }
}
