//! Provenance stamping for transformer outputs.
//!
//! [`wrap`] runs a call and, when the call produced a dataset, replaces the
//! dataset's metadata with a copy carrying a [`ProvenanceRecord`]:
//!
//! ```text
//! {
//!     "transformer": "<TypeName>.<method>",
//!     "params":      <the transformer's ParamRecord, shared>,
//!     "previous":    [<dataset arguments of the call, in order>],
//! }
//! ```
//!
//! Results that are not datasets come back untouched. `Result` and `Option`
//! are looked through; collections and tuples are returned as they are, even
//! when they contain datasets.

use crate::dataset::{Dataset, DatasetRef, ShareDataset};
use crate::metadata::{MetaValue, PARAMS_KEY, PREVIOUS_KEY, TRANSFORMER_KEY};
use crate::params::ParamRecord;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Identity of the transformer instance making a call.
#[derive(Debug, Clone)]
pub struct Origin {
    pub type_name: &'static str,
    pub params: Arc<ParamRecord>,
}

impl Origin {
    pub fn new(type_name: &'static str, params: Arc<ParamRecord>) -> Self {
        Self { type_name, params }
    }
}

/// One positional argument of a wrapped call.
pub enum CallArg<'a> {
    Dataset(&'a dyn ShareDataset),
    Value(&'a dyn Debug),
}

/// Positional arguments of a wrapped call, in call order.
#[derive(Default)]
pub struct CallArgs<'a> {
    args: Vec<CallArg<'a>>,
}

impl<'a> CallArgs<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments of a single-dataset lifecycle call.
    pub fn single<D: Dataset + Clone>(dataset: &'a D) -> Self {
        Self::new().dataset(dataset)
    }

    pub fn dataset<D: Dataset + Clone>(mut self, dataset: &'a D) -> Self {
        self.args.push(CallArg::Dataset(dataset));
        self
    }

    pub fn value(mut self, value: &'a dyn Debug) -> Self {
        self.args.push(CallArg::Value(value));
        self
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Snapshots of the dataset arguments, preserving call order.
    pub fn datasets(&self) -> Vec<DatasetRef> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                CallArg::Dataset(d) => Some(d.share()),
                CallArg::Value(_) => None,
            })
            .collect()
    }
}

impl Debug for CallArgs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for arg in &self.args {
            match arg {
                CallArg::Dataset(_) => list.entry(&"<dataset>"),
                CallArg::Value(v) => list.entry(v),
            };
        }
        list.finish()
    }
}

/// Lineage metadata describing which transformer call produced a dataset.
#[derive(Debug, Clone)]
pub struct ProvenanceRecord {
    pub transformer: String,
    pub params: Arc<ParamRecord>,
    pub previous: Vec<DatasetRef>,
}

impl ProvenanceRecord {
    pub fn capture(origin: &Origin, method: &str, args: &CallArgs<'_>) -> Self {
        Self {
            transformer: format!("{}.{}", origin.type_name, method),
            params: Arc::clone(&origin.params),
            previous: args.datasets(),
        }
    }

    /// Install this record on `dataset`, overwriting any earlier record.
    ///
    /// The current metadata map is copied first; the map behind the old `Arc`
    /// (possibly shared with the input dataset) is left untouched.
    pub fn apply<D: Dataset + ?Sized>(self, dataset: &mut D) {
        let mut metadata = (**dataset.metadata()).clone();
        metadata.update([
            (
                TRANSFORMER_KEY.to_string(),
                MetaValue::Json(serde_json::Value::String(self.transformer)),
            ),
            (PARAMS_KEY.to_string(), MetaValue::Params(self.params)),
            (PREVIOUS_KEY.to_string(), MetaValue::Datasets(self.previous)),
        ]);
        dataset.set_metadata(Arc::new(metadata));
    }
}

/// Values that may come out of a wrapped call.
///
/// Datasets are stamped; everything else passes through unchanged and never
/// builds a record.
pub trait Stampable: Sized {
    fn stamp<F: FnOnce() -> ProvenanceRecord>(self, record: F) -> Self;
}

impl<D: Dataset> Stampable for D {
    fn stamp<F: FnOnce() -> ProvenanceRecord>(mut self, record: F) -> Self {
        record().apply(&mut self);
        self
    }
}

impl<T: Stampable, E> Stampable for Result<T, E> {
    fn stamp<F: FnOnce() -> ProvenanceRecord>(self, record: F) -> Self {
        self.map(|value| value.stamp(record))
    }
}

impl<T: Stampable> Stampable for Option<T> {
    fn stamp<F: FnOnce() -> ProvenanceRecord>(self, record: F) -> Self {
        self.map(|value| value.stamp(record))
    }
}

impl Stampable for Box<dyn Dataset> {
    fn stamp<F: FnOnce() -> ProvenanceRecord>(mut self, record: F) -> Self {
        record().apply(self.as_mut());
        self
    }
}

macro_rules! passthrough {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Stampable for $ty {
                fn stamp<F: FnOnce() -> ProvenanceRecord>(self, _record: F) -> Self {
                    self
                }
            }
        )*
    };
}

passthrough!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &str,
    serde_json::Value,
    ParamRecord,
);

// Collections pass through even when they hold datasets.
impl<T> Stampable for Vec<T> {
    fn stamp<F: FnOnce() -> ProvenanceRecord>(self, _record: F) -> Self {
        self
    }
}

impl<T, S> Stampable for HashSet<T, S> {
    fn stamp<F: FnOnce() -> ProvenanceRecord>(self, _record: F) -> Self {
        self
    }
}

impl<K, V, S> Stampable for HashMap<K, V, S> {
    fn stamp<F: FnOnce() -> ProvenanceRecord>(self, _record: F) -> Self {
        self
    }
}

impl<K, V> Stampable for BTreeMap<K, V> {
    fn stamp<F: FnOnce() -> ProvenanceRecord>(self, _record: F) -> Self {
        self
    }
}

macro_rules! passthrough_tuple {
    ($($name:ident),+) => {
        impl<$($name),+> Stampable for ($($name,)+) {
            fn stamp<F: FnOnce() -> ProvenanceRecord>(self, _record: F) -> Self {
                self
            }
        }
    };
}

passthrough_tuple!(A);
passthrough_tuple!(A, B);
passthrough_tuple!(A, B, C);
passthrough_tuple!(A, B, C, D);

/// Run `call` and stamp its result with provenance from `origin`.
///
/// Errors raised by `call` propagate unchanged.
pub fn wrap<R, F>(origin: &Origin, method: &str, args: &CallArgs<'_>, call: F) -> R
where
    R: Stampable,
    F: FnOnce() -> R,
{
    let result = call();
    result.stamp(|| {
        let record = ProvenanceRecord::capture(origin, method, args);
        debug!(
            transformer = %record.transformer,
            previous = record.previous.len(),
            "Stamped dataset provenance"
        );
        record
    })
}
