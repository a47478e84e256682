//! Lineage traversal over stamped provenance.
//!
//! Each stamped dataset links to the datasets it was derived from through its
//! `previous` entry. These helpers follow those links to reconstruct the chain
//! of transformations behind a dataset.

use crate::dataset::{Dataset, DatasetRef};
use crate::metadata::Metadata;
use crate::params::ParamRecord;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// One transformation found while walking a dataset's lineage.
#[derive(Debug, Clone)]
pub struct LineageStep {
    /// Distance from the starting dataset (0 = the dataset itself).
    pub depth: usize,
    pub transformer: String,
    pub params: Arc<ParamRecord>,
    /// Number of dataset inputs the transformation consumed.
    pub inputs: usize,
}

/// Breadth-first walk of every stamped ancestor of `dataset`, itself included.
///
/// Ancestors reachable along several paths are reported once, at their
/// shallowest depth. Datasets deeper than `max_depth` are not visited.
///
/// Every argument snapshot is a fresh `Arc`, so ancestors are identified by
/// their metadata map, which snapshots of one dataset share.
pub fn trace(dataset: &dyn Dataset, max_depth: usize) -> Vec<LineageStep> {
    let mut steps = Vec::new();
    let mut seen: HashSet<*const Metadata> = HashSet::new();
    let mut queue: VecDeque<(usize, DatasetRef)> = VecDeque::new();

    seen.insert(Arc::as_ptr(dataset.metadata()));
    visit(dataset, 0, max_depth, &mut steps, &mut queue);
    while let Some((depth, current)) = queue.pop_front() {
        if !seen.insert(Arc::as_ptr(current.metadata())) {
            continue;
        }
        visit(current.as_ref(), depth, max_depth, &mut steps, &mut queue);
    }
    tracing::trace!(steps = steps.len(), max_depth, "Traced dataset lineage");
    steps
}

fn visit(
    dataset: &dyn Dataset,
    depth: usize,
    max_depth: usize,
    steps: &mut Vec<LineageStep>,
    queue: &mut VecDeque<(usize, DatasetRef)>,
) {
    let metadata = dataset.metadata();
    let Some(transformer) = metadata.transformer() else {
        return;
    };
    let previous = metadata.previous().unwrap_or_default();
    steps.push(LineageStep {
        depth,
        transformer: transformer.to_string(),
        params: metadata.params().cloned().unwrap_or_default(),
        inputs: previous.len(),
    });
    if depth < max_depth {
        queue.extend(previous.iter().map(|p| (depth + 1, Arc::clone(p))));
    }
}

/// Nested JSON audit of a dataset's provenance.
///
/// Stamped datasets render as `{"transformer", "params", "previous": [...]}`;
/// unstamped ones (raw inputs) and anything past `max_depth` render as `null`.
pub fn to_json(dataset: &dyn Dataset, max_depth: usize) -> serde_json::Value {
    let metadata = dataset.metadata();
    let Some(transformer) = metadata.transformer() else {
        return serde_json::Value::Null;
    };
    let previous: Vec<serde_json::Value> = metadata
        .previous()
        .unwrap_or_default()
        .iter()
        .map(|p| {
            if max_depth == 0 {
                serde_json::Value::Null
            } else {
                to_json(p.as_ref(), max_depth - 1)
            }
        })
        .collect();
    serde_json::json!({
        "transformer": transformer,
        "params": metadata.params().map(|p| p.to_json()).unwrap_or(serde_json::Value::Null),
        "previous": previous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::StructuredDataset;
    use crate::provenance::{wrap, CallArgs, Origin};
    use pretty_assertions::assert_eq;

    fn raw() -> StructuredDataset {
        StructuredDataset::new(vec!["x".into()], vec![vec![1.0]], vec![0.0]).unwrap()
    }

    fn step(name: &'static str, param: i64, inputs: &[&StructuredDataset]) -> StructuredDataset {
        let origin = Origin::new(name, Arc::new(ParamRecord::new().with("p", param).unwrap()));
        let args = inputs
            .iter()
            .fold(CallArgs::new(), |args, d| args.dataset(*d));
        wrap(&origin, "transform", &args, raw)
    }

    #[test]
    fn test_unstamped_dataset_has_no_lineage() {
        assert!(trace(&raw(), 10).is_empty());
        assert_eq!(to_json(&raw(), 10), serde_json::Value::Null);
    }

    #[test]
    fn test_chain_is_walked_in_depth_order() {
        let input = raw();
        let a = step("DisparateImpactRemover", 1, &[&input]);
        let b = step("Reweighing", 2, &[&a]);
        let c = step("RejectOptionClassification", 3, &[&b]);

        let names: Vec<(usize, String)> = trace(&c, 10)
            .into_iter()
            .map(|s| (s.depth, s.transformer))
            .collect();
        assert_eq!(
            names,
            vec![
                (0, "RejectOptionClassification.transform".to_string()),
                (1, "Reweighing.transform".to_string()),
                (2, "DisparateImpactRemover.transform".to_string()),
            ]
        );
    }

    #[test]
    fn test_max_depth_bounds_walk() {
        let a = step("A", 1, &[&raw()]);
        let b = step("B", 2, &[&a]);
        let c = step("C", 3, &[&b]);
        let steps = trace(&c, 1);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].transformer, "B.transform");
    }

    #[test]
    fn test_diamond_ancestor_reported_once() {
        let a = step("A", 1, &[&raw()]);
        let b = step("B", 2, &[&a]);
        let c = step("C", 3, &[&a]);
        let d = step("D", 4, &[&b, &c]);

        let steps = trace(&d, 10);
        let names: Vec<(usize, &str)> = steps
            .iter()
            .map(|s| (s.depth, s.transformer.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                (0, "D.transform"),
                (1, "B.transform"),
                (1, "C.transform"),
                (2, "A.transform"),
            ]
        );
    }

    #[test]
    fn test_repeated_argument_reported_once() {
        let a = step("A", 1, &[&raw()]);
        let d = step("D", 2, &[&a, &a]);

        let steps = trace(&d, 10);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].inputs, 2);
        assert_eq!(steps[1].transformer, "A.transform");
    }

    #[test]
    fn test_json_audit() {
        let input = raw();
        let a = step("A", 1, &[&input]);
        let b = step("B", 2, &[&a, &input]);
        assert_eq!(
            to_json(&b, 10),
            serde_json::json!({
                "transformer": "B.transform",
                "params": {"p": 2},
                "previous": [
                    {"transformer": "A.transform", "params": {"p": 1}, "previous": [null]},
                    null
                ]
            })
        );
        assert_eq!(
            to_json(&b, 0),
            serde_json::json!({"transformer": "B.transform", "params": {"p": 2}, "previous": [null, null]})
        );
    }
}
