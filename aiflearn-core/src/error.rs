//! Error types for the aiflearn-core crate.

use thiserror::Error;

/// A lifecycle method of the transformer contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fit,
    Predict,
    Transform,
    FitPredict,
    FitTransform,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Fit => "fit",
            Operation::Predict => "predict",
            Operation::Transform => "transform",
            Operation::FitPredict => "fit_predict",
            Operation::FitTransform => "fit_transform",
        }
    }

    /// Methods a caller most likely meant when this operation is unsupported.
    pub fn alternatives(&self) -> &'static [&'static str] {
        match self {
            Operation::Predict => &["transform", "fit_predict"],
            Operation::Transform => &["predict", "fit_transform"],
            Operation::FitPredict => &["fit_transform"],
            Operation::FitTransform => &["fit_predict"],
            Operation::Fit => &[],
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for transformer operations.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{transformer} is not fitted yet. Call 'fit' before using this transformer")]
    NotFitted { transformer: String },

    #[error(
        "'{operation}' is not supported for {transformer}. Perhaps you meant {} instead?",
        quote_alternatives(.alternatives)
    )]
    Unsupported {
        operation: Operation,
        transformer: String,
        alternatives: &'static [&'static str],
    },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransformError {
    pub fn unsupported(operation: Operation, transformer: impl Into<String>) -> Self {
        Self::Unsupported {
            operation,
            transformer: transformer.into(),
            alternatives: operation.alternatives(),
        }
    }

    pub fn not_fitted(transformer: impl Into<String>) -> Self {
        Self::NotFitted {
            transformer: transformer.into(),
        }
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    pub fn invalid_dataset(msg: impl Into<String>) -> Self {
        Self::InvalidDataset(msg.into())
    }

    pub fn algorithm(msg: impl Into<String>) -> Self {
        Self::Algorithm(msg.into())
    }
}

fn quote_alternatives(alternatives: &[&str]) -> String {
    let quoted: Vec<String> = alternatives.iter().map(|a| format!("'{a}'")).collect();
    match quoted.split_last() {
        None => "another method".to_string(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_predict_message() {
        let err = TransformError::unsupported(Operation::Predict, "Reweighing");
        assert_eq!(
            err.to_string(),
            "'predict' is not supported for Reweighing. \
             Perhaps you meant 'transform' or 'fit_predict' instead?"
        );
    }

    #[test]
    fn test_unsupported_transform_message() {
        let err = TransformError::unsupported(Operation::Transform, "EqOddsPostprocessing");
        let msg = err.to_string();
        assert!(msg.starts_with("'transform' is not supported"));
        assert!(msg.contains("'predict' or 'fit_transform'"));
    }

    #[test]
    fn test_single_alternative() {
        let err = TransformError::unsupported(Operation::FitPredict, "X");
        assert!(err.to_string().contains("Perhaps you meant 'fit_transform' instead?"));
    }

    #[test]
    fn test_not_fitted_names_transformer() {
        let err = TransformError::not_fitted("CalibratedEqOdds");
        assert!(err.to_string().contains("CalibratedEqOdds is not fitted"));
    }

    #[test]
    fn test_from_serde_json() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: TransformError = bad.into();
        assert!(matches!(err, TransformError::Serialization(_)));
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::FitTransform.to_string(), "fit_transform");
        assert!(Operation::Fit.alternatives().is_empty());
    }
}
