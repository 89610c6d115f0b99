//! Error taxonomy of the manipulation pipeline

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::CodecError;
use crate::handlers::HandlerError;
use crate::indexer::IndexError;

/// Client input rejected before any kernel call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Unknown operation type: {0}")]
    UnknownOperation(String),

    #[error("No solid content provided")]
    MissingSolid,

    #[error("Operation {0} requires a second solid")]
    MissingSecondSolid(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Kind of topological element addressed by an ordinal id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Face,
    Edge,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Face => write!(f, "face"),
            ElementKind::Edge => write!(f, "edge"),
        }
    }
}

/// Pipeline stage at which a request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Dispatch,
    Validate,
    Decode,
    Resolve,
    Execute,
    Encode,
    Measure,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Dispatch => "dispatch",
            Stage::Validate => "validate",
            Stage::Decode => "decode",
            Stage::Resolve => "resolve",
            Stage::Execute => "execute",
            Stage::Encode => "encode",
            Stage::Measure => "measure",
        };
        f.write_str(name)
    }
}

/// Classified cause of a failed request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManipulationFailure {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("{kind} id {id} out of range: valid ids are 0..{count}")]
    IndexOutOfRange {
        kind: ElementKind,
        id: i64,
        count: usize,
    },

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Encode failed: {0}")]
    Encode(String),

    #[error("Kernel construction failed: {0}")]
    KernelConstruction(String),

    #[error("Kernel did not finish within {0} ms")]
    KernelTimeout(u64),
}

impl ManipulationFailure {
    /// Stable machine-readable classification
    pub fn code(&self) -> &'static str {
        match self {
            ManipulationFailure::Input(InputError::UnknownOperation(_)) => "unknown_operation",
            ManipulationFailure::Input(_) => "input_error",
            ManipulationFailure::IndexOutOfRange { .. } => "index_out_of_range",
            ManipulationFailure::Decode(_) => "decode_error",
            ManipulationFailure::Encode(_) => "encode_error",
            ManipulationFailure::KernelConstruction(_) => "kernel_construction_error",
            ManipulationFailure::KernelTimeout(_) => "kernel_timeout",
        }
    }
}

impl From<CodecError> for ManipulationFailure {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Empty => ManipulationFailure::Decode(err.to_string()),
            CodecError::Decode(detail) => ManipulationFailure::Decode(detail),
            CodecError::Encode(detail) => ManipulationFailure::Encode(detail),
        }
    }
}

impl From<IndexError> for ManipulationFailure {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::OutOfRange { kind, id, count } => {
                ManipulationFailure::IndexOutOfRange { kind, id, count }
            }
        }
    }
}

impl From<HandlerError> for ManipulationFailure {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Input(input) => ManipulationFailure::Input(input),
            HandlerError::Kernel(kernel) => {
                ManipulationFailure::KernelConstruction(kernel.to_string())
            }
        }
    }
}

/// A failed request: what was asked, where it stopped, and why
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{operation} failed at {stage}: {failure}")]
pub struct ManipulationError {
    pub operation: String,
    pub stage: Stage,
    #[source]
    pub failure: ManipulationFailure,
}

impl ManipulationError {
    pub fn new(
        operation: impl Into<String>,
        stage: Stage,
        failure: impl Into<ManipulationFailure>,
    ) -> Self {
        Self {
            operation: operation.into(),
            stage,
            failure: failure.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.failure.code()
    }

    /// Message safe to return to the caller.
    ///
    /// Kernel construction detail stays in the logs; everything else is
    /// already phrased in terms of the request.
    pub fn public_message(&self) -> String {
        match &self.failure {
            ManipulationFailure::KernelConstruction(_) => format!(
                "{} could not be constructed by the geometric kernel",
                self.operation
            ),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_message_hides_kernel_detail() {
        let err = ManipulationError::new(
            "fillet_edge",
            Stage::Execute,
            ManipulationFailure::KernelConstruction("bsp node 42 degenerate".into()),
        );
        assert!(!err.public_message().contains("bsp node"));
        assert!(err.to_string().contains("bsp node"));
        assert_eq!(err.code(), "kernel_construction_error");
    }

    #[test]
    fn test_index_message_reports_range() {
        let err = ManipulationError::new(
            "fillet_edge",
            Stage::Resolve,
            ManipulationFailure::IndexOutOfRange {
                kind: ElementKind::Edge,
                id: 12,
                count: 12,
            },
        );
        assert_eq!(
            err.public_message(),
            "edge id 12 out of range: valid ids are 0..12"
        );
        assert_eq!(err.code(), "index_out_of_range");
    }

    #[test]
    fn test_input_codes() {
        let unknown = ManipulationFailure::from(InputError::UnknownOperation("twist".into()));
        assert_eq!(unknown.code(), "unknown_operation");
        let missing = ManipulationFailure::from(InputError::MissingSolid);
        assert_eq!(missing.code(), "input_error");
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Stage::Resolve).unwrap(), "\"resolve\"");
        assert_eq!(Stage::Execute.to_string(), "execute");
    }
}
