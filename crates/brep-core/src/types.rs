//! Request and response types exchanged with callers

use brep_kernel::TopologyCounts;
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{ManipulationError, Stage};
use crate::handlers::Outcome;
use crate::params::{ParamValue, Parameters};

/// A single manipulation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    /// Operation name as listed in the catalog
    pub operation_type: String,
    /// Primary solid text
    #[serde(default)]
    pub solid: Option<String>,
    /// Second solid text, boolean operations only
    #[serde(default)]
    pub other_solid: Option<String>,
    #[serde(default)]
    pub parameters: Parameters,
}

impl OperationRequest {
    pub fn new(operation_type: impl Into<String>, solid: impl Into<String>) -> Self {
        Self {
            operation_type: operation_type.into(),
            solid: Some(solid.into()),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_other_solid(mut self, solid: impl Into<String>) -> Self {
        self.other_solid = Some(solid.into());
        self
    }
}

/// A successful manipulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub modified_solid: String,
    /// The operation name as requested
    pub operation_applied: String,
    /// Supplied parameters plus every default that was filled in
    pub parameters_used: Parameters,
    pub outcome: Outcome,
}

/// Flat response envelope for transports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManipulationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_solid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_applied: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters_used: Option<Parameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

impl From<Result<OperationResult, ManipulationError>> for ManipulationResponse {
    fn from(result: Result<OperationResult, ManipulationError>) -> Self {
        match result {
            Ok(ok) => Self {
                success: true,
                outcome: Some(ok.outcome.label().to_string()),
                notice: ok.outcome.notice().map(str::to_string),
                modified_solid: Some(ok.modified_solid),
                operation_applied: Some(ok.operation_applied),
                parameters_used: Some(ok.parameters_used),
                error: None,
                error_code: None,
                stage: None,
            },
            Err(err) => Self {
                success: false,
                modified_solid: None,
                operation_applied: None,
                parameters_used: None,
                outcome: None,
                notice: None,
                error: Some(err.public_message()),
                error_code: Some(err.code().to_string()),
                stage: Some(err.stage),
            },
        }
    }
}

/// Result of validating solid text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_counts: Option<TopologyCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A point in model space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<DVec3> for Point3 {
    fn from(v: DVec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceInfo {
    pub id: usize,
    #[serde(rename = "type")]
    pub element_type: String,
    pub area: f64,
    pub centroid: Point3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInfo {
    pub id: usize,
    #[serde(rename = "type")]
    pub element_type: String,
    pub length: f64,
    pub centroid: Point3,
}

/// Per-element measurements, ids in indexer order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyInfo {
    pub faces: Vec<FaceInfo>,
    pub edges: Vec<EdgeInfo>,
    pub total_faces: usize,
    pub total_edges: usize,
    pub total_vertices: usize,
}

/// Identification of a running service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub status: String,
    pub service: String,
    pub version: String,
    pub kernel: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InputError, ManipulationFailure};

    #[test]
    fn test_request_json_defaults() {
        let request: OperationRequest =
            serde_json::from_str(r#"{"operation_type": "fillet_edge"}"#).unwrap();
        assert_eq!(request.solid, None);
        assert!(request.parameters.is_empty());
    }

    #[test]
    fn test_response_from_error() {
        let err = ManipulationError::new(
            "boolean_union",
            Stage::Validate,
            ManipulationFailure::Input(InputError::MissingSecondSolid("boolean_union".into())),
        );
        let response = ManipulationResponse::from(Err(err));
        assert!(!response.success);
        assert_eq!(response.error_code.as_deref(), Some("input_error"));
        assert_eq!(response.stage, Some(Stage::Validate));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("modified_solid").is_none());
        assert_eq!(json["stage"], "validate");
    }

    #[test]
    fn test_response_from_noop() {
        let ok = OperationResult {
            modified_solid: "{}".into(),
            operation_applied: "extend_edge".into(),
            parameters_used: Parameters::new(),
            outcome: Outcome::NoOp {
                notice: "unchanged".into(),
            },
        };
        let response = ManipulationResponse::from(Ok(ok));
        assert!(response.success);
        assert_eq!(response.outcome.as_deref(), Some("no_op"));
        assert_eq!(response.notice.as_deref(), Some("unchanged"));
    }
}
