//! Operation handlers
//!
//! One handler per operation kind. Each receives exclusive ownership of the
//! decoded shape, calls the kernel and applies its own failure policy.

use brep_kernel::{BooleanType, GeometricKernel, KernelError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::OperationKind;
use crate::config::ServiceConfig;
use crate::error::InputError;
use crate::params::{self, Parameters};

/// How a handler treated the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The geometry was modified as requested
    Applied,
    /// The operation is accepted but has no geometric effect
    NoOp { notice: String },
    /// The kernel failed and the input solid is returned unchanged
    Degraded { notice: String },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Applied => "applied",
            Outcome::NoOp { .. } => "no_op",
            Outcome::Degraded { .. } => "degraded",
        }
    }

    pub fn notice(&self) -> Option<&str> {
        match self {
            Outcome::Applied => None,
            Outcome::NoOp { notice } | Outcome::Degraded { notice } => Some(notice),
        }
    }
}

/// Result shape of a handler together with its outcome
#[derive(Debug)]
pub struct HandlerOutcome<S> {
    pub shape: S,
    pub outcome: Outcome,
}

impl<S> HandlerOutcome<S> {
    fn applied(shape: S) -> Self {
        Self {
            shape,
            outcome: Outcome::Applied,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Element resolved for a handler
pub enum ResolvedTarget<K: GeometricKernel> {
    Face(K::Face),
    Edge(K::Edge),
    Solid(K::Shape),
}

impl<K: GeometricKernel> ResolvedTarget<K> {
    fn describe(&self) -> &'static str {
        match self {
            ResolvedTarget::Face(_) => "face",
            ResolvedTarget::Edge(_) => "edge",
            ResolvedTarget::Solid(_) => "solid",
        }
    }

    fn mismatch(&self, expected: &str) -> HandlerError {
        HandlerError::Input(InputError::InvalidParameter {
            name: "target".into(),
            reason: format!("expected a {expected}, got a {}", self.describe()),
        })
    }

    fn into_face(self) -> Result<K::Face, HandlerError> {
        match self {
            ResolvedTarget::Face(face) => Ok(face),
            other => Err(other.mismatch("face")),
        }
    }

    fn into_edge(self) -> Result<K::Edge, HandlerError> {
        match self {
            ResolvedTarget::Edge(edge) => Ok(edge),
            other => Err(other.mismatch("edge")),
        }
    }

    fn into_solid(self) -> Result<K::Shape, HandlerError> {
        match self {
            ResolvedTarget::Solid(shape) => Ok(shape),
            other => Err(other.mismatch("solid")),
        }
    }
}

/// Run the handler for `kind`
///
/// # Arguments
/// * `kernel` - Geometric kernel performing the construction
/// * `kind` - Operation to apply
/// * `shape` - Primary solid, owned by this call
/// * `target` - Resolved face, edge or second solid
/// * `params` - Parameters with defaults already merged
/// * `config` - Service settings governing failure policy
pub fn execute<K: GeometricKernel>(
    kernel: &K,
    kind: OperationKind,
    shape: K::Shape,
    target: ResolvedTarget<K>,
    params: &Parameters,
    config: &ServiceConfig,
) -> Result<HandlerOutcome<K::Shape>, HandlerError> {
    match kind {
        OperationKind::ExtendFace => extend_face(kernel, shape, target.into_face()?, params),
        OperationKind::ExtendEdge => extend_edge(shape, target.into_edge()?, params),
        OperationKind::OffsetFace => {
            offset_face(kernel, shape, target.into_face()?, params, config)
        }
        OperationKind::FilletEdge => {
            let radius = params::number(params, "radius")?;
            let result = kernel.fillet(&shape, &target.into_edge()?, radius)?;
            Ok(HandlerOutcome::applied(result))
        }
        OperationKind::ChamferEdge => {
            let distance = params::number(params, "distance")?;
            let result = kernel.chamfer(&shape, &target.into_edge()?, distance)?;
            Ok(HandlerOutcome::applied(result))
        }
        OperationKind::Boolean(op) => boolean(kernel, shape, target.into_solid()?, op),
    }
}

// ========== Handlers ==========

/// Extrude the face along `direction * distance` and fuse the prism
fn extend_face<K: GeometricKernel>(
    kernel: &K,
    shape: K::Shape,
    face: K::Face,
    params: &Parameters,
) -> Result<HandlerOutcome<K::Shape>, HandlerError> {
    let distance = params::number(params, "distance")?;
    let direction = params::vector(params, "direction")?.try_normalize().ok_or_else(|| {
        InputError::InvalidParameter {
            name: "direction".into(),
            reason: "vector must not be zero".into(),
        }
    })?;

    let prism = kernel.prism(&shape, &face, direction * distance)?;
    let fused = kernel.boolean(&shape, &prism, BooleanType::Union)?;
    Ok(HandlerOutcome::applied(fused))
}

/// Edge extension has no geometric implementation; the solid is returned
/// as decoded and the outcome says so.
fn extend_edge<S, E>(
    shape: S,
    _edge: E,
    params: &Parameters,
) -> Result<HandlerOutcome<S>, HandlerError> {
    let length = params::number(params, "length")?;
    let both = params::flag(params, "both_directions")?;
    tracing::warn!(length, both_directions = both, "extend_edge has no geometric effect");
    Ok(HandlerOutcome {
        shape,
        outcome: Outcome::NoOp {
            notice: "extend_edge is not implemented; the solid is returned unchanged".into(),
        },
    })
}

fn offset_face<K: GeometricKernel>(
    kernel: &K,
    shape: K::Shape,
    face: K::Face,
    params: &Parameters,
    config: &ServiceConfig,
) -> Result<HandlerOutcome<K::Shape>, HandlerError> {
    let offset = params::number(params, "offset")?;
    match kernel.thick_solid(&shape, &face, offset, config.thick_solid_tolerance) {
        Ok(result) => Ok(HandlerOutcome::applied(result)),
        Err(e) if config.offset_face_degrades => {
            tracing::warn!(offset, error = %e, "offset_face failed, returning input solid");
            Ok(HandlerOutcome {
                shape,
                outcome: Outcome::Degraded {
                    notice: format!("offset of {offset} could not be built; solid unchanged"),
                },
            })
        }
        Err(e) => Err(e.into()),
    }
}

fn boolean<K: GeometricKernel>(
    kernel: &K,
    shape: K::Shape,
    other: K::Shape,
    op: BooleanType,
) -> Result<HandlerOutcome<K::Shape>, HandlerError> {
    let result = kernel.boolean(&shape, &other, op)?;
    Ok(HandlerOutcome::applied(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brep_kernel::{PolyKernel, PolyShape};
    use glam::DVec3;

    use crate::catalog::dispatch;
    use crate::indexer::{resolve_edge, resolve_face};

    fn cube(kernel: &PolyKernel) -> PolyShape {
        kernel.make_box(DVec3::ZERO, DVec3::ONE).unwrap()
    }

    fn params_for(name: &str, supplied: &[(&str, f64)]) -> Parameters {
        let supplied: Parameters = supplied
            .iter()
            .map(|(k, v)| (k.to_string(), (*v).into()))
            .collect();
        dispatch(name).unwrap().merge_defaults(&supplied).unwrap()
    }

    #[test]
    fn test_extend_face_grows_solid() {
        let kernel = PolyKernel::new();
        let shape = cube(&kernel);
        let top = resolve_face(&kernel, &shape, 5).unwrap();
        let params = params_for("extend_face", &[("face_id", 5.0), ("distance", 0.5)]);

        let out = execute(
            &kernel,
            OperationKind::ExtendFace,
            shape,
            ResolvedTarget::Face(top),
            &params,
            &ServiceConfig::default(),
        )
        .unwrap();
        assert_eq!(out.outcome, Outcome::Applied);
        let counts = kernel.topology_counts(&out.shape);
        assert_eq!((counts.faces, counts.edges, counts.vertices), (6, 12, 8));
    }

    #[test]
    fn test_extend_edge_is_noop() {
        let kernel = PolyKernel::new();
        let shape = cube(&kernel);
        let before = kernel.topology_counts(&shape);
        let edge = resolve_edge(&kernel, &shape, 3).unwrap();
        let params = params_for("extend_edge", &[("edge_id", 3.0), ("length", 4.0)]);

        let out = execute(
            &kernel,
            OperationKind::ExtendEdge,
            shape,
            ResolvedTarget::Edge(edge),
            &params,
            &ServiceConfig::default(),
        )
        .unwrap();
        assert_eq!(out.outcome.label(), "no_op");
        assert!(out.outcome.notice().is_some());
        assert_eq!(kernel.topology_counts(&out.shape), before);
    }

    #[test]
    fn test_offset_face_degrade_policy() {
        let kernel = PolyKernel::new();
        let params = params_for("offset_face", &[("face_id", 5.0), ("offset", -10.0)]);

        let shape = cube(&kernel);
        let expected = shape.clone();
        let face = resolve_face(&kernel, &shape, 5).unwrap();
        let out = execute(
            &kernel,
            OperationKind::OffsetFace,
            shape,
            ResolvedTarget::Face(face),
            &params,
            &ServiceConfig::default(),
        )
        .unwrap();
        assert!(matches!(out.outcome, Outcome::Degraded { .. }));
        assert_eq!(out.shape, expected);

        let strict = ServiceConfig {
            offset_face_degrades: false,
            ..ServiceConfig::default()
        };
        let shape = cube(&kernel);
        let face = resolve_face(&kernel, &shape, 5).unwrap();
        let err = execute(
            &kernel,
            OperationKind::OffsetFace,
            shape,
            ResolvedTarget::Face(face),
            &params,
            &strict,
        )
        .unwrap_err();
        assert!(matches!(err, HandlerError::Kernel(_)));
    }

    #[test]
    fn test_chamfer_applies() {
        let kernel = PolyKernel::new();
        let shape = cube(&kernel);
        let edge = resolve_edge(&kernel, &shape, 0).unwrap();
        let params = params_for("chamfer_edge", &[("edge_id", 0.0)]);
        let out = execute(
            &kernel,
            OperationKind::ChamferEdge,
            shape,
            ResolvedTarget::Edge(edge),
            &params,
            &ServiceConfig::default(),
        )
        .unwrap();
        assert_eq!(kernel.topology_counts(&out.shape).faces, 7);
    }

    #[test]
    fn test_target_mismatch() {
        let kernel = PolyKernel::new();
        let shape = cube(&kernel);
        let face = resolve_face(&kernel, &shape, 0).unwrap();
        let params = params_for("fillet_edge", &[("edge_id", 0.0)]);
        let err = execute(
            &kernel,
            OperationKind::FilletEdge,
            shape,
            ResolvedTarget::Face(face),
            &params,
            &ServiceConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, HandlerError::Input(_)));
    }
}
