//! Manipulation service
//!
//! Runs one request through dispatch, validation, decoding, element
//! resolution, the handler and encoding. Nothing is kept between requests:
//! every shape is owned by the call that decoded it.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use brep_kernel::{GeometricKernel, PolyKernel};
use uuid::Uuid;

use crate::catalog::{self, Target};
use crate::codec::ShapeCodec;
use crate::config::ServiceConfig;
use crate::error::{ElementKind, InputError, ManipulationError, ManipulationFailure, Stage};
use crate::handlers::{self, ResolvedTarget};
use crate::indexer::{self, ElementRef};
use crate::params;
use crate::types::{
    EdgeInfo, FaceInfo, OperationRequest, OperationResult, ServiceInfo, TopologyInfo,
    ValidationReport,
};

pub const SERVICE_NAME: &str = "brep-manipulation";

/// Stateless manipulation service over a geometric kernel
pub struct ManipulationService<K> {
    kernel: Arc<K>,
    config: ServiceConfig,
}

impl<K> Clone for ManipulationService<K> {
    fn clone(&self) -> Self {
        Self {
            kernel: Arc::clone(&self.kernel),
            config: self.config.clone(),
        }
    }
}

impl ManipulationService<PolyKernel> {
    /// Create a service with a polyhedral kernel built from `config.kernel`
    pub fn from_config(config: ServiceConfig) -> Self {
        let kernel = PolyKernel::with_config(config.kernel.clone());
        Self::new(kernel, config)
    }
}

impl<K: GeometricKernel + 'static> ManipulationService<K> {
    /// Create a service owning its kernel
    pub fn new(kernel: K, config: ServiceConfig) -> Self {
        Self::with_shared_kernel(Arc::new(kernel), config)
    }

    /// Create a service over a kernel shared with other owners
    pub fn with_shared_kernel(kernel: Arc<K>, config: ServiceConfig) -> Self {
        Self { kernel, config }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Service identification
    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            status: "healthy".into(),
            service: SERVICE_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            kernel: self.kernel.name().to_string(),
        }
    }

    /// Apply one operation to a solid
    pub fn manipulate(
        &self,
        request: OperationRequest,
    ) -> Result<OperationResult, ManipulationError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "manipulate",
            %request_id,
            operation = %request.operation_type
        );
        let _guard = span.enter();
        tracing::info!("Received manipulation request");

        let result = match self.config.request_timeout_ms {
            Some(ms) => self.run_with_timeout(request, ms),
            None => run_pipeline(self.kernel.as_ref(), &self.config, request),
        };

        match &result {
            Ok(done) => tracing::info!(outcome = done.outcome.label(), "Request completed"),
            Err(err) => log_failure(err),
        }
        result
    }

    /// Run the pipeline on a worker thread and stop waiting after `ms`.
    /// A worker that overruns finishes on its own; its result is dropped.
    fn run_with_timeout(
        &self,
        request: OperationRequest,
        ms: u64,
    ) -> Result<OperationResult, ManipulationError> {
        let operation = request.operation_type.clone();
        let kernel = Arc::clone(&self.kernel);
        let config = self.config.clone();
        let span = tracing::Span::current();
        let (tx, rx) = mpsc::channel();

        std::thread::Builder::new()
            .name("brep-worker".into())
            .spawn(move || {
                let _guard = span.enter();
                let result = run_pipeline(kernel.as_ref(), &config, request);
                // The receiver is gone once the caller timed out
                let _ = tx.send(result);
            })
            .map_err(|e| {
                ManipulationError::new(
                    operation.clone(),
                    Stage::Execute,
                    ManipulationFailure::KernelConstruction(format!(
                        "could not start worker: {e}"
                    )),
                )
            })?;

        match rx.recv_timeout(Duration::from_millis(ms)) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ManipulationError::new(
                operation,
                Stage::Execute,
                ManipulationFailure::KernelTimeout(ms),
            )),
            Err(RecvTimeoutError::Disconnected) => Err(ManipulationError::new(
                operation,
                Stage::Execute,
                ManipulationFailure::KernelConstruction(
                    "worker terminated unexpectedly".into(),
                ),
            )),
        }
    }

    /// Check that solid text decodes, reporting its topology counts.
    /// Never fails; decode problems are part of the report.
    pub fn validate(&self, text: &str) -> ValidationReport {
        let codec = ShapeCodec::new(self.kernel.as_ref());
        match codec.decode(text) {
            Ok(shape) => ValidationReport {
                valid: true,
                topology_counts: Some(self.kernel.topology_counts(&shape)),
                error: None,
            },
            Err(e) => {
                tracing::debug!(error = %e, "Validation failed");
                ValidationReport {
                    valid: false,
                    topology_counts: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Measure every face and edge of a solid, ids in indexer order
    pub fn topology_info(&self, text: &str) -> Result<TopologyInfo, ManipulationError> {
        const OPERATION: &str = "topology_info";
        let fail = |stage, failure: ManipulationFailure| {
            let err = ManipulationError::new(OPERATION, stage, failure);
            log_failure(&err);
            err
        };

        if text.trim().is_empty() {
            return Err(fail(Stage::Validate, InputError::MissingSolid.into()));
        }
        let kernel = self.kernel.as_ref();
        let shape = ShapeCodec::new(kernel)
            .decode(text)
            .map_err(|e| fail(Stage::Decode, e.into()))?;
        let measure = |e: brep_kernel::KernelError| {
            fail(Stage::Measure, ManipulationFailure::KernelConstruction(e.to_string()))
        };

        let faces = kernel
            .faces(&shape)
            .iter()
            .enumerate()
            .map(|(id, face)| -> Result<FaceInfo, ManipulationError> {
                let props = kernel.face_properties(&shape, face).map_err(measure)?;
                Ok(FaceInfo {
                    id,
                    element_type: ElementKind::Face.to_string(),
                    area: props.area,
                    centroid: props.centroid.into(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let edges = kernel
            .edges(&shape)
            .iter()
            .enumerate()
            .map(|(id, edge)| -> Result<EdgeInfo, ManipulationError> {
                let props = kernel.edge_properties(&shape, edge).map_err(measure)?;
                Ok(EdgeInfo {
                    id,
                    element_type: ElementKind::Edge.to_string(),
                    length: props.length,
                    centroid: props.centroid.into(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let counts = kernel.topology_counts(&shape);
        Ok(TopologyInfo {
            total_faces: faces.len(),
            total_edges: edges.len(),
            total_vertices: counts.vertices,
            faces,
            edges,
        })
    }
}

/// Trim-aware presence check for solid text
fn present(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

fn run_pipeline<K: GeometricKernel>(
    kernel: &K,
    config: &ServiceConfig,
    request: OperationRequest,
) -> Result<OperationResult, ManipulationError> {
    let OperationRequest {
        operation_type,
        solid,
        other_solid,
        parameters,
    } = request;
    let fail = |stage, failure: ManipulationFailure| {
        ManipulationError::new(operation_type.as_str(), stage, failure)
    };

    // ========== Dispatch & validation ==========

    let spec = catalog::dispatch(&operation_type).map_err(|e| fail(Stage::Dispatch, e.into()))?;
    let solid =
        present(solid).ok_or_else(|| fail(Stage::Validate, InputError::MissingSolid.into()))?;
    let other_solid = if spec.needs_second_solid() {
        let other = present(other_solid).ok_or_else(|| {
            fail(
                Stage::Validate,
                InputError::MissingSecondSolid(operation_type.clone()).into(),
            )
        })?;
        Some(other)
    } else {
        None
    };
    let params = spec
        .merge_defaults(&parameters)
        .map_err(|e| fail(Stage::Validate, e.into()))?;
    let element = match spec.target {
        Target::Face(name) => Some(ElementRef {
            kind: ElementKind::Face,
            id: params::index(&params, name).map_err(|e| fail(Stage::Validate, e.into()))?,
        }),
        Target::Edge(name) => Some(ElementRef {
            kind: ElementKind::Edge,
            id: params::index(&params, name).map_err(|e| fail(Stage::Validate, e.into()))?,
        }),
        Target::SecondSolid => None,
    };

    // ========== Decode & resolve ==========

    let codec = ShapeCodec::new(kernel);
    let shape = codec
        .decode(&solid)
        .map_err(|e| fail(Stage::Decode, e.into()))?;

    let target = match (element, other_solid) {
        (Some(ElementRef { kind: ElementKind::Face, id }), _) => ResolvedTarget::Face(
            indexer::resolve_face(kernel, &shape, id).map_err(|e| fail(Stage::Resolve, e.into()))?,
        ),
        (Some(ElementRef { kind: ElementKind::Edge, id }), _) => ResolvedTarget::Edge(
            indexer::resolve_edge(kernel, &shape, id).map_err(|e| fail(Stage::Resolve, e.into()))?,
        ),
        (None, Some(other)) => ResolvedTarget::Solid(
            codec
                .decode(&other)
                .map_err(|e| fail(Stage::Decode, e.into()))?,
        ),
        (None, None) => {
            return Err(fail(
                Stage::Validate,
                InputError::MissingSecondSolid(operation_type.clone()).into(),
            ));
        }
    };
    if let Some(element) = element {
        tracing::debug!(kind = %element.kind, id = element.id, "Resolved target element");
    }

    // ========== Execute & encode ==========

    let handled = handlers::execute(kernel, spec.kind, shape, target, &params, config)
        .map_err(|e| fail(Stage::Execute, e.into()))?;
    let modified_solid = codec
        .encode(&handled.shape)
        .map_err(|e| fail(Stage::Encode, e.into()))?;

    Ok(OperationResult {
        modified_solid,
        operation_applied: operation_type,
        parameters_used: params,
        outcome: handled.outcome,
    })
}

fn log_failure(err: &ManipulationError) {
    match &err.failure {
        ManipulationFailure::KernelConstruction(detail) => tracing::error!(
            operation = %err.operation,
            stage = %err.stage,
            detail = %detail,
            "Kernel construction failed"
        ),
        ManipulationFailure::KernelTimeout(ms) => tracing::error!(
            operation = %err.operation,
            timeout_ms = *ms,
            "Kernel timed out"
        ),
        other => tracing::warn!(
            operation = %err.operation,
            stage = %err.stage,
            error = %other,
            "Request rejected"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brep_kernel::{
        BooleanType, EdgeId, EdgeProperties, FaceId, FaceProperties, KernelResult, PolyKernel,
        PolyShape, TopologyCounts,
    };
    use glam::DVec3;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::handlers::Outcome;
    use crate::types::ManipulationResponse;

    /// Kernel wrapper that counts every call and can stall decoding
    #[derive(Default)]
    struct InstrumentedKernel {
        inner: PolyKernel,
        calls: AtomicUsize,
        decode_delay: Option<Duration>,
    }

    impl InstrumentedKernel {
        fn slow(delay: Duration) -> Self {
            Self {
                decode_delay: Some(delay),
                ..Default::default()
            }
        }

        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GeometricKernel for InstrumentedKernel {
        type Shape = PolyShape;
        type Face = FaceId;
        type Edge = EdgeId;

        fn name(&self) -> &str {
            "instrumented"
        }

        fn decode(&self, text: &str) -> KernelResult<PolyShape> {
            self.hit();
            if let Some(delay) = self.decode_delay {
                std::thread::sleep(delay);
            }
            self.inner.decode(text)
        }

        fn encode(&self, shape: &PolyShape) -> KernelResult<String> {
            self.hit();
            self.inner.encode(shape)
        }

        fn faces(&self, shape: &PolyShape) -> Vec<FaceId> {
            self.hit();
            self.inner.faces(shape)
        }

        fn edges(&self, shape: &PolyShape) -> Vec<EdgeId> {
            self.hit();
            self.inner.edges(shape)
        }

        fn topology_counts(&self, shape: &PolyShape) -> TopologyCounts {
            self.hit();
            self.inner.topology_counts(shape)
        }

        fn prism(&self, shape: &PolyShape, face: &FaceId, vector: DVec3) -> KernelResult<PolyShape> {
            self.hit();
            self.inner.prism(shape, face, vector)
        }

        fn boolean(&self, a: &PolyShape, b: &PolyShape, op: BooleanType) -> KernelResult<PolyShape> {
            self.hit();
            self.inner.boolean(a, b, op)
        }

        fn fillet(&self, shape: &PolyShape, edge: &EdgeId, radius: f64) -> KernelResult<PolyShape> {
            self.hit();
            self.inner.fillet(shape, edge, radius)
        }

        fn chamfer(&self, shape: &PolyShape, edge: &EdgeId, distance: f64) -> KernelResult<PolyShape> {
            self.hit();
            self.inner.chamfer(shape, edge, distance)
        }

        fn thick_solid(
            &self,
            shape: &PolyShape,
            removed: &FaceId,
            offset: f64,
            tolerance: f64,
        ) -> KernelResult<PolyShape> {
            self.hit();
            self.inner.thick_solid(shape, removed, offset, tolerance)
        }

        fn face_properties(&self, shape: &PolyShape, face: &FaceId) -> KernelResult<FaceProperties> {
            self.hit();
            self.inner.face_properties(shape, face)
        }

        fn edge_properties(&self, shape: &PolyShape, edge: &EdgeId) -> KernelResult<EdgeProperties> {
            self.hit();
            self.inner.edge_properties(shape, edge)
        }
    }

    fn service() -> ManipulationService<PolyKernel> {
        ManipulationService::new(PolyKernel::new(), ServiceConfig::default())
    }

    #[test]
    fn test_from_config_builds_kernel() {
        let config = ServiceConfig::from_ron_str("(kernel: (fillet_segments: 5))").unwrap();
        let service = ManipulationService::from_config(config);
        assert_eq!(service.kernel().config().fillet_segments, 5);
        assert_eq!(service.config().kernel.fillet_segments, 5);
    }

    fn box_text(min: DVec3, max: DVec3) -> String {
        let kernel = PolyKernel::new();
        kernel.encode(&kernel.make_box(min, max).unwrap()).unwrap()
    }

    fn cube_text() -> String {
        box_text(DVec3::ZERO, DVec3::ONE)
    }

    fn counts(service: &ManipulationService<PolyKernel>, text: &str) -> TopologyCounts {
        let report = service.validate(text);
        assert!(report.valid, "{:?}", report.error);
        report.topology_counts.unwrap()
    }

    #[test]
    fn test_unit_cube_topology_info() {
        let info = service().topology_info(&cube_text()).unwrap();
        assert_eq!(info.total_faces, 6);
        assert_eq!(info.total_edges, 12);
        assert_eq!(info.total_vertices, 8);
        for (i, face) in info.faces.iter().enumerate() {
            assert_eq!(face.id, i);
            assert_eq!(face.element_type, "face");
            assert_relative_eq!(face.area, 1.0, epsilon = 1e-6);
        }
        for edge in &info.edges {
            assert_relative_eq!(edge.length, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_fillet_adds_faces() {
        let service = service();
        let request = OperationRequest::new("fillet_edge", cube_text())
            .with_param("edge_id", 0.0)
            .with_param("radius", 0.1);
        let result = service.manipulate(request).unwrap();
        assert_eq!(result.outcome, Outcome::Applied);
        assert_eq!(result.operation_applied, "fillet_edge");

        let report = service.validate(&result.modified_solid);
        assert!(report.valid);
        assert!(report.error.is_none());
        assert!(report.topology_counts.unwrap().faces > 6);
    }

    #[test]
    fn test_handler_outputs_survive_round_trip() {
        let service = service();
        let kernel = service.kernel();
        let requests = [
            OperationRequest::new("fillet_edge", cube_text()).with_param("edge_id", 0.0),
            OperationRequest::new("chamfer_edge", cube_text()).with_param("edge_id", 3.0),
            OperationRequest::new("extend_face", cube_text()).with_param("face_id", 5.0),
            OperationRequest::new("offset_face", cube_text()).with_param("face_id", 5.0),
        ];
        for request in requests {
            let name = request.operation_type.clone();
            let result = service.manipulate(request).unwrap();
            assert_eq!(result.outcome, Outcome::Applied, "{name}");

            let shape = kernel.decode(&result.modified_solid).unwrap();
            let reencoded = kernel.encode(&shape).unwrap();
            let again = kernel.decode(&reencoded).unwrap();
            assert_eq!(
                kernel.topology_counts(&again),
                kernel.topology_counts(&shape),
                "{name}"
            );
            assert_eq!(
                counts(&service, &reencoded),
                counts(&service, &result.modified_solid),
                "{name}"
            );
        }
    }

    #[test]
    fn test_union_then_difference() {
        let service = service();
        let a = cube_text();
        let b = box_text(DVec3::splat(0.5), DVec3::splat(1.5));

        let fused = service
            .manipulate(OperationRequest::new("boolean_union", a).with_other_solid(b.clone()))
            .unwrap();
        let cut = service
            .manipulate(
                OperationRequest::new("boolean_difference", fused.modified_solid)
                    .with_other_solid(b),
            )
            .unwrap();
        assert!(counts(&service, &cut.modified_solid).faces >= 6);
    }

    #[test]
    fn test_defaults_echoed() {
        let request = OperationRequest::new("extrude_face", cube_text())
            .with_param("face_id", 5.0)
            .with_param("comment", true);
        let result = service().manipulate(request).unwrap();
        assert_eq!(result.operation_applied, "extrude_face");
        let used = &result.parameters_used;
        assert_eq!(used["distance"].as_number(), Some(1.0));
        assert_eq!(used["direction"].as_vector(), Some(DVec3::Z));
        assert_eq!(used["comment"].as_bool(), Some(true));
    }

    #[test]
    fn test_extend_edge_keeps_topology() {
        let service = service();
        let cube = cube_text();
        for edge in 0..12 {
            let request = OperationRequest::new("extend_edge", cube.clone())
                .with_param("edge_id", edge as f64);
            let result = service.manipulate(request).unwrap();
            assert!(matches!(result.outcome, Outcome::NoOp { .. }));
            assert_eq!(
                counts(&service, &result.modified_solid),
                counts(&service, &cube)
            );
        }
    }

    #[test]
    fn test_offset_face_degrades() {
        let service = service();
        let cube = cube_text();
        let request = OperationRequest::new("offset_face", cube.clone())
            .with_param("face_id", 5.0)
            .with_param("offset", -5.0);
        let result = service.manipulate(request).unwrap();
        assert!(matches!(result.outcome, Outcome::Degraded { .. }));
        assert_eq!(
            counts(&service, &result.modified_solid),
            counts(&service, &cube)
        );

        let strict = ManipulationService::new(
            PolyKernel::new(),
            ServiceConfig {
                offset_face_degrades: false,
                ..ServiceConfig::default()
            },
        );
        let request = OperationRequest::new("offset_face", cube)
            .with_param("face_id", 5.0)
            .with_param("offset", -5.0);
        let err = strict.manipulate(request).unwrap_err();
        assert_eq!(err.stage, Stage::Execute);
        assert_eq!(err.code(), "kernel_construction_error");
    }

    #[test]
    fn test_offset_face_applies() {
        let service = service();
        let request =
            OperationRequest::new("offset_face", cube_text()).with_param("face_id", 5.0);
        let result = service.manipulate(request).unwrap();
        assert_eq!(result.outcome, Outcome::Applied);
        assert_eq!(counts(&service, &result.modified_solid).faces, 11);
    }

    #[test]
    fn test_index_out_of_range() {
        let service = service();
        for id in [-1.0, 6.0, 99.0, 1e20, -1e20] {
            let request =
                OperationRequest::new("extend_face", cube_text()).with_param("face_id", id);
            let err = service.manipulate(request).unwrap_err();
            assert_eq!(err.stage, Stage::Resolve);
            assert_eq!(
                err.failure,
                ManipulationFailure::IndexOutOfRange {
                    kind: ElementKind::Face,
                    id: id as i64,
                    count: 6
                }
            );
        }
    }

    #[test]
    fn test_huge_edge_id_out_of_range() {
        let service = service();
        for id in [1e19, -1e19] {
            let request = OperationRequest::new("fillet_edge", cube_text())
                .with_param("edge_id", id)
                .with_param("radius", 0.1);
            let err = service.manipulate(request).unwrap_err();
            assert_eq!(err.stage, Stage::Resolve);
            assert_eq!(err.code(), "index_out_of_range");
            match err.failure {
                ManipulationFailure::IndexOutOfRange { kind, count, .. } => {
                    assert_eq!(kind, ElementKind::Edge);
                    assert_eq!(count, 12);
                }
                other => panic!("unexpected failure: {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_operation_before_decode() {
        let kernel = Arc::new(InstrumentedKernel::default());
        let service =
            ManipulationService::with_shared_kernel(Arc::clone(&kernel), ServiceConfig::default());
        for name in ["twist_face", "", "BOOLEAN_UNION"] {
            let request = OperationRequest::new(name, "not even a solid")
                .with_param("edge_id", 0.0)
                .with_param("radius", 0.1);
            let err = service.manipulate(request).unwrap_err();
            assert_eq!(err.stage, Stage::Dispatch);
            assert_eq!(err.code(), "unknown_operation");
        }
        assert_eq!(kernel.calls(), 0);
    }

    #[test]
    fn test_missing_solid_is_input_error() {
        let kernel = Arc::new(InstrumentedKernel::default());
        let service =
            ManipulationService::with_shared_kernel(Arc::clone(&kernel), ServiceConfig::default());

        let mut request = OperationRequest::new("fillet_edge", "").with_param("edge_id", 0.0);
        let err = service.manipulate(request.clone()).unwrap_err();
        assert_eq!(err.failure, ManipulationFailure::Input(InputError::MissingSolid));

        request.solid = None;
        let err = service.manipulate(request).unwrap_err();
        assert_eq!(err.stage, Stage::Validate);

        let err = service
            .manipulate(OperationRequest::new("boolean_union", cube_text()))
            .unwrap_err();
        assert!(matches!(
            err.failure,
            ManipulationFailure::Input(InputError::MissingSecondSolid(_))
        ));
        assert_eq!(kernel.calls(), 0);
    }

    #[test]
    fn test_kernel_failure_is_sanitized() {
        let service = service();
        let request = OperationRequest::new("fillet_edge", cube_text())
            .with_param("edge_id", 0.0)
            .with_param("radius", 5.0);
        let err = service.manipulate(request).unwrap_err();
        assert_eq!(err.stage, Stage::Execute);

        let response = ManipulationResponse::from(Err::<OperationResult, _>(err));
        assert!(!response.success);
        assert_eq!(response.error_code.as_deref(), Some("kernel_construction_error"));
        assert!(!response.error.unwrap().contains("exceeds"));
    }

    #[test]
    fn test_decode_failure() {
        let err = service()
            .manipulate(OperationRequest::new("fillet_edge", "garbage").with_param("edge_id", 0.0))
            .unwrap_err();
        assert_eq!(err.stage, Stage::Decode);
        assert_eq!(err.code(), "decode_error");

        let report = service().validate("garbage");
        assert!(!report.valid);
        assert!(report.error.is_some());
    }

    #[test]
    fn test_timeout() {
        let config = ServiceConfig {
            request_timeout_ms: Some(20),
            ..ServiceConfig::default()
        };
        let service = ManipulationService::new(
            InstrumentedKernel::slow(Duration::from_millis(500)),
            config,
        );
        let request =
            OperationRequest::new("chamfer_edge", cube_text()).with_param("edge_id", 0.0);
        let err = service.manipulate(request).unwrap_err();
        assert_eq!(err.stage, Stage::Execute);
        assert_eq!(err.failure, ManipulationFailure::KernelTimeout(20));
    }

    #[test]
    fn test_timeout_not_reached() {
        let config = ServiceConfig {
            request_timeout_ms: Some(30_000),
            ..ServiceConfig::default()
        };
        let service = ManipulationService::new(PolyKernel::new(), config);
        let request =
            OperationRequest::new("chamfer_edge", cube_text()).with_param("edge_id", 0.0);
        let result = service.manipulate(request).unwrap();
        assert_eq!(counts(&service, &result.modified_solid).faces, 7);
    }

    #[test]
    fn test_concurrent_requests() {
        let service = service();
        let cube = cube_text();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|edge| {
                    let service = service.clone();
                    let cube = cube.clone();
                    scope.spawn(move || {
                        let request = OperationRequest::new("chamfer_edge", cube)
                            .with_param("edge_id", edge as f64);
                        service.manipulate(request)
                    })
                })
                .collect();
            for handle in handles {
                let result = handle.join().unwrap().unwrap();
                assert_eq!(counts(&service, &result.modified_solid).faces, 7);
            }
        });
    }

    #[test]
    fn test_info() {
        let info = service().info();
        assert_eq!(info.service, SERVICE_NAME);
        assert_eq!(info.kernel, "polybrep");
        assert_eq!(info.status, "healthy");
    }
}
