//! Geometric kernel trait definitions
//!
//! These traits define the interface that every kernel binding must implement.
//! A binding owns the actual geometry: text encoding of solids, topology
//! enumeration, construction operations and measurement.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for geometric kernel operations
#[derive(Debug, Clone, Error)]
pub enum KernelError {
    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Encode failed: {0}")]
    Encode(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Invalid element: {0}")]
    InvalidElement(String),
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

/// Boolean operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanType {
    /// Union (fuse)
    Union,
    /// Subtraction (cut)
    Subtract,
    /// Intersection (common)
    Intersect,
}

/// Number of distinct topological elements of each kind in a shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyCounts {
    pub faces: usize,
    pub edges: usize,
    pub vertices: usize,
    pub solids: usize,
    pub shells: usize,
    pub wires: usize,
}

/// Surface properties of a face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceProperties {
    /// Surface area
    pub area: f64,
    /// Area-weighted center of the face
    pub centroid: DVec3,
}

/// Linear properties of an edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeProperties {
    /// Curve length
    pub length: f64,
    /// Length-weighted center of the edge
    pub centroid: DVec3,
}

/// The main geometric kernel trait
///
/// Implementations provide every geometric capability the manipulation
/// service delegates: codec, enumeration, construction and measurement.
/// Shapes are plain values owned by the caller, so independent calls on
/// independent shapes may run concurrently.
pub trait GeometricKernel: Send + Sync {
    /// In-memory solid handle
    type Shape: Send;
    /// Reference to a face of a shape
    type Face: Clone + Send;
    /// Reference to an edge of a shape
    type Edge: Clone + Send;

    /// Get the name of this kernel
    fn name(&self) -> &str;

    // ========== Codec ==========

    /// Build a shape from its serialized text form
    fn decode(&self, text: &str) -> KernelResult<Self::Shape>;

    /// Serialize a shape to text
    fn encode(&self, shape: &Self::Shape) -> KernelResult<String>;

    // ========== Topology ==========

    /// All faces, each once, in the kernel's deterministic traversal order
    fn faces(&self, shape: &Self::Shape) -> Vec<Self::Face>;

    /// All edges, each once, in the kernel's deterministic traversal order
    fn edges(&self, shape: &Self::Shape) -> Vec<Self::Edge>;

    /// Count distinct topological elements
    fn topology_counts(&self, shape: &Self::Shape) -> TopologyCounts;

    // ========== Construction ==========

    /// Build an extrusion prism by sweeping a face along a vector
    ///
    /// # Arguments
    /// * `shape` - The shape owning the face
    /// * `face` - The face to sweep
    /// * `vector` - Sweep direction scaled by distance
    fn prism(
        &self,
        shape: &Self::Shape,
        face: &Self::Face,
        vector: DVec3,
    ) -> KernelResult<Self::Shape>;

    /// Perform a boolean operation on two shapes
    fn boolean(
        &self,
        a: &Self::Shape,
        b: &Self::Shape,
        op: BooleanType,
    ) -> KernelResult<Self::Shape>;

    /// Round a single edge with the given radius
    fn fillet(
        &self,
        shape: &Self::Shape,
        edge: &Self::Edge,
        radius: f64,
    ) -> KernelResult<Self::Shape>;

    /// Bevel a single edge with the given symmetric distance
    fn chamfer(
        &self,
        shape: &Self::Shape,
        edge: &Self::Edge,
        distance: f64,
    ) -> KernelResult<Self::Shape>;

    /// Build a thick solid by offsetting every face except `removed`,
    /// which becomes an opening
    ///
    /// # Arguments
    /// * `offset` - Wall thickness (positive = outward, negative = inward)
    /// * `tolerance` - Offsets smaller than this are rejected
    fn thick_solid(
        &self,
        shape: &Self::Shape,
        removed: &Self::Face,
        offset: f64,
        tolerance: f64,
    ) -> KernelResult<Self::Shape>;

    // ========== Measurement ==========

    /// Compute area and centroid of a face
    fn face_properties(
        &self,
        shape: &Self::Shape,
        face: &Self::Face,
    ) -> KernelResult<FaceProperties>;

    /// Compute length and centroid of an edge
    fn edge_properties(
        &self,
        shape: &Self::Shape,
        edge: &Self::Edge,
    ) -> KernelResult<EdgeProperties>;
}
