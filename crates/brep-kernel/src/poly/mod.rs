//! Polyhedral BREP kernel
//!
//! A self-contained kernel for solids bounded by planar faces. Booleans run
//! on a BSP tree of convex polygons and the result is sewn back into a
//! topology store; blends and offsets are expressed as booleans against
//! generated tool solids.

mod blend;
mod bsp;
pub mod format;
mod geometry;
mod offset;
mod sew;
mod sweep;
mod topology;
mod triangulate;

use glam::DVec3;
use serde::{Deserialize, Serialize};

pub use blend::Blend;
pub use geometry::Plane;
pub use topology::{
    EdgeData, EdgeId, FaceData, FaceId, OrientedEdge, PolyShape, ShellId, SolidData, SolidId,
    Traversal, VertexId, WireId,
};

use crate::kernel::{
    BooleanType, EdgeProperties, FaceProperties, GeometricKernel, KernelError, KernelResult,
    TopologyCounts,
};

/// Tuning of the polyhedral kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Points closer than this are treated as one vertex
    pub weld_tolerance: f64,
    /// Number of planar facets approximating a fillet arc
    pub fillet_segments: u32,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            weld_tolerance: bsp::EPSILON,
            fillet_segments: 8,
        }
    }
}

/// Polyhedral geometric kernel
#[derive(Debug, Clone, Default)]
pub struct PolyKernel {
    config: KernelConfig,
}

impl PolyKernel {
    /// Create a kernel with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a kernel with the given settings
    pub fn with_config(config: KernelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Create an axis-aligned box between two corners
    pub fn make_box(&self, min: DVec3, max: DVec3) -> KernelResult<PolyShape> {
        topology::make_box(min, max, self.config.weld_tolerance)
    }

    fn check_face(shape: &PolyShape, face: FaceId) -> KernelResult<()> {
        if shape.has_face(face) {
            Ok(())
        } else {
            Err(KernelError::InvalidElement(format!("face {}", face.index())))
        }
    }

    fn check_edge(shape: &PolyShape, edge: EdgeId) -> KernelResult<()> {
        if shape.has_edge(edge) {
            Ok(())
        } else {
            Err(KernelError::InvalidElement(format!("edge {}", edge.index())))
        }
    }
}

impl GeometricKernel for PolyKernel {
    type Shape = PolyShape;
    type Face = FaceId;
    type Edge = EdgeId;

    fn name(&self) -> &str {
        "polybrep"
    }

    fn decode(&self, text: &str) -> KernelResult<PolyShape> {
        format::decode(text, self.config.weld_tolerance)
    }

    fn encode(&self, shape: &PolyShape) -> KernelResult<String> {
        format::encode(shape)
    }

    fn faces(&self, shape: &PolyShape) -> Vec<FaceId> {
        shape.traverse().faces
    }

    fn edges(&self, shape: &PolyShape) -> Vec<EdgeId> {
        shape.traverse().edges
    }

    fn topology_counts(&self, shape: &PolyShape) -> TopologyCounts {
        shape.counts()
    }

    fn prism(&self, shape: &PolyShape, face: &FaceId, vector: DVec3) -> KernelResult<PolyShape> {
        Self::check_face(shape, *face)?;
        sweep::prism(shape, *face, vector, self.config.weld_tolerance)
    }

    fn boolean(&self, a: &PolyShape, b: &PolyShape, op: BooleanType) -> KernelResult<PolyShape> {
        let pa = triangulate::shape_polygons(a)?;
        let pb = triangulate::shape_polygons(b)?;
        let soup = match op {
            BooleanType::Union => bsp::union(pa, pb),
            BooleanType::Subtract => bsp::subtract(pa, pb),
            BooleanType::Intersect => bsp::intersect(pa, pb),
        };
        if soup.is_empty() {
            return Err(KernelError::BooleanFailed(format!("{op:?} produced no solid")));
        }
        sew::sew(&soup, self.config.weld_tolerance)
            .map_err(|e| KernelError::BooleanFailed(format!("{op:?}: {e}")))
    }

    fn fillet(&self, shape: &PolyShape, edge: &EdgeId, radius: f64) -> KernelResult<PolyShape> {
        Self::check_edge(shape, *edge)?;
        let blend = Blend::Round {
            radius,
            segments: self.config.fillet_segments,
        };
        blend::blend_edge(shape, *edge, blend, self.config.weld_tolerance)
    }

    fn chamfer(&self, shape: &PolyShape, edge: &EdgeId, distance: f64) -> KernelResult<PolyShape> {
        Self::check_edge(shape, *edge)?;
        blend::blend_edge(
            shape,
            *edge,
            Blend::Bevel { distance },
            self.config.weld_tolerance,
        )
    }

    fn thick_solid(
        &self,
        shape: &PolyShape,
        removed: &FaceId,
        offset: f64,
        tolerance: f64,
    ) -> KernelResult<PolyShape> {
        offset::thick_solid(shape, *removed, offset, tolerance, self.config.weld_tolerance)
    }

    fn face_properties(&self, shape: &PolyShape, face: &FaceId) -> KernelResult<FaceProperties> {
        Self::check_face(shape, *face)?;
        let normal = shape.face(*face).plane.normal;
        let (area, centroid) = geometry::region_area_centroid(&shape.face_loops(*face), normal);
        Ok(FaceProperties {
            area: area.abs(),
            centroid,
        })
    }

    fn edge_properties(&self, shape: &PolyShape, edge: &EdgeId) -> KernelResult<EdgeProperties> {
        Self::check_edge(shape, *edge)?;
        let data = shape.edge(*edge);
        let (a, b) = (shape.vertex(data.start), shape.vertex(data.end));
        Ok(EdgeProperties {
            length: a.distance(b),
            centroid: (a + b) * 0.5,
        })
    }
}
