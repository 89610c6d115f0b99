//! Edge blends: fillet and chamfer
//!
//! A blend removes material along one convex edge. The removed region is
//! described by a profile in the plane perpendicular to the edge, swept past
//! both edge ends and subtracted from the solid.

use glam::DVec3;

use super::bsp;
use super::sew::sew;
use super::sweep::sweep_region;
use super::topology::{EdgeId, FaceLoops, PolyShape};
use super::triangulate::shape_polygons;
use crate::kernel::{KernelError, KernelResult};

/// Cross-section of the material removed along an edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Blend {
    /// Circular rounding approximated by planar facets
    Round { radius: f64, segments: u32 },
    /// Symmetric bevel
    Bevel { distance: f64 },
}

/// Local frame of an edge between two planar faces
struct EdgeFrame {
    start: DVec3,
    end: DVec3,
    /// Outward normals of the two faces
    n1: DVec3,
    n2: DVec3,
    /// In-face directions pointing away from the edge
    w1: DVec3,
    w2: DVec3,
    /// How far each face extends away from the edge
    extent1: f64,
    extent2: f64,
}

fn edge_frame(shape: &PolyShape, edge: EdgeId) -> KernelResult<EdgeFrame> {
    if !shape.has_edge(edge) {
        return Err(KernelError::InvalidElement(format!("edge {}", edge.index())));
    }
    let uses = shape.edge_faces(edge);
    let [(f1, oe1), (f2, oe2)] = uses.as_slice() else {
        return Err(KernelError::OperationFailed(format!(
            "edge {} is not shared by exactly two faces",
            edge.index()
        )));
    };
    if f1 == f2 {
        return Err(KernelError::OperationFailed(format!(
            "edge {} is a seam of a single face",
            edge.index()
        )));
    }

    let data = shape.edge(edge);
    let (start, end) = (shape.vertex(data.start), shape.vertex(data.end));
    let n1 = shape.face(*f1).plane.normal;
    let n2 = shape.face(*f2).plane.normal;
    let inward = |n: DVec3, forward: bool| {
        let dir = if forward { end - start } else { start - end };
        n.cross(dir).normalize_or_zero()
    };
    let w1 = inward(n1, oe1.forward);
    let w2 = inward(n2, oe2.forward);

    let extent = |face, w: DVec3| {
        shape
            .face_loops(face)
            .iter()
            .flatten()
            .map(|p| (*p - start).dot(w))
            .fold(0.0_f64, f64::max)
    };

    Ok(EdgeFrame {
        start,
        end,
        n1,
        n2,
        w1,
        w2,
        extent1: extent(*f1, w1),
        extent2: extent(*f2, w2),
    })
}

/// Apply a blend to a single edge
pub fn blend_edge(
    shape: &PolyShape,
    edge: EdgeId,
    blend: Blend,
    tolerance: f64,
) -> KernelResult<PolyShape> {
    let size = match blend {
        Blend::Round { radius, .. } => radius,
        Blend::Bevel { distance } => distance,
    };
    if !size.is_finite() || size <= tolerance {
        return Err(KernelError::OperationFailed(format!(
            "blend size {size} must be positive"
        )));
    }

    let frame = edge_frame(shape, edge)?;
    if frame.n1.dot(frame.w2) >= -1e-9 || frame.n2.dot(frame.w1) >= -1e-9 {
        return Err(KernelError::OperationFailed(format!(
            "edge {} is not convex",
            edge.index()
        )));
    }

    let EdgeFrame { start: p, n1, n2, .. } = frame;
    let (t1, t2, arc) = match blend {
        Blend::Round { radius, segments } => {
            let k = n1.dot(n2);
            let center = p + (n1 + n2) * (-radius / (1.0 + k));
            let t1 = center + n1 * radius;
            let t2 = center + n2 * radius;
            let phi = k.clamp(-1.0, 1.0).acos();
            let segments = segments.max(1);
            // Interior arc points from the second tangent back to the first
            let arc: Vec<DVec3> = (1..segments)
                .map(|j| {
                    let s = j as f64 / segments as f64;
                    let dir = (n2 * ((1.0 - s) * phi).sin() + n1 * (s * phi).sin()) / phi.sin();
                    center + dir * radius
                })
                .collect();
            (t1, t2, arc)
        }
        Blend::Bevel { distance } => (p + frame.w1 * distance, p + frame.w2 * distance, Vec::new()),
    };

    let setback1 = (t1 - p).dot(frame.w1);
    let setback2 = (t2 - p).dot(frame.w2);
    if setback1 >= frame.extent1 - tolerance || setback2 >= frame.extent2 - tolerance {
        return Err(KernelError::OperationFailed(format!(
            "blend size {size} exceeds the faces adjacent to edge {}",
            edge.index()
        )));
    }

    let margin = setback1.max(setback2);
    let axis = (frame.end - p).normalize_or_zero();
    let length = frame.end.distance(p);
    let shift = -axis * margin;

    let mut profile = vec![
        t1,
        t1 + n1 * margin,
        p + (n1 + n2) * margin,
        t2 + n2 * margin,
        t2,
    ];
    profile.extend(arc);
    let profile: Vec<DVec3> = profile.into_iter().map(|q| q + shift).collect();

    let region = FaceLoops::new(profile);
    let normal = super::geometry::newell(&region.outer).normalize_or_zero();
    let cutter = PolyShape::from_faces(
        sweep_region(&region, normal, axis * (length + 2.0 * margin), tolerance)?,
        tolerance,
    )?;

    let soup = bsp::subtract(shape_polygons(shape)?, shape_polygons(&cutter)?);
    sew(&soup, tolerance)
}
