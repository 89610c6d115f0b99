//! Conversion of faces into convex polygons for the boolean engine

use glam::{DVec2, DVec3};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2, Triangulation};

use super::bsp::Polygon;
use super::geometry::{Plane, is_convex, point_in_polygon, project};
use super::topology::{FaceId, PolyShape};
use crate::kernel::{KernelError, KernelResult};

/// Convex polygons covering every face of a shape.
///
/// Convex faces without holes pass through unchanged; all others are split
/// into triangles by a constrained Delaunay triangulation.
pub fn shape_polygons(shape: &PolyShape) -> KernelResult<Vec<Polygon>> {
    let mut out = Vec::new();
    for face in shape.traverse().faces {
        out.extend(face_polygons(shape, face)?);
    }
    Ok(out)
}

pub fn face_polygons(shape: &PolyShape, face: FaceId) -> KernelResult<Vec<Polygon>> {
    let plane = shape.face(face).plane;
    let loops = shape.face_loops(face);
    if loops.len() == 1 && is_convex(&loops[0], plane.normal, 1e-12) {
        return Ok(vec![Polygon::new(loops[0].clone(), plane)]);
    }
    triangulate_loops(&loops, plane)
}

/// Triangulate a planar region given as outer loop plus holes
pub fn triangulate_loops(loops: &[Vec<DVec3>], plane: Plane) -> KernelResult<Vec<Polygon>> {
    let Some(outer) = loops.first() else {
        return Ok(Vec::new());
    };
    let origin = outer[0];
    let (u, v) = plane.basis();
    let projected: Vec<Vec<DVec2>> = loops.iter().map(|l| project(l, origin, u, v)).collect();

    let mut cdt = ConstrainedDelaunayTriangulation::<Point2<f64>>::new();
    let mut positions: Vec<Option<DVec3>> = Vec::new();
    for (ring3, ring2) in loops.iter().zip(&projected) {
        insert_constraint_loop(&mut cdt, ring3, ring2, &mut positions)?;
    }

    let mut out = Vec::new();
    for triangle in cdt.inner_faces() {
        let handles = triangle.vertices();
        let p2: Vec<DVec2> = handles
            .iter()
            .map(|h| DVec2::new(h.position().x, h.position().y))
            .collect();
        let centroid = (p2[0] + p2[1] + p2[2]) / 3.0;
        if !point_in_polygon(centroid, &projected[0])
            || projected[1..]
                .iter()
                .any(|hole| point_in_polygon(centroid, hole))
        {
            continue;
        }
        let mut points = Vec::with_capacity(3);
        for h in handles.iter() {
            let p = positions
                .get(h.fix().index())
                .copied()
                .flatten()
                .ok_or_else(|| KernelError::OperationFailed("triangulation lost a vertex".into()))?;
            points.push(p);
        }
        if (points[1] - points[0])
            .cross(points[2] - points[0])
            .dot(plane.normal)
            < 0.0
        {
            points.swap(1, 2);
        }
        out.push(Polygon::new(points, plane));
    }
    Ok(out)
}

/// Inserts a closed loop as constraint edges, remembering 3D positions
fn insert_constraint_loop(
    cdt: &mut ConstrainedDelaunayTriangulation<Point2<f64>>,
    ring3: &[DVec3],
    ring2: &[DVec2],
    positions: &mut Vec<Option<DVec3>>,
) -> KernelResult<()> {
    if ring2.len() < 3 {
        return Err(KernelError::OperationFailed(
            "constraint loop needs at least 3 points".into(),
        ));
    }
    let mut handles = Vec::with_capacity(ring2.len());
    for (p3, p2) in ring3.iter().zip(ring2) {
        let handle = cdt
            .insert(Point2::new(p2.x, p2.y))
            .map_err(|e: InsertionError| {
                KernelError::OperationFailed(format!("CDT insert: {e}"))
            })?;
        let idx = handle.index();
        if positions.len() <= idx {
            positions.resize(idx + 1, None);
        }
        positions[idx].get_or_insert(*p3);
        handles.push(handle);
    }
    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }
    Ok(())
}
