//! Thick solids from convex polyhedra
//!
//! A convex solid is the intersection of the half-spaces behind its face
//! planes, so offsetting it amounts to moving those planes. The wall is the
//! difference of two such hulls; leaving the removed face's plane out of
//! the inner hull opens the wall on that side.

use glam::DVec3;

use super::bsp::{self, Polygon};
use super::geometry::{Plane, bounds, clip_behind, newell};
use super::sew::sew;
use super::topology::{FaceId, PolyShape};
use crate::kernel::{KernelError, KernelResult};

/// Hollow or thicken a convex solid, opening it at `removed`
pub fn thick_solid(
    shape: &PolyShape,
    removed: FaceId,
    offset: f64,
    tolerance: f64,
    weld_tolerance: f64,
) -> KernelResult<PolyShape> {
    if !offset.is_finite() || offset.abs() < tolerance {
        return Err(KernelError::OperationFailed(format!(
            "offset {offset} is below tolerance {tolerance}"
        )));
    }
    if !shape.has_face(removed) {
        return Err(KernelError::InvalidElement(format!("face {}", removed.index())));
    }
    if shape.solids().len() != 1 || shape.solids().iter().any(|s| !s.voids.is_empty()) {
        return Err(KernelError::OperationFailed(
            "thick solid needs a single solid without voids".into(),
        ));
    }

    let faces = shape.traverse().faces;
    let points = shape.vertex_points();
    let mut kept: Vec<Plane> = Vec::new();
    let mut removed_plane = None;
    for &face in &faces {
        let plane = shape.face(face).plane;
        if points.iter().any(|p| plane.distance(*p) > weld_tolerance) {
            return Err(KernelError::OperationFailed(
                "thick solid is only supported for convex solids".into(),
            ));
        }
        if face == removed {
            removed_plane = Some(plane);
        } else if !kept.iter().any(|k| k.coincides(&plane, weld_tolerance)) {
            kept.push(plane);
        }
    }
    let removed_plane = removed_plane
        .ok_or_else(|| KernelError::InvalidElement(format!("face {}", removed.index())))?;

    let (lo, hi) = bounds(points.iter().copied())
        .ok_or_else(|| KernelError::OperationFailed("shape has no vertices".into()))?;
    let margin = 2.0 * ((hi - lo).max_element() + offset.abs()) + 1.0;
    let (lo, hi) = (lo - DVec3::splat(margin), hi + DVec3::splat(margin));

    let (outer_planes, inner_planes): (Vec<Plane>, Vec<Plane>) = if offset > 0.0 {
        let mut outer: Vec<Plane> = kept.iter().map(|p| p.shifted(offset)).collect();
        outer.push(removed_plane);
        (outer, kept)
    } else {
        let mut outer = kept.clone();
        outer.push(removed_plane);
        (outer, kept.iter().map(|p| p.shifted(offset)).collect())
    };

    let outer = hull_polygons(&outer_planes, lo, hi, weld_tolerance);
    let inner = hull_polygons(&inner_planes, lo, hi, weld_tolerance);
    if outer.is_empty() || inner.is_empty() {
        return Err(KernelError::OperationFailed(format!(
            "offset {offset} leaves no wall"
        )));
    }

    sew(&bsp::subtract(outer, inner), weld_tolerance)
}

/// Boundary polygons of the region behind every plane, capped by a box
fn hull_polygons(planes: &[Plane], lo: DVec3, hi: DVec3, epsilon: f64) -> Vec<Polygon> {
    let box_planes = [
        Plane { normal: DVec3::NEG_X, w: -lo.x },
        Plane { normal: DVec3::X, w: hi.x },
        Plane { normal: DVec3::NEG_Y, w: -lo.y },
        Plane { normal: DVec3::Y, w: hi.y },
        Plane { normal: DVec3::NEG_Z, w: -lo.z },
        Plane { normal: DVec3::Z, w: hi.z },
    ];
    let mut all: Vec<Plane> = planes.to_vec();
    for plane in box_planes {
        if !all.iter().any(|p| p.coincides(&plane, epsilon)) {
            all.push(plane);
        }
    }

    let center = (lo + hi) * 0.5;
    let reach = (hi - lo).length() * 2.0;
    let mut polygons = Vec::new();
    for (i, plane) in all.iter().enumerate() {
        let (u, v) = plane.basis();
        let origin = center - plane.normal * plane.distance(center);
        let mut ring = vec![
            origin + (-u - v) * reach,
            origin + (u - v) * reach,
            origin + (u + v) * reach,
            origin + (-u + v) * reach,
        ];
        for (j, other) in all.iter().enumerate() {
            if i != j && ring.len() >= 3 {
                ring = clip_behind(&ring, other, epsilon);
            }
        }
        if ring.len() >= 3 && 0.5 * newell(&ring).length() > epsilon * epsilon {
            polygons.push(Polygon::new(ring, *plane));
        }
    }
    polygons
}
