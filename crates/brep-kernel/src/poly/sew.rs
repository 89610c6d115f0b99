//! Rebuilding a BREP from the polygon soup produced by the boolean engine
//!
//! Fragments are welded, grouped by supporting plane and merged into maximal
//! faces: interior edges between fragments of the same plane cancel out,
//! the remaining boundary segments are chained into loops, and vertices
//! that only subdivide a straight edge are dropped again.

use std::collections::HashMap;

use glam::DVec3;

use super::bsp::Polygon;
use super::geometry::{Plane, Welder, dedup_ring, newell, plane_basis, point_in_polygon, project};
use super::topology::{FaceLoops, PolyShape};
use crate::kernel::{KernelError, KernelResult};

/// Minimum sine of the turn angle for a vertex to count as a corner
const COLLINEAR_SINE: f64 = 1e-7;

struct Fragment {
    ring: Vec<usize>,
    group: usize,
}

/// Sew a closed polygon soup into a shape
pub fn sew(polygons: &[Polygon], tolerance: f64) -> KernelResult<PolyShape> {
    let mut welder = Welder::new(tolerance);
    let mut planes: Vec<Plane> = Vec::new();
    let mut fragments = Vec::new();

    for polygon in polygons {
        let mut ring: Vec<usize> = polygon.vertices.iter().map(|p| welder.insert(*p)).collect();
        dedup_ring(&mut ring);
        if ring.len() < 3 {
            continue;
        }
        let points: Vec<DVec3> = ring.iter().map(|&i| welder.point(i)).collect();
        if 0.5 * newell(&points).length() <= tolerance * tolerance {
            continue;
        }
        let group = match planes
            .iter()
            .position(|p| p.coincides(&polygon.plane, tolerance))
        {
            Some(g) => g,
            None => {
                planes.push(polygon.plane);
                planes.len() - 1
            }
        };
        fragments.push(Fragment { ring, group });
    }

    if fragments.is_empty() {
        return Err(KernelError::OperationFailed("result is empty".into()));
    }

    let points = welder.points();
    split_t_junctions(&mut fragments, &planes, points, tolerance);

    // Boundary loops per plane group
    let mut group_loops: Vec<Vec<Vec<usize>>> = Vec::with_capacity(planes.len());
    for (g, plane) in planes.iter().enumerate() {
        let segments = boundary_segments(fragments.iter().filter(|f| f.group == g));
        group_loops.push(chain_loops(&segments, points, plane.normal));
    }

    // Planes meeting at each vertex decide which vertices are true corners
    let mut incidence: HashMap<usize, Vec<usize>> = HashMap::new();
    for (g, loops) in group_loops.iter().enumerate() {
        for &v in loops.iter().flatten() {
            let groups = incidence.entry(v).or_default();
            if !groups.contains(&g) {
                groups.push(g);
            }
        }
    }

    let mut faces = Vec::new();
    let mut dropped = 0usize;
    for (g, loops) in group_loops.into_iter().enumerate() {
        let normal = planes[g].normal;
        let mut outers: Vec<(Vec<DVec3>, f64)> = Vec::new();
        let mut holes: Vec<Vec<DVec3>> = Vec::new();
        for mut ring in loops {
            simplify_loop(&mut ring, points, &incidence);
            if ring.len() < 3 {
                continue;
            }
            let ring: Vec<DVec3> = ring.iter().map(|&i| points[i]).collect();
            let area = 0.5 * newell(&ring).dot(normal);
            if area.abs() <= tolerance * tolerance {
                continue;
            }
            if area > 0.0 {
                outers.push((ring, area));
            } else {
                holes.push(ring);
            }
        }

        let mut group_faces: Vec<FaceLoops> = outers
            .iter()
            .map(|(ring, _)| FaceLoops::new(ring.clone()))
            .collect();
        for hole in holes {
            match enclosing_outer(&hole, &outers, normal, tolerance) {
                Some(i) => group_faces[i].inner.push(hole),
                None => dropped += 1,
            }
        }
        faces.extend(group_faces);
    }

    tracing::debug!(
        "Sewed {} fragments on {} planes into {} faces ({} stray holes)",
        fragments.len(),
        planes.len(),
        faces.len(),
        dropped
    );

    PolyShape::from_faces(faces, tolerance)
}

/// Insert every vertex lying in the interior of a fragment edge into that edge
fn split_t_junctions(fragments: &mut [Fragment], planes: &[Plane], points: &[DVec3], tolerance: f64) {
    let on_plane: Vec<Vec<usize>> = planes
        .iter()
        .map(|plane| {
            (0..points.len())
                .filter(|&i| plane.distance(points[i]).abs() <= tolerance)
                .collect()
        })
        .collect();

    for fragment in fragments.iter_mut() {
        let candidates = &on_plane[fragment.group];
        let n = fragment.ring.len();
        let mut ring = Vec::with_capacity(n);
        for k in 0..n {
            let a = fragment.ring[k];
            let b = fragment.ring[(k + 1) % n];
            ring.push(a);
            let (pa, pb) = (points[a], points[b]);
            let ab = pb - pa;
            let len2 = ab.length_squared();
            if len2 <= tolerance * tolerance {
                continue;
            }
            let mut inner: Vec<(f64, usize)> = candidates
                .iter()
                .filter(|&&c| c != a && c != b)
                .filter_map(|&c| {
                    let t = (points[c] - pa).dot(ab) / len2;
                    if t <= 0.0 || t >= 1.0 {
                        return None;
                    }
                    let foot = pa + ab * t;
                    let off_line = foot.distance(points[c]);
                    let inside = points[c].distance(pa) > tolerance && points[c].distance(pb) > tolerance;
                    (off_line <= tolerance && inside).then_some((t, c))
                })
                .collect();
            inner.sort_by(|x, y| x.0.total_cmp(&y.0));
            ring.extend(inner.into_iter().map(|(_, c)| c));
        }
        fragment.ring = ring;
    }
}

/// Directed fragment edges that are not cancelled by an opposite edge
fn boundary_segments<'a>(fragments: impl Iterator<Item = &'a Fragment>) -> Vec<(usize, usize)> {
    let mut all = Vec::new();
    for fragment in fragments {
        let n = fragment.ring.len();
        for k in 0..n {
            all.push((fragment.ring[k], fragment.ring[(k + 1) % n]));
        }
    }

    let mut count: HashMap<(usize, usize), i64> = HashMap::new();
    for &s in &all {
        *count.entry(s).or_default() += 1;
    }
    let mut keep: HashMap<(usize, usize), i64> = HashMap::new();
    for (&(a, b), &n) in &count {
        let opposite = count.get(&(b, a)).copied().unwrap_or(0);
        if n > opposite {
            keep.insert((a, b), n - opposite);
        }
    }

    all.into_iter()
        .filter(|s| match keep.get_mut(s) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        })
        .collect()
}

/// Chain directed segments into closed loops.
///
/// Where several segments leave the same vertex, the one turning furthest
/// left is taken, which keeps loops touching at a vertex apart.
fn chain_loops(segments: &[(usize, usize)], points: &[DVec3], normal: DVec3) -> Vec<Vec<usize>> {
    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, &(a, _)) in segments.iter().enumerate() {
        outgoing.entry(a).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut loops = Vec::new();
    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        let origin = segments[start].0;
        let mut ring = Vec::new();
        let mut current = start;
        let closed = loop {
            used[current] = true;
            let (a, b) = segments[current];
            ring.push(a);
            if b == origin {
                break true;
            }
            let incoming = points[b] - points[a];
            let next = outgoing
                .get(&b)
                .into_iter()
                .flatten()
                .copied()
                .filter(|&s| !used[s])
                .map(|s| {
                    let outgoing_dir = points[segments[s].1] - points[b];
                    let turn = normal
                        .dot(incoming.cross(outgoing_dir))
                        .atan2(incoming.dot(outgoing_dir));
                    (s, turn)
                })
                .fold(None, |best: Option<(usize, f64)>, cand| match best {
                    Some(prev) if prev.1 >= cand.1 => Some(prev),
                    _ => Some(cand),
                });
            match next {
                Some((s, _)) => current = s,
                None => break false,
            }
        };
        if closed && ring.len() >= 3 {
            loops.push(ring);
        } else {
            tracing::debug!("Discarding open boundary chain of {} segments", ring.len());
        }
    }
    loops
}

/// Drop vertices that merely subdivide a straight edge between two faces
fn simplify_loop(ring: &mut Vec<usize>, points: &[DVec3], incidence: &HashMap<usize, Vec<usize>>) {
    loop {
        let n = ring.len();
        if n < 3 {
            return;
        }
        let removable = (0..n).find(|&i| {
            let (prev, cur, next) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            if incidence.get(&cur).map_or(0, Vec::len) >= 3 {
                return false;
            }
            let d1 = points[cur] - points[prev];
            let d2 = points[next] - points[cur];
            let scale = d1.length() * d2.length();
            scale > 0.0 && d1.dot(d2) > 0.0 && d1.cross(d2).length() <= COLLINEAR_SINE * scale
        });
        match removable {
            Some(i) => {
                ring.remove(i);
            }
            None => return,
        }
    }
}

/// Smallest outer loop containing a hole
fn enclosing_outer(
    hole: &[DVec3],
    outers: &[(Vec<DVec3>, f64)],
    normal: DVec3,
    tolerance: f64,
) -> Option<usize> {
    let (u, v) = plane_basis(normal);
    let origin = hole[0];
    // Material lies to the left of a hole edge; probe just beside it
    let dir = hole[1] - hole[0];
    let probe3 = (hole[0] + hole[1]) * 0.5 + normal.cross(dir).normalize_or_zero() * tolerance * 10.0;
    let probe = project(&[probe3], origin, u, v)[0];
    outers
        .iter()
        .enumerate()
        .filter(|(_, (ring, _))| point_in_polygon(probe, &project(ring, origin, u, v)))
        .min_by(|a, b| a.1.1.total_cmp(&b.1.1))
        .map(|(i, _)| i)
}
