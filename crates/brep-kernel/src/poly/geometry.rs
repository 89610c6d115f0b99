//! Planar geometry helpers shared by the polyhedral kernel

use std::collections::HashMap;

use glam::{DVec2, DVec3};

/// An oriented plane `normal · p = w`; the normal points out of the material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub w: f64,
}

impl Plane {
    /// Plane through `point` with the given normal
    pub fn from_point_normal(point: DVec3, normal: DVec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        Some(Self {
            normal,
            w: normal.dot(point),
        })
    }

    /// Best-fit plane of a closed loop, oriented by its winding (Newell's method)
    pub fn from_loop(points: &[DVec3]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let normal = newell(points).try_normalize()?;
        let center = points.iter().copied().sum::<DVec3>() / points.len() as f64;
        Some(Self {
            normal,
            w: normal.dot(center),
        })
    }

    /// Signed distance, positive on the outer side
    pub fn distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.w
    }

    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Plane moved along its normal
    pub fn shifted(self, offset: f64) -> Self {
        Self {
            normal: self.normal,
            w: self.w + offset,
        }
    }

    /// Same orientation and position within tolerance
    pub fn coincides(&self, other: &Plane, tolerance: f64) -> bool {
        self.normal.dot(other.normal) > 1.0 - 1e-9 && (self.w - other.w).abs() <= tolerance
    }

    /// Orthonormal in-plane axes `(u, v)` with `u × v = normal`
    pub fn basis(&self) -> (DVec3, DVec3) {
        plane_basis(self.normal)
    }
}

/// Twice the vector area of a closed loop
pub fn newell(points: &[DVec3]) -> DVec3 {
    let Some(&origin) = points.first() else {
        return DVec3::ZERO;
    };
    let mut sum = DVec3::ZERO;
    for i in 1..points.len().saturating_sub(1) {
        sum += (points[i] - origin).cross(points[i + 1] - origin);
    }
    sum
}

pub fn plane_basis(normal: DVec3) -> (DVec3, DVec3) {
    let abs = normal.abs();
    let axis = if abs.x <= abs.y && abs.x <= abs.z {
        DVec3::X
    } else if abs.y <= abs.z {
        DVec3::Y
    } else {
        DVec3::Z
    };
    let u = normal.cross(axis).normalize();
    let v = normal.cross(u);
    (u, v)
}

/// Project points into plane coordinates
pub fn project(points: &[DVec3], origin: DVec3, u: DVec3, v: DVec3) -> Vec<DVec2> {
    points
        .iter()
        .map(|p| {
            let d = *p - origin;
            DVec2::new(d.dot(u), d.dot(v))
        })
        .collect()
}

/// Even-odd point in polygon test
pub fn point_in_polygon(point: DVec2, polygon: &[DVec2]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Area and area centroid of a planar region bounded by loops.
/// Hole loops wind opposite to the outer loop and subtract.
pub fn region_area_centroid(loops: &[Vec<DVec3>], normal: DVec3) -> (f64, DVec3) {
    let mut area = 0.0;
    let mut moment = DVec3::ZERO;
    for ring in loops {
        let Some(&p0) = ring.first() else {
            continue;
        };
        for i in 1..ring.len().saturating_sub(1) {
            let a = 0.5 * (ring[i] - p0).cross(ring[i + 1] - p0).dot(normal);
            area += a;
            moment += a * (p0 + ring[i] + ring[i + 1]) / 3.0;
        }
    }
    if area.abs() <= f64::EPSILON {
        let count = loops.iter().map(Vec::len).sum::<usize>().max(1);
        let center = loops.iter().flatten().copied().sum::<DVec3>() / count as f64;
        return (area, center);
    }
    (area, moment / area)
}

/// True when every corner turns left (or goes straight) around `normal`
pub fn is_convex(points: &[DVec3], normal: DVec3, tolerance: f64) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    (0..n).all(|i| {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        (b - a).cross(c - b).dot(normal) >= -tolerance
    })
}

/// Sutherland-Hodgman clip keeping the part behind `plane`
pub fn clip_behind(points: &[DVec3], plane: &Plane, epsilon: f64) -> Vec<DVec3> {
    let n = points.len();
    let mut out = Vec::with_capacity(n + 1);
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let da = plane.distance(a);
        let db = plane.distance(b);
        if da <= epsilon {
            out.push(a);
        }
        if (da < -epsilon && db > epsilon) || (da > epsilon && db < -epsilon) {
            let t = da / (da - db);
            out.push(a.lerp(b, t));
        }
    }
    out
}

/// Axis-aligned bounds of a point set
pub fn bounds(points: impl IntoIterator<Item = DVec3>) -> Option<(DVec3, DVec3)> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
}

/// Merges points closer than a tolerance into shared indices.
///
/// Indices are handed out in insertion order; the grid is only a lookup
/// accelerator and never drives output order.
#[derive(Debug)]
pub struct Welder {
    tolerance: f64,
    points: Vec<DVec3>,
    grid: HashMap<(i64, i64, i64), Vec<usize>>,
}

impl Welder {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            points: Vec::new(),
            grid: HashMap::new(),
        }
    }

    fn cell(&self, p: DVec3) -> (i64, i64, i64) {
        let s = p / self.tolerance;
        (s.x.floor() as i64, s.y.floor() as i64, s.z.floor() as i64)
    }

    /// Index of an existing point within tolerance, or a new one
    pub fn insert(&mut self, p: DVec3) -> usize {
        let (cx, cy, cz) = self.cell(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(bucket) = self.grid.get(&(cx + dx, cy + dy, cz + dz)) {
                        for &idx in bucket {
                            if self.points[idx].distance(p) <= self.tolerance {
                                return idx;
                            }
                        }
                    }
                }
            }
        }
        let idx = self.points.len();
        self.points.push(p);
        self.grid.entry((cx, cy, cz)).or_default().push(idx);
        idx
    }

    pub fn point(&self, idx: usize) -> DVec3 {
        self.points[idx]
    }

    pub fn points(&self) -> &[DVec3] {
        &self.points
    }
}

/// Remove consecutive duplicates from a closed index ring
pub fn dedup_ring(ring: &mut Vec<usize>) {
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
}
