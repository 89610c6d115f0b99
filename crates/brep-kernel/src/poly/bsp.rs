//! BSP-tree constructive solid geometry on convex polygons
//!
//! Each solid is turned into a tree of splitting planes taken from its own
//! polygons. Clipping one tree against another removes the polygons lying
//! inside (or outside) the other solid; the set operations are fixed
//! sequences of clip and invert steps.

use glam::DVec3;

use super::geometry::Plane;

/// Classification tolerance for points against a splitting plane
pub const EPSILON: f64 = 1e-5;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// A convex planar polygon carrying the plane of the face it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<DVec3>,
    pub plane: Plane,
}

impl Polygon {
    pub fn new(vertices: Vec<DVec3>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane = self.plane.flipped();
    }
}

/// Output buckets for one plane split
#[derive(Default)]
struct SplitBuckets {
    coplanar_front: Vec<Polygon>,
    coplanar_back: Vec<Polygon>,
    front: Vec<Polygon>,
    back: Vec<Polygon>,
}

fn split_polygon(plane: &Plane, polygon: Polygon, out: &mut SplitBuckets) {
    let mut polygon_type = COPLANAR;
    let types: Vec<u8> = polygon
        .vertices
        .iter()
        .map(|v| {
            let t = plane.distance(*v);
            let ty = if t < -EPSILON {
                BACK
            } else if t > EPSILON {
                FRONT
            } else {
                COPLANAR
            };
            polygon_type |= ty;
            ty
        })
        .collect();

    match polygon_type {
        COPLANAR => {
            if plane.normal.dot(polygon.plane.normal) > 0.0 {
                out.coplanar_front.push(polygon);
            } else {
                out.coplanar_back.push(polygon);
            }
        }
        FRONT => out.front.push(polygon),
        BACK => out.back.push(polygon),
        _ => {
            debug_assert_eq!(polygon_type, SPANNING);
            let n = polygon.vertices.len();
            let mut f = Vec::with_capacity(n + 1);
            let mut b = Vec::with_capacity(n + 1);
            for i in 0..n {
                let j = (i + 1) % n;
                let (ti, tj) = (types[i], types[j]);
                let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                if ti != BACK {
                    f.push(vi);
                }
                if ti != FRONT {
                    b.push(vi);
                }
                if (ti | tj) == SPANNING {
                    let t = (plane.w - plane.normal.dot(vi)) / plane.normal.dot(vj - vi);
                    let v = vi.lerp(vj, t);
                    f.push(v);
                    b.push(v);
                }
            }
            if f.len() >= 3 {
                out.front.push(Polygon::new(f, polygon.plane));
            }
            if b.len() >= 3 {
                out.back.push(Polygon::new(b, polygon.plane));
            }
        }
    }
}

/// A node of the BSP tree; polygons stored here are coplanar with `plane`
#[derive(Debug, Default)]
pub struct Node {
    plane: Option<Plane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
}

impl Node {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Node::default();
        node.build(polygons);
        node
    }

    /// Swap solid space and empty space
    pub fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            *plane = plane.flipped();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` that are inside this tree
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons;
        };
        let mut buckets = SplitBuckets::default();
        for polygon in polygons {
            split_polygon(plane, polygon, &mut buckets);
        }
        let mut front = buckets.front;
        front.append(&mut buckets.coplanar_front);
        let mut back = buckets.back;
        back.append(&mut buckets.coplanar_back);

        let mut result = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        if let Some(node) = &self.back {
            result.extend(node.clip_polygons(back));
        }
        result
    }

    /// Remove the parts of this tree's polygons that are inside `other`
    pub fn clip_to(&mut self, other: &Node) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = Vec::new();
        self.collect_polygons(&mut out);
        out
    }

    fn collect_polygons(&self, out: &mut Vec<Polygon>) {
        out.extend(self.polygons.iter().cloned());
        if let Some(front) = &self.front {
            front.collect_polygons(out);
        }
        if let Some(back) = &self.back {
            back.collect_polygons(out);
        }
    }

    /// Insert polygons, splitting them down the tree
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        let Some(first) = polygons.first() else {
            return;
        };
        let plane = *self.plane.get_or_insert(first.plane);
        let mut buckets = SplitBuckets::default();
        for polygon in polygons {
            split_polygon(&plane, polygon, &mut buckets);
        }
        self.polygons.append(&mut buckets.coplanar_front);
        self.polygons.append(&mut buckets.coplanar_back);
        if !buckets.front.is_empty() {
            self.front
                .get_or_insert_with(Box::default)
                .build(buckets.front);
        }
        if !buckets.back.is_empty() {
            self.back
                .get_or_insert_with(Box::default)
                .build(buckets.back);
        }
    }
}

/// Polygons bounding `a ∪ b`
pub fn union(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.all_polygons()
}

/// Polygons bounding `a − b`
pub fn subtract(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}

/// Polygons bounding `a ∩ b`
pub fn intersect(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.invert();
    b.clip_to(&a);
    b.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::geometry::newell;

    /// Closed convex polygon soup of an axis-aligned box
    fn cube_polygons(min: DVec3, max: DVec3) -> Vec<Polygon> {
        let c = |x: bool, y: bool, z: bool| {
            DVec3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };
        let quads = [
            [c(false, false, false), c(false, false, true), c(false, true, true), c(false, true, false)],
            [c(true, false, false), c(true, true, false), c(true, true, true), c(true, false, true)],
            [c(false, false, false), c(true, false, false), c(true, false, true), c(false, false, true)],
            [c(false, true, false), c(false, true, true), c(true, true, true), c(true, true, false)],
            [c(false, false, false), c(false, true, false), c(true, true, false), c(true, false, false)],
            [c(false, false, true), c(true, false, true), c(true, true, true), c(false, true, true)],
        ];
        quads
            .iter()
            .map(|q| Polygon::new(q.to_vec(), Plane::from_loop(q).unwrap()))
            .collect()
    }

    fn volume(polygons: &[Polygon]) -> f64 {
        polygons
            .iter()
            .map(|p| {
                let v = &p.vertices;
                (1..v.len() - 1)
                    .map(|i| v[0].dot(v[i].cross(v[i + 1])))
                    .sum::<f64>()
            })
            .sum::<f64>()
            / 6.0
    }

    fn area(polygons: &[Polygon]) -> f64 {
        polygons
            .iter()
            .map(|p| 0.5 * newell(&p.vertices).length())
            .sum()
    }

    #[test]
    fn test_split_spanning_polygon() {
        let square = cube_polygons(DVec3::ZERO, DVec3::ONE).remove(5);
        let plane = Plane::from_point_normal(DVec3::splat(0.5), DVec3::X).unwrap();
        let mut buckets = SplitBuckets::default();
        split_polygon(&plane, square, &mut buckets);
        assert_eq!(buckets.front.len(), 1);
        assert_eq!(buckets.back.len(), 1);
        assert!((area(&buckets.front) - 0.5).abs() < 1e-12);
        assert!((area(&buckets.back) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_overlapping_boxes() {
        let a = cube_polygons(DVec3::ZERO, DVec3::ONE);
        let b = cube_polygons(DVec3::splat(0.5), DVec3::splat(1.5));

        let u = union(a.clone(), b.clone());
        assert!((volume(&u) - (2.0 - 0.125)).abs() < 1e-9);

        let d = subtract(a.clone(), b.clone());
        assert!((volume(&d) - 0.875).abs() < 1e-9);

        let i = intersect(a, b);
        assert!((volume(&i) - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_intersection_is_empty() {
        let a = cube_polygons(DVec3::ZERO, DVec3::ONE);
        let b = cube_polygons(DVec3::splat(3.0), DVec3::splat(4.0));
        assert!(intersect(a, b).is_empty());
    }

    #[test]
    fn test_stacked_union_drops_shared_face() {
        let a = cube_polygons(DVec3::ZERO, DVec3::ONE);
        let b = cube_polygons(DVec3::new(0.0, 0.0, 1.0), DVec3::new(1.0, 1.0, 2.0));
        let u = union(a, b);
        assert!((volume(&u) - 2.0).abs() < 1e-9);
        // Shared face is dropped from both operands
        assert!((area(&u) - 10.0).abs() < 1e-9);
    }
}
