//! Topology store for planar-faced solids
//!
//! Entities live in flat arenas and reference each other through typed
//! indices. The hierarchy is solid → shell → face → wire → oriented edge →
//! vertex.

use std::collections::HashMap;

use glam::DVec3;

use super::geometry::{Plane, Welder, bounds, dedup_ring};
use crate::kernel::{KernelError, KernelResult, TopologyCounts};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Position of the entity in its arena
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

entity_id!(
    /// Identifier of a vertex in a [`PolyShape`]
    VertexId
);
entity_id!(
    /// Identifier of an edge in a [`PolyShape`]
    EdgeId
);
entity_id!(
    /// Identifier of a wire in a [`PolyShape`]
    WireId
);
entity_id!(
    /// Identifier of a face in a [`PolyShape`]
    FaceId
);
entity_id!(
    /// Identifier of a shell in a [`PolyShape`]
    ShellId
);
entity_id!(
    /// Identifier of a solid in a [`PolyShape`]
    SolidId
);

/// A straight edge between two vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeData {
    pub start: VertexId,
    pub end: VertexId,
}

/// An edge with its traversal direction inside a wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedEdge {
    pub edge: EdgeId,
    /// `true` when traversed start → end
    pub forward: bool,
}

/// A closed loop of oriented edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireData {
    pub edges: Vec<OrientedEdge>,
}

/// A planar face bounded by one outer wire and any number of holes
#[derive(Debug, Clone, PartialEq)]
pub struct FaceData {
    pub outer: WireId,
    pub inner: Vec<WireId>,
    /// Supporting plane, normal pointing out of the material
    pub plane: Plane,
}

/// A connected set of faces enclosing a volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellData {
    pub faces: Vec<FaceId>,
}

/// A solid with an outer boundary and optional internal voids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolidData {
    pub outer: ShellId,
    pub voids: Vec<ShellId>,
}

/// Boundary loops of one face given as points, outer loop first
#[derive(Debug, Clone, Default)]
pub struct FaceLoops {
    pub outer: Vec<DVec3>,
    pub inner: Vec<Vec<DVec3>>,
}

impl FaceLoops {
    pub fn new(outer: Vec<DVec3>) -> Self {
        Self {
            outer,
            inner: Vec::new(),
        }
    }

    /// Same region seen from the other side
    pub fn reversed(mut self) -> Self {
        self.outer.reverse();
        for ring in &mut self.inner {
            ring.reverse();
        }
        self
    }
}

/// Unique elements in traversal order
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    pub shells: Vec<ShellId>,
    pub faces: Vec<FaceId>,
    pub wires: Vec<WireId>,
    pub edges: Vec<EdgeId>,
    pub vertices: Vec<VertexId>,
}

/// In-memory planar BREP
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyShape {
    pub(crate) vertices: Vec<DVec3>,
    pub(crate) edges: Vec<EdgeData>,
    pub(crate) wires: Vec<WireData>,
    pub(crate) faces: Vec<FaceData>,
    pub(crate) shells: Vec<ShellData>,
    pub(crate) solids: Vec<SolidData>,
}

impl PolyShape {
    pub fn vertex(&self, id: VertexId) -> DVec3 {
        self.vertices[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &EdgeData {
        &self.edges[id.index()]
    }

    pub fn wire(&self, id: WireId) -> &WireData {
        &self.wires[id.index()]
    }

    pub fn face(&self, id: FaceId) -> &FaceData {
        &self.faces[id.index()]
    }

    pub fn solids(&self) -> &[SolidData] {
        &self.solids
    }

    pub fn vertex_points(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Check that an edge id belongs to this shape
    pub fn has_edge(&self, id: EdgeId) -> bool {
        id.index() < self.edges.len()
    }

    /// Check that a face id belongs to this shape
    pub fn has_face(&self, id: FaceId) -> bool {
        id.index() < self.faces.len()
    }

    /// Start vertex of an oriented edge
    pub fn oriented_start(&self, oe: OrientedEdge) -> VertexId {
        let edge = self.edge(oe.edge);
        if oe.forward { edge.start } else { edge.end }
    }

    /// End vertex of an oriented edge
    pub fn oriented_end(&self, oe: OrientedEdge) -> VertexId {
        let edge = self.edge(oe.edge);
        if oe.forward { edge.end } else { edge.start }
    }

    /// Loop points of a wire in traversal order
    pub fn wire_points(&self, id: WireId) -> Vec<DVec3> {
        self.wire(id)
            .edges
            .iter()
            .map(|oe| self.vertex(self.oriented_start(*oe)))
            .collect()
    }

    /// Outer loop followed by hole loops
    pub fn face_loops(&self, id: FaceId) -> Vec<Vec<DVec3>> {
        let face = self.face(id);
        std::iter::once(face.outer)
            .chain(face.inner.iter().copied())
            .map(|w| self.wire_points(w))
            .collect()
    }

    /// Depth-first walk solids → shells → faces → wires → edges → vertices.
    ///
    /// Shells are visited outer first, then voids; wires outer first, then
    /// holes. Every element is reported once, at its first visit.
    pub fn traverse(&self) -> Traversal {
        let mut out = Traversal::default();
        let mut seen_shell = vec![false; self.shells.len()];
        let mut seen_face = vec![false; self.faces.len()];
        let mut seen_wire = vec![false; self.wires.len()];
        let mut seen_edge = vec![false; self.edges.len()];
        let mut seen_vertex = vec![false; self.vertices.len()];

        for solid in &self.solids {
            for shell in std::iter::once(solid.outer).chain(solid.voids.iter().copied()) {
                if std::mem::replace(&mut seen_shell[shell.index()], true) {
                    continue;
                }
                out.shells.push(shell);
                for &face in &self.shells[shell.index()].faces {
                    if std::mem::replace(&mut seen_face[face.index()], true) {
                        continue;
                    }
                    out.faces.push(face);
                    let data = &self.faces[face.index()];
                    for wire in std::iter::once(data.outer).chain(data.inner.iter().copied()) {
                        if std::mem::replace(&mut seen_wire[wire.index()], true) {
                            continue;
                        }
                        out.wires.push(wire);
                        for oe in &self.wires[wire.index()].edges {
                            if !std::mem::replace(&mut seen_edge[oe.edge.index()], true) {
                                out.edges.push(oe.edge);
                            }
                            let edge = self.edges[oe.edge.index()];
                            let (first, second) = if oe.forward {
                                (edge.start, edge.end)
                            } else {
                                (edge.end, edge.start)
                            };
                            for v in [first, second] {
                                if !std::mem::replace(&mut seen_vertex[v.index()], true) {
                                    out.vertices.push(v);
                                }
                            }
                        }
                    }
                }
            }
        }
        out
    }

    pub fn counts(&self) -> TopologyCounts {
        let t = self.traverse();
        TopologyCounts {
            faces: t.faces.len(),
            edges: t.edges.len(),
            vertices: t.vertices.len(),
            solids: self.solids.len(),
            shells: t.shells.len(),
            wires: t.wires.len(),
        }
    }

    /// Faces using an edge, with the edge's direction inside each face
    pub fn edge_faces(&self, edge: EdgeId) -> Vec<(FaceId, OrientedEdge)> {
        let mut uses = Vec::new();
        for face in self.traverse().faces {
            let data = self.face(face);
            for wire in std::iter::once(data.outer).chain(data.inner.iter().copied()) {
                for oe in &self.wire(wire).edges {
                    if oe.edge == edge {
                        uses.push((face, *oe));
                    }
                }
            }
        }
        uses
    }

    /// Assemble a shape from face loops.
    ///
    /// Points are welded, edges are shared between faces by their vertex
    /// pair, faces connected through edges form shells, and shells are
    /// sorted into solids by the sign of their enclosed volume.
    pub fn from_faces(faces: Vec<FaceLoops>, tolerance: f64) -> KernelResult<Self> {
        let mut welder = Welder::new(tolerance);
        let mut indexed: Vec<(Vec<Vec<usize>>, Plane)> = Vec::new();

        for face in faces {
            let mut rings = Vec::with_capacity(1 + face.inner.len());
            for ring in std::iter::once(face.outer).chain(face.inner) {
                let mut idx: Vec<usize> = ring.iter().map(|p| welder.insert(*p)).collect();
                dedup_ring(&mut idx);
                if idx.len() >= 3 {
                    rings.push(idx);
                } else if rings.is_empty() {
                    break;
                }
            }
            let Some(outer) = rings.first() else {
                continue;
            };
            let points: Vec<DVec3> = outer.iter().map(|&i| welder.point(i)).collect();
            let Some(plane) = Plane::from_loop(&points) else {
                continue;
            };
            indexed.push((rings, plane));
        }

        let mut shape = PolyShape::default();
        let mut vertex_map: HashMap<usize, VertexId> = HashMap::new();
        let mut edge_map: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();

        for (rings, plane) in &indexed {
            let mut wire_ids = Vec::with_capacity(rings.len());
            for ring in rings {
                let verts: Vec<VertexId> = ring
                    .iter()
                    .map(|&i| {
                        *vertex_map.entry(i).or_insert_with(|| {
                            shape.vertices.push(welder.point(i));
                            VertexId(shape.vertices.len() as u32 - 1)
                        })
                    })
                    .collect();
                let mut wire = WireData {
                    edges: Vec::with_capacity(verts.len()),
                };
                for (k, &a) in verts.iter().enumerate() {
                    let b = verts[(k + 1) % verts.len()];
                    let key = if a < b { (a, b) } else { (b, a) };
                    let edge = *edge_map.entry(key).or_insert_with(|| {
                        shape.edges.push(EdgeData { start: a, end: b });
                        EdgeId(shape.edges.len() as u32 - 1)
                    });
                    wire.edges.push(OrientedEdge {
                        edge,
                        forward: shape.edges[edge.index()].start == a,
                    });
                }
                shape.wires.push(wire);
                wire_ids.push(WireId(shape.wires.len() as u32 - 1));
            }
            shape.faces.push(FaceData {
                outer: wire_ids[0],
                inner: wire_ids[1..].to_vec(),
                plane: *plane,
            });
        }

        shape.group_shells(tolerance)?;
        Ok(shape)
    }

    /// Group faces into shells by shared edges and shells into solids
    fn group_shells(&mut self, tolerance: f64) -> KernelResult<()> {
        let face_count = self.faces.len();
        let mut parent: Vec<usize> = (0..face_count).collect();
        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }

        let mut edge_owner: Vec<Option<usize>> = vec![None; self.edges.len()];
        for f in 0..face_count {
            let face = &self.faces[f];
            for wire in std::iter::once(face.outer).chain(face.inner.iter().copied()) {
                for oe in &self.wires[wire.index()].edges {
                    match edge_owner[oe.edge.index()] {
                        Some(other) => {
                            let (ra, rb) = (find(&mut parent, f), find(&mut parent, other));
                            if ra != rb {
                                parent[ra.max(rb)] = ra.min(rb);
                            }
                        }
                        None => edge_owner[oe.edge.index()] = Some(f),
                    }
                }
            }
        }

        // Groups in order of their lowest face
        let mut groups: Vec<Vec<FaceId>> = Vec::new();
        let mut group_of_root: HashMap<usize, usize> = HashMap::new();
        for f in 0..face_count {
            let root = find(&mut parent, f);
            let g = *group_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[g].push(FaceId(f as u32));
        }

        let min_volume = tolerance.powi(3);
        let mut outers: Vec<(ShellId, f64, (DVec3, DVec3))> = Vec::new();
        let mut voids: Vec<(ShellId, f64, (DVec3, DVec3))> = Vec::new();
        for faces in groups {
            let volume = self.enclosed_volume(&faces);
            let Some(bbox) = bounds(faces.iter().flat_map(|&f| self.face_loops(f)).flatten())
            else {
                continue;
            };
            if volume.abs() <= min_volume {
                tracing::debug!("Dropping degenerate shell with {} faces", faces.len());
                continue;
            }
            self.shells.push(ShellData { faces });
            let id = ShellId(self.shells.len() as u32 - 1);
            if volume > 0.0 {
                outers.push((id, volume, bbox));
            } else {
                voids.push((id, volume, bbox));
            }
        }

        if outers.is_empty() {
            return Err(KernelError::OperationFailed(
                "result does not enclose any volume".into(),
            ));
        }

        self.solids = outers
            .iter()
            .map(|(id, _, _)| SolidData {
                outer: *id,
                voids: Vec::new(),
            })
            .collect();

        for (void, _, (vlo, vhi)) in voids {
            let host = outers
                .iter()
                .enumerate()
                .filter(|(_, (_, _, (lo, hi)))| {
                    lo.cmple(vlo + tolerance).all() && hi.cmpge(vhi - tolerance).all()
                })
                .min_by(|a, b| a.1.1.total_cmp(&b.1.1))
                .map(|(i, _)| i);
            match host {
                Some(i) => self.solids[i].voids.push(void),
                None => tracing::debug!("Void shell {:?} has no enclosing shell", void),
            }
        }
        Ok(())
    }

    /// Signed volume enclosed by a set of faces (divergence theorem)
    pub fn enclosed_volume(&self, faces: &[FaceId]) -> f64 {
        let mut volume = 0.0;
        for &face in faces {
            for ring in self.face_loops(face) {
                let Some(&p0) = ring.first() else {
                    continue;
                };
                for i in 1..ring.len().saturating_sub(1) {
                    volume += p0.dot(ring[i].cross(ring[i + 1]));
                }
            }
        }
        volume / 6.0
    }
}

/// Axis-aligned box between two corners
pub fn make_box(min: DVec3, max: DVec3, tolerance: f64) -> KernelResult<PolyShape> {
    let (lo, hi) = (min.min(max), min.max(max));
    let size = hi - lo;
    if size.min_element() <= tolerance {
        return Err(KernelError::OperationFailed(format!(
            "box extent {size} is degenerate"
        )));
    }
    let p = |x: f64, y: f64, z: f64| DVec3::new(x, y, z);
    let (x0, y0, z0) = (lo.x, lo.y, lo.z);
    let (x1, y1, z1) = (hi.x, hi.y, hi.z);
    let faces = vec![
        // -X, +X, -Y, +Y, -Z, +Z
        FaceLoops::new(vec![p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1), p(x0, y1, z0)]),
        FaceLoops::new(vec![p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1), p(x1, y0, z1)]),
        FaceLoops::new(vec![p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1)]),
        FaceLoops::new(vec![p(x0, y1, z0), p(x0, y1, z1), p(x1, y1, z1), p(x1, y1, z0)]),
        FaceLoops::new(vec![p(x0, y0, z0), p(x0, y1, z0), p(x1, y1, z0), p(x1, y0, z0)]),
        FaceLoops::new(vec![p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1)]),
    ];
    PolyShape::from_faces(faces, tolerance)
}
