//! Text format of polyhedral solids
//!
//! A solid is written as a JSON document mirroring the topology store:
//!
//! ```json
//! {"format":"polybrep","version":1,
//!  "vertices":[[0,0,0],...],
//!  "edges":[[0,1],...],
//!  "wires":[[{"edge":0,"forward":true},...],...],
//!  "faces":[{"outer":0,"inner":[]},...],
//!  "shells":[[0,1,2,3,4,5]],
//!  "solids":[{"outer":0,"voids":[]}]}
//! ```
//!
//! Face planes are not stored; they are recomputed from the outer wire.

use serde::{Deserialize, Serialize};

use glam::DVec3;

use super::geometry::Plane;
use super::topology::{
    EdgeData, EdgeId, FaceData, OrientedEdge, PolyShape, ShellData, ShellId, SolidData,
    VertexId, WireData, WireId, FaceId,
};
use crate::kernel::{KernelError, KernelResult};

pub const FORMAT_NAME: &str = "polybrep";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ShapeDocument {
    format: String,
    version: u32,
    vertices: Vec<[f64; 3]>,
    edges: Vec<[u32; 2]>,
    wires: Vec<Vec<OrientedEdgeDocument>>,
    faces: Vec<FaceDocument>,
    shells: Vec<Vec<u32>>,
    solids: Vec<SolidDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OrientedEdgeDocument {
    edge: u32,
    forward: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct FaceDocument {
    outer: u32,
    #[serde(default)]
    inner: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SolidDocument {
    outer: u32,
    #[serde(default)]
    voids: Vec<u32>,
}

fn decode_error(msg: impl Into<String>) -> KernelError {
    KernelError::Decode(msg.into())
}

fn check_index(kind: &str, index: u32, len: usize) -> KernelResult<()> {
    if (index as usize) < len {
        Ok(())
    } else {
        Err(decode_error(format!(
            "{kind} index {index} out of range (count {len})"
        )))
    }
}

/// Serialize a shape
pub fn encode(shape: &PolyShape) -> KernelResult<String> {
    let doc = ShapeDocument {
        format: FORMAT_NAME.into(),
        version: FORMAT_VERSION,
        vertices: shape.vertices.iter().map(|v| v.to_array()).collect(),
        edges: shape.edges.iter().map(|e| [e.start.0, e.end.0]).collect(),
        wires: shape
            .wires
            .iter()
            .map(|w| {
                w.edges
                    .iter()
                    .map(|oe| OrientedEdgeDocument {
                        edge: oe.edge.0,
                        forward: oe.forward,
                    })
                    .collect()
            })
            .collect(),
        faces: shape
            .faces
            .iter()
            .map(|f| FaceDocument {
                outer: f.outer.0,
                inner: f.inner.iter().map(|w| w.0).collect(),
            })
            .collect(),
        shells: shape
            .shells
            .iter()
            .map(|s| s.faces.iter().map(|f| f.0).collect())
            .collect(),
        solids: shape
            .solids
            .iter()
            .map(|s| SolidDocument {
                outer: s.outer.0,
                voids: s.voids.iter().map(|v| v.0).collect(),
            })
            .collect(),
    };
    serde_json::to_string(&doc).map_err(|e| KernelError::Encode(e.to_string()))
}

/// Parse and validate a shape
pub fn decode(text: &str, tolerance: f64) -> KernelResult<PolyShape> {
    if text.trim().is_empty() {
        return Err(decode_error("empty input"));
    }
    let doc: ShapeDocument =
        serde_json::from_str(text).map_err(|e| decode_error(e.to_string()))?;
    if doc.format != FORMAT_NAME {
        return Err(decode_error(format!("unknown format '{}'", doc.format)));
    }
    if doc.version != FORMAT_VERSION {
        return Err(decode_error(format!("unsupported version {}", doc.version)));
    }

    let mut shape = PolyShape::default();

    for v in &doc.vertices {
        let p = DVec3::from_array(*v);
        if !p.is_finite() {
            return Err(decode_error("non-finite vertex coordinate"));
        }
        shape.vertices.push(p);
    }

    for [a, b] in &doc.edges {
        check_index("vertex", *a, shape.vertices.len())?;
        check_index("vertex", *b, shape.vertices.len())?;
        if a == b {
            return Err(decode_error(format!("edge from vertex {a} to itself")));
        }
        shape.edges.push(EdgeData {
            start: VertexId(*a),
            end: VertexId(*b),
        });
    }

    for (w, wire) in doc.wires.iter().enumerate() {
        if wire.len() < 3 {
            return Err(decode_error(format!("wire {w} has fewer than 3 edges")));
        }
        let mut data = WireData {
            edges: Vec::with_capacity(wire.len()),
        };
        for oe in wire {
            check_index("edge", oe.edge, shape.edges.len())?;
            data.edges.push(OrientedEdge {
                edge: EdgeId(oe.edge),
                forward: oe.forward,
            });
        }
        let n = data.edges.len();
        for k in 0..n {
            let end = shape.oriented_end(data.edges[k]);
            let next = shape.oriented_start(data.edges[(k + 1) % n]);
            if end != next {
                return Err(decode_error(format!("wire {w} is not a closed chain")));
            }
        }
        shape.wires.push(data);
    }

    for (f, face) in doc.faces.iter().enumerate() {
        check_index("wire", face.outer, shape.wires.len())?;
        for w in &face.inner {
            check_index("wire", *w, shape.wires.len())?;
        }
        let outer = shape.wire_points(WireId(face.outer));
        let plane = Plane::from_loop(&outer)
            .ok_or_else(|| decode_error(format!("face {f} has a degenerate outer wire")))?;
        let all_points = std::iter::once(face.outer)
            .chain(face.inner.iter().copied())
            .flat_map(|w| shape.wire_points(WireId(w)));
        for p in all_points {
            if plane.distance(p).abs() > tolerance {
                return Err(decode_error(format!("face {f} is not planar")));
            }
        }
        shape.faces.push(FaceData {
            outer: WireId(face.outer),
            inner: face.inner.iter().map(|w| WireId(*w)).collect(),
            plane,
        });
    }

    check_closed(&shape)?;

    for (s, shell) in doc.shells.iter().enumerate() {
        if shell.is_empty() {
            return Err(decode_error(format!("shell {s} has no faces")));
        }
        for f in shell {
            check_index("face", *f, shape.faces.len())?;
        }
        shape.shells.push(ShellData {
            faces: shell.iter().map(|f| FaceId(*f)).collect(),
        });
    }

    if doc.solids.is_empty() {
        return Err(decode_error("no solid in input"));
    }
    for solid in &doc.solids {
        check_index("shell", solid.outer, shape.shells.len())?;
        for v in &solid.voids {
            check_index("shell", *v, shape.shells.len())?;
        }
        shape.solids.push(SolidData {
            outer: ShellId(solid.outer),
            voids: solid.voids.iter().map(|v| ShellId(*v)).collect(),
        });
    }

    Ok(shape)
}

/// Every edge must be walked as often forward as backward by the face
/// loops, otherwise the faces leave a boundary open.
fn check_closed(shape: &PolyShape) -> KernelResult<()> {
    let mut balance = vec![0i64; shape.edges.len()];
    for face in &shape.faces {
        for wire in std::iter::once(face.outer).chain(face.inner.iter().copied()) {
            for oe in &shape.wire(wire).edges {
                balance[oe.edge.index()] += if oe.forward { 1 } else { -1 };
            }
        }
    }
    match balance.iter().position(|&b| b != 0) {
        Some(e) => Err(decode_error(format!(
            "surface is not closed at edge {e}"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::topology::make_box;

    const TOL: f64 = 1e-5;

    #[test]
    fn test_round_trip_preserves_store() {
        let cube = make_box(DVec3::ZERO, DVec3::new(1.0, 2.0, 3.0), TOL).unwrap();
        let text = encode(&cube).unwrap();
        let decoded = decode(&text, TOL).unwrap();
        assert_eq!(decoded, cube);
        assert_eq!(encode(&decoded).unwrap(), text);
    }

    #[test]
    fn test_rejects_empty_and_garbage() {
        assert!(matches!(decode("", TOL), Err(KernelError::Decode(_))));
        assert!(matches!(decode("   \n", TOL), Err(KernelError::Decode(_))));
        assert!(matches!(decode("not a solid", TOL), Err(KernelError::Decode(_))));
    }

    #[test]
    fn test_rejects_wrong_format() {
        let text = r#"{"format":"step","version":1,"vertices":[],"edges":[],"wires":[],"faces":[],"shells":[],"solids":[]}"#;
        let err = decode(text, TOL).unwrap_err();
        assert!(err.to_string().contains("unknown format"));
    }

    #[test]
    fn test_rejects_missing_solid() {
        let text = r#"{"format":"polybrep","version":1,"vertices":[],"edges":[],"wires":[],"faces":[],"shells":[],"solids":[]}"#;
        let err = decode(text, TOL).unwrap_err();
        assert!(err.to_string().contains("no solid"));
    }

    #[test]
    fn test_rejects_open_wire() {
        let text = r#"{"format":"polybrep","version":1,
            "vertices":[[0,0,0],[1,0,0],[1,1,0],[0,1,0]],
            "edges":[[0,1],[1,2],[2,3]],
            "wires":[[{"edge":0,"forward":true},{"edge":1,"forward":true},{"edge":2,"forward":true}]],
            "faces":[{"outer":0}],"shells":[[0]],"solids":[{"outer":0}]}"#;
        let err = decode(text, TOL).unwrap_err();
        assert!(err.to_string().contains("not a closed chain"));
    }

    #[test]
    fn test_rejects_open_surface() {
        let triangle = r#"{"format":"polybrep","version":1,
            "vertices":[[0,0,0],[1,0,0],[0,1,0]],
            "edges":[[0,1],[1,2],[2,0]],
            "wires":[[{"edge":0,"forward":true},{"edge":1,"forward":true},{"edge":2,"forward":true}]],
            "faces":[{"outer":0}],"shells":[[0]],"solids":[{"outer":0}]}"#;
        let err = decode(triangle, TOL).unwrap_err();
        assert!(err.to_string().contains("not closed"));

        // Outer wire reused as its own hole
        let self_holed = r#"{"format":"polybrep","version":1,
            "vertices":[[0,0,0],[1,0,0],[0,1,0]],
            "edges":[[0,1],[1,2],[2,0]],
            "wires":[[{"edge":0,"forward":true},{"edge":1,"forward":true},{"edge":2,"forward":true}]],
            "faces":[{"outer":0,"inner":[0]}],"shells":[[0]],"solids":[{"outer":0}]}"#;
        let err = decode(self_holed, TOL).unwrap_err();
        assert!(err.to_string().contains("not closed"));
    }

    #[test]
    fn test_rejects_dangling_index() {
        let text = r#"{"format":"polybrep","version":1,
            "vertices":[[0,0,0]],"edges":[[0,5]],"wires":[],"faces":[],"shells":[],"solids":[]}"#;
        let err = decode(text, TOL).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
