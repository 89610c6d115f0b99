//! Topology indexer
//!
//! Faces and edges are addressed by their position in the kernel's
//! traversal order: depth-first over solids, shells, faces, wires and
//! edges, each element counted at its first visit. Ordinals are only
//! meaningful for the shape they were computed on.

use brep_kernel::GeometricKernel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ElementKind;

/// A face or edge addressed by ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    #[error("{kind} id {id} out of range: valid ids are 0..{count}")]
    OutOfRange {
        kind: ElementKind,
        id: i64,
        count: usize,
    },
}

fn pick<T>(mut elements: Vec<T>, kind: ElementKind, id: i64) -> Result<T, IndexError> {
    let count = elements.len();
    match usize::try_from(id) {
        Ok(index) if index < count => Ok(elements.swap_remove(index)),
        _ => Err(IndexError::OutOfRange { kind, id, count }),
    }
}

/// Resolve a face ordinal
pub fn resolve_face<K: GeometricKernel>(
    kernel: &K,
    shape: &K::Shape,
    id: i64,
) -> Result<K::Face, IndexError> {
    pick(kernel.faces(shape), ElementKind::Face, id)
}

/// Resolve an edge ordinal
pub fn resolve_edge<K: GeometricKernel>(
    kernel: &K,
    shape: &K::Shape,
    id: i64,
) -> Result<K::Edge, IndexError> {
    pick(kernel.edges(shape), ElementKind::Edge, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brep_kernel::PolyKernel;
    use glam::DVec3;

    #[test]
    fn test_every_face_distinct() {
        let kernel = PolyKernel::new();
        let cube = kernel.make_box(DVec3::ZERO, DVec3::ONE).unwrap();
        let faces: Vec<_> = (0..6)
            .map(|i| resolve_face(&kernel, &cube, i).unwrap())
            .collect();
        for (i, a) in faces.iter().enumerate() {
            for b in &faces[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_out_of_range_reports_count() {
        let kernel = PolyKernel::new();
        let cube = kernel.make_box(DVec3::ZERO, DVec3::ONE).unwrap();
        for id in [-1, 12, 1000] {
            let err = resolve_edge(&kernel, &cube, id).unwrap_err();
            assert_eq!(
                err,
                IndexError::OutOfRange {
                    kind: ElementKind::Edge,
                    id,
                    count: 12
                }
            );
        }
        assert!(resolve_face(&kernel, &cube, 6).is_err());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let kernel = PolyKernel::new();
        let cube = kernel.make_box(DVec3::ZERO, DVec3::ONE).unwrap();
        for id in 0..12 {
            assert_eq!(
                resolve_edge(&kernel, &cube, id).unwrap(),
                resolve_edge(&kernel, &cube, id).unwrap()
            );
        }
    }
}
