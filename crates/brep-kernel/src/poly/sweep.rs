//! Linear sweeps of planar regions

use glam::DVec3;

use super::topology::{FaceId, FaceLoops, PolyShape};
use crate::kernel::{KernelError, KernelResult};

/// Faces of the solid swept by a planar region moving along `vector`.
///
/// `region` must wind counter-clockwise around `normal`. Fails when the
/// vector is too short or lies in the region's plane.
pub fn sweep_region(
    region: &FaceLoops,
    normal: DVec3,
    vector: DVec3,
    tolerance: f64,
) -> KernelResult<Vec<FaceLoops>> {
    let length = vector.length();
    if !length.is_finite() || length <= tolerance {
        return Err(KernelError::OperationFailed(format!(
            "sweep vector {vector} is too short"
        )));
    }
    let along = normal.dot(vector) / length;
    if along.abs() <= 1e-9 {
        return Err(KernelError::OperationFailed(
            "sweep vector lies in the profile plane".into(),
        ));
    }

    let translate = |ring: &Vec<DVec3>| ring.iter().map(|p| *p + vector).collect::<Vec<_>>();
    let mut faces = Vec::with_capacity(2 + region.outer.len());

    // Caps: the start cap faces backwards, the end cap forwards
    faces.push(region.clone().reversed());
    faces.push(FaceLoops {
        outer: translate(&region.outer),
        inner: region.inner.iter().map(translate).collect(),
    });

    for ring in std::iter::once(&region.outer).chain(&region.inner) {
        let n = ring.len();
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            faces.push(FaceLoops::new(vec![a, b, b + vector, a + vector]));
        }
    }

    if along < 0.0 {
        faces = faces.into_iter().map(FaceLoops::reversed).collect();
    }
    Ok(faces)
}

/// Prism swept by one face of a shape
pub fn prism(
    shape: &PolyShape,
    face: FaceId,
    vector: DVec3,
    tolerance: f64,
) -> KernelResult<PolyShape> {
    let normal = shape.face(face).plane.normal;
    let mut loops = shape.face_loops(face).into_iter();
    let region = FaceLoops {
        outer: loops.next().unwrap_or_default(),
        inner: loops.collect(),
    };
    let faces = sweep_region(&region, normal, vector, tolerance)?;
    PolyShape::from_faces(faces, tolerance)
}
