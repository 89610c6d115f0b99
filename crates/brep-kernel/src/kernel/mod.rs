//! Geometric kernel abstraction

mod traits;

pub use traits::{
    BooleanType, EdgeProperties, FaceProperties, GeometricKernel, KernelError, KernelResult,
    TopologyCounts,
};
