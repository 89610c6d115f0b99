//! Geometric Kernel Abstraction
//!
//! This crate provides:
//! - The geometric kernel trait the manipulation service is written against
//! - A polyhedral BREP kernel: JSON solid codec, topology traversal,
//!   BSP booleans, prism, fillet, chamfer, thick solid and measurement

pub mod kernel;
pub mod poly;

// Re-exports for convenience
pub use kernel::{
    BooleanType, EdgeProperties, FaceProperties, GeometricKernel, KernelError, KernelResult,
    TopologyCounts,
};
pub use poly::{EdgeId, FaceId, KernelConfig, PolyKernel, PolyShape};
