//! BREP Manipulation Core
//!
//! This crate provides:
//! - Codec adapter between solid text and kernel shapes
//! - Topology indexer addressing faces and edges by ordinal
//! - Operation catalog, parameter defaults and dispatch
//! - Operation handlers with their failure policies
//! - The manipulation service orchestrating a request end to end

pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;
pub mod indexer;
pub mod params;
pub mod service;
pub mod types;

pub use catalog::{OperationKind, OperationSpec, dispatch};
pub use codec::{CodecError, ShapeCodec};
pub use config::{ConfigError, ServiceConfig};
pub use error::{ElementKind, InputError, ManipulationError, ManipulationFailure, Stage};
pub use handlers::{HandlerError, Outcome};
pub use indexer::{ElementRef, IndexError, resolve_edge, resolve_face};
pub use params::{ParamValue, Parameters};
pub use service::ManipulationService;
pub use types::*;
