//! Codec adapter between solid text and kernel shapes

use brep_kernel::{GeometricKernel, KernelError};
use thiserror::Error;

/// Errors of the text round trip
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("Solid text is empty")]
    Empty,
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Text codec backed by a geometric kernel
#[derive(Debug)]
pub struct ShapeCodec<'k, K> {
    kernel: &'k K,
}

impl<'k, K: GeometricKernel> ShapeCodec<'k, K> {
    pub fn new(kernel: &'k K) -> Self {
        Self { kernel }
    }

    /// Decode solid text into a shape owned by the caller
    pub fn decode(&self, text: &str) -> Result<K::Shape, CodecError> {
        if text.trim().is_empty() {
            return Err(CodecError::Empty);
        }
        self.kernel
            .decode(text)
            .map_err(|e| match e {
                KernelError::Decode(detail) => CodecError::Decode(detail),
                other => CodecError::Decode(other.to_string()),
            })
    }

    /// Encode a shape back to solid text
    pub fn encode(&self, shape: &K::Shape) -> Result<String, CodecError> {
        self.kernel
            .encode(shape)
            .map_err(|e| match e {
                KernelError::Encode(detail) => CodecError::Encode(detail),
                other => CodecError::Encode(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brep_kernel::PolyKernel;
    use glam::DVec3;

    #[test]
    fn test_round_trip_keeps_counts() {
        let kernel = PolyKernel::new();
        let codec = ShapeCodec::new(&kernel);
        let cube = kernel.make_box(DVec3::ZERO, DVec3::ONE).unwrap();

        let text = codec.encode(&cube).unwrap();
        let decoded = codec.decode(&text).unwrap();
        assert_eq!(
            kernel.topology_counts(&decoded),
            kernel.topology_counts(&cube)
        );
    }

    #[test]
    fn test_decode_failures() {
        let kernel = PolyKernel::new();
        let codec = ShapeCodec::new(&kernel);
        assert_eq!(codec.decode("  ").unwrap_err(), CodecError::Empty);
        assert!(matches!(codec.decode("{}"), Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_decode_message_has_single_prefix() {
        let kernel = PolyKernel::new();
        let codec = ShapeCodec::new(&kernel);
        let message = codec.decode("{}").unwrap_err().to_string();
        assert!(message.starts_with("Decode failed: "));
        assert_eq!(message.matches("Decode failed").count(), 1);
    }
}
