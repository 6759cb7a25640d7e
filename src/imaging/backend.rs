//! Image optimization backend trait and shared types.
//!
//! The [`ImageOptimizer`] trait is the seam between the asset materializer and
//! the codec. The production implementation is
//! [`RustOptimizer`](super::rust_backend::RustOptimizer); tests use the
//! recording [`MockOptimizer`](tests::MockOptimizer).

use super::params::OptimizeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image optimization backends.
pub trait ImageOptimizer {
    /// Re-encode `params.source` into `params.output`.
    fn optimize(&self, params: &OptimizeParams) -> Result<(), BackendError>;
}
