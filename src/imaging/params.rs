//! Parameter types for image optimization.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the asset materializer (which decides when an image must
//! be re-encoded) and the [`backend`](super::backend) (which does the pixel
//! work). This separation allows swapping backends (e.g. for testing with a
//! mock) without changing materialization logic.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Everything one optimization needs: read `source`, normalize it and
/// write the result to `output`. The output format follows `output`'s
/// extension.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub quality: Quality,
}
