//! High-level image operations.
//!
//! [`optimize_image`] is the boundary the asset materializer calls. Backend
//! errors stop here: they are logged and reported as `false`, so the caller
//! can fall back to a verbatim copy.

use super::backend::ImageOptimizer;
use super::params::{OptimizeParams, Quality};
use std::path::Path;
use tracing::{debug, warn};

/// Re-encode `source` into `destination`. Returns `true` on success.
pub fn optimize_image(
    backend: &dyn ImageOptimizer,
    source: &Path,
    destination: &Path,
    quality: Quality,
) -> bool {
    let params = OptimizeParams {
        source: source.to_path_buf(),
        output: destination.to_path_buf(),
        quality,
    };
    match backend.optimize(&params) {
        Ok(()) => {
            debug!(
                source = %source.display(),
                destination = %destination.display(),
                quality = quality.value(),
                "optimized image"
            );
            true
        }
        Err(e) => {
            warn!(source = %source.display(), error = %e, "image optimization failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockOptimizer;
    use tempfile::TempDir;

    #[test]
    fn success_is_true_and_passes_quality() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.jpg");
        std::fs::write(&source, b"x").unwrap();
        let backend = MockOptimizer::new();

        assert!(optimize_image(
            &backend,
            &source,
            &tmp.path().join("b.jpg"),
            Quality::new(70)
        ));
        assert_eq!(backend.get_operations()[0].quality, 70);
    }

    #[test]
    fn failure_is_false_not_an_error() {
        let backend = MockOptimizer::failing();
        assert!(!optimize_image(
            &backend,
            Path::new("/a.jpg"),
            Path::new("/b.jpg"),
            Quality::default()
        ));
    }

    #[test]
    fn real_backend_failure_is_false() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("bad.jpg");
        std::fs::write(&source, b"not a jpeg").unwrap();
        let backend = crate::imaging::RustOptimizer::new();
        assert!(!optimize_image(
            &backend,
            &source,
            &tmp.path().join("out.jpg"),
            Quality::default()
        ));
    }
}
