//! Geometry-staging collaborator.
//!
//! Surface-mesh transforms (rotation to angle of attack, scaling,
//! translation) live outside this pipeline. The coordinator only needs
//! "load, transform, save to the case's geometry path" as one opaque unit,
//! which this trait captures.

use std::path::Path;

use af_core::AfError;

use crate::error::AppResult;

pub trait GeometryStager {
    /// Place the transformed surface mesh at `destination` inside a case.
    fn stage(&self, source: &Path, aoa_deg: f64, destination: &Path) -> AppResult<()>;
}

/// Pass-through stager for geometry that is already in case orientation.
///
/// The angle still travels with the case for post-processing; only the
/// rotation itself is delegated to an external transform tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyStager;

impl GeometryStager for CopyStager {
    fn stage(&self, source: &Path, aoa_deg: f64, destination: &Path) -> AppResult<()> {
        if !source.is_file() {
            return Err(AfError::GeometryMissing {
                path: source.to_path_buf(),
            }
            .into());
        }
        std::fs::copy(source, destination)?;
        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            aoa_deg,
            "geometry staged without transform"
        );
        Ok(())
    }
}
