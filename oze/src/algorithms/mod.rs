//! Typed parameter sets, one per engine algorithm used by the pipeline.
//!
//! Each struct validates its fields before it is turned into an
//! [`Invocation`]; invalid parameters never reach the engine.

pub mod raster;
pub mod table;
pub mod vector;

use std::path::Path;

use crate::engine::{EngineError, Invocation, Parameters};

pub use raster::{Aspect, ClipRasterByMask, Polygonize, RasterCalculator};
pub use table::{FieldCalculator, FieldType, JoinAttributesTable, RenameField, ShortestLine};
pub use vector::{
    Buffer, Collect, Difference, ExtractByExpression, FixGeometries, Intersection,
    MergeVectorLayers, MultipartToSingleparts,
};

/// Engine algorithm with a typed parameter set
pub trait Algorithm {
    /// Engine identifier, e.g. `native:buffer`
    const ID: &'static str;

    /// File the algorithm writes
    fn output(&self) -> &Path;

    /// Parameters other than `OUTPUT`
    fn parameters(&self) -> Parameters;

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Validate and build the engine call
    fn invocation(&self) -> Result<Invocation, EngineError> {
        check_output(self.output())
            .and_then(|_| self.validate())
            .map_err(|reason| EngineError::InvalidParameters {
                algorithm: Self::ID,
                reason,
            })?;
        let parameters = self.parameters().path("OUTPUT", self.output());
        Ok(Invocation::new(
            Self::ID,
            parameters,
            self.output().to_path_buf(),
        ))
    }
}

fn check_output(path: &Path) -> Result<(), String> {
    if path.file_stem().is_none() || path.extension().is_none() {
        return Err(format!("output {:?} needs a file name and extension", path));
    }
    Ok(())
}

pub(crate) fn require_field(label: &str, name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{} must not be empty", label));
    }
    Ok(())
}

pub(crate) fn require_positive(label: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("{} must be a positive number, got {}", label, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_output_without_extension_is_rejected() {
        let alg = FixGeometries {
            input: PathBuf::from("in.shp"),
            output: PathBuf::from("/tmp/out"),
        };
        let err = alg.invocation().unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidParameters {
                algorithm: "native:fixgeometries",
                ..
            }
        ));
    }

    #[test]
    fn test_output_is_added_to_parameters() {
        let alg = FixGeometries {
            input: PathBuf::from("in.shp"),
            output: PathBuf::from("/tmp/out.shp"),
        };
        let invocation = alg.invocation().unwrap();
        assert_eq!(invocation.parameters.get_str("OUTPUT"), Some("/tmp/out.shp"));
        assert_eq!(invocation.output, PathBuf::from("/tmp/out.shp"));
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("DISTANCE", 1.0).is_ok());
        assert!(require_positive("DISTANCE", 0.0).is_err());
        assert!(require_positive("DISTANCE", f64::NAN).is_err());
    }
}
