use std::path::{Path, PathBuf};

use super::{require_field, Algorithm};
use crate::engine::Parameters;

/// Crop a raster to the cutline of a mask layer
#[derive(Debug, Clone)]
pub struct ClipRasterByMask {
    pub input: PathBuf,
    pub mask: PathBuf,
    pub output: PathBuf,
}

impl Algorithm for ClipRasterByMask {
    const ID: &'static str = "gdal:cliprasterbymasklayer";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .path("INPUT", &self.input)
            .path("MASK", &self.mask)
            .flag("CROP_TO_CUTLINE", true)
    }
}

/// Aspect (compass direction of the slope) of an elevation raster
#[derive(Debug, Clone)]
pub struct Aspect {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Algorithm for Aspect {
    const ID: &'static str = "gdal:aspect";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new().path("INPUT", &self.input).int("BAND", 1)
    }
}

/// Raster calculator over `layers`, referenced as `"<layer name>@<band>"`
#[derive(Debug, Clone)]
pub struct RasterCalculator {
    pub expression: String,
    pub layers: Vec<PathBuf>,
    pub output: PathBuf,
}

impl Algorithm for RasterCalculator {
    const ID: &'static str = "qgis:rastercalculator";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .text("EXPRESSION", &self.expression)
            .paths("LAYERS", &self.layers)
    }

    fn validate(&self) -> Result<(), String> {
        require_field("EXPRESSION", &self.expression)?;
        if self.layers.is_empty() {
            return Err("LAYERS must list at least one raster".to_string());
        }
        Ok(())
    }
}

/// Raster to polygons grouped by cell value, written to `field`
#[derive(Debug, Clone)]
pub struct Polygonize {
    pub input: PathBuf,
    pub field: String,
    pub output: PathBuf,
}

impl Polygonize {
    /// Polygonize into the engine's default `DN` field
    pub fn dn(input: PathBuf, output: PathBuf) -> Self {
        Polygonize {
            input,
            field: "DN".to_string(),
            output,
        }
    }
}

impl Algorithm for Polygonize {
    const ID: &'static str = "gdal:polygonize";

    fn output(&self) -> &Path {
        &self.output
    }

    fn parameters(&self) -> Parameters {
        Parameters::new()
            .path("INPUT", &self.input)
            .int("BAND", 1)
            .text("FIELD", &self.field)
            .flag("EIGHT_CONNECTEDNESS", false)
            .text("EXTRA", "")
    }

    fn validate(&self) -> Result<(), String> {
        require_field("FIELD", &self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygonize_defaults() {
        let alg = Polygonize {
            input: PathBuf::from("MAP_JANUARY_CLIPPED.tif"),
            field: "Wind_speed".to_string(),
            output: PathBuf::from("wind.shp"),
        };
        let params = alg.invocation().unwrap().parameters;
        assert_eq!(params.get("BAND").unwrap(), 1);
        assert_eq!(params.get("EIGHT_CONNECTEDNESS").unwrap(), false);
        assert_eq!(params.get_str("FIELD"), Some("Wind_speed"));
    }

    #[test]
    fn test_raster_calculator_needs_layers() {
        let alg = RasterCalculator {
            expression: "1".to_string(),
            layers: vec![],
            output: PathBuf::from("out.tif"),
        };
        assert!(alg.invocation().is_err());
    }
}
