use std::path::{Path, PathBuf};

use super::StageRunner;
use crate::algorithms::{Aspect, Polygonize, RasterCalculator};
use crate::commons::basic_functions::layer_name;
use crate::error::PipelineError;
use crate::expression::AspectWindow;

/// Aspect raster of an elevation model
pub fn terrain_aspect(
    runner: &mut StageRunner<'_>,
    elevation: &Path,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "terrain aspect",
        &Aspect {
            input: elevation.to_path_buf(),
            output,
        },
    )
}

/// Binary exposure raster: 1 where the aspect lies strictly inside `window`
pub fn reclassify_exposure(
    runner: &mut StageRunner<'_>,
    aspect: &Path,
    window: AspectWindow,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "reclassify exposure",
        &RasterCalculator {
            expression: window.raster_expression(&layer_name(aspect)),
            layers: vec![aspect.to_path_buf()],
            output,
        },
    )
}

/// Raster to polygons, cell value written to `field`
pub fn polygonize(
    runner: &mut StageRunner<'_>,
    raster: &Path,
    field: &str,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "polygonize",
        &Polygonize {
            input: raster.to_path_buf(),
            field: field.to_string(),
            output,
        },
    )
}
