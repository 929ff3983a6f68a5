use std::path::{Path, PathBuf};

use super::StageRunner;
use crate::algorithms::{
    Buffer, Collect, Difference, ExtractByExpression, FieldCalculator, FixGeometries,
    Intersection, JoinAttributesTable, MergeVectorLayers, MultipartToSingleparts, RenameField,
    ShortestLine,
};
use crate::error::PipelineError;
use crate::expression::FilterExpr;

/// Merge layers into one, reprojected to `crs`. Overlaps are kept.
pub fn merge_vector_layers(
    runner: &mut StageRunner<'_>,
    layers: Vec<PathBuf>,
    crs: &str,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "merge vector layers",
        &MergeVectorLayers {
            layers,
            crs: crs.to_string(),
            output,
        },
    )
}

pub fn repair_geometry(
    runner: &mut StageRunner<'_>,
    input: &Path,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "repair geometry",
        &FixGeometries {
            input: input.to_path_buf(),
            output,
        },
    )
}

pub fn split_into_single_parts(
    runner: &mut StageRunner<'_>,
    input: &Path,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "split into single parts",
        &MultipartToSingleparts {
            input: input.to_path_buf(),
            output,
        },
    )
}

pub fn group_layer(
    runner: &mut StageRunner<'_>,
    input: &Path,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "group layer",
        &Collect {
            input: input.to_path_buf(),
            output,
        },
    )
}

pub fn buffer(
    runner: &mut StageRunner<'_>,
    input: &Path,
    distance: f64,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "buffer",
        &Buffer {
            input: input.to_path_buf(),
            distance,
            output,
        },
    )
}

/// Keep features satisfying `expression`
pub fn filter_by_expression(
    runner: &mut StageRunner<'_>,
    input: &Path,
    expression: FilterExpr,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "filter by expression",
        &ExtractByExpression {
            input: input.to_path_buf(),
            expression,
            output,
        },
    )
}

/// Intersection keeping the attributes of both layers
pub fn intersect(
    runner: &mut StageRunner<'_>,
    input: &Path,
    overlay: &Path,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "intersection",
        &Intersection::new(input.to_path_buf(), overlay.to_path_buf(), output),
    )
}

pub fn difference(
    runner: &mut StageRunner<'_>,
    input: &Path,
    overlay: &Path,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "difference",
        &Difference {
            input: input.to_path_buf(),
            overlay: overlay.to_path_buf(),
            output,
        },
    )
}

/// Area of every feature into `AREA`
pub fn calculate_area(
    runner: &mut StageRunner<'_>,
    input: &Path,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "calculate area",
        &FieldCalculator::area(input.to_path_buf(), output),
    )
}

/// Sequential unique integer `ID`
pub fn add_id(
    runner: &mut StageRunner<'_>,
    input: &Path,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "add id",
        &FieldCalculator::feature_id(input.to_path_buf(), output),
    )
}

pub fn rename_column(
    runner: &mut StageRunner<'_>,
    input: &Path,
    field: &str,
    new_name: &str,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "rename column",
        &RenameField {
            input: input.to_path_buf(),
            field: field.to_string(),
            new_name: new_name.to_string(),
            output,
        },
    )
}

/// Shortest line from each source feature to the nearest destination feature
pub fn calculate_distance(
    runner: &mut StageRunner<'_>,
    source: &Path,
    destination: &Path,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "calculate distance",
        &ShortestLine {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            output,
        },
    )
}

/// Copy `column` from `join` onto `base` by `ID`; unmatched features are dropped
pub fn join_column_by_id(
    runner: &mut StageRunner<'_>,
    base: &Path,
    join: &Path,
    column: &str,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    runner.run(
        "join attributes by id",
        &JoinAttributesTable::by_id(base.to_path_buf(), join.to_path_buf(), column, output),
    )
}

/// Distance from every feature of `base` to the nearest feature of
/// `destination`, joined back onto `base` as the `distance` column
pub fn attach_distance(
    runner: &mut StageRunner<'_>,
    base: &Path,
    destination: &Path,
    distance_output: PathBuf,
    output: PathBuf,
) -> Result<PathBuf, PipelineError> {
    let distances = calculate_distance(runner, base, destination, distance_output)?;
    join_column_by_id(runner, base, &distances, "distance", output)
}
