//! Twelve-month raster attribution.
//!
//! Monthly rasters are clipped to a province mask and polygonized; each
//! month's value is then joined onto the candidate areas as a new column.
//! The join is a linear chain: January seeds the cumulative table from the
//! candidate areas, every later month joins onto the previous month's
//! table, and December writes the final file.

use std::path::{Path, PathBuf};

use super::terrain::polygonize;
use super::vector::{join_column_by_id, rename_column};
use super::StageRunner;
use crate::algorithms::{ClipRasterByMask, Intersection};
use crate::catalog::Month;
use crate::error::PipelineError;

/// Path of a month's source raster: `<folder>/map_<month>.tif`
pub fn monthly_raster(folder: &Path, month: Month) -> PathBuf {
    folder.join(format!("map_{}.tif", month.name()))
}

/// Path of a month's clipped raster: `<folder>/MAP_<MONTH>_CLIPPED.tif`
pub fn clipped_raster(folder: &Path, month: Month) -> PathBuf {
    folder.join(format!("MAP_{}_CLIPPED.tif", month.upper()))
}

/// Clip all twelve monthly rasters to `mask`, in month order.
/// The first failure aborts the remaining months.
pub fn clip_monthly_rasters(
    runner: &mut StageRunner<'_>,
    input_folder: &Path,
    mask: &Path,
    output_folder: &Path,
) -> Result<Vec<(Month, PathBuf)>, PipelineError> {
    Month::ALL
        .iter()
        .map(|&month| {
            let clipped = runner.for_month(month).run(
                "clip raster by mask",
                &ClipRasterByMask {
                    input: monthly_raster(input_folder, month),
                    mask: mask.to_path_buf(),
                    output: clipped_raster(output_folder, month),
                },
            )?;
            Ok((month, clipped))
        })
        .collect()
}

/// Polygonize clipped rasters into `<output_folder>/<prefix>_<month>.shp`
pub fn polygonize_monthly(
    runner: &mut StageRunner<'_>,
    rasters: &[(Month, PathBuf)],
    output_folder: &Path,
    prefix: &str,
    field: &str,
) -> Result<Vec<(Month, PathBuf)>, PipelineError> {
    rasters
        .iter()
        .map(|(month, raster)| {
            let output = output_folder.join(format!("{}_{}.shp", prefix, month.name()));
            let vector = polygonize(&mut runner.for_month(*month), raster, field, output)?;
            Ok((*month, vector))
        })
        .collect()
}

/// Cumulative monthly join onto a seed layer of candidate areas
///
/// For each month the candidate areas are intersected with the month's
/// polygons (keeping only `value_field`), the value field is renamed to the
/// month name, and the renamed column is joined by `ID` onto the running
/// table. Features without a match are dropped at every join.
#[derive(Debug, Clone)]
pub struct MonthlyJoin {
    /// Candidate areas carrying a unique `ID`
    pub seed: PathBuf,
    /// Value field of the polygonized monthly layers
    pub value_field: String,
    /// Folder for the intermediate files
    pub support_dir: PathBuf,
    /// File name stem shared by the intermediates, e.g. `wind_speed`
    pub stem: String,
    /// Stem of the renamed monthly layers, e.g. `wind_speed_vector`
    pub rename_stem: String,
    pub province: String,
    pub final_output: PathBuf,
}

impl MonthlyJoin {
    /// `<support>/<stem>_vector_<province>_<month>.shp`
    pub fn intersection_path(&self, month: Month) -> PathBuf {
        self.support_dir.join(format!(
            "{}_vector_{}_{}.shp",
            self.stem,
            self.province,
            month.name()
        ))
    }

    /// `<support>/<rename_stem>_<province>_<month>_rename.shp`
    pub fn renamed_path(&self, month: Month) -> PathBuf {
        self.support_dir.join(format!(
            "{}_{}_{}_rename.shp",
            self.rename_stem,
            self.province,
            month.name()
        ))
    }

    /// `<support>/<stem>_vector_<index>_<province>.shp`
    pub fn cumulative_path(&self, month: Month) -> PathBuf {
        self.support_dir.join(format!(
            "{}_vector_{}_{}.shp",
            self.stem,
            month.index(),
            self.province
        ))
    }

    /// Table the month's column is joined onto
    pub fn join_input(&self, month: Month) -> PathBuf {
        match month.previous() {
            None => self.seed.clone(),
            Some(previous) => self.cumulative_path(previous),
        }
    }

    /// Table the month's join writes
    pub fn join_output(&self, month: Month) -> PathBuf {
        if month.is_last() {
            self.final_output.clone()
        } else {
            self.cumulative_path(month)
        }
    }

    /// Run the chain over `monthly_vectors` (one polygon layer per month,
    /// in month order). Returns the final output path.
    pub fn run(
        &self,
        runner: &mut StageRunner<'_>,
        monthly_vectors: &[(Month, PathBuf)],
    ) -> Result<PathBuf, PipelineError> {
        let mut last = self.seed.clone();
        for (month, vector) in monthly_vectors {
            let month = *month;
            let mut runner = runner.for_month(month);

            let intersected = runner.run(
                "intersect monthly values",
                &Intersection::new(self.seed.clone(), vector.clone(), self.intersection_path(month))
                    .with_overlay_fields(&[self.value_field.as_str()]),
            )?;
            let renamed = rename_column(
                &mut runner,
                &intersected,
                &self.value_field,
                month.name(),
                self.renamed_path(month),
            )?;
            last = join_column_by_id(
                &mut runner,
                &self.join_input(month),
                &renamed,
                month.name(),
                self.join_output(month),
            )?;
        }
        Ok(last)
    }
}
