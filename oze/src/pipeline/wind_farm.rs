use std::path::PathBuf;

use tracing::info;

use super::{for_each_province, RunOptions};
use crate::catalog::{BdotClass, Province};
use crate::config::PipelineConfig;
use crate::engine::Geoprocessor;
use crate::error::PipelineError;
use crate::expression::FilterExpr;
use crate::geo_core::GeoCore;
use crate::stages::vector::{
    add_id, attach_distance, buffer, calculate_area, difference, filter_by_expression,
    group_layer, merge_vector_layers, repair_geometry, split_into_single_parts,
};
use crate::stages::StageRunner;

/// Step 2: wind-farm candidate areas
///
/// Land cover minus a buffer around buildings, kept above the minimum
/// area and close to the medium-voltage lines selected by Step 1.
#[derive(Debug, Clone)]
pub struct WindFarm {
    pub geo_core: GeoCore,
    /// Step 1 output root, holding `medium_power_line_<p>.shp`
    pub photovoltaic_root: PathBuf,
    pub building_buffer: f64,
    pub min_area: f64,
    pub line_distance: f64,
}

impl WindFarm {
    pub fn from_config(config: &PipelineConfig) -> Self {
        let criteria = &config.criteria;
        WindFarm {
            geo_core: GeoCore::new(
                criteria.crs.clone(),
                config.data_root.clone(),
                config.outputs.wind_farm.clone(),
            ),
            photovoltaic_root: config.outputs.photovoltaic.clone(),
            building_buffer: criteria.building_buffer,
            min_area: criteria.wind_min_area,
            line_distance: criteria.wind_line_distance,
        }
    }

    /// Final layer of the step: `windfarm_area_<p>.shp`
    pub fn candidate_areas(&self, province: &Province) -> PathBuf {
        self.output_file("windfarm_area", province)
    }

    fn output_file(&self, stem: &str, province: &Province) -> PathBuf {
        self.geo_core.output(format!("{}_{}.shp", stem, province.name))
    }

    pub fn run(&self, engine: &mut dyn Geoprocessor, options: &RunOptions) -> Result<(), PipelineError> {
        options.prepare(&self.geo_core.output_path)?;
        for_each_province("wind farm areas", options, |province| {
            let mut runner = StageRunner::new(&mut *engine, province);
            self.run_province(&mut runner).map(|_| ())
        })
    }

    /// Stages of one province; returns `windfarm_area_<p>.shp`
    pub fn run_province(&self, runner: &mut StageRunner<'_>) -> Result<PathBuf, PipelineError> {
        let province = runner.province();
        let p = &province;
        let data_root = &self.geo_core.data_root;

        let exclusion = buffer(
            runner,
            &province.bdot_layer(data_root, BdotClass::Buildings),
            self.building_buffer,
            self.output_file("WIND_FARM_BUFFER", p),
        )?;

        let merged = merge_vector_layers(
            runner,
            province.land_cover_layers(data_root),
            self.geo_core.get_crs(),
            self.output_file("Merge_layers_area", p),
        )?;
        let parts = split_into_single_parts(runner, &merged, self.output_file("merge_area_split", p))?;
        let with_area = calculate_area(runner, &parts, self.output_file("calculate_area_split", p))?;
        let large = filter_by_expression(
            runner,
            &with_area,
            FilterExpr::area_above(self.min_area),
            self.output_file(&format!("calculate_area_split_above_{:.0}", self.min_area), p),
        )?;
        let grouped = group_layer(runner, &large, self.output_file("grouping_layer_in_diff", p))?;
        let repaired = repair_geometry(runner, &grouped, self.output_file("repair_layer_in_diff", p))?;

        // Remove the building exclusion zone, then re-check area on what is left
        let remaining = difference(runner, &repaired, &exclusion, self.output_file("wind_farm_area", p))?;
        let parts = split_into_single_parts(runner, &remaining, self.output_file("split_layer_in_diff", p))?;
        let with_area = calculate_area(runner, &parts, self.output_file("calculate_area_in_diff", p))?;
        let large = filter_by_expression(
            runner,
            &with_area,
            FilterExpr::area_above(self.min_area),
            self.output_file("filter_area_in_diff", p),
        )?;
        let areas = add_id(runner, &large, self.output_file("wind_farm_area_id", p))?;

        let lines = self
            .photovoltaic_root
            .join(format!("medium_power_line_{}.shp", province.name));
        let with_line = attach_distance(
            runner,
            &areas,
            &lines,
            self.output_file("distance_wind_farm_to_line", p),
            self.output_file("wind_farm_area_id_distance", p),
        )?;
        let output = filter_by_expression(
            runner,
            &with_line,
            FilterExpr::distance_below(self.line_distance),
            self.candidate_areas(p),
        )?;

        info!("wind farm areas for {}: {}", province.name, output.display());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PROVINCES;
    use crate::engine::RecordingEngine;

    fn wind_farm() -> WindFarm {
        let mut config = PipelineConfig::default();
        config.data_root = PathBuf::from("/data");
        config.outputs.photovoltaic = PathBuf::from("/s1");
        config.outputs.wind_farm = PathBuf::from("/s2");
        WindFarm::from_config(&config)
    }

    #[test]
    fn test_fractional_threshold_keeps_integer_name() {
        let mut wind_farm = wind_farm();
        wind_farm.min_area = 12500.4;
        let mut engine = RecordingEngine::new();
        let mut runner = StageRunner::new(&mut engine, PROVINCES[4]);
        wind_farm.run_province(&mut runner).unwrap();
        assert_eq!(
            engine.invocations()[4].output,
            PathBuf::from("/s2/calculate_area_split_above_12500_lodzkie.shp")
        );
    }

    #[test]
    fn test_province_stages() {
        let wind_farm = wind_farm();
        let mut engine = RecordingEngine::new();
        let mut runner = StageRunner::new(&mut engine, PROVINCES[15]);
        let out = wind_farm.run_province(&mut runner).unwrap();
        assert_eq!(out, PathBuf::from("/s2/windfarm_area_zachodniopomorskie.shp"));

        let calls = engine.invocations();
        assert_eq!(calls.len(), 15);
        assert_eq!(calls[0].algorithm, "native:buffer");
        assert_eq!(calls[0].parameters.get("DISTANCE"), Some(&serde_json::json!(800.0)));
        assert_eq!(
            calls[4].output,
            PathBuf::from("/s2/calculate_area_split_above_10000_zachodniopomorskie.shp")
        );
        assert_eq!(calls[7].algorithm, "native:difference");
        assert_eq!(
            calls[7].parameters.get_str("OVERLAY"),
            Some("/s2/WIND_FARM_BUFFER_zachodniopomorskie.shp")
        );
        assert_eq!(
            calls[12].parameters.get_str("DESTINATION"),
            Some("/s1/medium_power_line_zachodniopomorskie.shp")
        );
        assert_eq!(
            calls[14].parameters.get_str("EXPRESSION"),
            Some("\"distance\" < 800")
        );
    }
}
