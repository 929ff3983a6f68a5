use std::path::{Path, PathBuf};

use tracing::info;

use super::{for_each_province, RunOptions};
use crate::catalog::{BdotClass, Province};
use crate::config::{Criteria, PipelineConfig};
use crate::engine::Geoprocessor;
use crate::error::PipelineError;
use crate::expression::{AspectWindow, CmpOp, FilterExpr};
use crate::geo_core::GeoCore;
use crate::stages::terrain::{polygonize, reclassify_exposure, terrain_aspect};
use crate::stages::vector::{
    add_id, attach_distance, calculate_area, filter_by_expression, intersect,
    merge_vector_layers, rename_column, repair_geometry, split_into_single_parts,
};
use crate::stages::StageRunner;

/// Step 1: photovoltaic candidate areas
///
/// Land cover (undeveloped land, arable land, grassland) is intersected
/// with south-west to south-east facing terrain, split into parts, kept
/// above the minimum area and within reach of a medium-voltage line. The
/// result carries `ID`, `AREA`, `LINE_DISTANCE` and `ROAD_DISTANCE`.
#[derive(Debug, Clone)]
pub struct PhotovoltaicFarm {
    pub geo_core: GeoCore,
    pub window: AspectWindow,
    pub min_area: f64,
    pub line_distance: f64,
    /// `RODZAJ` of medium-voltage lines
    pub medium_voltage_kind: String,
}

impl PhotovoltaicFarm {
    pub fn from_config(config: &PipelineConfig) -> Self {
        let Criteria {
            crs,
            photovoltaic_min_area,
            photovoltaic_line_distance,
            medium_voltage_kind,
            ..
        } = &config.criteria;
        PhotovoltaicFarm {
            geo_core: GeoCore::new(
                crs.clone(),
                config.data_root.clone(),
                config.outputs.photovoltaic.clone(),
            ),
            window: config.aspect_window(),
            min_area: *photovoltaic_min_area,
            line_distance: *photovoltaic_line_distance,
            medium_voltage_kind: medium_voltage_kind.clone(),
        }
    }

    /// Final layer of the step: `photovoltaic_area_<p>.shp`
    pub fn candidate_areas(&self, province: &Province) -> PathBuf {
        self.output_file("photovoltaic_area", province)
    }

    /// Medium-voltage lines selected for the province, reused by Step 2
    pub fn medium_power_lines(&self, province: &Province) -> PathBuf {
        self.output_file("medium_power_line", province)
    }

    fn output_file(&self, stem: &str, province: &Province) -> PathBuf {
        self.geo_core.output(format!("{}_{}.shp", stem, province.name))
    }

    /// Run the step for every selected province
    pub fn run(&self, engine: &mut dyn Geoprocessor, options: &RunOptions) -> Result<(), PipelineError> {
        let aspect_dir = options.prepare(&self.geo_core.output_dir("TERRAIN_ASPECT"))?;
        let exposure_dir = options.prepare(&self.geo_core.output_dir("EXPOSURE_WS_S_ES"))?;
        let vector_dir = options.prepare(&self.geo_core.output_dir("VECTOR_EXPOSURE"))?;
        options.prepare(&self.geo_core.output_path)?;

        for_each_province("photovoltaic areas", options, |province| {
            let mut runner = StageRunner::new(&mut *engine, province);
            self.run_province(&mut runner, &aspect_dir, &exposure_dir, &vector_dir)
                .map(|_| ())
        })
    }

    /// Stages of one province; returns `photovoltaic_area_<p>.shp`
    pub fn run_province(
        &self,
        runner: &mut StageRunner<'_>,
        aspect_dir: &Path,
        exposure_dir: &Path,
        vector_dir: &Path,
    ) -> Result<PathBuf, PipelineError> {
        let province = runner.province();
        let p = &province;
        let data_root = &self.geo_core.data_root;

        // Land cover base layer
        let merged = merge_vector_layers(
            runner,
            province.land_cover_layers(data_root),
            self.geo_core.get_crs(),
            self.output_file("Merge_layers_area", p),
        )?;
        let repaired = repair_geometry(runner, &merged, self.output_file("repair_layer", p))?;
        let land_cover =
            split_into_single_parts(runner, &repaired, self.output_file("repair_layer_split", p))?;

        // Terrain exposure
        let elevation = self
            .geo_core
            .data(Path::new("NMT").join(format!("{}_geotif.tif", province.name)));
        let aspect = terrain_aspect(
            runner,
            &elevation,
            aspect_dir.join(format!("{}_aspect.tif", province.name)),
        )?;
        let exposure = reclassify_exposure(
            runner,
            &aspect,
            self.window,
            exposure_dir.join(format!("RASTER_WS_S_ES_{}.tif", province.name)),
        )?;
        let exposure_vector = polygonize(
            runner,
            &exposure,
            "DN",
            vector_dir.join(format!("EXPOSURE_VECTOR_{}.shp", province.name)),
        )?;
        let exposed = filter_by_expression(
            runner,
            &exposure_vector,
            FilterExpr::number("DN", CmpOp::Eq, 1.0),
            self.output_file("EXPOSURE_VECTOR_TRUE", p),
        )?;

        // Candidate areas
        let potential = intersect(
            runner,
            &exposed,
            &land_cover,
            self.output_file("POTENCIAL_PHOTOVOLTAIC_AREA", p),
        )?;
        let parts =
            split_into_single_parts(runner, &potential, self.output_file("SPLIT_POTENCIAL_AREA", p))?;
        let with_area = calculate_area(runner, &parts, self.output_file("calculate_split_area", p))?;
        let large = filter_by_expression(
            runner,
            &with_area,
            FilterExpr::area_above(self.min_area),
            self.output_file("filter_area_by_area_condition", p),
        )?;
        let areas = add_id(runner, &large, self.output_file("area_id", p))?;

        // Distance to medium-voltage lines
        let lines = filter_by_expression(
            runner,
            &province.bdot_layer(data_root, BdotClass::PowerLines),
            FilterExpr::text("RODZAJ", CmpOp::Eq, &self.medium_voltage_kind),
            self.medium_power_lines(p),
        )?;
        let with_line = attach_distance(
            runner,
            &areas,
            &lines,
            self.output_file("distance_to_line", p),
            self.output_file("area_with_distance_to_power_line", p),
        )?;
        let near_line = filter_by_expression(
            runner,
            &with_line,
            FilterExpr::distance_below(self.line_distance),
            self.output_file("area_distance_criterium_line", p),
        )?;
        let line_renamed = rename_column(
            runner,
            &near_line,
            "distance",
            "LINE_DISTANCE",
            self.output_file("area_distance_criterium_line_rename", p),
        )?;

        // Distance to roads
        let with_road = attach_distance(
            runner,
            &line_renamed,
            &province.bdot_layer(data_root, BdotClass::Roads),
            self.output_file("distance_to_road", p),
            self.output_file("select_column_distance_to_road", p),
        )?;
        let output = rename_column(
            runner,
            &with_road,
            "distance",
            "ROAD_DISTANCE",
            self.candidate_areas(p),
        )?;

        info!("photovoltaic areas for {}: {}", province.name, output.display());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PROVINCES;
    use crate::engine::RecordingEngine;

    fn farm() -> PhotovoltaicFarm {
        let mut config = PipelineConfig::default();
        config.data_root = PathBuf::from("/data");
        config.outputs.photovoltaic = PathBuf::from("/s1");
        PhotovoltaicFarm::from_config(&config)
    }

    #[test]
    fn test_province_stage_order() {
        let farm = farm();
        let mut engine = RecordingEngine::new();
        let lodzkie = PROVINCES[4];
        let mut runner = StageRunner::new(&mut engine, lodzkie);
        let out = farm
            .run_province(
                &mut runner,
                Path::new("/s1/TERRAIN_ASPECT"),
                Path::new("/s1/EXPOSURE_WS_S_ES"),
                Path::new("/s1/VECTOR_EXPOSURE"),
            )
            .unwrap();
        assert_eq!(out, PathBuf::from("/s1/photovoltaic_area_lodzkie.shp"));

        let calls = engine.invocations();
        assert_eq!(calls.len(), 20);
        assert_eq!(calls[0].algorithm, "native:mergevectorlayers");
        assert_eq!(
            calls[0].output,
            PathBuf::from("/s1/Merge_layers_area_lodzkie.shp")
        );
        assert_eq!(calls[3].algorithm, "gdal:aspect");
        assert_eq!(
            calls[3].parameters.get_str("INPUT"),
            Some("/data/NMT/lodzkie_geotif.tif")
        );
        assert_eq!(
            calls[3].output,
            PathBuf::from("/s1/TERRAIN_ASPECT/lodzkie_aspect.tif")
        );
        assert_eq!(
            calls[6].output,
            PathBuf::from("/s1/EXPOSURE_VECTOR_TRUE_lodzkie.shp")
        );
        assert_eq!(calls[6].parameters.get_str("EXPRESSION"), Some("\"DN\" = 1"));
        assert_eq!(
            calls[7].parameters.get_str("INPUT"),
            Some("/s1/EXPOSURE_VECTOR_TRUE_lodzkie.shp")
        );
        assert_eq!(engine.count("native:extractbyexpression"), 4);
        assert_eq!(engine.count("native:shortestline"), 2);
        assert_eq!(engine.count("native:renametablefield"), 2);
    }

    #[test]
    fn test_medium_voltage_filter() {
        let farm = farm();
        let mut engine = RecordingEngine::new();
        let mut runner = StageRunner::new(&mut engine, PROVINCES[0]);
        farm.run_province(
            &mut runner,
            Path::new("/a"),
            Path::new("/e"),
            Path::new("/v"),
        )
        .unwrap();
        let call = engine
            .invocations()
            .iter()
            .find(|c| c.output == farm.medium_power_lines(&PROVINCES[0]))
            .unwrap();
        assert_eq!(
            call.parameters.get_str("EXPRESSION"),
            Some("\"RODZAJ\" = 'linia elektroenergetyczna średniego napięcia'")
        );
        assert!(call
            .parameters
            .get_str("INPUT")
            .unwrap()
            .ends_with("PL.PZGiK.337.BDOT10k.02__OT_SULN_L.shp"));
    }
}
