use std::path::PathBuf;

use tracing::info;

use super::{for_each_province, RunOptions};
use crate::catalog::Province;
use crate::config::PipelineConfig;
use crate::engine::Geoprocessor;
use crate::error::PipelineError;
use crate::geo_core::GeoCore;
use crate::stages::monthly::{clip_monthly_rasters, polygonize_monthly, MonthlyJoin};
use crate::stages::vector::buffer;
use crate::stages::StageRunner;

/// Monthly raster series attributed onto candidate areas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyKind {
    /// Step 3: surface solar radiation onto photovoltaic areas
    SolarRadiation,
    /// Step 4: mean wind speed onto wind-farm areas
    WindSpeed,
}

impl MonthlyKind {
    /// Folder of `map_<month>.tif` under the data root
    pub fn input_folder(self) -> &'static str {
        match self {
            MonthlyKind::SolarRadiation => "SURFACE_RADIATION_1991_2020",
            MonthlyKind::WindSpeed => "MEAN_WIND_SPEED",
        }
    }

    pub fn clip_folder(self) -> &'static str {
        match self {
            MonthlyKind::SolarRadiation => "CLIP_RADIATION",
            MonthlyKind::WindSpeed => "CLIP_WIND_SPEED",
        }
    }

    /// Field the polygonized cell value is written to (10 chars max)
    pub fn value_field(self) -> &'static str {
        match self {
            MonthlyKind::SolarRadiation => "Solar_surf",
            MonthlyKind::WindSpeed => "Wind_speed",
        }
    }

    pub fn stem(self) -> &'static str {
        match self {
            MonthlyKind::SolarRadiation => "solar_radiation",
            MonthlyKind::WindSpeed => "wind_speed",
        }
    }

    /// Stem of the renamed monthly layers in the support folder
    pub fn rename_stem(self) -> &'static str {
        match self {
            MonthlyKind::SolarRadiation => "solar_radiation",
            MonthlyKind::WindSpeed => "wind_speed_vector",
        }
    }

    /// Final table name of a province, also the relational table name
    pub fn final_table(self, province: &Province) -> String {
        match self {
            MonthlyKind::SolarRadiation => {
                format!("solar_radiation_photovoltaic_area_{}", province.name)
            }
            MonthlyKind::WindSpeed => format!("wind_speed_area_{}", province.name),
        }
    }

    fn label(self) -> &'static str {
        match self {
            MonthlyKind::SolarRadiation => "solar radiation",
            MonthlyKind::WindSpeed => "wind speed",
        }
    }
}

/// Steps 3 and 4: clip, polygonize and join twelve monthly rasters onto
/// the candidate areas of the previous steps
#[derive(Debug, Clone)]
pub struct MonthlyAttribution {
    pub kind: MonthlyKind,
    pub geo_core: GeoCore,
    /// Output root of the step producing the candidate areas
    pub seed_root: PathBuf,
    pub mask_buffer: f64,
}

impl MonthlyAttribution {
    pub fn from_config(kind: MonthlyKind, config: &PipelineConfig) -> Self {
        let (output_root, seed_root) = match kind {
            MonthlyKind::SolarRadiation => (
                config.outputs.solar_radiation.clone(),
                config.outputs.photovoltaic.clone(),
            ),
            MonthlyKind::WindSpeed => (
                config.outputs.wind_speed.clone(),
                config.outputs.wind_farm.clone(),
            ),
        };
        MonthlyAttribution {
            kind,
            geo_core: GeoCore::new(config.criteria.crs.clone(), config.data_root.clone(), output_root),
            seed_root,
            mask_buffer: config.criteria.mask_buffer,
        }
    }

    /// Candidate areas the months are joined onto
    pub fn seed(&self, province: &Province) -> PathBuf {
        let seed = match self.kind {
            MonthlyKind::SolarRadiation => format!("photovoltaic_area_{}.shp", province.name),
            MonthlyKind::WindSpeed => format!("windfarm_area_{}.shp", province.name),
        };
        self.seed_root.join(seed)
    }

    pub fn final_output(&self, province: &Province) -> PathBuf {
        self.geo_core
            .output(format!("{}.shp", self.kind.final_table(province)))
    }

    fn support_dir(&self) -> PathBuf {
        self.geo_core
            .output_dir(format!("support_{}_vector", self.kind.stem()))
    }

    fn monthly_join(&self, province: &Province) -> MonthlyJoin {
        MonthlyJoin {
            seed: self.seed(province),
            value_field: self.kind.value_field().to_string(),
            support_dir: self.support_dir(),
            stem: self.kind.stem().to_string(),
            rename_stem: self.kind.rename_stem().to_string(),
            province: province.name.to_string(),
            final_output: self.final_output(province),
        }
    }

    pub fn run(&self, engine: &mut dyn Geoprocessor, options: &RunOptions) -> Result<(), PipelineError> {
        options.prepare(&self.geo_core.output_path)?;
        options.prepare(&self.geo_core.output_dir("MASK_TO_CUT_BUFFER"))?;
        options.prepare(&self.support_dir())?;

        for_each_province(self.kind.label(), options, |province| {
            options.prepare(&self.clip_dir(&province))?;
            let mut runner = StageRunner::new(&mut *engine, province);
            self.run_province(&mut runner).map(|_| ())
        })
    }

    fn clip_dir(&self, province: &Province) -> PathBuf {
        self.geo_core
            .output_dir(self.kind.clip_folder())
            .join(province.name)
    }

    /// Stages of one province; returns the final joined table
    pub fn run_province(&self, runner: &mut StageRunner<'_>) -> Result<PathBuf, PipelineError> {
        let province = runner.province();

        let mask = buffer(
            runner,
            &self
                .geo_core
                .data(format!("MASK_TO_CUT/{}.shp", province.name)),
            self.mask_buffer,
            self.geo_core
                .output_dir("MASK_TO_CUT_BUFFER")
                .join(format!("{}_BUFFOR.shp", province.name)),
        )?;

        let clipped = clip_monthly_rasters(
            runner,
            &self.geo_core.data(self.kind.input_folder()),
            &mask,
            &self.clip_dir(&province),
        )?;
        let vectors = polygonize_monthly(
            runner,
            &clipped,
            &self.geo_core.output_path,
            &format!("{}_vector_{}", self.kind.stem(), province.name),
            self.kind.value_field(),
        )?;

        let output = self.monthly_join(&province).run(runner, &vectors)?;
        info!("{} for {}: {}", self.kind.label(), province.name, output.display());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Month, PROVINCES};
    use crate::engine::RecordingEngine;

    fn config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.data_root = PathBuf::from("/data");
        config.outputs.photovoltaic = PathBuf::from("/s1");
        config.outputs.wind_farm = PathBuf::from("/s2");
        config.outputs.solar_radiation = PathBuf::from("/s3");
        config.outputs.wind_speed = PathBuf::from("/s4");
        config
    }

    #[test]
    fn test_solar_radiation_province() {
        let step = MonthlyAttribution::from_config(MonthlyKind::SolarRadiation, &config());
        let mut engine = RecordingEngine::new();
        let mut runner = StageRunner::new(&mut engine, PROVINCES[6]);
        let out = step.run_province(&mut runner).unwrap();
        assert_eq!(
            out,
            PathBuf::from("/s3/solar_radiation_photovoltaic_area_mazowieckie.shp")
        );

        let calls = engine.invocations();
        assert_eq!(calls.len(), 61);
        assert_eq!(calls[0].parameters.get_str("INPUT"), Some("/data/MASK_TO_CUT/mazowieckie.shp"));
        assert_eq!(
            calls[0].output,
            PathBuf::from("/s3/MASK_TO_CUT_BUFFER/mazowieckie_BUFFOR.shp")
        );
        assert_eq!(
            calls[2].parameters.get_str("INPUT"),
            Some("/data/SURFACE_RADIATION_1991_2020/map_february.tif")
        );
        assert_eq!(
            calls[2].output,
            PathBuf::from("/s3/CLIP_RADIATION/mazowieckie/MAP_FEBRUARY_CLIPPED.tif")
        );
        assert_eq!(
            calls[13].output,
            PathBuf::from("/s3/solar_radiation_vector_mazowieckie_january.shp")
        );
        assert_eq!(calls[13].parameters.get_str("FIELD"), Some("Solar_surf"));
        assert_eq!(
            calls[25].parameters.get_str("INPUT"),
            Some("/s1/photovoltaic_area_mazowieckie.shp")
        );
    }

    #[test]
    fn test_wind_speed_seed_and_final() {
        let step = MonthlyAttribution::from_config(MonthlyKind::WindSpeed, &config());
        let p = PROVINCES[9];
        assert_eq!(step.seed(&p), PathBuf::from("/s2/windfarm_area_podlaskie.shp"));
        assert_eq!(step.final_output(&p), PathBuf::from("/s4/wind_speed_area_podlaskie.shp"));
        let join = step.monthly_join(&p);
        assert_eq!(
            join.join_output(Month::March),
            PathBuf::from("/s4/support_wind_speed_vector/wind_speed_vector_3_podlaskie.shp")
        );
        assert_eq!(
            join.renamed_path(Month::March),
            PathBuf::from("/s4/support_wind_speed_vector/wind_speed_vector_podlaskie_march_rename.shp")
        );

        let solar = MonthlyAttribution::from_config(MonthlyKind::SolarRadiation, &config());
        assert_eq!(
            solar.monthly_join(&p).renamed_path(Month::March),
            PathBuf::from(
                "/s3/support_solar_radiation_vector/solar_radiation_podlaskie_march_rename.shp"
            )
        );
    }

    #[test]
    fn test_failure_carries_month() {
        let step = MonthlyAttribution::from_config(MonthlyKind::WindSpeed, &config());
        // buffer + 12 clips + 4 polygonizations succeed
        let mut engine = RecordingEngine::failing_at(17);
        let mut runner = StageRunner::new(&mut engine, PROVINCES[9]);
        let err = step.run_province(&mut runner).unwrap_err();
        match err {
            PipelineError::Stage { stage, month, .. } => {
                assert_eq!(stage, "polygonize");
                assert_eq!(month, Some(Month::May));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
