//! Step 5: per-province totals of the attributed candidate areas.
//!
//! Sums the `area` column of every province's final solar and wind tables,
//! writes the totals to CSV and renders a grouped bar chart.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::Province;
use crate::commons::basic_functions::ensure_dir;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::pipeline::MonthlyKind;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid table name `{0}`")]
    InvalidTable(String),

    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("dataframe error: {0}")]
    Polars(#[from] PolarsError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Source of the summed `area` of a table
pub trait AreaStore {
    /// `SUM(area)` of `table`; `None` when the table has no rows
    fn sum_area(&mut self, table: &str) -> Result<Option<f64>, AnalysisError>;
}

/// Table names are interpolated into SQL, so only plain lowercase
/// identifiers are accepted
pub fn validate_table(table: &str) -> Result<(), AnalysisError> {
    let valid = !table.is_empty()
        && table.len() <= 63
        && table
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_lowercase() || c == '_')
        && table
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AnalysisError::InvalidTable(table.to_string()))
    }
}

/// In-memory store keyed by table name; a missing table sums to `None`
#[derive(Debug, Default, Clone)]
pub struct MemoryAreaStore {
    tables: HashMap<String, Vec<Option<f64>>>,
}

impl MemoryAreaStore {
    pub fn new() -> Self {
        MemoryAreaStore::default()
    }

    /// Add a table with one `area` value per row
    pub fn with_table(mut self, table: impl Into<String>, areas: Vec<Option<f64>>) -> Self {
        self.tables.insert(table.into(), areas);
        self
    }
}

impl AreaStore for MemoryAreaStore {
    fn sum_area(&mut self, table: &str) -> Result<Option<f64>, AnalysisError> {
        validate_table(table)?;
        // SQL SUM ignores NULLs and is NULL over no non-NULL values
        let total = self
            .tables
            .get(table)
            .map(|rows| rows.iter().flatten().copied().collect::<Vec<_>>())
            .filter(|values| !values.is_empty())
            .map(|values| values.iter().sum());
        Ok(total)
    }
}

#[cfg(feature = "postgres")]
pub use postgres::PgAreaStore;

#[cfg(feature = "postgres")]
mod postgres {
    use sqlx::postgres::{PgPool, PgPoolOptions};
    use tokio::runtime::Runtime;

    use super::{validate_table, AnalysisError, AreaStore};
    use crate::config::DatabaseConfig;

    /// PostgreSQL store holding the imported final tables
    /// Queries run on a private current-thread runtime.
    pub struct PgAreaStore {
        runtime: Runtime,
        pool: PgPool,
    }

    impl PgAreaStore {
        pub fn connect(config: &DatabaseConfig) -> Result<Self, AnalysisError> {
            let url = config.url()?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let pool = runtime.block_on(
                PgPoolOptions::new()
                    .max_connections(1)
                    .connect(url.as_str()),
            )?;
            Ok(PgAreaStore { runtime, pool })
        }
    }

    impl AreaStore for PgAreaStore {
        fn sum_area(&mut self, table: &str) -> Result<Option<f64>, AnalysisError> {
            validate_table(table)?;
            let sql = format!("SELECT SUM(area)::float8 FROM \"{}\"", table);
            let total: Option<Option<f64>> = self
                .runtime
                .block_on(sqlx::query_scalar::<_, Option<f64>>(sql.as_str()).fetch_optional(&self.pool))?;
            Ok(total.flatten())
        }
    }
}

/// Totals of one province, in m²
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSummary {
    pub province: &'static str,
    pub solar_area: f64,
    pub wind_area_total: f64,
}

/// Query both totals of every province, in table order.
/// A NULL sum or an empty result counts as zero.
pub fn summarize(
    store: &mut dyn AreaStore,
    provinces: &[Province],
) -> Result<Vec<AreaSummary>, AnalysisError> {
    provinces
        .iter()
        .map(|province| {
            let solar_table = MonthlyKind::SolarRadiation.final_table(province);
            let wind_table = MonthlyKind::WindSpeed.final_table(province);
            let solar_area = store.sum_area(&solar_table)?.unwrap_or(0.0);
            let wind_area_total = store.sum_area(&wind_table)?.unwrap_or(0.0);
            debug!(
                province = province.name,
                solar_area, wind_area_total, "area totals"
            );
            Ok(AreaSummary {
                province: province.name,
                solar_area,
                wind_area_total,
            })
        })
        .collect()
}

/// `province | solar_area | wind_area_total`
pub fn summary_frame(rows: &[AreaSummary]) -> Result<DataFrame, AnalysisError> {
    let df = df!(
        "province" => rows.iter().map(|r| r.province).collect::<Vec<_>>(),
        "solar_area" => rows.iter().map(|r| r.solar_area).collect::<Vec<_>>(),
        "wind_area_total" => rows.iter().map(|r| r.wind_area_total).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

/// Long layout of the summary, one row per province and source, for
/// grouped bar charts
pub fn chart_frame(rows: &[AreaSummary]) -> Result<DataFrame, AnalysisError> {
    let mut province = Vec::with_capacity(rows.len() * 2);
    let mut source = Vec::with_capacity(rows.len() * 2);
    let mut area = Vec::with_capacity(rows.len() * 2);
    for row in rows {
        province.extend([row.province, row.province]);
        source.extend(["solar", "wind"]);
        area.extend([row.solar_area, row.wind_area_total]);
    }
    let df = df!(
        "province" => province,
        "source" => source,
        "area" => area,
    )?;
    Ok(df)
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), AnalysisError> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)?;
    Ok(())
}

#[cfg(feature = "plot")]
pub fn write_chart(rows: &[AreaSummary], path: &Path) -> Result<(), AnalysisError> {
    use plotlars::{BarPlot, Legend, Orientation, Plot, Rgb, Text};

    let df = chart_frame(rows)?;
    BarPlot::builder()
        .data(&df)
        .labels("province")
        .values("area")
        .group("source")
        .orientation(Orientation::Vertical)
        .colors(vec![Rgb(255, 190, 11), Rgb(58, 134, 255)])
        .plot_title(Text::from("Renewable energy candidate area by province").size(18))
        .x_title("Province")
        .y_title("Area [m²]")
        .legend_title("Source")
        .legend(&Legend::new().x(0.85).y(0.95))
        .build()
        .write_html(path.to_string_lossy().to_string());
    Ok(())
}

/// Step 5 driver: writes `area_summary.csv` and `area_summary.html`
#[derive(Debug, Clone)]
pub struct Analysis {
    pub output_dir: PathBuf,
}

impl Analysis {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Analysis {
            output_dir: config.outputs.analysis.clone(),
        }
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join("area_summary.csv")
    }

    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join("area_summary.html")
    }

    pub fn run(
        &self,
        store: &mut dyn AreaStore,
        provinces: &[Province],
    ) -> Result<Vec<AreaSummary>, AnalysisError> {
        let rows = summarize(store, provinces)?;
        ensure_dir(&self.output_dir)?;

        let mut df = summary_frame(&rows)?;
        write_csv(&mut df, &self.csv_path())?;
        info!("area summary written to {}", self.csv_path().display());

        #[cfg(feature = "plot")]
        {
            write_chart(&rows, &self.chart_path())?;
            info!("area chart written to {}", self.chart_path().display());
        }

        Ok(rows)
    }
}
