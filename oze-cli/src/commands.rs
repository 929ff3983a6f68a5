use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "oze")]
#[command(version)]
#[command(about = "Locate photovoltaic and wind-farm candidate areas in Polish provinces")]
#[command(
    long_about = "Runs the renewable-site pipeline province by province through qgis_process:\n\
    photovoltaic and wind-farm candidate areas, monthly solar radiation and wind speed\n\
    attribution, and the per-province area summary."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Pipeline configuration (TOML); defaults reproduce the standard layout
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Only log errors and hide progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Step 1: photovoltaic candidate areas
    Photovoltaic(StepArgs),

    /// Step 2: wind-farm candidate areas (needs Step 1 power lines)
    WindFarm(StepArgs),

    /// Step 3: monthly surface solar radiation onto photovoltaic areas
    SolarRadiation(StepArgs),

    /// Step 4: monthly mean wind speed onto wind-farm areas
    WindSpeed(StepArgs),

    /// Step 5: per-province area totals from the database
    Analysis(AnalysisArgs),

    /// Steps 1 to 4 in order, then the analysis unless dry-running
    All(StepArgs),

    /// Print the province table
    Provinces,
}

#[derive(Args, Debug, Clone)]
pub struct StepArgs {
    /// Province code or name; repeat to select several (default: all)
    #[arg(short, long = "province", value_name = "PROVINCE")]
    pub provinces: Vec<String>,

    /// Record the engine invocations and print them as JSON instead of running
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    /// Province code or name; repeat to select several (default: all)
    #[arg(short, long = "province", value_name = "PROVINCE")]
    pub provinces: Vec<String>,
}
