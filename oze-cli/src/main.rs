mod commands;

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{AnalysisArgs, CliArgs, Commands, StepArgs};
use oze::catalog::PROVINCES;
use oze::engine::{Geoprocessor, QgisProcess, RecordingEngine};
use oze::pipeline::{MonthlyAttribution, MonthlyKind, PhotovoltaicFarm, RunOptions, WindFarm};
use oze::PipelineConfig;

#[derive(Debug, Clone, Copy)]
enum Step {
    Photovoltaic,
    WindFarm,
    SolarRadiation,
    WindSpeed,
}

impl Step {
    const ALL: [Step; 4] = [
        Step::Photovoltaic,
        Step::WindFarm,
        Step::SolarRadiation,
        Step::WindSpeed,
    ];

    fn run(
        self,
        config: &PipelineConfig,
        engine: &mut dyn Geoprocessor,
        options: &RunOptions,
    ) -> Result<()> {
        let result = match self {
            Step::Photovoltaic => PhotovoltaicFarm::from_config(config).run(engine, options),
            Step::WindFarm => WindFarm::from_config(config).run(engine, options),
            Step::SolarRadiation => {
                MonthlyAttribution::from_config(MonthlyKind::SolarRadiation, config)
                    .run(engine, options)
            }
            Step::WindSpeed => {
                MonthlyAttribution::from_config(MonthlyKind::WindSpeed, config).run(engine, options)
            }
        };
        result.with_context(|| format!("{:?} step failed", self))
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(&args);
    debug!("Arguments: {:?}", args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<()> {
    if let Commands::Provinces = args.command {
        print_provinces();
        return Ok(());
    }

    let config = PipelineConfig::load(args.config.as_deref()).with_context(|| {
        format!(
            "failed to load configuration from {}",
            args.config
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults".to_string())
        )
    })?;
    debug!("Configuration: {:?}", config);

    match &args.command {
        Commands::Photovoltaic(step) => run_steps(&config, &[Step::Photovoltaic], step, args.quiet),
        Commands::WindFarm(step) => run_steps(&config, &[Step::WindFarm], step, args.quiet),
        Commands::SolarRadiation(step) => {
            run_steps(&config, &[Step::SolarRadiation], step, args.quiet)
        }
        Commands::WindSpeed(step) => run_steps(&config, &[Step::WindSpeed], step, args.quiet),
        Commands::Analysis(analysis) => run_analysis(&config, analysis),
        Commands::All(step) => {
            run_steps(&config, &Step::ALL, step, args.quiet)?;
            if step.dry_run {
                info!("Dry run: skipping the analysis step");
                return Ok(());
            }
            run_analysis(
                &config,
                &AnalysisArgs {
                    provinces: step.provinces.clone(),
                },
            )
        }
        Commands::Provinces => Ok(()),
    }
}

fn run_steps(config: &PipelineConfig, steps: &[Step], args: &StepArgs, quiet: bool) -> Result<()> {
    let options = RunOptions::default()
        .select(&args.provinces)?
        .dry_run(args.dry_run)
        .progress(!quiet && !args.dry_run);

    if args.dry_run {
        let mut engine = RecordingEngine::new();
        for step in steps {
            step.run(config, &mut engine, &options)?;
        }
        let plan = serde_json::to_string_pretty(engine.invocations())
            .context("failed to serialize the invocation plan")?;
        println!("{}", plan);
        info!("Dry run: {} invocations planned", engine.len());
        return Ok(());
    }

    let mut engine = QgisProcess::new(config.engine.program.clone());
    for step in steps {
        step.run(config, &mut engine, &options)?;
    }
    Ok(())
}

#[cfg(feature = "postgres")]
fn run_analysis(config: &PipelineConfig, args: &AnalysisArgs) -> Result<()> {
    use oze::analysis::{Analysis, PgAreaStore};

    let options = RunOptions::default().select(&args.provinces)?;
    let mut store = PgAreaStore::connect(&config.database).with_context(|| {
        format!(
            "failed to connect to {}:{}/{}",
            config.database.host, config.database.port, config.database.dbname
        )
    })?;
    let analysis = Analysis::from_config(config);
    let rows = analysis
        .run(&mut store, &options.provinces)
        .context("analysis step failed")?;
    for row in &rows {
        println!(
            "{:<20} {:>16.2} {:>16.2}",
            row.province, row.solar_area, row.wind_area_total
        );
    }
    Ok(())
}

#[cfg(not(feature = "postgres"))]
fn run_analysis(_config: &PipelineConfig, _args: &AnalysisArgs) -> Result<()> {
    anyhow::bail!("the analysis step needs the `postgres` feature")
}

fn print_provinces() {
    println!("{:<4} {:<20} {:>6}", "code", "name", "bdot");
    for p in PROVINCES.iter() {
        println!("{:<4} {:<20} {:>6}", p.code, p.name, p.number);
    }
}

fn init_logging(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("OZE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    };

    let mut filter = EnvFilter::from_default_env();
    if env::var("RUST_LOG").is_err() {
        for directive in [format!("oze={}", level), "sqlx=warn".to_string()] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}
