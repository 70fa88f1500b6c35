//! Single-server queue simulation application.
#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use eyre::{eyre, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use structopt::StructOpt;

use ssqsim::{Config, GeneratorKind, Report, SimulationResult, StreamLayout, Summary};

/// Output format of the results.
#[derive(Debug, Clone, Copy, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
enum Format {
    /// Classic text report.
    Text,
    /// JSON object.
    Json,
}

/// Runs a single-server queue simulation.
#[derive(Debug, StructOpt)]
struct Opt {
    /// Simulation configuration file in YAML, or JSON if the extension is `.json`.
    #[structopt(long, conflicts_with("legacy-input"))]
    config: Option<PathBuf>,

    /// Input file with three numbers: mean interarrival time, mean service time,
    /// and the number of customers.
    #[structopt(long)]
    legacy_input: Option<PathBuf>,

    /// Overrides the mean interarrival time.
    #[structopt(long)]
    mean_interarrival: Option<f64>,

    /// Overrides the mean service time.
    #[structopt(long)]
    mean_service: Option<f64>,

    /// Overrides the number of customers that must finish waiting.
    #[structopt(long)]
    customers: Option<usize>,

    /// Overrides the capacity of the waiting queue.
    #[structopt(long)]
    queue_capacity: Option<usize>,

    /// Overrides the random seed.
    #[structopt(long)]
    seed: Option<u64>,

    /// Overrides the random generator: `lcg` or `chacha`.
    #[structopt(long)]
    generator: Option<GeneratorKind>,

    /// Overrides the stream layout: `shared` or `split`.
    #[structopt(long)]
    streams: Option<StreamLayout>,

    /// Number of independent replications with consecutive seeds.
    #[structopt(long, default_value = "1")]
    replications: u64,

    /// Output format: `text` or `json`.
    #[structopt(long, default_value = "text")]
    format: Format,

    /// Write the results to this file instead of the stdout.
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// Verbosity.
    #[structopt(short, long, parse(from_occurrences))]
    verbose: i32,

    /// Store the logs this file.
    #[structopt(long)]
    log_output: Option<PathBuf>,

    /// Do not log to the stderr.
    #[structopt(long)]
    no_stderr: bool,
}

impl Opt {
    /// Loads the configuration file, if any, and applies the overrides.
    fn config(&self) -> eyre::Result<Config> {
        let config = if let Some(path) = &self.config {
            let file = File::open(path)
                .wrap_err_with(|| format!("unable to open config: {}", path.display()))?;
            if path.extension().map_or(false, |e| e == "json") {
                Config::from_json(file)?
            } else {
                Config::from_yaml(file)?
            }
        } else if let Some(path) = &self.legacy_input {
            let file = File::open(path)
                .wrap_err_with(|| format!("unable to open input: {}", path.display()))?;
            Config::from_legacy(file)?
        } else {
            Config::default()
        };
        let config = Config {
            mean_interarrival: self.mean_interarrival.unwrap_or(config.mean_interarrival),
            mean_service: self.mean_service.unwrap_or(config.mean_service),
            required_customers: self.customers.unwrap_or(config.required_customers),
            queue_capacity: self.queue_capacity.unwrap_or(config.queue_capacity),
            seed: self.seed.or(config.seed),
            generator: self.generator.unwrap_or(config.generator),
            streams: self.streams.unwrap_or(config.streams),
        };
        Ok(config.verify()?)
    }

    fn output(&self) -> eyre::Result<Box<dyn Write>> {
        Ok(match &self.output {
            Some(path) => Box::new(io::BufWriter::new(File::create(path).wrap_err_with(
                || format!("unable to create output file: {}", path.display()),
            )?)),
            None => Box::new(io::stdout()),
        })
    }
}

/// Failure of the application, carrying the exit code it should end with.
struct Failure {
    code: i32,
    error: eyre::Report,
}

impl From<eyre::Report> for Failure {
    fn from(error: eyre::Report) -> Self {
        let code = error
            .downcast_ref::<ssqsim::Error>()
            .map_or(3, ssqsim::Error::exit_code);
        Self { code, error }
    }
}

impl From<ssqsim::Error> for Failure {
    fn from(error: ssqsim::Error) -> Self {
        Self {
            code: error.exit_code(),
            error: error.into(),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    config: &'a Config,
    result: &'a SimulationResult,
    average_delay: f64,
    average_queue_length: f64,
    utilization: f64,
}

fn write_result(
    opt: &Opt,
    config: &Config,
    result: &SimulationResult,
    out: &mut dyn Write,
) -> eyre::Result<()> {
    match opt.format {
        Format::Text => writeln!(out, "{}", Report::new(config, result))?,
        Format::Json => {
            serde_json::to_writer_pretty(
                &mut *out,
                &JsonReport {
                    config,
                    result,
                    average_delay: result.average_delay(),
                    average_queue_length: result.average_queue_length(),
                    utilization: result.utilization(),
                },
            )?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_summary(opt: &Opt, summary: &Summary, out: &mut dyn Write) -> eyre::Result<()> {
    match opt.format {
        Format::Text => {
            writeln!(out, "Replications {:21}\n", summary.replications)?;
            writeln!(out, "Average delay in queue {}", summary.average_delay)?;
            writeln!(out, "Average number in queue {}", summary.average_queue_length)?;
            writeln!(out, "Server utilization {}", summary.utilization)?;
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, summary)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn run_single(opt: &Opt, config: &Config) -> Result<(), Failure> {
    let mut out = opt.output()?;
    match ssqsim::run(config) {
        Ok(result) => {
            write_result(opt, config, &result, &mut *out)?;
            Ok(())
        }
        Err(err) => {
            // The diagnostic goes to the report, like a regular result would.
            writeln!(out, "{}", err).wrap_err("unable to write output")?;
            Err(err.into())
        }
    }
}

fn run_replications(opt: &Opt, config: &Config) -> Result<(), Failure> {
    let seeds = ssqsim::replication_seeds(config, opt.replications);
    let pb = ProgressBar::new(opt.replications)
        .with_style(ProgressStyle::default_bar().template("{msg} {wide_bar} {pos}/{len}"));
    pb.set_message("Replications");
    let results = ssqsim::replicate_with(config, &seeds, |_, _| pb.inc(1));
    pb.finish();
    let results = results.into_iter().collect::<ssqsim::Result<Vec<_>>>()?;
    let summary =
        Summary::from_results(&results).ok_or_else(|| eyre!("no replications were run"))?;
    let mut out = opt.output()?;
    write_summary(opt, &summary, &mut *out)?;
    Ok(())
}

/// Set up a logger based on the given user options.
fn set_up_logger(opt: &Opt) -> Result<(), fern::InitError> {
    let log_level = match opt.verbose {
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        3 => log::LevelFilter::Trace,
        _ => log::LevelFilter::Warn,
    };
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(log_level);
    let dispatch = if let Some(path) = &opt.log_output {
        let _ = std::fs::remove_file(path);
        dispatch.chain(log_file(path)?)
    } else {
        dispatch
    };
    let dispatch = if opt.no_stderr {
        dispatch
    } else {
        dispatch.chain(io::stderr())
    };
    dispatch.apply()?;
    Ok(())
}

fn log_file(path: &Path) -> io::Result<File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .append(false)
        .open(path)
}

fn run(opt: &Opt) -> Result<(), Failure> {
    set_up_logger(opt).wrap_err("unable to set up logger")?;
    let config = opt.config()?;
    if opt.replications > 1 {
        run_replications(opt, &config)
    } else {
        run_single(opt, &config)
    }
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let opt = Opt::from_args();
    if let Err(failure) = run(&opt) {
        eprintln!("Error: {:?}", failure.error);
        std::process::exit(failure.code);
    }
    Ok(())
}
