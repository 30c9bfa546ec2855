mod config;
mod decode;
mod error;
mod gps;
mod metadata;
mod processor;
mod route;
mod session;
mod tags;
mod walker;

#[cfg(test)]
mod test_support;

use crate::config::AppConfig;
use crate::error::RouteError;
use crate::route::{BrowserSink, PrintSink, RouteOrder, RouteSink};
use crate::session::{GallerySession, ImportReport};
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about = "Inspect photo metadata and build a travel route from geotagged photos")]
struct Cli {
    /// Directory holding `default`, `$RUN_MODE` and `local` config files
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the metadata fields of each image
    Inspect {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Order geotagged images by time and produce a directions link
    Route {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Overrides `route_order` from the config
        #[arg(long, value_enum)]
        order: Option<RouteOrder>,
        /// Open the link in the default browser instead of printing it
        #[arg(long)]
        open: bool,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::new(&cli.config_dir)?;

    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    info!("Starting photo_route");

    let code = match cli.command {
        Command::Inspect { paths, json } => inspect(&config, &paths, json)?,
        Command::Route { paths, order, open, json } => {
            route(&config, &paths, order.unwrap_or(config.route_order), open, json)?
        }
    };

    info!("photo_route finished");
    Ok(code)
}

fn import(config: &AppConfig, inputs: &[PathBuf]) -> Result<(GallerySession, ImportReport)> {
    let paths = walker::expand_inputs(inputs, config)?;
    let mut session = GallerySession::new(config.parallel_import);
    let report = session.import(&paths);
    Ok((session, report))
}

fn print_failures(report: &ImportReport) {
    for failure in &report.failures {
        eprintln!("Could not load image {}: {}", failure.path.display(), failure.error);
    }
}

fn inspect(config: &AppConfig, inputs: &[PathBuf], json: bool) -> Result<ExitCode> {
    let (session, report) = import(config, inputs)?;

    if json {
        let records: Vec<_> = session.records().map(|(_, r)| r).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for (_, record) in session.records() {
            println!("{}", record.path.display());
            for (name, value) in record.display_fields() {
                println!("  {name:<14} {value}");
            }
        }
    }
    print_failures(&report);

    Ok(if session.is_empty() && !report.failures.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn route(config: &AppConfig, inputs: &[PathBuf], order: RouteOrder, open: bool, json: bool) -> Result<ExitCode> {
    let (session, report) = import(config, inputs)?;
    print_failures(&report);

    let route = match session.route(order) {
        Ok(route) => route,
        Err(RouteError::InsufficientData { found }) => {
            eprintln!("Not enough geotagged images to build a route: need at least 2, found {found}.");
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&route)?);
    }
    if open {
        BrowserSink::new(&config.maps_base_url).deliver(&route)?;
    } else if !json {
        PrintSink::new(&config.maps_base_url, std::io::stdout().lock()).deliver(&route)?;
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_route_options() {
        let cli = Cli::parse_from(["photo_route", "route", "--order", "exif-captured", "--open", "a.jpg", "trip/"]);
        match cli.command {
            Command::Route { paths, order, open, json } => {
                assert_eq!(paths, [PathBuf::from("a.jpg"), PathBuf::from("trip/")]);
                assert_eq!(order, Some(RouteOrder::ExifCaptured));
                assert!(open);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config_dir, PathBuf::from("config"));
    }

    #[test]
    fn cli_requires_paths() {
        assert!(Cli::try_parse_from(["photo_route", "inspect"]).is_err());
    }
}
