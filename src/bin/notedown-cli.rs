use clap::{Arg, ArgAction, Command};
use notedown::{BackendSelector, Mode, Settings};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct FileReport {
    input: PathBuf,
    output: Option<PathBuf>,
    backend: Option<String>,
    error: Option<String>,
}

fn main() {
    let matches = Command::new("notedown")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert notebook HTML exports to Markdown")
        .arg(
            Arg::new("inputs")
                .help("HTML files to convert")
                .required(true)
                .num_args(1..)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Markdown output path (single input only)"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .default_value("auto")
                .value_parser(["auto", "high-fidelity", "simplified", "custom", "pandoc", "html2md", "markdownify"])
                .help("Conversion backend, or auto to try them in order"),
        )
        .arg(
            Arg::new("no-images")
                .long("no-images")
                .action(ArgAction::SetTrue)
                .help("Replace embedded images with a placeholder instead of extracting them"),
        )
        .arg(
            Arg::new("pandoc")
                .long("pandoc")
                .value_name("PATH")
                .help("pandoc executable to use"),
        )
        .arg(
            Arg::new("banner")
                .long("banner")
                .action(ArgAction::SetTrue)
                .help("Start the custom output with title and export time"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print a JSON summary instead of text"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        )
        .get_matches();

    let default_filter = if matches.get_flag("verbose") { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("inputs")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let output = matches.get_one::<PathBuf>("output").cloned();
    if output.is_some() && inputs.len() > 1 {
        eprintln!("Error: --output can only be used with a single input file");
        std::process::exit(2);
    }

    let mode: Mode = match matches.get_one::<String>("mode").map(String::as_str).unwrap_or("auto").parse() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(2);
        }
    };

    // CLI flags override the loaded configuration
    let mut settings = match Settings::new() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Error: failed to load configuration: {}", err);
            std::process::exit(1);
        }
    };
    if matches.get_flag("no-images") {
        settings.extract_images = false;
    }
    if matches.get_flag("banner") {
        settings.export_banner = true;
    }
    if let Some(pandoc) = matches.get_one::<String>("pandoc") {
        settings.pandoc_path = pandoc.clone();
    }

    let selector = BackendSelector::from_settings(&settings);
    let json = matches.get_flag("json");

    let mut reports = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let report = match selector.run(input, output.as_deref(), mode) {
            Ok(converted) => {
                if !json {
                    println!("Success: {} ({})", converted.path.display(), converted.backend);
                }
                FileReport {
                    input: input.clone(),
                    output: Some(converted.path),
                    backend: Some(converted.backend.to_string()),
                    error: None,
                }
            }
            Err(failure) => {
                if !json {
                    println!("Failed: {} ({})", input.display(), failure);
                }
                FileReport {
                    input: input.clone(),
                    output: None,
                    backend: failure.backend.map(|b| b.to_string()),
                    error: Some(failure.error.to_string()),
                }
            }
        };
        reports.push(report);
    }

    let succeeded = reports.iter().filter(|r| r.output.is_some()).count();
    if json {
        match serde_json::to_string_pretty(&reports) {
            Ok(text) => println!("{}", text),
            Err(err) => {
                eprintln!("Error: {}", err);
                std::process::exit(1);
            }
        }
    } else {
        println!("Conversion complete: {}/{} files successful", succeeded, reports.len());
    }

    if succeeded != reports.len() {
        std::process::exit(1);
    }
}
