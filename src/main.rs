#![deny(missing_docs)]
#![deny(warnings)]

//! Command-line entry for the mapstash demo client.

use std::path::PathBuf;

use mapstash::state::SharedMapState;
use mapstash::{bootstrap, config, export, logging, seed};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };

    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let mut app_config = match &options.config_path {
        Some(path) => {
            let mut loaded =
                config::load_from_path(path).map_err(|err| err.to_string())?;
            loaded.apply_env_overrides();
            loaded
        }
        None => config::load_or_default().map_err(|err| err.to_string())?,
    };
    if let Some(base_url) = &options.base_url {
        app_config.base_url = Some(base_url.clone());
    }

    match options.command {
        Command::Samples => {
            let boot = bootstrap::run(&app_config, options.sample_map_id.as_deref())
                .map_err(|err| err.to_string())?;
            if let Some(err) = boot.samples_error {
                return Err(format!("Could not fetch sample configurations: {err}"));
            }
            boot.state.with(|map| {
                if map.samples().is_empty() {
                    println!("No sample configurations available.");
                }
                for sample in map.samples() {
                    println!(
                        "{}  {}",
                        sample.id.as_deref().unwrap_or("-"),
                        sample.label.as_deref().unwrap_or("(unnamed)")
                    );
                }
            });
        }
        Command::Save => {
            let boot = bootstrap::run(&app_config, options.sample_map_id.as_deref())
                .map_err(|err| err.to_string())?;
            seed::load_sample_data(&boot.state).map_err(|err| err.to_string())?;
            let receipt = export::save_to_backend(&boot.backend, &boot.state)
                .map_err(|err| format!("Save failed: {err}"))?;
            println!("{}", receipt.message);
        }
        Command::Export => {
            let state = SharedMapState::new();
            seed::load_sample_data(&state).map_err(|err| err.to_string())?;
            let out = options
                .out
                .unwrap_or_else(|| PathBuf::from(export::DEFAULT_EXPORT_FILE));
            export::write_to_file(&state, &out).map_err(|err| err.to_string())?;
            println!("Wrote {}", out.display());
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Samples,
    Save,
    Export,
}

#[derive(Debug)]
struct Options {
    command: Command,
    sample_map_id: Option<String>,
    config_path: Option<PathBuf>,
    base_url: Option<String>,
    out: Option<PathBuf>,
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    let mut command = None;
    let mut sample_map_id = None;
    let mut config_path = None;
    let mut base_url = None;
    let mut out = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--id" => {
                sample_map_id = Some(take_value(&args, &mut idx, "--id")?);
            }
            "--config" => {
                config_path = Some(PathBuf::from(take_value(&args, &mut idx, "--config")?));
            }
            "--base-url" => {
                base_url = Some(take_value(&args, &mut idx, "--base-url")?);
            }
            "--out" => {
                out = Some(PathBuf::from(take_value(&args, &mut idx, "--out")?));
            }
            "samples" if command.is_none() => command = Some(Command::Samples),
            "save" if command.is_none() => command = Some(Command::Save),
            "export" if command.is_none() => command = Some(Command::Export),
            other => return Err(format!("Unknown argument: {other}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let Some(command) = command else {
        println!("{}", help_text());
        return Ok(None);
    };
    Ok(Some(Options {
        command,
        sample_map_id,
        config_path,
        base_url,
        out,
    }))
}

fn take_value(args: &[String], idx: &mut usize, flag: &str) -> Result<String, String> {
    *idx += 1;
    args.get(*idx)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn help_text() -> String {
    [
        "mapstash - demo client for the map-configuration save backend",
        "",
        "Usage: mapstash <COMMAND> [OPTIONS]",
        "",
        "Commands:",
        "  samples   List the sample configurations the backend offers",
        "  save      Seed the demo datasets and save the configuration",
        "  export    Seed the demo datasets and write the payload to a file",
        "",
        "Options:",
        "  --id <SAMPLE_MAP_ID>   Narrow the sample fetch to one map id",
        "  --config <PATH>        Read configuration from PATH",
        "  --base-url <URL>       Override the backend base URL",
        "  --out <PATH>           Output file for export (default kepler.gl.json)",
        "  -h, --help             Show this help",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_and_flags() {
        let options = parse_args(vec![
            "save".to_string(),
            "--id".to_string(),
            "nyc".to_string(),
            "--base-url".to_string(),
            "http://backend:9000".to_string(),
        ])
        .unwrap()
        .unwrap();
        assert_eq!(options.command, Command::Save);
        assert_eq!(options.sample_map_id.as_deref(), Some("nyc"));
        assert_eq!(options.base_url.as_deref(), Some("http://backend:9000"));
    }

    #[test]
    fn rejects_flags_without_values() {
        let err = parse_args(vec!["samples".to_string(), "--id".to_string()]).unwrap_err();
        assert!(err.contains("--id"));
    }

    #[test]
    fn rejects_unknown_arguments() {
        let err = parse_args(vec!["upload".to_string()]).unwrap_err();
        assert!(err.contains("upload"));
    }
}
