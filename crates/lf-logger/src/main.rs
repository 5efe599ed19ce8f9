//! lf-filter - apply a logger config's payload filters from the command line.
//!
//! Reads a payload from a file or stdin, shortens or trims it for one
//! handler, and writes the result to stdout. Diagnostics go to stderr in the
//! configured log format.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use lf_logger::exit_codes::ExitCode;
use lf_logger::{ConfigError, Logger, LoggerConfig};

/// Shorten or redact JSON payloads the way the logger would.
#[derive(Parser)]
#[command(name = "lf-filter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Logger config file (.json or .toml)
    #[arg(long, short = 'c', global = true, env = "LF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep only the handler's logged fields
    Shorten(FilterArgs),
    /// Mask the handler's trimmed fields
    Trim(FilterArgs),
    /// Validate the config and print a summary
    Check,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Handler name (case-insensitive)
    #[arg(long)]
    handler: String,

    /// Payload file; stdin when omitted
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Ok
            };
            std::process::exit(code.as_i32());
        }
    };

    let exit_code = run(&cli);
    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli) -> ExitCode {
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return output_error(ExitCode::ConfigError, &err.to_string()),
    };

    let (logger, _guard) = match Logger::new(config.clone()) {
        Ok(pair) => pair,
        Err(err) => return output_error(ExitCode::ConfigError, &err.to_string()),
    };

    match &cli.command {
        Commands::Shorten(args) => run_filter(&logger, args, |handler, body| {
            config.shortener().shorten(handler, body).into_owned()
        }),
        Commands::Trim(args) => run_filter(&logger, args, |handler, body| {
            config.trimmer().trim(handler, body).into_owned()
        }),
        Commands::Check => run_check(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<LoggerConfig, ConfigError> {
    let config = match path {
        Some(path) => LoggerConfig::load(path)?,
        None => LoggerConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn run_filter<F>(logger: &Logger, args: &FilterArgs, filter: F) -> ExitCode
where
    F: FnOnce(&str, &[u8]) -> Vec<u8>,
{
    let body = match read_input(args.input.as_deref()) {
        Ok(body) => body,
        Err(err) => return output_error(ExitCode::IoError, &format!("reading input: {}", err)),
    };

    let out = logger.in_scope(|| {
        let out = filter(&args.handler, &body);
        tracing::debug!(
            handler = args.handler.as_str(),
            bytes_in = body.len(),
            bytes_out = out.len(),
            "payload filtered"
        );
        out
    });

    let mut stdout = io::stdout().lock();
    match stdout.write_all(&out).and_then(|()| stdout.flush()) {
        Ok(()) => ExitCode::Ok,
        Err(err) => output_error(ExitCode::IoError, &format!("writing output: {}", err)),
    }
}

fn read_input(path: Option<&Path>) -> io::Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path),
        None => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run_check(config: &LoggerConfig) -> ExitCode {
    let mut logged: Vec<String> = config
        .shortener()
        .config()
        .handlers()
        .map(str::to_string)
        .collect();
    logged.sort();
    let mut trimmed: Vec<String> = config
        .trimmer()
        .config()
        .handlers()
        .map(str::to_string)
        .collect();
    trimmed.sort();

    let response = serde_json::json!({
        "status": "valid",
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "service": config.service_name(),
        "level": config.level,
        "format": config.format,
        "timestamps": config.timestamps,
        "logged_handlers": logged,
        "trimmed_handlers": trimmed,
        "shadowed_trimmed_handlers": config.shadowed_trimmed_handlers(),
    });

    match serde_json::to_string_pretty(&response) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Ok
        }
        Err(err) => output_error(ExitCode::IoError, &err.to_string()),
    }
}

/// Print a JSON error to stderr and return `code`.
fn output_error(code: ExitCode, message: &str) -> ExitCode {
    let response = serde_json::json!({
        "status": "error",
        "error": {
            "code": code.code_name(),
            "message": message,
        }
    });
    eprintln!("{}", response);
    code
}
