//! Purpose: `r5t-job` CLI entry point for inspecting a worker's job data file.
//! Role: Binary crate root; parses args, runs one lookup, emits results on stdout.
//! Invariants: Values are printed as JSON (job ids as a bare line) on stdout.
//! Invariants: Non-interactive errors and notices are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

use r5t_worker_sdk::api::{
    DEFAULT_DATA_PATH, Error, ErrorKind, JobConfigReader, MissingParamPolicy, Notice, NoticeSink,
    to_exit_code,
};
use r5t_worker_sdk::notice::notice_json;

#[derive(Parser)]
#[command(
    name = "r5t-job",
    version,
    about = "Read the job id and params handed to an r5t worker",
    after_help = r#"EXAMPLES
  $ r5t-job job-id
  $ r5t-job param start_date --fallback 2000
  $ r5t-job --data ./example-data.json show --pretty

NOTES
  - Default data path: /input/data.json (override with --data or R5T_DATAPATH)
  - A missing data file makes `param` print its fallback; malformed files always fail"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        env = "R5T_DATAPATH",
        default_value = DEFAULT_DATA_PATH,
        help = "Path to the job data file",
        value_hint = ValueHint::FilePath
    )]
    data: PathBuf,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum MissingMode {
    Error,
    Fallback,
}

impl From<MissingMode> for MissingParamPolicy {
    fn from(mode: MissingMode) -> Self {
        match mode {
            MissingMode::Error => MissingParamPolicy::Error,
            MissingMode::Fallback => MissingParamPolicy::Fallback,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Print the job id")]
    JobId,
    #[command(
        about = "Print one param as JSON",
        after_help = r#"EXAMPLES
  $ r5t-job param start_date --fallback 2000
  $ r5t-job param region --fallback '"us-east-1"'
  $ r5t-job param retries --missing fallback --fallback 3"#
    )]
    Param {
        #[arg(help = "Param name to look up")]
        name: String,
        #[arg(
            long,
            default_value = "null",
            help = "JSON value printed when the data file is absent"
        )]
        fallback: String,
        #[arg(
            long,
            default_value = "error",
            value_enum,
            help = "What to do when the file parses but the param is absent"
        )]
        missing: MissingMode,
    },
    #[command(about = "Print the validated job data document")]
    Show {
        #[arg(long, help = "Pretty-print the JSON output")]
        pretty: bool,
    },
}

struct CliNotices {
    color_mode: ColorMode,
}

impl NoticeSink for CliNotices {
    fn emit(&self, notice: &Notice) {
        emit_notice(notice, self.color_mode);
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(code) => code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<i32, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(exit_code);
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Run `r5t-job --help` for usage."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let reader = JobConfigReader::new()
        .with_path(cli.data)
        .with_notice_sink(Arc::new(CliNotices { color_mode }));

    run_command(cli.command, reader)
        .map(|()| 0)
        .map_err(|err| (err, color_mode))
}

fn run_command(command: Command, reader: JobConfigReader) -> Result<(), Error> {
    match command {
        Command::JobId => {
            let job_id = reader.job_id()?;
            println!("{job_id}");
        }
        Command::Param {
            name,
            fallback,
            missing,
        } => {
            let fallback = parse_fallback(&fallback)?;
            let value = reader
                .with_missing_param_policy(missing.into())
                .param_value(&name, fallback)?;
            println!("{}", encode_json(&value, false)?);
        }
        Command::Show { pretty } => {
            let config = reader.load()?;
            let value = serde_json::to_value(&config).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to encode job data")
                    .with_source(err)
            })?;
            println!("{}", encode_json(&value, pretty)?);
        }
    }
    Ok(())
}

fn parse_fallback(text: &str) -> Result<Value, Error> {
    serde_json::from_str(text).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("--fallback must be a JSON value")
            .with_hint("Quote strings as JSON, e.g. --fallback '\"text\"'.")
            .with_source(err)
    })
}

fn encode_json(value: &Value, pretty: bool) -> Result<String, Error> {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    encoded.map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("json encode failed")
            .with_source(err)
    })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or("invalid arguments");
    first.trim_start_matches("error: ").trim().to_string()
}

#[derive(Copy, Clone)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {} (path: {})", notice.message, notice.path);
        return;
    }

    let json = serde_json::to_string(&notice_json(notice)).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "job data file not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
        ErrorKind::Parse => "job data file is not valid JSON".to_string(),
        ErrorKind::MissingField => "required field missing".to_string(),
        ErrorKind::MissingParam => "param not set".to_string(),
        ErrorKind::TypeMismatch => "unexpected value type".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(field) = err.field() {
        inner.insert("field".to_string(), json!(field));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    if let Some(column) = err.column() {
        inner.insert("column".to_string(), json!(column));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(field) = err.field() {
        lines.push(format!(
            "{} {field}",
            colorize_label("field:", use_color, AnsiColor::Yellow)
        ));
    }
    if let (Some(line), Some(column)) = (err.line(), err.column()) {
        lines.push(format!(
            "{} line {line}, column {column}",
            colorize_label("at:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}
