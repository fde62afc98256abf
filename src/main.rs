// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use serde_json::Value;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use storyfy::app_config::{self, Config};
use storyfy::app_controller::{flatten_file, Controller};
use storyfy::handlers::ResponseEnvelope;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a Final Draft screenplay, flatten it and run the evaluation
    Convert {
        /// Screenplay file (.fdx)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Run an entry point on a JSON event (file or stdin)
    Invoke {
        /// Entry point name, e.g. script_evaluator
        function: String,

        /// JSON event file; read from stdin when omitted
        #[arg(value_name = "EVENT")]
        event: Option<PathBuf>,
    },

    /// Sanitize and flatten a screenplay locally and print the lines
    Flatten {
        /// Screenplay file (.fdx)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the stored JSON form instead of plain lines
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions for storyfy
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Storyfy - screenplay coverage pipeline
///
/// Converts Final Draft screenplays into flattened text and sends them to
/// language models for script coverage.
#[derive(Parser, Debug)]
#[command(name = "storyfy")]
#[command(version)]
#[command(about = "Screenplay conversion and AI script coverage")]
#[command(long_about = "Storyfy converts Final Draft (.fdx) screenplays into flattened text and evaluates them with language models.

EXAMPLES:
    storyfy convert script.fdx                          # Convert, store and evaluate
    storyfy --dry-run convert script.fdx                # Same with in-memory storage and mock models
    storyfy flatten script.fdx                          # Print the flattened lines only
    storyfy invoke call_model event.json                # Run one entry point on an event
    storyfy completions bash > storyfy.bash             # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. S3_BUCKET_NAME and EVALUATOR_FUNCTION override
    the upload bucket and the evaluator function name.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Upload bucket (overrides configuration and environment)
    #[arg(long, global = true)]
    bucket: Option<String>,

    /// Evaluator function name (overrides configuration and environment)
    #[arg(long, global = true)]
    evaluator_function: Option<String>,

    /// Use in-memory storage and mock models; the config file is not read
    #[arg(long, global = true)]
    dry_run: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour of a level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    run(CommandLineOptions::parse()).await
}

// @runs: One CLI command
async fn run(cli: CommandLineOptions) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "storyfy", &mut std::io::stdout());
        return Ok(());
    }

    // Local only: model credentials and storage settings are not needed
    if let Commands::Flatten { file, json } = &cli.command {
        let config = read_config(&cli)?;
        return print_flattened(file, *json, &config.evaluation.annotation_tag);
    }

    let config = load_config(&cli)?;
    let controller = Controller::with_config(config).context("Failed to initialize pipeline")?;

    match cli.command {
        Commands::Convert { file } => {
            let envelope = controller.convert_file(&file).await?;
            print_envelope(&envelope)
        }
        Commands::Invoke { function, event } => {
            let event = read_event(event.as_deref())?;
            let envelope = controller.invoke(&function, event).await?;
            print_envelope(&envelope)
        }
        Commands::Flatten { .. } | Commands::Completions { .. } => Ok(()),
    }
}

// @returns: Configuration with environment and CLI overrides applied, not validated
fn read_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = if cli.dry_run {
        info!("Dry run: in-memory storage and mock models");
        Config::for_dry_run()
    } else {
        Config::load_or_create(&cli.config)
            .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?
    };

    config.apply_env_overrides();
    config.apply_overrides(cli.bucket.clone(), cli.evaluator_function.clone());
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level.into();
    }
    log::set_max_level(level_filter(&config.log_level));
    Ok(config)
}

// @returns: Validated configuration
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let config = read_config(cli)?;
    config.validate().context("Invalid configuration")?;
    debug!("Configuration loaded: {} model(s)", config.models.len());
    Ok(config)
}

fn print_flattened(file: &Path, json: bool, annotation_tag: &str) -> Result<()> {
    let script = flatten_file(file, annotation_tag)?;
    if json {
        println!("{}", script.to_json_pretty().context("Failed to serialize script")?);
    } else {
        for line in &script.content {
            println!("{}", line);
        }
    }
    info!("Flattened {:?} into {} line(s)", file, script.len());
    Ok(())
}

// @returns: Event parsed from a file, or from stdin when no path is given
fn read_event(path: Option<&Path>) -> Result<Value> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read event file: {:?}", path))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read event from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&content).context("Event is not valid JSON")
}

fn print_envelope(envelope: &ResponseEnvelope) -> Result<()> {
    let output = serde_json::json!({
        "statusCode": envelope.status_code,
        "body": envelope.body_json(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if envelope.is_success() {
        Ok(())
    } else {
        let message = envelope.error_message().unwrap_or_else(|| envelope.body.clone());
        error!("Entry point answered {}: {}", envelope.status_code, message);
        Err(anyhow!("Request failed with status {}", envelope.status_code))
    }
}
