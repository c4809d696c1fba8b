use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gcput::command::instance::DiskSelector;
use gcput::config::Config;
use gcput::convert::{parse_document, ConvertReport, Converter, InputFormat};
use gcput::resource::ResourceKind;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Print the gcloud commands that recreate exported GCP resources
#[derive(Parser, Debug)]
#[command(name = "gcput", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    resource: ResourceCommand,

    /// Log level for debugging (written to the gcput log file)
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
enum ResourceCommand {
    /// Firewall rules from `gcloud compute firewall-rules list --format=json`
    FirewallRules {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Instances from `gcloud compute instances list --format=json`
    Instances {
        #[command(flatten)]
        input: InputArgs,

        /// Disk types to delete with the instance, regardless of auto-delete
        #[arg(long, value_enum)]
        delete_disk_type: Option<DiskSelector>,

        /// Disk types to keep with the instance, regardless of auto-delete
        #[arg(long, value_enum)]
        keep_disk_type: Option<DiskSelector>,

        /// Also emit --network-interface flags
        #[arg(long)]
        network_interfaces: bool,
    },
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Exported files to convert; stdin when omitted or `-`
    files: Vec<PathBuf>,

    /// Print "create" commands (the default when neither -c nor -d is given)
    #[arg(short, long)]
    create: bool,

    /// Print "delete" commands
    #[arg(short, long)]
    delete: bool,

    /// Input format; guessed from the file extension otherwise, JSON for stdin
    #[arg(long, value_enum)]
    input_format: Option<InputFormat>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.to_string().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gcput started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gcput").join("gcput.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcput").join("gcput.log");
    }
    PathBuf::from("gcput.log")
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let config = Config::load();

    let (converter, input) = match args.resource {
        ResourceCommand::FirewallRules { input } => (
            Converter::new(ResourceKind::FirewallRules).with_modes(input.create, input.delete),
            input,
        ),
        ResourceCommand::Instances {
            input,
            delete_disk_type,
            keep_disk_type,
            network_interfaces,
        } => (
            Converter::new(ResourceKind::Instances)
                .with_modes(input.create, input.delete)
                .with_delete_options(
                    config.effective_delete_options(delete_disk_type, keep_disk_type),
                )
                .with_network_interfaces(config.effective_network_interfaces(network_interfaces)),
            input,
        ),
    };

    tracing::debug!("Converter: {:?}", converter);

    let sources: Vec<Option<PathBuf>> = if input.files.is_empty() {
        vec![None]
    } else {
        input
            .files
            .iter()
            .map(|f| (f.as_os_str() != "-").then(|| f.clone()))
            .collect()
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut failed = false;

    for source in &sources {
        let label = source
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<stdin>".to_string());

        let report = match convert_source(&converter, source.as_deref(), input.input_format) {
            Ok(report) => report,
            Err(err) => {
                tracing::error!("{}: {:#}", label, err);
                eprintln!("gcput: {}: {:#}", label, err);
                failed = true;
                continue;
            }
        };

        for line in &report.lines {
            writeln!(out, "{}", line)?;
        }

        for err in &report.errors {
            eprintln!("gcput: {}: {}", label, err);
        }
        failed |= !report.is_success();
    }

    out.flush()?;

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn convert_source(
    converter: &Converter,
    path: Option<&Path>,
    format: Option<InputFormat>,
) -> Result<ConvertReport> {
    let (text, guessed) = match path {
        Some(path) => (
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?,
            InputFormat::from_path(path),
        ),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            (text, None)
        }
    };

    let format = format.or(guessed).unwrap_or_default();
    let records = parse_document(&text, format)?;
    tracing::info!("Loaded {} record(s), format {:?}", records.len(), format);

    Ok(converter.convert_all(&records))
}
