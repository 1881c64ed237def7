//! ocp - Object Copy
//!
//! A parallel copy/move command between local files and an object store,
//! powered by objcp.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use objcp::{
    BatchStats, Clients, CompletionRecord, Context, DirObjectStore, Error as ObjcpError, Location,
    Operation, StorageClass, TransferOptions, TransferRequest, transfer,
};
use serde_json::{Value, json};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// ocp - Parallel object copy
///
/// Copy or move files and objects between the local filesystem and an
/// object store. Sources may contain glob characters (`*`, `?`, `[`).
///
/// Usage:
///   ocp cp SOURCE DEST
///   ocp mv 's3://bucket/logs/*.gz' archive/
#[derive(Parser, Debug)]
#[command(name = "ocp", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Number of parallel transfers
    #[arg(short = 'j', long, global = true, default_value = "16")]
    jobs: usize,

    /// Root directory of the object store backing `s3://` locations
    ///
    /// Objects live at `<root>/<bucket>/<key>`.
    #[arg(long, global = true, env = "OCP_REMOTE_ROOT", value_name = "DIR")]
    remote_root: Option<PathBuf>,

    /// Output format for completion records
    #[arg(long, global = true, value_enum, default_value = "human")]
    output: OutputMode,

    /// Suppress the progress spinner
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Show debug logs and a summary
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy objects
    Cp(TransferArgs),
    /// Move objects (each source is deleted after it was transferred)
    Mv(TransferArgs),
}

impl Command {
    fn split(self) -> (Operation, TransferArgs) {
        match self {
            Self::Cp(args) => (Operation::Copy, args),
            Self::Mv(args) => (Operation::Move, args),
        }
    }
}

#[derive(clap::Args, Debug)]
struct TransferArgs {
    /// Source file, directory, object or glob pattern
    source: String,

    /// Destination file, directory, object or prefix
    destination: String,

    /// Do not overwrite an existing destination
    #[arg(short = 'n', long)]
    no_clobber: bool,

    /// Only overwrite if the sizes differ
    #[arg(short = 's', long)]
    if_size_differ: bool,

    /// Only overwrite if the source is newer
    #[arg(short = 'u', long)]
    if_source_newer: bool,

    /// Keep the directory structure below the source's glob root
    #[arg(long)]
    parents: bool,

    /// Descend into subdirectories and prefixes
    #[arg(short = 'R', long)]
    recursive: bool,

    /// Storage class for objects written to the object store
    #[arg(long, value_name = "CLASS")]
    storage_class: Option<StorageClass>,
}

impl TransferArgs {
    fn to_options(&self, jobs: usize) -> TransferOptions {
        let mut options = TransferOptions::default().with_parallel(jobs);
        if self.no_clobber {
            options = options.with_no_clobber();
        }
        if self.if_size_differ {
            options = options.with_if_size_differ();
        }
        if self.if_source_newer {
            options = options.with_if_source_newer();
        }
        if self.recursive {
            options = options.with_recursive();
        }
        if self.parents {
            options = options.with_parents();
        }
        if let Some(class) = self.storage_class {
            options = options.with_storage_class(class);
        }
        options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputMode {
    Human,
    Jsonl,
}

impl OutputMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Jsonl => "jsonl",
        }
    }
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Transfer(#[from] ObjcpError),

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Transfer(ObjcpError::Cancelled) => 130,
            Self::Transfer(
                ObjcpError::GlobInDestination(_)
                | ObjcpError::InvalidLocation { .. }
                | ObjcpError::InvalidStorageClass(_)
                | ObjcpError::RemoteNotConfigured(_),
            ) => 2,
            _ => 1,
        }
    }
}

fn main() {
    if let Err(error) = run() {
        match &error {
            CliError::Transfer(ObjcpError::Cancelled) => eprintln!("Cancelled."),
            _ => eprintln!("ERROR {error}"),
        }
        std::process::exit(error.exit_code());
    }
}

fn run() -> CliResult<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let Args {
        command,
        jobs,
        remote_root,
        output,
        quiet,
        verbose,
    } = args;
    let (operation, transfer_args) = command.split();

    let source = Location::parse(&transfer_args.source)?;
    let destination = Location::parse(&transfer_args.destination)?;
    if destination.has_glob() {
        return Err(ObjcpError::GlobInDestination(destination).into());
    }

    let clients = match remote_root {
        Some(root) => Clients::new(Arc::new(DirObjectStore::new(root))),
        None => {
            if let Some(remote) = [&source, &destination].into_iter().find(|l| l.is_remote()) {
                return Err(ObjcpError::RemoteNotConfigured(remote.clone()).into());
            }
            Clients::local_only()
        }
    };

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel_clone = cancel.clone();
        ctrlc::set_handler(move || {
            if cancel_clone.load(Ordering::Relaxed) {
                eprintln!("\nForce quit.");
                std::process::exit(130);
            }
            cancel_clone.store(true, Ordering::Relaxed);
            eprintln!(
                "\nCancelling... finishing in-flight transfers. Press Ctrl+C again to abort immediately."
            );
        })
        .ok();
    }
    let ctx = Context::with_cancel_token(cancel);

    let pb = if output == OutputMode::Human && !quiet && std::io::stderr().is_terminal() {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner().template("{spinner:.green} {msg}");
        if let Ok(style) = style {
            pb.set_style(style);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_message(format!("{} {}...", operation.label(), source));
            Some(pb)
        } else {
            None
        }
    } else {
        None
    };

    let printer = pb.clone();
    let options = transfer_args
        .to_options(jobs)
        .with_on_complete(move |record| {
            let emit = || {
                if let Err(error) = emit_record(output, record) {
                    tracing::error!(%error, "failed to write completion record");
                }
            };
            match &printer {
                Some(pb) => pb.suspend(emit),
                None => emit(),
            }
        });

    tracing::debug!(
        op = operation.label(),
        src = %source,
        dst = %destination,
        jobs,
        output = output.as_str(),
        "starting"
    );

    let request = TransferRequest::new(source, destination)
        .with_operation(operation)
        .with_options(options);

    let start_time = Instant::now();
    let result = transfer(&ctx, &clients, &request);
    let duration = start_time.elapsed();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    match result {
        Ok(stats) => {
            if verbose && output == OutputMode::Human {
                print_stats(&stats, duration);
            }
            Ok(())
        }
        Err(ObjcpError::Batch(batch)) => {
            if verbose && output == OutputMode::Human {
                print_stats(&batch.stats, duration);
            }
            Err(ObjcpError::Batch(batch).into())
        }
        Err(error) => Err(error.into()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn emit_record(output: OutputMode, record: &CompletionRecord) -> CliResult<()> {
    match output {
        OutputMode::Human => {
            println!(
                "{} {} {}",
                record.operation, record.source, record.destination
            );
            Ok(())
        }
        OutputMode::Jsonl => print_json_value(&record_to_json(record)),
    }
}

fn record_to_json(record: &CompletionRecord) -> Value {
    json!({
        "operation": record.operation.label(),
        "source": record.source.to_string(),
        "destination": record.destination.to_string(),
        "size": record.size,
        "storage_class": record.storage_class.map(StorageClass::as_str),
    })
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn print_stats(stats: &BatchStats, duration: Duration) {
    eprintln!("Completed in {duration:?}");
    eprintln!("  Transferred:  {}", stats.transferred);
    eprintln!("  Skipped:      {}", stats.skipped);
    eprintln!("  Failed:       {}", stats.failed);
    if stats.enumeration_errors > 0 {
        eprintln!("  List errors:  {}", stats.enumeration_errors);
    }
    eprintln!("  Total size:   {}", format_bytes(stats.bytes));
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
