//! CLI entry point for `pstreport`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use pstreport::config::Config;
use pstreport::container::loader::ContainerKind;
use pstreport::export::{FolderExporter, OutputLayout};
use pstreport::traverse::{ExclusionList, Traversal, TraversalSummary};

#[derive(Parser)]
#[command(
    name = "pstreport",
    version,
    about = "Per-folder CSV and body reports from PST/OST mailbox archives"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Folder exclusion flags shared by `export` and `tree`.
#[derive(Args)]
struct ExclusionArgs {
    /// Additional folder name to skip (repeatable)
    #[arg(short, long = "exclude", value_name = "NAME")]
    exclude: Vec<String>,
    /// Start from an empty exclusion list
    #[arg(long)]
    no_default_excludes: bool,
}

impl ExclusionArgs {
    fn resolve(&self, config: &Config) -> ExclusionList {
        config
            .traversal
            .exclusions_with(self.no_default_excludes, &self.exclude)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write folder_report_<folder>.csv and message_body_<folder>.txt for every folder
    Export {
        /// Container file (.pst, .ost, or .json snapshot)
        path: PathBuf,
        /// Output directory [default: ./output]
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Container backend: auto, snapshot, pst
        #[arg(short, long, default_value = "auto")]
        kind: ContainerKind,
        #[command(flatten)]
        exclusions: ExclusionArgs,
        /// Do not walk below excluded folders
        #[arg(long)]
        skip_excluded_children: bool,
        /// Use folder names in file names as-is
        #[arg(long)]
        raw_names: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the folder tree with message counts
    Tree {
        path: PathBuf,
        #[arg(short, long, default_value = "auto")]
        kind: ContainerKind,
        #[command(flatten)]
        exclusions: ExclusionArgs,
        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration file
    InitConfig,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = pstreport::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Export {
            path,
            output,
            kind,
            exclusions,
            skip_excluded_children,
            raw_names,
            json,
        } => {
            let traversal = Traversal::new(
                exclusions.resolve(&config),
                skip_excluded_children || config.traversal.skip_excluded_children,
            );
            let output = output.unwrap_or_else(|| config.export.output_dir.clone());
            let sanitize = config.export.sanitize_names && !raw_names;
            cmd_export(&path, kind, &traversal, &output, sanitize, &config, json)
        }
        Commands::Tree {
            path,
            kind,
            exclusions,
            json,
        } => cmd_tree(&path, kind, &exclusions.resolve(&config), json),
        Commands::InitConfig => cmd_init_config(&config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = pstreport::config::log_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "pstreport.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Walk the container and write all folder reports.
fn cmd_export(
    path: &Path,
    kind: ContainerKind,
    traversal: &Traversal,
    output: &Path,
    sanitize: bool,
    config: &Config,
    json: bool,
) -> anyhow::Result<()> {
    let layout = OutputLayout::new(output, sanitize)?;
    let exporter = FolderExporter::new(
        layout,
        &config.export.date_format,
        &config.export.body_charset,
    )?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Opening {}", path.display()));

    let start = Instant::now();
    let result = pstreport::report::export_file(path, kind, traversal, &exporter, &|folder| {
        pb.set_message(format!("Processing folder: {folder}"));
    });
    pb.finish_and_clear();
    let summary = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(path, exporter.layout().dir(), &summary, start.elapsed());
    }

    Ok(())
}

/// Print the folder hierarchy.
fn cmd_tree(
    path: &Path,
    kind: ContainerKind,
    exclusions: &ExclusionList,
    json: bool,
) -> anyhow::Result<()> {
    let tree = pstreport::report::inventory_file(path, kind, exclusions)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        println!();
        print!("{}", tree.render());
        println!();
        println!(
            "  {} folder(s), {} message(s)",
            tree.descendant_count(),
            tree.total_messages()
        );
        println!();
    }
    Ok(())
}

/// Write the active configuration to the config file location.
fn cmd_init_config(config: &Config) -> anyhow::Result<()> {
    let path = pstreport::config::save_config(config)?;
    println!("  Wrote {}", path.display());
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "pstreport", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Print the run summary as a human-readable table.
fn print_summary(path: &Path, output: &Path, summary: &TraversalSummary, elapsed: Duration) {
    use humansize::{format_size, BINARY};

    println!();
    println!("  {:<25} {}", "Container", path.display());
    println!("  {:<25} {}", "Output directory", output.display());
    println!("  {:<25} {}", "Folders visited", summary.folders_visited);
    println!("  {:<25} {}", "Folders exported", summary.folders_exported);
    println!("  {:<25} {}", "Folders excluded", summary.folders_excluded);
    println!("  {:<25} {}", "Folders without bodies", summary.folders_empty);
    println!("  {:<25} {}", "Messages", summary.messages);
    println!("  {:<25} {}", "Messages with body", summary.messages_with_body);
    println!(
        "  {:<25} {} ({})",
        "Files written",
        summary.files_written,
        format_size(summary.bytes_written, BINARY)
    );
    println!("  {:<25} {:.2?}", "Elapsed", elapsed);

    if !summary.outcomes.is_empty() {
        println!();
        println!("    {:>6}  Folder", "Bodies");
        for outcome in &summary.outcomes {
            if outcome.messages == 0 {
                println!("    {:>6}  {} (empty)", "-", outcome.folder);
            } else {
                println!("    {:>6}  {}", outcome.with_body, outcome.folder);
            }
        }
    }
    println!();
}
