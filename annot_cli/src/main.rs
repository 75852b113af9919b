mod commands;
mod prompt;
mod session;
mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

#[derive(Parser)]
#[command(name = "annot")]
#[command(about = "Create and retrieve Nobl9 SLO annotations from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the sloctl config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively create annotations across a set of SLOs
    Create {
        /// Context name from the sloctl config (prompted when omitted)
        #[arg(short, long)]
        context: Option<String>,
    },

    /// Fetch annotations for a time window, analyze and export them
    Fetch {
        /// Context name from the sloctl config (prompted when omitted)
        #[arg(short, long)]
        context: Option<String>,

        /// Relative window ending now (e.g. 24h, 7d)
        #[arg(long, conflicts_with_all = ["from", "to", "day"])]
        since: Option<String>,

        /// Window start (RFC3339), paired with --to
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Window end (RFC3339)
        #[arg(long)]
        to: Option<String>,

        /// A single day (YYYY-MM-DD)
        #[arg(long, conflicts_with_all = ["from", "to"])]
        day: Option<String>,

        /// Export everything without prompting (csv, json, markdown)
        #[arg(short, long)]
        format: Option<String>,

        /// Export directory
        #[arg(short, long, default_value = "export_annotations")]
        output_dir: PathBuf,
    },

    /// List authentication contexts from the sloctl config
    Contexts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    // Console output plus a session log file under ./annotation_logs.
    std::fs::create_dir_all("annotation_logs")?;
    let file_appender = tracing_appender::rolling::daily("annotation_logs", "annot.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_filter(LevelFilter::from_level(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(LevelFilter::DEBUG),
        )
        .init();

    match cli.command {
        Commands::Create { context } => {
            commands::create::execute(cli.config, context).await?;
        }

        Commands::Fetch {
            context,
            since,
            from,
            to,
            day,
            format,
            output_dir,
        } => {
            commands::fetch::execute(
                cli.config, context, since, from, to, day, format, output_dir,
            )
            .await?;
        }

        Commands::Contexts => {
            commands::contexts::execute(cli.config).await?;
        }
    }

    Ok(())
}
