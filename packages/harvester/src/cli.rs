//! Command-line interface for the harvester.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::FetchConfig;
use crate::error::{HarvesterError, Result};
use crate::http::create_client;
use crate::link::Link;
use crate::loader::Harvest;
use crate::persist::{save_all, SaveMode, SaveOptions};
use crate::sources::{build_loader, LoaderOptions, Source};

/// legaldata harvester - Enumerate and download Japanese regulatory documents.
#[derive(Parser)]
#[command(name = "legaldata-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the links a source currently publishes, one JSON object per line.
    List {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Download every link of a source with its metadata.
    Download {
        #[command(flatten)]
        target: TargetArgs,

        /// Output directory; each link is stored in a numbered subdirectory
        #[arg(short, long)]
        output: PathBuf,

        /// Store extracted text instead of the raw content
        #[arg(long)]
        text: bool,

        /// Number of concurrent downloads (default: LEGALDATA_JOBS or 4)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
}

/// Source selection shared by every command.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Site to harvest
    #[arg(value_enum)]
    pub source: Source,

    /// Year (default: current year)
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Law list category (egov) or press release category (sesc-houdou)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Web handbook type id (jsda-handbook)
    #[arg(long)]
    pub type_id: Option<String>,

    /// Report section (dir-report)
    #[arg(long)]
    pub keyword: Option<String>,

    /// Report subsection (dir-report)
    #[arg(long)]
    pub sub_keyword: Option<String>,

    /// Page to harvest instead of the default (jpx-rule, jsda)
    #[arg(long)]
    pub url: Option<String>,

    /// Site root override, used to point loaders at a mirror
    #[arg(long, hide = true)]
    pub base_url: Option<String>,
}

impl From<TargetArgs> for LoaderOptions {
    fn from(args: TargetArgs) -> Self {
        Self {
            year: args.year,
            category: args.category,
            type_id: args.type_id,
            keyword: args.keyword,
            sub_keyword: args.sub_keyword,
            url: args.url,
            base_url: args.base_url,
        }
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = FetchConfig::from_env();

    match cli.command {
        Commands::List { target } => list_command(target, &config),
        Commands::Download {
            target,
            output,
            text,
            jobs,
        } => {
            let config = match jobs {
                Some(jobs) => config.with_jobs(jobs),
                None => config,
            };
            let mode = if text { SaveMode::Text } else { SaveMode::Raw };
            download_command(target, &output, mode, &config)
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Enumerate the links of a source behind a spinner on stderr.
fn collect_links(target: TargetArgs, config: &FetchConfig) -> Result<Harvest<Link>> {
    let source = target.source;
    let client = create_client(config)?;

    let pb = spinner(format!("Collecting links from {source}..."));
    let result = build_loader(&client, source, &target.into()).and_then(|l| l.harvest());
    pb.finish_and_clear();

    let harvest = result?;
    tracing::info!(
        %source,
        links = harvest.items.len(),
        warnings = harvest.warning_count(),
        "Collected links"
    );
    Ok(harvest)
}

/// Execute the list command.
fn list_command(target: TargetArgs, config: &FetchConfig) -> Result<()> {
    let harvest = collect_links(target, config)?;

    for link in &harvest.items {
        println!("{}", serde_json::Value::Object(link.payload()?));
    }
    if !harvest.warnings.is_empty() {
        eprintln!(
            "{} {}",
            style("Skipped entries:").yellow().bold(),
            harvest.warning_count()
        );
    }
    Ok(())
}

/// Check the output location before any request is made.
fn prepare_output_dir(output: &Path) -> Result<()> {
    if output.exists() && !output.is_dir() {
        return Err(HarvesterError::InvalidOutputDir {
            path: output.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }
    std::fs::create_dir_all(output)?;
    Ok(())
}

/// Execute the download command.
fn download_command(
    target: TargetArgs,
    output: &Path,
    mode: SaveMode,
    config: &FetchConfig,
) -> Result<()> {
    prepare_output_dir(output)?;

    let source = target.source;
    println!(
        "{} {} into {}",
        style("Downloading").bold(),
        style(source).cyan(),
        style(output.display()).green()
    );

    let harvest = collect_links(target, config)?;
    println!("  Links: {}", harvest.items.len());
    if !harvest.warnings.is_empty() {
        println!(
            "  Skipped entries: {}",
            style(harvest.warning_count()).yellow().bold()
        );
    }

    let client = create_client(config)?;
    let pb = ProgressBar::new(harvest.items.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let outcomes = save_all(
        &client,
        &harvest.items,
        output,
        mode,
        &SaveOptions::default(),
        config.jobs,
        |_| pb.inc(1),
    );
    pb.finish_and_clear();
    let outcomes = outcomes?;

    let failed: Vec<_> = outcomes.iter().filter(|o| o.result.is_err()).collect();
    for outcome in &failed {
        if let Err(e) = &outcome.result {
            eprintln!("  {} {}: {e}", style("Failed").red(), outcome.link.url);
        }
    }

    println!();
    println!(
        "{} {} of {} links to {}",
        style("Saved").green().bold(),
        outcomes.len() - failed.len(),
        outcomes.len(),
        output.display()
    );

    Ok(())
}
