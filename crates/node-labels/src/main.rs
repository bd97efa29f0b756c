//! CLI for resolving and applying pull request labels
//!
//! Run `node-labels --help` for usage information.

// CLI binaries legitimately need println! for user output
#![allow(clippy::disallowed_macros)]

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use node_labels::{
    parse_repo, Config, GitHubClient, LabelAutomation, LabelRepository, LabelResolver,
    ResolverConfig,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "node-labels")]
#[command(about = "Resolve pull request labels from changed file paths")]
#[command(version)]
struct Cli {
    /// Output format: json, text
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve labels for changed paths (read from stdin when none are given)
    Resolve {
        /// Changed file paths, relative to the repository root
        paths: Vec<String>,

        /// Branch the change targets (e.g. v20.x-staging)
        #[arg(short, long)]
        branch: Option<String>,

        /// Distinct subsystem labels kept before collapsing into "lib / src"
        /// (defaults to MAX_LABELS_LIMIT, then 4)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List the labels defined on a repository
    Existing {
        /// Repository in owner/repo format
        #[arg(short, long)]
        repo: String,
    },

    /// Resolve labels for a pull request and add the ones the repository defines
    Apply {
        /// Repository in owner/repo format
        #[arg(short, long)]
        repo: String,

        /// Pull request number
        #[arg(short, long)]
        pr: u64,

        /// Dry run - print labels instead of adding them
        #[arg(short, long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let config = Config::from_env();

    match cli.command {
        Commands::Resolve {
            paths,
            branch,
            limit,
        } => {
            let resolver_config = limit.map_or(config.resolver, ResolverConfig::with_label_limit);
            run_resolve(paths, branch.as_deref(), resolver_config, cli.format)?;
        }
        Commands::Existing { repo } => {
            run_existing(&config, &repo, cli.format).await?;
        }
        Commands::Apply { repo, pr, dry_run } => {
            run_apply(&config, &repo, pr, dry_run, cli.format).await?;
        }
    }

    Ok(())
}

fn run_resolve(
    paths: Vec<String>,
    branch: Option<&str>,
    resolver_config: ResolverConfig,
    format: OutputFormat,
) -> Result<()> {
    let paths = if paths.is_empty() {
        read_paths(io::stdin().lock())?
    } else {
        paths
    };

    if paths.is_empty() {
        anyhow::bail!("No paths given. Pass them as arguments or one per line on stdin");
    }

    let labels = LabelResolver::new(resolver_config).resolve(&paths, branch);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&labels)?);
        }
        OutputFormat::Text => {
            for label in labels {
                println!("{label}");
            }
        }
    }

    Ok(())
}

fn read_paths(reader: impl BufRead) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read paths from stdin")?;
        let line = line.trim();
        if !line.is_empty() {
            paths.push(line.to_string());
        }
    }
    Ok(paths)
}

async fn run_existing(config: &Config, repo: &str, format: OutputFormat) -> Result<()> {
    let (owner, repo_name) = parse_repo(repo)?;
    let client = GitHubClient::from_config(config)?;

    let labels = client
        .fetch_existing_labels(owner, repo_name)
        .await
        .with_context(|| format!("Failed to fetch labels for {repo}"))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&labels)?);
        }
        OutputFormat::Text => {
            println!("Labels on {repo} ({} total):", labels.len());
            for label in labels {
                println!("  {label}");
            }
        }
    }

    Ok(())
}

async fn run_apply(
    config: &Config,
    repo: &str,
    pr: u64,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let (owner, repo_name) = parse_repo(repo)?;
    if config.github_token.is_none() && !dry_run {
        anyhow::bail!("GITHUB_TOKEN is required to add labels");
    }

    let client = GitHubClient::from_config(config)?;
    let automation = LabelAutomation::new(client, LabelResolver::new(config.resolver));

    let plan = automation
        .apply(owner, repo_name, pr, dry_run)
        .await
        .with_context(|| format!("Failed to label PR #{pr} on {repo}"))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        OutputFormat::Text => {
            if plan.resolved.is_empty() {
                println!("No labels resolved for PR #{pr} ({} files)", plan.files);
                return Ok(());
            }

            let verb = if plan.applied {
                "Added"
            } else {
                "Would add"
            };
            println!(
                "{verb} {} label(s) to PR #{pr} (base: {}):",
                plan.applicable.len(),
                plan.base_branch
            );
            for label in &plan.applicable {
                println!("  {label}");
            }
            if !plan.missing.is_empty() {
                println!("Not defined on {repo}: {}", plan.missing.join(", "));
            }
        }
    }

    Ok(())
}
