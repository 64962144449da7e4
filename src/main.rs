use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use archgraph::cli::commands;
use archgraph::cli::{Cli, Commands};
use archgraph::config::resolve_config;

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let project_path = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = resolve_config(&project_path, cli.config.as_deref())?;
    let classes = commands::load_snapshot(&project_path.join(&cli.batch), &config)?;

    let output = match cli.command {
        Commands::Summary => commands::run_summary(&classes, &cli.format)?,

        Commands::Deps {
            ref class,
            transitive,
            ref direction,
        } => commands::run_deps(&classes, class, transitive, direction, &cli.format)?,

        Commands::Accessors { ref member } => {
            commands::run_accessors(&classes, member, &cli.format)?
        }

        Commands::Cycles => commands::run_cycles(&classes, &cli.format)?,

        Commands::Packages { ref pattern } => {
            commands::run_packages(&classes, pattern, &cli.format)?
        }

        Commands::Annotations { ref class } => commands::run_annotations(
            &classes,
            class,
            &config.annotation_format,
            &cli.format,
        )?,
    };
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}

/// Log to stderr so stdout stays machine readable.
fn init_logging() {
    let filter = EnvFilter::try_from_env("ARCHGRAPH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
