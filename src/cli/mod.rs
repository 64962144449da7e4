use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub mod commands;
pub mod output;

#[derive(Parser)]
#[command(
    name = "archgraph",
    version,
    about = "Dependency and access queries over an imported Java class batch"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON import batch written by a bytecode importer
    #[arg(long, global = true, default_value = "archgraph-batch.json")]
    pub batch: PathBuf,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Path to config file (default: .archgraph/config.toml or archgraph.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Overview statistics of the imported classes
    Summary,

    /// Class-level dependency analysis
    Deps {
        /// Fully qualified class name
        class: String,
        /// Follow dependencies transitively
        #[arg(long)]
        transitive: bool,
        /// Direction: in, out, or both
        #[arg(long, default_value = "out")]
        direction: String,
    },

    /// Accesses, calls and references resolving to a member
    Accessors {
        /// Member full name, e.g. `com.example.Foo.bar(int)` or `com.example.Foo.count`
        member: String,
    },

    /// Detect dependency cycles between imported classes
    Cycles,

    /// List imported classes in packages matching a pattern such as `..service..`
    Packages {
        pattern: String,
    },

    /// Annotations declared on a class, its members and parameters
    Annotations {
        /// Fully qualified class name
        class: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Compact,
}
