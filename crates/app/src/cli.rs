use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Author and send HTTP requests stored in httpiness collections
#[derive(Parser, Debug)]
#[command(name = "httpiness")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Override the configured log filter")]
pub struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a request with variables and cached auth applied, without sending it
    #[command(visible_alias = "p")]
    Preview {
        /// Collection file
        collection: PathBuf,

        /// Absolute path of the request inside the collection (e.g. /Users/List)
        request: String,

        /// Apply this preset before resolving
        #[arg(long)]
        preset: Option<String>,
    },
    /// Resolve a request, running OAuth2 flows if needed, and send it
    #[command(visible_alias = "s")]
    Send {
        /// Collection file
        collection: PathBuf,

        /// Absolute path of the request inside the collection (e.g. /Users/List)
        request: String,

        /// Apply this preset before resolving
        #[arg(long)]
        preset: Option<String>,

        /// Print response headers
        #[arg(short, long)]
        include: bool,
    },
    /// Rewrite a collection file at the current document version
    Migrate {
        /// Collection file
        collection: PathBuf,

        /// Write to this file instead of replacing the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Inspect and edit collection variables and presets
    Vars {
        /// Collection file
        collection: PathBuf,

        #[command(subcommand)]
        action: VarsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum VarsAction {
    /// List variables and presets
    List,
    /// Set a variable
    Set {
        /// Variable name
        name: String,

        /// New value
        value: String,

        /// Keep the value in the secret store
        #[arg(long)]
        sensitive: bool,
    },
    /// Remove a variable
    Unset {
        /// Variable name
        name: String,
    },
    /// Apply the non-empty assignments of a preset
    Apply {
        /// Preset name
        preset: String,
    },
    /// Store the current values of variables as a preset
    Capture {
        /// Preset name
        preset: String,

        /// Variables to capture (all when omitted)
        names: Vec<String>,
    },
}
