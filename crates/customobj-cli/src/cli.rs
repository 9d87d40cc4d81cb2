use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "customobj",
    about = "Apply declared custom objects to a versioned object store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration and manifest file
    #[arg(short, long, global = true, default_value = "customobj.toml")]
    pub config: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create, update, or delete objects until the store matches the manifest
    Apply(ApplyArgs),
    /// Re-read every known object from the store
    Refresh,
    /// Delete one object, or every object in state
    Destroy(DestroyArgs),
    /// Adopt an existing object by its remote id
    Import(ImportArgs),
    /// Show local state
    Show(ShowArgs),
    /// Describe the resource fields
    Schema,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Keep objects that are in state but no longer declared
    #[arg(long)]
    pub keep_orphans: bool,
}

#[derive(Args)]
pub struct DestroyArgs {
    pub name: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Manifest name to import into
    pub name: String,
    /// Remote id of the existing object
    pub id: String,
}

#[derive(Args)]
pub struct ShowArgs {
    pub name: Option<String>,
}
