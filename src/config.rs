use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use thiserror::Error;

use crate::tasks::{TaskSpec, builtin_tasks};
use crate::tiles::TileOrder;

#[derive(Debug, Parser)]
#[command(name = "kira-tilemanifest", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build one training CSV per task from sample manifests and tile directories.
    Run(RunArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Directory holding `<sample>/<sample>_tiles/` directories.
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Directory holding the task manifests (defaults to the tile root).
    #[arg(long)]
    pub manifests: Option<PathBuf>,
    /// Directory the task CSVs are written to.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// JSON config file; flags given on the command line take precedence.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Only run the named tasks (repeatable).
    #[arg(long = "task")]
    pub tasks: Vec<String>,
    /// Order of tiles within a sample directory (defaults to sorted).
    #[arg(long, value_enum)]
    pub tile_order: Option<TileOrder>,
    /// Run remaining tasks after a failure instead of stopping.
    #[arg(long)]
    pub keep_going: bool,
    /// Write a JSON run summary to this path.
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub root: Option<PathBuf>,
    pub manifests: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub tile_order: Option<TileOrder>,
    pub keep_going: Option<bool>,
    pub summary: Option<PathBuf>,
    pub tasks: Option<Vec<TaskSpec>>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown task '{0}'")]
    UnknownTask(String),
    #[error("no tasks to run")]
    NoTasks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub root: PathBuf,
    pub manifests: PathBuf,
    pub out: PathBuf,
    pub tasks: Vec<TaskSpec>,
    pub tile_order: TileOrder,
    pub keep_going: bool,
    pub summary: Option<PathBuf>,
}

impl RunConfig {
    pub fn manifest_path(&self, task: &TaskSpec) -> PathBuf {
        self.manifests.join(&task.manifest)
    }

    pub fn output_path(&self, task: &TaskSpec) -> PathBuf {
        self.out.join(&task.output)
    }
}

pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn resolve_config(args: &RunArgs) -> Result<RunConfig, ConfigError> {
    let file = match &args.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };
    merge(args, file)
}

fn merge(args: &RunArgs, file: FileConfig) -> Result<RunConfig, ConfigError> {
    let root = args
        .root
        .clone()
        .or(file.root)
        .unwrap_or_else(|| PathBuf::from("."));
    let manifests = args
        .manifests
        .clone()
        .or(file.manifests)
        .unwrap_or_else(|| root.clone());
    let out = args
        .out
        .clone()
        .or(file.out)
        .unwrap_or_else(|| PathBuf::from("."));

    let catalogue = file.tasks.unwrap_or_else(builtin_tasks);
    let tasks = select_tasks(catalogue, &args.tasks)?;

    Ok(RunConfig {
        root,
        manifests,
        out,
        tasks,
        tile_order: args.tile_order.or(file.tile_order).unwrap_or_default(),
        keep_going: args.keep_going || file.keep_going.unwrap_or(false),
        summary: args.summary.clone().or(file.summary),
    })
}

fn select_tasks(
    catalogue: Vec<TaskSpec>,
    wanted: &[String],
) -> Result<Vec<TaskSpec>, ConfigError> {
    if let Some(unknown) = wanted
        .iter()
        .find(|name| !catalogue.iter().any(|t| &t.name == *name))
    {
        return Err(ConfigError::UnknownTask(unknown.clone()));
    }
    let tasks: Vec<TaskSpec> = if wanted.is_empty() {
        catalogue
    } else {
        catalogue
            .into_iter()
            .filter(|t| wanted.contains(&t.name))
            .collect()
    };
    if tasks.is_empty() {
        return Err(ConfigError::NoTasks);
    }
    Ok(tasks)
}

#[cfg(test)]
#[path = "../tests/src_inline/config.rs"]
mod tests;
