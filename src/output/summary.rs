use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::output::{OutputError, create_output};
use crate::tiles::{ExpandStats, TileOrder};

#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub task: String,
    pub manifest: String,
    pub label_column: String,
    pub output: String,
    pub status: TaskStatus,
    #[serde(flatten)]
    pub stats: ExpandStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Written,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: &'static str,
    pub version: &'static str,
    pub tile_root: String,
    pub tile_order: TileOrder,
    pub tasks: Vec<TaskSummary>,
}

impl RunSummary {
    pub fn new(tile_root: &Path, tile_order: TileOrder) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            tile_root: tile_root.display().to_string(),
            tile_order,
            tasks: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count()
    }
}

pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), OutputError> {
    let mut w = create_output(path)?;
    serde_json::to_writer_pretty(&mut w, summary).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writeln!(w)
        .and_then(|_| w.flush())
        .map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })
}
