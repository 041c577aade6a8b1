use thiserror::Error;

use crate::config::RunConfig;
use crate::input::{InputError, load_manifest};
use crate::output::summary::TaskStatus;
use crate::output::{OutputError, RunSummary, TaskSummary, write_task_csv};
use crate::tasks::TaskSpec;
use crate::tiles::{ExpandStats, TileError, expand_tiles};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("task '{task}': {source}")]
    Input {
        task: String,
        #[source]
        source: InputError,
    },
    #[error("task '{task}': {source}")]
    Tiles {
        task: String,
        #[source]
        source: TileError,
    },
    #[error("task '{task}': {source}")]
    Output {
        task: String,
        #[source]
        source: OutputError,
    },
    #[error("{failed} of {total} tasks failed")]
    TasksFailed { failed: usize, total: usize },
}

#[derive(Debug, Clone)]
pub struct TaskReport {
    pub stats: ExpandStats,
}

/// Loads one task's manifest, expands it against the tile root and writes
/// the CSV. Nothing is written if loading or expansion fails.
pub fn run_task(config: &RunConfig, task: &TaskSpec) -> Result<TaskReport, PipelineError> {
    let manifest_path = config.manifest_path(task);
    tracing::info!(
        task = %task.name,
        manifest = %manifest_path.display(),
        label_column = %task.label_column,
        "building task manifest"
    );

    let manifest = load_manifest(&manifest_path, &task.label_column).map_err(|source| {
        PipelineError::Input {
            task: task.name.clone(),
            source,
        }
    })?;

    let expansion = expand_tiles(&manifest, &config.root, config.tile_order).map_err(|source| {
        PipelineError::Tiles {
            task: task.name.clone(),
            source,
        }
    })?;

    let output = config.output_path(task);
    write_task_csv(&output, &manifest.label_column, &expansion.rows).map_err(|source| {
        PipelineError::Output {
            task: task.name.clone(),
            source,
        }
    })?;

    let stats = expansion.stats;
    tracing::info!(
        task = %task.name,
        output = %output.display(),
        samples = stats.samples,
        samples_with_tiles = stats.samples_with_tiles,
        samples_skipped = stats.samples_skipped,
        tiles = stats.tiles,
        "wrote task csv"
    );

    Ok(TaskReport { stats })
}

/// Runs every configured task in order. Without `keep_going` the first
/// failure is returned immediately; CSVs from earlier tasks stay on disk.
pub fn run_all(config: &RunConfig) -> Result<RunSummary, PipelineError> {
    let mut summary = RunSummary::new(&config.root, config.tile_order);

    for task in &config.tasks {
        let mut entry = TaskSummary {
            task: task.name.clone(),
            manifest: config.manifest_path(task).display().to_string(),
            label_column: task.label_column.clone(),
            output: config.output_path(task).display().to_string(),
            status: TaskStatus::Written,
            stats: ExpandStats::default(),
            error: None,
        };
        match run_task(config, task) {
            Ok(report) => entry.stats = report.stats,
            Err(err) if config.keep_going => {
                tracing::error!(task = %task.name, "{err}");
                entry.status = TaskStatus::Failed;
                entry.error = Some(err.to_string());
            }
            Err(err) => return Err(err),
        }
        summary.tasks.push(entry);
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "../tests/src_inline/pipeline.rs"]
mod tests;
