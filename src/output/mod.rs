use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod csv;
pub mod summary;

pub use csv::write_task_csv;
pub use summary::{RunSummary, TaskSummary, write_summary};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn create_output(path: &Path) -> Result<BufWriter<File>, OutputError> {
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    Ok(BufWriter::new(File::create(path).map_err(io_err)?))
}

#[cfg(test)]
#[path = "../../tests/src_inline/output/tests.rs"]
mod tests;
