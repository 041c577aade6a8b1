use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::{Manifest, ManifestRow};

pub const TILES_SUFFIX: &str = "_tiles";

#[derive(Debug, Error)]
pub enum TileError {
    #[error("cannot derive a sample directory from filename '{filename}'")]
    BadFilename { filename: String },
    #[error("tile name {name:?} in {} is not valid UTF-8", dir.display())]
    NonUtf8Name { dir: PathBuf, name: OsString },
    #[error("failed to list tile directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TileOrder {
    /// Tile names sorted bytewise; reruns produce identical files.
    #[default]
    Sorted,
    /// Whatever order the filesystem returns.
    Filesystem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRow {
    pub image_path: String,
    pub label: Option<String>,
    pub sample: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpandStats {
    pub samples: usize,
    pub samples_with_tiles: usize,
    pub samples_skipped: usize,
    pub tiles: usize,
}

#[derive(Debug, Clone)]
pub struct Expansion {
    pub rows: Vec<TileRow>,
    pub stats: ExpandStats,
}

/// Base name of `filename` without its extension, as used for the sample's
/// directory under the tile root.
pub fn sample_dir_name(filename: &str) -> Result<String, TileError> {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| TileError::BadFilename {
            filename: filename.to_string(),
        })
}

pub fn tile_dir(root: &Path, sample_dir: &str) -> PathBuf {
    root.join(sample_dir).join(format!("{sample_dir}{TILES_SUFFIX}"))
}

pub fn tile_image_path(sample_dir: &str, tile: &str) -> String {
    format!("{sample_dir}/{sample_dir}{TILES_SUFFIX}/{tile}")
}

pub fn expand_tiles(
    manifest: &Manifest,
    root: &Path,
    order: TileOrder,
) -> Result<Expansion, TileError> {
    let mut rows = Vec::new();
    let mut stats = ExpandStats::default();

    for row in &manifest.rows {
        stats.samples += 1;
        let sample_dir = sample_dir_name(&row.filename)?;
        let dir = tile_dir(root, &sample_dir);
        if !dir.exists() {
            tracing::debug!(
                sample = %row.sample,
                dir = %dir.display(),
                "no tile directory; skipping sample"
            );
            stats.samples_skipped += 1;
            continue;
        }

        let tiles = list_tiles(&dir, order)?;
        stats.samples_with_tiles += 1;
        stats.tiles += tiles.len();
        rows.extend(tiles.iter().map(|tile| tile_row(row, &sample_dir, tile)));
    }

    Ok(Expansion { rows, stats })
}

fn tile_row(row: &ManifestRow, sample_dir: &str, tile: &str) -> TileRow {
    TileRow {
        image_path: tile_image_path(sample_dir, tile),
        label: row.label.clone(),
        sample: row.sample.clone(),
    }
}

fn list_tiles(dir: &Path, order: TileOrder) -> Result<Vec<String>, TileError> {
    let io_err = |source| TileError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let name = entry.map_err(io_err)?.file_name();
        let name = name.into_string().map_err(|name| TileError::NonUtf8Name {
            dir: dir.to_path_buf(),
            name,
        })?;
        names.push(name);
    }

    if order == TileOrder::Sorted {
        names.sort_unstable();
    }
    Ok(names)
}

#[cfg(test)]
#[path = "../tests/src_inline/tiles.rs"]
mod tests;
