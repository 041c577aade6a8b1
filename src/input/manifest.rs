use std::borrow::Cow;
use std::path::Path;

use crate::input::{InputError, open_maybe_gz};

pub const FILENAME_COLUMN: &str = "filename";
pub const SAMPLE_COLUMN: &str = "sample";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub filename: String,
    pub label: Option<String>,
    pub sample: String,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub label_column: String,
    pub rows: Vec<ManifestRow>,
}

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    filename: usize,
    label: usize,
    sample: usize,
}

/// Reads a tab-separated sample manifest, keeping only `filename`, the task
/// label column and `sample`. Row order is preserved and values are kept as
/// text; an empty or absent label field becomes `None`.
pub fn load_manifest(path: &Path, label_column: &str) -> Result<Manifest, InputError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    let mut line_no = 0usize;

    let header_cols = loop {
        buf.clear();
        let read = reader
            .read_line(&mut buf)
            .map_err(|e| InputError::io(path, e))?;
        if read == 0 {
            return Err(InputError::Empty {
                path: path.to_path_buf(),
            });
        }
        line_no += 1;
        let line = strip_line_ending(&buf);
        if line.is_empty() {
            continue;
        }
        break line
            .trim_start_matches('\u{feff}')
            .split('\t')
            .map(|s| unquote(s).into_owned())
            .collect::<Vec<_>>();
    };

    let index = ColumnIndex {
        filename: find_column(&header_cols, FILENAME_COLUMN, path)?,
        label: find_column(&header_cols, label_column, path)?,
        sample: find_column(&header_cols, SAMPLE_COLUMN, path)?,
    };

    let mut rows = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_line(&mut buf)
            .map_err(|e| InputError::io(path, e))?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = strip_line_ending(&buf);
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        rows.push(parse_row(&fields, index, path, line_no)?);
    }

    tracing::debug!(
        path = %path.display(),
        label_column,
        rows = rows.len(),
        "loaded manifest"
    );

    Ok(Manifest {
        label_column: label_column.to_string(),
        rows,
    })
}

fn find_column(header: &[String], name: &str, path: &Path) -> Result<usize, InputError> {
    header
        .iter()
        .position(|col| col == name)
        .ok_or_else(|| InputError::MissingColumn {
            column: name.to_string(),
            path: path.to_path_buf(),
        })
}

fn parse_row(
    fields: &[&str],
    index: ColumnIndex,
    path: &Path,
    line_no: usize,
) -> Result<ManifestRow, InputError> {
    let required = |idx: usize, name: &str| {
        fields
            .get(idx)
            .map(|s| unquote(s).into_owned())
            .ok_or_else(|| InputError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                msg: format!("row has no '{name}' field"),
            })
    };

    let filename = required(index.filename, FILENAME_COLUMN)?;
    let sample = required(index.sample, SAMPLE_COLUMN)?;
    let label = fields
        .get(index.label)
        .map(|s| unquote(s))
        .filter(|s| !s.is_empty())
        .map(Cow::into_owned);

    Ok(ManifestRow {
        filename,
        label,
        sample,
    })
}

/// Drops one enclosing pair of `"` and collapses doubled quotes inside it.
/// Unquoted fields are returned untouched.
pub fn unquote(field: &str) -> Cow<'_, str> {
    match field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) if inner.contains("\"\"") => Cow::Owned(inner.replace("\"\"", "\"")),
        Some(inner) => Cow::Borrowed(inner),
        None => Cow::Borrowed(field),
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
