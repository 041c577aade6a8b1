use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use crate::output::{OutputError, create_output};
use crate::tiles::TileRow;

pub fn write_task_csv(
    path: &Path,
    label_column: &str,
    rows: &[TileRow],
) -> Result<(), OutputError> {
    let mut w = create_output(path)?;
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    writeln!(w, "image_path,{},sample", escape_field(label_column)).map_err(io_err)?;
    for row in rows {
        writeln!(
            w,
            "{},{},{}",
            escape_field(&row.image_path),
            escape_field(row.label.as_deref().unwrap_or("")),
            escape_field(&row.sample)
        )
        .map_err(io_err)?;
    }
    w.flush().map_err(io_err)?;
    Ok(())
}

/// Minimal quoting: only fields holding a delimiter, quote or line break are
/// wrapped, with inner quotes doubled.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
