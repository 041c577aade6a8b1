use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::input::{Manifest, ManifestRow};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_tilemanifest_tiles_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn make_tiles(root: &Path, sample_dir: &str, tiles: &[&str]) {
    let dir = tile_dir(root, sample_dir);
    fs::create_dir_all(&dir).unwrap();
    for tile in tiles {
        fs::write(dir.join(tile), b"png").unwrap();
    }
}

fn manifest(label_column: &str, rows: &[(&str, Option<&str>, &str)]) -> Manifest {
    Manifest {
        label_column: label_column.to_string(),
        rows: rows
            .iter()
            .map(|(filename, label, sample)| ManifestRow {
                filename: filename.to_string(),
                label: label.map(|s| s.to_string()),
                sample: sample.to_string(),
            })
            .collect(),
    }
}

fn tile_row(image_path: &str, label: Option<&str>, sample: &str) -> TileRow {
    TileRow {
        image_path: image_path.to_string(),
        label: label.map(|s| s.to_string()),
        sample: sample.to_string(),
    }
}

#[test]
fn test_sample_dir_name_strips_extension_and_parents() {
    assert_eq!(sample_dir_name("S1.svs").unwrap(), "S1");
    assert_eq!(sample_dir_name("/data/slides/S1.svs").unwrap(), "S1");
    assert_eq!(
        sample_dir_name("TCGA-A1-A0SB-01Z-00-DX1.tumor.svs").unwrap(),
        "TCGA-A1-A0SB-01Z-00-DX1.tumor"
    );
    assert_eq!(sample_dir_name("noext").unwrap(), "noext");
    assert!(matches!(
        sample_dir_name(""),
        Err(TileError::BadFilename { .. })
    ));
}

#[test]
fn test_tile_paths() {
    assert_eq!(
        tile_dir(Path::new("/root"), "S1"),
        PathBuf::from("/root/S1/S1_tiles")
    );
    assert_eq!(tile_image_path("S1", "t1.png"), "S1/S1_tiles/t1.png");
}

#[test]
fn test_expand_two_tiles() {
    let root = make_temp_dir();
    make_tiles(&root, "S1", &["t2.png", "t1.png"]);
    let m = manifest("er_status_by_ihc", &[("S1.svs", Some("Positive"), "S1")]);

    let out = expand_tiles(&m, &root, TileOrder::Sorted).unwrap();
    assert_eq!(
        out.rows,
        vec![
            tile_row("S1/S1_tiles/t1.png", Some("Positive"), "S1"),
            tile_row("S1/S1_tiles/t2.png", Some("Positive"), "S1"),
        ]
    );
    assert_eq!(out.stats.tiles, 2);
    assert_eq!(out.stats.samples_with_tiles, 1);
}

#[test]
fn test_missing_tile_dir_is_skipped() {
    let root = make_temp_dir();
    make_tiles(&root, "S2", &["a.png"]);
    let m = manifest(
        "pr_status_by_ihc",
        &[
            ("S1.svs", Some("Negative"), "S1"),
            ("S2.svs", Some("Positive"), "S2"),
        ],
    );

    let out = expand_tiles(&m, &root, TileOrder::Sorted).unwrap();
    assert_eq!(
        out.rows,
        vec![tile_row("S2/S2_tiles/a.png", Some("Positive"), "S2")]
    );
    assert_eq!(
        out.stats,
        ExpandStats {
            samples: 2,
            samples_with_tiles: 1,
            samples_skipped: 1,
            tiles: 1,
        }
    );
}

#[test]
fn test_sample_dir_without_tiles_subdir_is_skipped() {
    let root = make_temp_dir();
    fs::create_dir_all(root.join("S1")).unwrap();
    let m = manifest("HER2_status", &[("S1.svs", Some("Positive"), "S1")]);

    let out = expand_tiles(&m, &root, TileOrder::Sorted).unwrap();
    assert!(out.rows.is_empty());
    assert_eq!(out.stats.samples_skipped, 1);
}

#[test]
fn test_empty_tile_dir_gives_no_rows() {
    let root = make_temp_dir();
    make_tiles(&root, "S1", &[]);
    let m = manifest("HER2_status", &[("S1.svs", Some("Positive"), "S1")]);

    let out = expand_tiles(&m, &root, TileOrder::Filesystem).unwrap();
    assert!(out.rows.is_empty());
    assert_eq!(out.stats.samples_with_tiles, 1);
    assert_eq!(out.stats.samples_skipped, 0);
}

#[test]
fn test_rows_follow_manifest_order_and_copy_values() {
    let root = make_temp_dir();
    make_tiles(&root, "B", &["x.png", "y.png"]);
    make_tiles(&root, "A", &["z.png"]);
    let m = manifest(
        "Triple_negative_status",
        &[
            ("slides/B.svs", None, "sample-b"),
            ("A.svs", Some("Yes"), "sample-a"),
        ],
    );

    let out = expand_tiles(&m, &root, TileOrder::Sorted).unwrap();
    assert_eq!(
        out.rows,
        vec![
            tile_row("B/B_tiles/x.png", None, "sample-b"),
            tile_row("B/B_tiles/y.png", None, "sample-b"),
            tile_row("A/A_tiles/z.png", Some("Yes"), "sample-a"),
        ]
    );
}

#[test]
fn test_filesystem_order_lists_every_entry() {
    let root = make_temp_dir();
    make_tiles(&root, "S1", &["c.png", "a.png", "b.png"]);
    fs::create_dir_all(tile_dir(&root, "S1").join("nested")).unwrap();
    let m = manifest("er_status_by_ihc", &[("S1.svs", Some("Positive"), "S1")]);

    let out = expand_tiles(&m, &root, TileOrder::Filesystem).unwrap();
    let mut paths: Vec<&str> = out.rows.iter().map(|r| r.image_path.as_str()).collect();
    paths.sort_unstable();
    assert_eq!(
        paths,
        [
            "S1/S1_tiles/a.png",
            "S1/S1_tiles/b.png",
            "S1/S1_tiles/c.png",
            "S1/S1_tiles/nested",
        ]
    );
}

#[test]
fn test_tile_path_that_is_a_file_is_an_error() {
    let root = make_temp_dir();
    fs::create_dir_all(root.join("S1")).unwrap();
    fs::write(tile_dir(&root, "S1"), b"not a dir").unwrap();
    let m = manifest("er_status_by_ihc", &[("S1.svs", Some("Positive"), "S1")]);

    let err = expand_tiles(&m, &root, TileOrder::Sorted).unwrap_err();
    assert!(matches!(err, TileError::Io { .. }));
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_tile_name_is_an_error() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let root = make_temp_dir();
    make_tiles(&root, "S1", &["t1.png"]);
    let bad = OsStr::from_bytes(b"t\xff.png");
    fs::write(tile_dir(&root, "S1").join(bad), b"png").unwrap();
    let m = manifest("er_status_by_ihc", &[("S1.svs", Some("Positive"), "S1")]);

    let err = expand_tiles(&m, &root, TileOrder::Sorted).unwrap_err();
    match err {
        TileError::NonUtf8Name { name, .. } => assert_eq!(name.as_os_str(), bad),
        other => panic!("unexpected error: {other}"),
    }
}
