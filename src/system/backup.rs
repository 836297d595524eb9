//! Snapshot of the legacy file and the fragment directory, and the way back.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use super::fs::{copy_dir, copy_entry, present, remove_any, unique_dir};
use crate::config::Paths;
use crate::error::{Result, TuneError};
use crate::models::{BackupManifest, BackupRecord};

pub const MANIFEST: &str = "manifest.json";
const LEGACY_COPY: &str = "sysctl.conf";
const FRAGMENT_COPY: &str = "sysctl.d";
const PREFIX: &str = "sysctl-";
// Length of `%Y%m%d-%H%M%S`.
const STAMP_LEN: usize = 15;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> TuneError + '_ {
    move |source| TuneError::Backup { path: path.to_path_buf(), source }
}

/// Copy whatever exists of the current configuration into a fresh
/// `sysctl-YYYYmmdd-HHMMSS` directory under `paths.backup_root`. Any failure
/// is returned before the caller gets a chance to delete anything.
pub fn create(paths: &Paths, now: DateTime<Local>) -> Result<BackupRecord> {
    let base = format!("{}{}", PREFIX, now.format("%Y%m%d-%H%M%S"));
    let dir = unique_dir(&paths.backup_root, &base).map_err(io_err(&paths.backup_root))?;
    debug!(dir = %dir.display(), "backup directory created");

    // Same test `install::clean` uses, so whatever gets deleted was copied.
    let legacy_present = present(&paths.legacy_conf);
    if legacy_present {
        let to = dir.join(LEGACY_COPY);
        copy_entry(&paths.legacy_conf, &to).map_err(io_err(&to))?;
    }

    let fragment_present = paths.fragment_dir.is_dir();
    let fragment_files = if fragment_present {
        let to = dir.join(FRAGMENT_COPY);
        copy_dir(&paths.fragment_dir, &to).map_err(io_err(&to))?
    } else {
        Vec::new()
    };

    let manifest = BackupManifest {
        created_at: now,
        legacy_conf: paths.legacy_conf.clone(),
        legacy_present,
        fragment_dir: paths.fragment_dir.clone(),
        fragment_present,
        fragment_files,
    };
    let manifest_path = dir.join(MANIFEST);
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|source| TuneError::Manifest { path: manifest_path.clone(), source })?;
    fs::write(&manifest_path, json).map_err(io_err(&manifest_path))?;

    info!(
        dir = %dir.display(),
        legacy = legacy_present,
        fragments = manifest.fragment_files.len(),
        "backup complete"
    );
    Ok(BackupRecord { dir, manifest })
}

/// Read a backup directory written by [`create`].
pub fn open(dir: &Path) -> Result<BackupRecord> {
    let path = dir.join(MANIFEST);
    let text = fs::read_to_string(&path).map_err(|source| TuneError::Read { path: path.clone(), source })?;
    let manifest = serde_json::from_str(&text).map_err(|source| TuneError::Manifest { path, source })?;
    Ok(BackupRecord { dir: dir.to_path_buf(), manifest })
}

/// Backup directories under `root`, newest first. Directories without a
/// manifest are ignored.
pub fn list(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(root) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(TuneError::Read { path: root.to_path_buf(), source }),
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with(PREFIX))
                && p.join(MANIFEST).is_file()
        })
        .collect();
    dirs.sort_by_cached_key(|p| std::cmp::Reverse(order_key(p)));
    Ok(dirs)
}

// `sysctl-20260304-050607-12` -> ("20260304-050607", 12). The counter is
// compared numerically so `-10` sorts after `-2`.
fn order_key(dir: &Path) -> (String, usize) {
    let name = dir.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let stamp = name.strip_prefix(PREFIX).unwrap_or(name);
    match stamp.get(STAMP_LEN..).and_then(|rest| rest.strip_prefix('-')) {
        Some(counter) => (stamp[..STAMP_LEN].to_string(), counter.parse().unwrap_or(0)),
        None => (stamp.to_string(), 0),
    }
}

/// Put the backed-up files back where the manifest says they came from.
/// Whatever currently sits at those paths is removed first.
pub fn restore(record: &BackupRecord) -> Result<()> {
    let m = &record.manifest;
    let clean_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| TuneError::Clean { path, source }
    };
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| TuneError::Write { path, source }
    };

    remove_any(&m.legacy_conf).map_err(clean_err(&m.legacy_conf))?;
    if m.legacy_present {
        copy_entry(&record.dir.join(LEGACY_COPY), &m.legacy_conf).map_err(write_err(&m.legacy_conf))?;
    }

    remove_any(&m.fragment_dir).map_err(clean_err(&m.fragment_dir))?;
    if m.fragment_present {
        copy_dir(&record.dir.join(FRAGMENT_COPY), &m.fragment_dir).map_err(write_err(&m.fragment_dir))?;
    } else {
        fs::create_dir_all(&m.fragment_dir).map_err(write_err(&m.fragment_dir))?;
    }
    info!(from = %record.dir.display(), "configuration restored");
    Ok(())
}

/// True when nothing was there to back up.
pub fn is_empty(record: &BackupRecord) -> bool {
    !record.manifest.legacy_present && record.manifest.fragment_files.is_empty()
}
