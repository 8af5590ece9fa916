use std::path::{Path, PathBuf};

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::ModRecord;
use crate::modinfo::{ModInfo, ModInfoError};
use crate::{archive, links, source_mod};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("The directory '{}' does not exist.", .0.display())]
    NotFound(PathBuf),
    #[error("'{}' is not a directory.", .0.display())]
    NotADirectory(PathBuf),
    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModFileKind {
    /// A zip archive carrying a `modinfo.json`.
    Archive,
    /// A single C# source file.
    Source,
}

impl ModFileKind {
    pub fn from_path(path: &Path) -> Option<ModFileKind> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("zip") {
            Some(ModFileKind::Archive)
        } else if ext.eq_ignore_ascii_case("cs") {
            Some(ModFileKind::Source)
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: ModInfoError,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    /// Records in scan order.
    pub mods: Vec<ModRecord>,
    pub skipped: Vec<SkippedFile>,
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn build_record(info: ModInfo, file_name: &str) -> Result<ModRecord, ModInfoError> {
    let url_mod = links::mod_page_url(&info.mod_id)?;
    let url_download = links::download_url(file_name, &info.version)?;
    Ok(ModRecord {
        name: info.name,
        version: info.version,
        mod_id: info.mod_id,
        side: info.side,
        description: info.description,
        url_mod,
        url_download,
    })
}

pub fn read_mod_file(path: &Path, kind: ModFileKind) -> Result<ModRecord, ModInfoError> {
    let info = match kind {
        ModFileKind::Archive => archive::read_mod_archive(path)?,
        ModFileKind::Source => source_mod::read_source_mod(path)?,
    };
    build_record(info, &file_name_of(path))
}

pub fn list_mod_files(mod_dir: &Path) -> Result<Vec<(PathBuf, ModFileKind)>, ScanError> {
    if !mod_dir.exists() {
        return Err(ScanError::NotFound(mod_dir.to_path_buf()));
    }
    if !mod_dir.is_dir() {
        return Err(ScanError::NotADirectory(mod_dir.to_path_buf()));
    }

    let read_error = |source: std::io::Error| ScanError::Read {
        path: mod_dir.to_path_buf(),
        source,
    };
    let entries: Vec<PathBuf> = mod_dir
        .read_dir()
        .map_err(read_error)?
        .map(|entry| entry.map(|entry| entry.path()).map_err(read_error))
        .collect::<Result<_, _>>()?;

    Ok(entries
        .into_iter()
        .filter(|path| path.is_file())
        .filter_map(|path| ModFileKind::from_path(&path).map(|kind| (path, kind)))
        .sorted_by(|(a, _), (b, _)| a.file_name().cmp(&b.file_name()))
        .collect())
}

/// Reads every mod file in `mod_dir`. A file that cannot be read is recorded
/// in [`ScanReport::skipped`] and the scan moves on; only a missing or
/// unreadable directory fails the scan.
pub fn scan_mod_dir(mod_dir: &Path) -> Result<ScanReport, ScanError> {
    info!("Scanning mods in {}", mod_dir.display());
    let files = list_mod_files(mod_dir)?;
    debug!("Found {} mod files", files.len());

    let (mods, skipped): (Vec<_>, Vec<_>) = files
        .iter()
        .map(|(path, kind)| {
            read_mod_file(path, *kind).map_err(|reason| {
                warn!("Skipping {}: {}", path.display(), reason);
                SkippedFile {
                    file_name: file_name_of(path),
                    reason,
                }
            })
        })
        .partition_result();

    info!("Read {} mods, skipped {} files", mods.len(), skipped.len());
    Ok(ScanReport { mods, skipped })
}
