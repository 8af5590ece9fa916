use std::path::{Path, PathBuf};

use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{ModList, ModRecord};
use crate::scan::SkippedFile;

pub const DEFAULT_OUTPUT_FILE: &str = "modlist.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to serialize the mod list: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Orders mods by display name, ignoring case. Mods with equal names keep
/// their scan order.
pub fn sort_mods(mods: Vec<ModRecord>) -> Vec<ModRecord> {
    mods.into_iter()
        .sorted_by_cached_key(|m| m.name.to_lowercase())
        .collect()
}

pub fn to_json(list: &ModList) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    list.serialize(&mut serializer)?;
    Ok(out)
}

pub fn write_mod_list(mods: Vec<ModRecord>, path: &Path) -> Result<ModList, ExportError> {
    let list = ModList {
        mods: sort_mods(mods),
    };
    let json = to_json(&list)?;
    debug!("Writing {} bytes to {}", json.len(), path.display());
    std::fs::write(path, json).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {} mods to {}", list.mods.len(), path.display());
    Ok(list)
}

pub fn print_summary(list: &ModList, skipped: &[SkippedFile], output: &Path) {
    println!(
        "{} has been created with {} mods.",
        output.display().to_string().bold(),
        list.mods.len().to_string().green().bold()
    );
    if skipped.is_empty() {
        println!("No invalid or corrupted files.");
        return;
    }
    println!("{}", "Invalid or corrupted files:".yellow().bold());
    for file in skipped {
        println!("- {} ({})", file.file_name.red(), file.reason);
    }
}
