use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{self, IniDocument};

/// Folder the game keeps its data in, under the user's config directory.
const GAME_DATA_DIR: &str = "VintagestoryData";

/// The game's default mods folder for the current user:
/// `%APPDATA%\VintagestoryData\Mods` on Windows, `~/.config/VintagestoryData/Mods`
/// on Linux, `~/Library/Application Support/VintagestoryData/Mods` on macOS.
///
/// Falls back to a relative `VintagestoryData/Mods` if the platform has no
/// config directory for this user.
pub fn get_default_mod_dir() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| {
        warn!("Failed to get user config directory, using the working directory");
        PathBuf::new()
    });
    base.join(GAME_DATA_DIR).join("Mods")
}

/// Expands a leading `~` to the home directory. `~user` forms are left as-is.
pub fn expand_home(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\"))
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

/// Turns a configured path into an absolute one, relative to the working
/// directory.
fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::path::absolute(&path).unwrap_or(path)
}

/// Resolves the mods directory from `config_file`, falling back to
/// [`get_default_mod_dir`] when the file, the `[ModPath]` section or its
/// `path` key is missing. Never fails; whether the directory exists is checked
/// by the scan.
pub fn resolve_mod_dir(config_file: &Path) -> PathBuf {
    debug!("Looking for config at {}", config_file.display());
    if !config_file.is_file() {
        info!(
            "No config file at {}, using the default mods directory",
            config_file.display()
        );
        return get_default_mod_dir();
    }

    let document = match IniDocument::from_file(config_file) {
        Ok(document) => document,
        Err(e) => {
            warn!("{}: {}", config_file.display(), e);
            return get_default_mod_dir();
        }
    };

    match config::configured_mod_path(&document) {
        Some(raw) => {
            let path = absolutize(expand_home(raw));
            debug!("Configured mods directory: {}", path.display());
            path
        }
        None if !document.has_section(config::MOD_PATH_SECTION) => {
            info!(
                "No [{}] section in {}, using the default mods directory",
                config::MOD_PATH_SECTION,
                config_file.display()
            );
            get_default_mod_dir()
        }
        None => {
            info!(
                "No {} key under [{}] in {}, using the default mods directory",
                config::MOD_PATH_KEY,
                config::MOD_PATH_SECTION,
                config_file.display()
            );
            get_default_mod_dir()
        }
    }
}
