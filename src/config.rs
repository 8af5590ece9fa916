use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.ini";

/// Section holding the mods directory.
pub const MOD_PATH_SECTION: &str = "ModPath";

/// Key holding the mods directory, inside [`MOD_PATH_SECTION`].
pub const MOD_PATH_KEY: &str = "path";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read the config file: {0}")]
    Read(#[from] std::io::Error),
}

/// A parsed INI document.
///
/// Section names are case-sensitive. Keys are stored lowercased, so lookups
/// through [`IniDocument::get`] are case-insensitive on the key.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IniDocument {
    sections: HashMap<String, HashMap<String, String>>,
}

impl IniDocument {
    /// Parses INI text.
    ///
    /// Blank lines and lines starting with `;` or `#` are ignored, as are
    /// entries that appear before the first section header and lines that are
    /// neither a header nor a `key = value` / `key: value` entry. A repeated
    /// key keeps its last value.
    pub fn parse(content: &str) -> IniDocument {
        let mut document = IniDocument::default();
        let mut current: Option<String> = None;

        for (line_no, raw) in content.trim_start_matches('\u{feff}').lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = header.trim().to_string();
                document.sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let Some((key, value)) = split_entry(line) else {
                debug!("Ignoring malformed config line {}: {}", line_no + 1, line);
                continue;
            };
            let Some(section) = &current else {
                debug!("Ignoring config entry outside of a section: {}", key);
                continue;
            };
            document
                .sections
                .entry(section.clone())
                .or_default()
                .insert(key.to_lowercase(), value.to_string());
        }

        document
    }

    /// Reads and parses an INI file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<IniDocument, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(IniDocument::parse(&content))
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(&key.to_lowercase()))
            .map(String::as_str)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }
}

/// Splits an entry on whichever of `=` or `:` comes first.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let at = line.find(|c: char| c == '=' || c == ':')?;
    let key = line[..at].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[at + 1..].trim()))
}

/// Returns the configured mods directory, if the document declares a
/// non-empty one.
pub fn configured_mod_path(document: &IniDocument) -> Option<&str> {
    document
        .get(MOD_PATH_SECTION, MOD_PATH_KEY)
        .filter(|path| !path.is_empty())
}
