//! Single-file C# mods, which the game compiles on load.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::model::Side;
use crate::modinfo::{ModInfo, ModInfoError};

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bVersion\s*=\s*"([^"]+)""#).expect("valid version regex"));
static SIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bSide\s*=\s*"([^"]+)""#).expect("valid side regex"));
static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bDescription\s*=\s*"([^"]+)""#).expect("valid description regex")
});
static NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnamespace\s+([A-Za-z0-9_]+)").expect("valid namespace regex"));

fn capture(re: &Regex, content: &str) -> Option<String> {
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Reads the mod attributes out of C# source.
///
/// The namespace doubles as the display name; the id is the namespace
/// lowercased. `Version`, `Side` and the namespace are required.
pub fn parse_source_mod(content: &str) -> Result<ModInfo, ModInfoError> {
    let namespace = capture(&NAMESPACE, content).ok_or(ModInfoError::MissingField("namespace"))?;
    let version = capture(&VERSION, content).ok_or(ModInfoError::MissingField("Version"))?;
    let declared_side = capture(&SIDE, content).ok_or(ModInfoError::MissingField("Side"))?;
    let description = capture(&DESCRIPTION, content).unwrap_or_default();

    let mod_id = namespace.to_lowercase().replace(' ', "");
    let side = Side::parse(&declared_side).unwrap_or_else(|| {
        warn!("Unknown side {:?} for {}, assuming both", declared_side, mod_id);
        Side::default()
    });

    Ok(ModInfo {
        name: namespace,
        version,
        mod_id,
        side,
        description,
    })
}

pub fn read_source_mod(path: &Path) -> Result<ModInfo, ModInfoError> {
    debug!("Reading source mod {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_source_mod(content.trim_start_matches('\u{feff}'))
}
