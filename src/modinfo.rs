use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::model::Side;

/// File name of the descriptor every mod archive carries.
pub const MODINFO_FILE: &str = "modinfo.json";

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*//[^\n]*$").expect("valid comment regex"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid trailing comma regex"));

#[derive(Debug, Error)]
pub enum ModInfoError {
    #[error("Failed to read mod file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to open archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("No modinfo.json found")]
    MissingDescriptor,
    #[error("modinfo.json claims to be {0} bytes")]
    DescriptorTooLarge(u64),
    #[error("modinfo.json is not valid UTF-8")]
    InvalidEncoding,
    #[error("Failed to parse modinfo.json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing `{0}` field")]
    MissingField(&'static str),
    #[error("Failed to build mod URL: {0}")]
    Url(#[from] url::ParseError),
}

/// The identity fields declared by a mod.
#[derive(Debug, Clone, PartialEq)]
pub struct ModInfo {
    pub name: String,
    pub version: String,
    pub mod_id: String,
    pub side: Side,
    pub description: String,
}

/// Layouts the descriptor fields are found in, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorShape {
    /// Fields at the top level of the document.
    Flat,
    /// Fields one level down, under a wrapper key such as `"ModInfo"`.
    Wrapped,
}

impl DescriptorShape {
    pub const PRIORITY: [DescriptorShape; 2] = [DescriptorShape::Flat, DescriptorShape::Wrapped];

    /// The object this shape reads fields from, if the document has one.
    pub fn fields<'a>(&self, document: &'a Map<String, Value>) -> Option<&'a Map<String, Value>> {
        match self {
            DescriptorShape::Flat => Some(document).filter(|fields| has_mod_id(fields)),
            DescriptorShape::Wrapped => document
                .values()
                .filter_map(Value::as_object)
                .find(|fields| has_mod_id(fields)),
        }
    }
}

fn has_mod_id(fields: &Map<String, Value>) -> bool {
    lookup(fields, "modid").is_some_and(|v| !v.is_null())
}

/// Case-insensitive key lookup.
fn lookup<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn lookup_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match lookup(fields, key)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Removes what mod authors commonly leave in hand-written JSON: a byte
/// order mark, whole-line `//` comments and trailing commas.
pub fn clean_json(raw: &str) -> Cow<'_, str> {
    let raw = raw.trim_start_matches('\u{feff}');
    match LINE_COMMENT.replace_all(raw, "") {
        Cow::Borrowed(text) => TRAILING_COMMA.replace_all(text, "$1"),
        Cow::Owned(text) => Cow::Owned(TRAILING_COMMA.replace_all(&text, "$1").into_owned()),
    }
}

/// Parses the text of a `modinfo.json`.
pub fn parse_modinfo(raw: &str) -> Result<ModInfo, ModInfoError> {
    let document: Map<String, Value> = serde_json::from_str(&clean_json(raw))?;

    let fields = DescriptorShape::PRIORITY
        .iter()
        .find_map(|shape| shape.fields(&document))
        .ok_or(ModInfoError::MissingField("modid"))?;

    let mod_id = lookup_string(fields, "modid")
        .ok_or(ModInfoError::MissingField("modid"))?
        .to_lowercase();
    let name = lookup_string(fields, "name").ok_or(ModInfoError::MissingField("name"))?;
    let version = lookup_string(fields, "version").ok_or(ModInfoError::MissingField("version"))?;

    let side = match lookup_string(fields, "side") {
        None => Side::default(),
        Some(declared) => Side::parse(&declared).unwrap_or_else(|| {
            warn!("Unknown side {:?} for {}, assuming both", declared, mod_id);
            Side::default()
        }),
    };
    let description = lookup_string(fields, "description").unwrap_or_default();

    Ok(ModInfo {
        name,
        version,
        mod_id,
        side,
        description,
    })
}
