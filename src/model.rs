use std::fmt;

use serde::Serialize;

/// Which side of the game a mod needs to be installed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Client,
    Server,
    #[default]
    Both,
}

impl Side {
    /// Maps a declared side to a [`Side`]. `Universal` is the name the game
    /// itself uses for [`Side::Both`].
    pub fn parse(value: &str) -> Option<Side> {
        match value.trim().to_ascii_lowercase().as_str() {
            "client" => Some(Side::Client),
            "server" => Some(Side::Server),
            "universal" | "both" => Some(Side::Both),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Client => "client",
            Side::Server => "server",
            Side::Both => "both",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "ModId")]
    pub mod_id: String,
    #[serde(rename = "Side")]
    pub side: Side,
    #[serde(rename = "Description")]
    pub description: String,
    pub url_mod: String,
    pub url_download: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ModList {
    #[serde(rename = "Mods")]
    pub mods: Vec<ModRecord>,
}
