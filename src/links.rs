use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Mod pages on the mod database.
pub const MOD_DB_URL: &str = "https://mods.vintagestory.at/show/mod/";

/// CDN the mod database serves release files from.
pub const MOD_DOWNLOAD_BASE: &str = "https://moddbcdn.vintagestory.at/";

/// Content hash the mod database appends to uploaded file names.
static CONTENT_HASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+)[_+][0-9a-fA-F]{32}$").expect("valid content hash regex")
});

/// Page of a mod on the mod database.
pub fn mod_page_url(mod_id: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(MOD_DB_URL)?;
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(mod_id);
    }
    Ok(url.into())
}

/// Strips a trailing `_<hash>` or `+<hash>` from a file stem.
pub fn strip_content_hash(stem: &str) -> &str {
    CONTENT_HASH
        .captures(stem)
        .and_then(|caps| caps.name("name"))
        .map_or(stem, |name| name.as_str())
}

/// File name a release is offered under, e.g. `mymod-1.20.4-v1.2.1.zip` for
/// `mymod-1.20.4_<hash>.zip` at version `1.2.1`.
pub fn release_file_name(file_name: &str, version: &str) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let name = strip_content_hash(&stem);
    let versioned = format!("-v{}", version);
    let mut release = if name.ends_with(&versioned) {
        name.to_string()
    } else {
        format!("{}{}", name, versioned)
    };
    if let Some(ext) = path.extension() {
        release.push('.');
        release.push_str(&ext.to_string_lossy());
    }
    release
}

/// Download link for a mod file, keeping the stored file name in the path and
/// the release file name in the `dl` query parameter.
pub fn download_url(file_name: &str, version: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(MOD_DOWNLOAD_BASE)?;
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(file_name);
    }
    let release: String =
        url::form_urlencoded::byte_serialize(release_file_name(file_name, version).as_bytes())
            .collect();
    url.set_query(Some(&format!("dl={}", release.replace('+', "%20"))));
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "apeflowerpots-1.20.4_b34cb937d2b07ff986b963cde118cc23.zip";

    #[test]
    fn builds_download_url_for_hashed_file() {
        assert_eq!(
            download_url(SAMPLE, "1.2.1").unwrap(),
            "https://moddbcdn.vintagestory.at/apeflowerpots-1.20.4_b34cb937d2b07ff986b963cde118cc23.zip?dl=apeflowerpots-1.20.4-v1.2.1.zip"
        );
    }

    #[test]
    fn builds_mod_page_url() {
        assert_eq!(
            mod_page_url("apeflowerpots").unwrap(),
            "https://mods.vintagestory.at/show/mod/apeflowerpots"
        );
    }

    #[test]
    fn strips_plus_delimited_hash() {
        assert_eq!(
            strip_content_hash("carryon+0123456789abcdef0123456789ABCDEF"),
            "carryon"
        );
    }

    #[test]
    fn leaves_short_or_non_hex_suffixes_alone() {
        assert_eq!(strip_content_hash("mod_1234abcd"), "mod_1234abcd");
        assert_eq!(
            strip_content_hash("mod_zz34cb937d2b07ff986b963cde118cc23"),
            "mod_zz34cb937d2b07ff986b963cde118cc23"
        );
        assert_eq!(strip_content_hash("plainmod"), "plainmod");
    }

    #[test]
    fn does_not_repeat_version_suffix() {
        assert_eq!(release_file_name("mymod-v1.0.0.zip", "1.0.0"), "mymod-v1.0.0.zip");
        assert_eq!(release_file_name("mymod.zip", "1.0.0"), "mymod-v1.0.0.zip");
    }

    #[test]
    fn keeps_source_extension() {
        assert_eq!(release_file_name("HudClock.cs", "2.0"), "HudClock-v2.0.cs");
    }

    #[test]
    fn encodes_unsafe_characters() {
        let url = download_url("my mod.zip", "1.0").unwrap();
        assert_eq!(
            url,
            "https://moddbcdn.vintagestory.at/my%20mod.zip?dl=my%20mod-v1.0.zip"
        );
    }

    #[test]
    fn keeps_plus_and_ampersand_inside_release_name() {
        let url = download_url("a+b&c.zip", "1.0").unwrap();
        assert_eq!(
            url,
            "https://moddbcdn.vintagestory.at/a+b&c.zip?dl=a%2Bb%26c-v1.0.zip"
        );
    }
}
