use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::modinfo::{self, ModInfo, ModInfoError, MODINFO_FILE};

/// Largest descriptor read out of an archive. Real ones are a few hundred bytes.
const MAX_DESCRIPTOR_SIZE: u64 = 1024 * 1024;

fn is_descriptor(file_name: &str) -> bool {
    file_name.eq_ignore_ascii_case(MODINFO_FILE)
}

/// Picks the descriptor entry out of an archive listing.
///
/// A root-level `modinfo.json` wins. Otherwise, if every entry lives under the
/// same top-level folder, `<folder>/modinfo.json` is used. Anything deeper is
/// not considered.
pub fn find_descriptor<'a, I>(names: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = names.into_iter().collect();

    if let Some(root) = names.iter().find(|name| is_descriptor(name)) {
        return Some(root.to_string());
    }

    let mut folder: Option<&str> = None;
    for name in names.iter() {
        let (top, _) = name.split_once('/')?;
        match folder {
            Some(existing) if existing != top => return None,
            _ => folder = Some(top),
        }
    }
    let folder = folder?;

    names
        .iter()
        .find(|name| {
            name.split_once('/')
                .is_some_and(|(top, rest)| top == folder && is_descriptor(rest))
        })
        .map(|name| name.to_string())
}

/// Reads the descriptor text out of an opened archive.
pub fn read_descriptor<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String, ModInfoError> {
    let entry_name =
        find_descriptor(archive.file_names()).ok_or(ModInfoError::MissingDescriptor)?;
    debug!("Reading {}", entry_name);

    let entry = archive.by_name(&entry_name)?;
    if entry.size() > MAX_DESCRIPTOR_SIZE {
        return Err(ModInfoError::DescriptorTooLarge(entry.size()));
    }
    let mut bytes = Vec::new();
    entry.take(MAX_DESCRIPTOR_SIZE).read_to_end(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| ModInfoError::InvalidEncoding)
}

/// Opens a mod archive and parses its descriptor. The archive is closed again
/// before this returns, whether or not parsing succeeded.
pub fn read_mod_archive(path: &Path) -> Result<ModInfo, ModInfoError> {
    debug!("Opening archive {}", path.display());
    let reader = BufReader::new(File::open(path)?);
    let mut archive = ZipArchive::new(reader)?;
    let raw = read_descriptor(&mut archive)?;
    modinfo::parse_modinfo(&raw)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Writes a zip at `path` holding the given `(name, contents)` entries.
    /// Names ending in `/` become directories.
    pub(crate) fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(contents.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    const FLOWERPOTS: &str =
        r#"{ "name": "Custom Flowerpots", "version": "1.2.1", "modid": "apeflowerpots" }"#;

    #[test]
    fn finds_root_descriptor() {
        let names = ["assets/", "ModInfo.json", "modicon.png"];
        assert_eq!(find_descriptor(names), Some("ModInfo.json".to_string()));
    }

    #[test]
    fn finds_descriptor_in_single_top_level_folder() {
        let names = ["mymod/", "mymod/modinfo.json", "mymod/assets/a.json"];
        assert_eq!(
            find_descriptor(names),
            Some("mymod/modinfo.json".to_string())
        );
    }

    #[test]
    fn ignores_descriptor_when_folders_differ() {
        let names = ["a/modinfo.json", "b/readme.txt"];
        assert_eq!(find_descriptor(names), None);
    }

    #[test]
    fn ignores_descriptor_beside_root_files() {
        let names = ["readme.txt", "mymod/modinfo.json"];
        assert_eq!(find_descriptor(names), None);
    }

    #[test]
    fn ignores_deeply_nested_descriptor() {
        let names = ["mymod/inner/modinfo.json"];
        assert_eq!(find_descriptor(names), None);
    }

    #[test]
    fn reads_archive_with_root_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowerpots.zip");
        write_zip(&path, &[("modinfo.json", FLOWERPOTS), ("assets/", "")]);

        let info = read_mod_archive(&path).unwrap();
        assert_eq!(info.name, "Custom Flowerpots");
        assert_eq!(info.mod_id, "apeflowerpots");
    }

    #[test]
    fn reads_archive_with_nested_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested.zip");
        write_zip(
            &path,
            &[("Flowerpots/", ""), ("Flowerpots/modinfo.json", FLOWERPOTS)],
        );

        let info = read_mod_archive(&path).unwrap();
        assert_eq!(info.version, "1.2.1");
    }

    #[test]
    fn missing_descriptor_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodescriptor.zip");
        write_zip(&path, &[("readme.txt", "hello")]);

        let err = read_mod_archive(&path).unwrap_err();
        assert!(matches!(err, ModInfoError::MissingDescriptor));
    }

    #[test]
    fn corrupt_archive_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"this is not a zip file").unwrap();

        let err = read_mod_archive(&path).unwrap_err();
        assert!(matches!(err, ModInfoError::Zip(_)));
    }

    #[test]
    fn non_utf8_descriptor_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file("modinfo.json", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(&[0x7b, 0xff, 0xfe, 0x7d]).unwrap();
        writer.finish().unwrap();

        let err = read_mod_archive(&path).unwrap_err();
        assert!(matches!(err, ModInfoError::InvalidEncoding));
    }

    fn u16_at(bytes: &[u8], at: usize) -> usize {
        u16::from_le_bytes([bytes[at], bytes[at + 1]]) as usize
    }

    /// Rewrites the zip64 uncompressed size of the first central directory
    /// entry in an archive written with `large_file(true)`.
    fn set_central_zip64_size(path: &Path, size: u64) {
        let mut bytes = std::fs::read(path).unwrap();
        let header = bytes
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .expect("central directory header");
        bytes[header + 24..header + 28].copy_from_slice(&[0xff; 4]);

        let mut field = header + 46 + u16_at(&bytes, header + 28);
        let extra_end = field + u16_at(&bytes, header + 30);
        while field < extra_end {
            if u16_at(&bytes, field) == 0x0001 {
                bytes[field + 4..field + 12].copy_from_slice(&size.to_le_bytes());
                std::fs::write(path, bytes).unwrap();
                return;
            }
            field += 4 + u16_at(&bytes, field + 2);
        }
        panic!("no zip64 extra field");
    }

    #[test]
    fn oversized_descriptor_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_zip(&dir.path().join("a_good.zip"), &[("modinfo.json", FLOWERPOTS)]);

        let path = dir.path().join("b_huge.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file(
                "modinfo.json",
                SimpleFileOptions::default()
                    .compression_method(zip::CompressionMethod::Stored)
                    .large_file(true),
            )
            .unwrap();
        writer.write_all(FLOWERPOTS.as_bytes()).unwrap();
        writer.finish().unwrap();
        set_central_zip64_size(&path, u64::MAX - 16);

        let report = crate::scan::scan_mod_dir(dir.path()).unwrap();
        assert_eq!(report.mods.len(), 1);
        assert_eq!(report.mods[0].mod_id, "apeflowerpots");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].file_name, "b_huge.zip");
        assert!(matches!(
            report.skipped[0].reason,
            ModInfoError::DescriptorTooLarge(_)
        ));
    }
}
