//! Archive entry extraction: ZIP, RAR and 7Z backends behind one contract.

use std::io::{Cursor, Read, Write};

use sevenz_rust::{Password, SevenZReader};
use tempfile::NamedTempFile;
use unrar::Archive;
use zip::ZipArchive;

use crate::config::WEBP_SUFFIX;
use crate::error::PipelineError;

/// Supported container formats, selected by filename suffix alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Rar,
    SevenZ,
}

impl ArchiveKind {
    /// Case-insensitive suffix dispatch; `None` for anything unrecognized.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".rar") {
            Some(Self::Rar)
        } else if name.ends_with(".7z") {
            Some(Self::SevenZ)
        } else {
            None
        }
    }
}

/// A WebP file pulled out of an archive. `name` is the entry's basename
/// with any directory components stripped, original case preserved.
#[derive(Debug, Clone)]
pub struct ExtractedEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Walk the archive in listing order and return the bytes of every entry
/// whose name ends in `.webp` (case-insensitive), basenamed. Entries with
/// other extensions are skipped silently.
///
/// Never fails: a structural error (corrupt container, unreadable entry)
/// is logged and whatever was read before it is returned, possibly
/// nothing. There is no guard against crafted archives; entry counts and
/// decompressed sizes are unbounded.
pub fn extract_webp_entries(data: &[u8], kind: ArchiveKind) -> Vec<ExtractedEntry> {
    let mut entries = Vec::new();

    let result = match kind {
        ArchiveKind::Zip => extract_zip(data, &mut entries),
        ArchiveKind::Rar => extract_rar(data, &mut entries),
        ArchiveKind::SevenZ => extract_7z(data, &mut entries),
    };

    if let Err(e) = result {
        log::warn!("{kind:?} extraction stopped early: {e}");
    }

    log::debug!("extracted {} WebP entries from {kind:?} archive", entries.len());
    entries
}

fn is_webp_entry(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(WEBP_SUFFIX)
}

fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

fn extract_zip(data: &[u8], entries: &mut Vec<ExtractedEntry>) -> Result<(), PipelineError> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| PipelineError::ArchiveOpen(e.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| PipelineError::ArchiveRead(e.to_string()))?;
        if entry.is_dir() || !is_webp_entry(entry.name()) {
            continue;
        }

        let name = basename(entry.name()).to_string();
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .map_err(|e| PipelineError::ArchiveRead(e.to_string()))?;

        entries.push(ExtractedEntry { name, data: buf });
    }

    Ok(())
}

fn extract_rar(data: &[u8], entries: &mut Vec<ExtractedEntry>) -> Result<(), PipelineError> {
    // unrar only opens archives by path, so spool the buffer to disk first.
    let mut spool =
        NamedTempFile::new().map_err(|e| PipelineError::ArchiveOpen(e.to_string()))?;
    spool
        .write_all(data)
        .map_err(|e| PipelineError::ArchiveOpen(e.to_string()))?;

    let mut archive = Archive::new(spool.path())
        .open_for_processing()
        .map_err(|e| PipelineError::ArchiveOpen(e.to_string()))?;

    while let Some(header) = archive
        .read_header()
        .map_err(|e| PipelineError::ArchiveRead(e.to_string()))?
    {
        let entry = header.entry();
        let filename = entry.filename.to_string_lossy().into_owned();

        archive = if entry.is_file() && is_webp_entry(&filename) {
            let (data, rest) = header
                .read()
                .map_err(|e| PipelineError::ArchiveRead(e.to_string()))?;
            entries.push(ExtractedEntry {
                name: basename(&filename).to_string(),
                data,
            });
            rest
        } else {
            header
                .skip()
                .map_err(|e| PipelineError::ArchiveRead(e.to_string()))?
        };
    }

    Ok(())
}

fn extract_7z(data: &[u8], entries: &mut Vec<ExtractedEntry>) -> Result<(), PipelineError> {
    let len = data.len() as u64;
    let mut archive = SevenZReader::new(Cursor::new(data), len, Password::empty())
        .map_err(|e| PipelineError::ArchiveOpen(e.to_string()))?;

    archive
        .for_each_entries(|entry, reader| {
            // The entry reader is positional, so skipped entries still
            // have to be drained before the next one can be read.
            let mut buf = Vec::new();
            if let Err(e) = reader.read_to_end(&mut buf) {
                log::warn!("unreadable 7z entry {}: {e}", entry.name());
                return Ok(false);
            }

            if !entry.is_directory() && is_webp_entry(entry.name()) {
                entries.push(ExtractedEntry {
                    name: basename(entry.name()).to_string(),
                    data: buf,
                });
            }
            Ok(true)
        })
        .map_err(|e| PipelineError::ArchiveRead(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::write::SimpleFileOptions;

    fn zip_fixture(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in files {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn suffix_dispatch_is_case_insensitive() {
        assert_eq!(ArchiveKind::from_name("photos.zip"), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::from_name("PHOTOS.ZIP"), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::from_name("scans.RaR"), Some(ArchiveKind::Rar));
        assert_eq!(ArchiveKind::from_name("dump.7Z"), Some(ArchiveKind::SevenZ));
        assert_eq!(ArchiveKind::from_name("notes.tar"), None);
        assert_eq!(ArchiveKind::from_name("zip"), None);
        assert_eq!(ArchiveKind::from_name(""), None);
    }

    #[test]
    fn zip_filters_and_basenames_entries() {
        let data = zip_fixture(&[
            ("a.webp", b"first"),
            ("b.png", b"not wanted"),
            ("sub/c.WEBP", b"second"),
        ]);

        let entries = extract_webp_entries(&data, ArchiveKind::Zip);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.webp");
        assert_eq!(entries[0].data, b"first");
        assert_eq!(entries[1].name, "c.WEBP");
        assert_eq!(entries[1].data, b"second");
    }

    #[test]
    fn corrupt_zip_yields_nothing() {
        let entries = extract_webp_entries(b"this is not a zip file", ArchiveKind::Zip);
        assert!(entries.is_empty());
    }

    #[test]
    fn corrupt_rar_yields_nothing() {
        let entries = extract_webp_entries(b"this is not a rar file", ArchiveKind::Rar);
        assert!(entries.is_empty());
    }

    #[test]
    fn corrupt_7z_yields_nothing() {
        let entries = extract_webp_entries(b"this is not a 7z file", ArchiveKind::SevenZ);
        assert!(entries.is_empty());
    }

    #[test]
    fn sevenz_extraction_filters_entries() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.webp"), b"webp bytes").unwrap();
        std::fs::write(src.path().join("b.txt"), b"not an image").unwrap();

        let out = tempfile::tempdir().unwrap();
        let archive_path = out.path().join("fixture.7z");
        sevenz_rust::compress_to_path(src.path(), &archive_path).unwrap();

        let data = std::fs::read(&archive_path).unwrap();
        let entries = extract_webp_entries(&data, ArchiveKind::SevenZ);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.webp");
        assert_eq!(entries[0].data, b"webp bytes");
    }
}
