//! `.wotmod` package assembly.
//!
//! A mod package is a plain zip whose entries are stored uncompressed;
//! the game mounts it as an overlay over `res/`. Each transformed
//! document is written at every destination path its source asset is
//! mounted under, so one document may appear several times.

use std::io::{Cursor, Seek, Write};

use thiserror::Error;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Conventional file name for a produced package.
pub const DEFAULT_PACKAGE_NAME: &str = "styles.wotmod";

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One transformed document plus every archive path it appears at.
#[derive(Debug, Clone)]
pub struct PackageEntry {
    pub destinations: Vec<String>,
    pub content: String,
}

/// Write the whole batch to `writer` as a stored zip.
///
/// Every destination of every entry becomes an archive member carrying
/// that entry's content; an empty batch produces a valid empty archive.
pub fn write_package<W: Write + Seek>(
    writer: W,
    entries: &[PackageEntry],
) -> Result<(), PackageError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for entry in entries {
        for destination in &entry.destinations {
            zip.start_file(destination.as_str(), options)?;
            zip.write_all(entry.content.as_bytes())?;
        }
    }

    zip.finish()?;
    Ok(())
}

/// In-memory variant of [`write_package`].
pub fn package_to_vec(entries: &[PackageEntry]) -> Result<Vec<u8>, PackageError> {
    let mut cursor = Cursor::new(Vec::new());
    write_package(&mut cursor, entries)?;
    Ok(cursor.into_inner())
}
