// Processed index files (JSON)

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use recmatch_link::ProcessedSource;
use serde::{Deserialize, Serialize};

use crate::error::IoError;

/// Index file format version.
/// Increment when the serialized index changes in a way old readers can't load.
pub const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct IndexFileRef<'a> {
    format_version: u32,
    index: &'a ProcessedSource,
}

#[derive(Deserialize)]
struct IndexFile {
    index: ProcessedSource,
}

/// Only the version, so a newer file fails cleanly instead of mid-decode.
#[derive(Deserialize)]
struct VersionHeader {
    format_version: u32,
}

fn check_version(found: u32) -> Result<(), IoError> {
    if found != INDEX_FORMAT_VERSION {
        return Err(IoError::IndexVersion {
            found,
            expected: INDEX_FORMAT_VERSION,
        });
    }
    Ok(())
}

pub fn write_index<W: Write>(index: &ProcessedSource, writer: W) -> Result<(), IoError> {
    let file = IndexFileRef {
        format_version: INDEX_FORMAT_VERSION,
        index,
    };
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, &file)?;
    writer.flush()?;
    Ok(())
}

pub fn read_index(content: &str) -> Result<ProcessedSource, IoError> {
    let header: VersionHeader = serde_json::from_str(content)?;
    check_version(header.format_version)?;

    let file: IndexFile = serde_json::from_str(content)?;
    Ok(file.index)
}

pub fn save_index(index: &ProcessedSource, path: &Path) -> Result<(), IoError> {
    let file = File::create(path)?;
    write_index(index, file)?;
    log::debug!("wrote processed index ({} records) to {}", index.source().len(), path.display());
    Ok(())
}

pub fn load_index(path: &Path) -> Result<ProcessedSource, IoError> {
    let mut content = String::new();
    BufReader::new(File::open(path)?).read_to_string(&mut content)?;
    read_index(&content)
}
