// Delimited (CSV/TSV) import/export

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use recmatch_table::{Record, Source};

use crate::error::IoError;

/// Lower-cased file extension of `path`, or `default` when it has none.
pub fn get_format(path: &Path, default: &str) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map_or_else(|| default.to_string(), str::to_ascii_lowercase)
}

/// Field delimiter for a format name.
pub fn delimiter_for(format: &str) -> Result<u8, IoError> {
    match format {
        "csv" => Ok(b','),
        "tsv" | "tab" | "chr" => Ok(b'\t'),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

/// Decode bytes as UTF-8, falling back to Windows-1252 (common for Excel-exported files).
pub fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(decode_text(bytes))
}

/// Parse delimited text: the first row names the columns, every later row is
/// one record. Records carry their 1-based data row as `input_line`.
pub fn import_str(content: &str, delimiter: u8) -> Result<Source, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut source = Source::new(headers.clone());
    let mut overlong = 0usize;

    for (row_idx, result) in reader.records().enumerate() {
        let row = result?;
        if row.len() > headers.len() {
            overlong += 1;
        }
        // Short rows are padded with empty values.
        let record = Record::from_pairs(
            headers
                .iter()
                .enumerate()
                .map(|(col, header)| (header.as_str(), row.get(col).unwrap_or(""))),
        )
        .with_input_line(row_idx + 1);
        source.add_record(record, None)?;
    }

    if overlong > 0 {
        log::warn!("{overlong} rows have more fields than the header row; extra fields dropped");
    }
    log::debug!("imported {} records with {} columns", source.len(), headers.len());
    Ok(source)
}

pub fn import_reader<R: Read>(mut reader: R, delimiter: u8) -> Result<Source, IoError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    import_str(&decode_text(bytes), delimiter)
}

/// Import a file, picking the delimiter from its extension (or `default_format`).
pub fn import_source(path: &Path, default_format: &str) -> Result<Source, IoError> {
    let delimiter = delimiter_for(&get_format(path, default_format))?;
    let content = read_file_as_utf8(path)?;
    import_str(&content, delimiter)
}

/// Write a header row, then every record's values in header order.
pub fn export_source<W: Write>(source: &Source, writer: W, delimiter: u8) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    writer.write_record(source.headers())?;
    for record in source {
        writer.write_record(
            source
                .headers()
                .iter()
                .map(|header| record.get(header).unwrap_or("")),
        )?;
    }

    writer.flush()?;
    Ok(())
}

pub fn export_path(source: &Source, path: &Path, delimiter: u8) -> Result<(), IoError> {
    let file = File::create(path)?;
    export_source(source, file, delimiter)
}
