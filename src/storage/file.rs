//! Table file I/O
//!
//! Reads a table file into positional rows and writes it back through an
//! atomic replace.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::FileSyncStrategy;
use crate::error::{Result, TabulaError};
use crate::schema::TableSchema;

/// Suffix of the sibling file written before the rename
const TEMP_SUFFIX: &str = "tmp";

/// Replace `path` with whatever `write` produces
///
/// Writes a sibling temp file, optionally fsyncs it, then renames it over
/// `path`. Readers see either the old contents or the new, never a mix.
pub fn replace_file<F>(path: &Path, sync: FileSyncStrategy, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let tmp_path = temp_path(path);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp_path)?;
    let mut writer = BufWriter::new(file);

    let written = write(&mut writer).and_then(|()| writer.flush().map_err(TabulaError::from));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    let file = writer
        .into_inner()
        .map_err(|e| TabulaError::Io(e.into_error()))?;
    if sync == FileSyncStrategy::EveryWrite {
        file.sync_all()?;
    }
    drop(file);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    if sync == FileSyncStrategy::EveryWrite {
        sync_parent_dir(path)?;
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => File::open(dir)?.sync_all(),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// One table's backing flat file
///
/// ## Layout
/// ```text
/// id,name,joined          <- header: field names in schema order
/// 1,alice,2024-01-02 ...  <- data row 0
/// ,,                      <- data row 1 (tombstone)
/// 3,carol,                <- data row 2 (null timestamp)
/// ```
/// No handle is held between calls.
#[derive(Debug, Clone)]
pub struct TableFile {
    path: PathBuf,
    sync: FileSyncStrategy,
}

impl TableFile {
    pub fn new(path: impl Into<PathBuf>, sync: FileSyncStrategy) -> Self {
        Self {
            path: path.into(),
            sync,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether anything occupies the file's path
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write a file holding only the header row
    pub fn create(&self, schema: &TableSchema) -> Result<()> {
        self.write_rows(schema, &[])
    }

    /// Read every data row (header excluded) as positional text fields
    ///
    /// The header must match the schema's field names and every row must
    /// have one field per schema field.
    pub fn read_rows(&self, schema: &TableSchema) -> Result<Vec<Vec<String>>> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                TabulaError::NotFound(format!("table file {}", self.path.display()))
            }
            _ => TabulaError::Io(e),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);
        let mut records = reader.records();

        let header = records.next().transpose()?.ok_or_else(|| {
            TabulaError::CorruptHeader(format!("{} has no header row", self.path.display()))
        })?;
        let expected = schema.field_names();
        if !header.iter().eq(expected.iter().copied()) {
            return Err(TabulaError::CorruptHeader(format!(
                "{} has header {:?}, expected {:?}",
                self.path.display(),
                header.iter().collect::<Vec<_>>(),
                expected
            )));
        }

        let mut rows = Vec::new();
        for (row, record) in records.enumerate() {
            let record = record?;
            if record.len() != expected.len() {
                return Err(TabulaError::CorruptRecord {
                    row,
                    reason: format!("expected {} fields, found {}", expected.len(), record.len()),
                });
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(rows)
    }

    /// Atomically replace the file with the header plus `rows`
    pub fn write_rows(&self, schema: &TableSchema, rows: &[Vec<String>]) -> Result<()> {
        replace_file(&self.path, self.sync, |w| {
            let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(w);
            writer.write_record(schema.field_names())?;
            for row in rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
            Ok(())
        })
    }

    /// Delete the backing file
    pub fn remove(&self) -> Result<()> {
        fs::remove_file(&self.path)?;
        Ok(())
    }
}
