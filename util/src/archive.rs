//! CSV archiving functionality
//!
//! An [`Archiver`] writes timestamped rows into a CSV file inside the session's archive
//! directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
pub struct Archiver<W: Write = File> {
    writer: Writer<W>,
    num_columns: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    CreateError(std::io::Error),

    #[error("Expected a record with {0} columns but got {1}")]
    WrongRecordLength(usize, usize),

    #[error("Cannot write to the archive: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver<File> {
    /// Create a new archiver from a paricular path relative to the session's archive root.
    ///
    /// The file is truncated and the header row written immediately.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session,
        path: P,
        header: &[&str],
    ) -> Result<Self, ArchiveError> {
        let session_path = session.arch_root.join(path);

        let file = File::create(session_path).map_err(ArchiveError::CreateError)?;

        Self::from_writer(file, header)
    }
}

impl<W: Write> Archiver<W> {
    /// Create an archiver around any writer, writing the header row first.
    pub fn from_writer(inner: W, header: &[&str]) -> Result<Self, ArchiveError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);

        writer.write_record(header)?;
        writer.flush().map_err(ArchiveError::FlushError)?;

        Ok(Self {
            writer,
            num_columns: header.len(),
        })
    }

    /// Write a single row into the archive.
    ///
    /// The row must have as many fields as the header.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<(), ArchiveError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let fields: Vec<T> = record.into_iter().collect();

        if fields.len() != self.num_columns {
            return Err(ArchiveError::WrongRecordLength(
                self.num_columns,
                fields.len(),
            ));
        }

        self.writer.write_record(fields)?;
        self.writer.flush().map_err(ArchiveError::FlushError)?;

        Ok(())
    }

    /// Consume the archiver, returning the inner writer.
    pub fn into_inner(self) -> Result<W, ArchiveError> {
        self.writer
            .into_inner()
            .map_err(|e| {
                ArchiveError::FlushError(std::io::Error::new(e.error().kind(), e.error().to_string()))
            })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_write_records() {
        let mut arch = Archiver::from_writer(Vec::new(), &["a", "b"]).unwrap();

        arch.write_record(&["1", "2"]).unwrap();
        arch.write_record(vec![String::from("3"), String::from("4")])
            .unwrap();

        let out = String::from_utf8(arch.into_inner().unwrap()).unwrap();
        assert_eq!(out, "a,b\n1,2\n3,4\n");
    }

    #[test]
    fn test_wrong_length() {
        let mut arch = Archiver::from_writer(Vec::new(), &["a", "b"]).unwrap();

        assert!(matches!(
            arch.write_record(&["1"]),
            Err(ArchiveError::WrongRecordLength(2, 1))
        ));
    }
}
