// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Streaming record scanner
//!
//! Reads one record at a time from any `Read`, so memory use is bounded by
//! the largest record rather than the file size.

use crate::decoder::parse_record_header;
use crate::header::{parse_header, FileHeader, FILE_CODE, FILE_VERSION, HEADER_LEN};
use std::io::{self, Read};
use thiserror::Error;

/// Size of a record header in bytes
const RECORD_HEADER_LEN: usize = 8;

/// Why scanning stopped on a malformed file
#[derive(Error, Debug)]
pub enum ScanError {
    /// Underlying read failed
    #[error("read failed: {0}")]
    Io(#[source] io::Error),
    /// Structure is not a valid shapefile
    #[error("malformed shapefile: {0}")]
    Malformed(String),
}

impl From<io::Error> for ScanError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ScanError::Malformed("unexpected end of file".to_string())
        } else {
            ScanError::Io(e)
        }
    }
}

/// Raw record pulled from the stream
#[derive(Debug)]
pub struct RawRecord {
    /// Record number as stored (1-based)
    pub number: i32,
    /// Zero-based position of the record in the file
    pub index: usize,
    /// Record content (shape type onwards)
    pub content: Vec<u8>,
}

/// Sequential record scanner over a `.shp` byte stream
pub struct RecordScanner<R> {
    reader: R,
    header: FileHeader,
    /// Bytes consumed so far, header included
    pos: u64,
    index: usize,
}

impl<R: Read> RecordScanner<R> {
    /// Read and validate the main header
    pub fn new(mut reader: R) -> Result<Self, ScanError> {
        let mut buf = [0u8; HEADER_LEN];
        reader.read_exact(&mut buf).map_err(|e| match ScanError::from(e) {
            ScanError::Malformed(_) => {
                ScanError::Malformed("file shorter than the 100-byte header".to_string())
            }
            other => other,
        })?;

        let (_, header) = parse_header(&buf)
            .map_err(|_| ScanError::Malformed("unreadable header".to_string()))?;

        if header.file_code != FILE_CODE {
            return Err(ScanError::Malformed(format!(
                "bad file code {} (expected {})",
                header.file_code, FILE_CODE
            )));
        }

        if header.version != FILE_VERSION {
            log::warn!(
                "Unexpected shapefile version {} (expected {}), reading anyway",
                header.version,
                FILE_VERSION
            );
        }

        Ok(Self {
            reader,
            header,
            pos: HEADER_LEN as u64,
            index: 0,
        })
    }

    /// Main file header
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Read the next record
    ///
    /// Returns `Ok(None)` at the declared end of file, or at a clean end of
    /// stream on a record boundary.
    pub fn next_record(&mut self) -> Result<Option<RawRecord>, ScanError> {
        if self.pos >= self.header.file_length {
            return Ok(None);
        }

        let mut head = [0u8; RECORD_HEADER_LEN];
        match read_full(&mut self.reader, &mut head)? {
            0 => {
                log::warn!(
                    "Shapefile ended at byte {} before its declared length {}",
                    self.pos,
                    self.header.file_length
                );
                return Ok(None);
            }
            n if n < RECORD_HEADER_LEN => {
                return Err(ScanError::Malformed(format!(
                    "truncated record header at byte {}",
                    self.pos
                )));
            }
            _ => {}
        }

        let (_, (number, length)) = parse_record_header(&head)
            .map_err(|_| ScanError::Malformed("unreadable record header".to_string()))?;

        let end = self.pos + (RECORD_HEADER_LEN + length) as u64;
        if end > self.header.file_length {
            return Err(ScanError::Malformed(format!(
                "record {} extends past the declared file length",
                number
            )));
        }

        let mut content = vec![0u8; length];
        self.reader.read_exact(&mut content)?;

        let record = RawRecord {
            number,
            index: self.index,
            content,
        };
        self.pos = end;
        self.index += 1;

        Ok(Some(record))
    }
}

/// Fill `buf` as far as the stream allows, returning the bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn file_with_records(records: &[Vec<u8>], declared_extra: i32) -> Vec<u8> {
        let body_len: usize = records.iter().map(|r| r.len() + RECORD_HEADER_LEN).sum();
        let words = ((HEADER_LEN + body_len) / 2) as i32 + declared_extra;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&FILE_CODE.to_be_bytes());
        bytes.extend_from_slice(&[0u8; 20]);
        bytes.extend_from_slice(&words.to_be_bytes());
        bytes.extend_from_slice(&FILE_VERSION.to_le_bytes());
        bytes.extend_from_slice(&5i32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 64]);
        for (i, content) in records.iter().enumerate() {
            bytes.extend_from_slice(&(i as i32 + 1).to_be_bytes());
            bytes.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
            bytes.extend_from_slice(content);
        }
        bytes
    }

    #[test]
    fn test_scan_records_in_order() {
        let bytes = file_with_records(&[0i32.to_le_bytes().to_vec(), vec![0u8; 6]], 0);
        let mut scanner = RecordScanner::new(Cursor::new(bytes)).unwrap();

        let first = scanner.next_record().unwrap().unwrap();
        assert_eq!((first.number, first.index, first.content.len()), (1, 0, 4));
        let second = scanner.next_record().unwrap().unwrap();
        assert_eq!((second.number, second.index, second.content.len()), (2, 1, 6));
        assert!(scanner.next_record().unwrap().is_none());
    }

    #[test]
    fn test_bad_file_code() {
        let mut bytes = file_with_records(&[], 0);
        bytes[..4].copy_from_slice(&1234i32.to_be_bytes());
        assert!(matches!(
            RecordScanner::new(Cursor::new(bytes)),
            Err(ScanError::Malformed(_))
        ));
    }

    #[test]
    fn test_short_file() {
        assert!(matches!(
            RecordScanner::new(Cursor::new(vec![0u8; 40])),
            Err(ScanError::Malformed(_))
        ));
    }

    #[test]
    fn test_scan_error_display() {
        let err = match RecordScanner::new(Cursor::new(vec![0u8; 40])) {
            Err(e) => e,
            Ok(_) => panic!("short file accepted"),
        };
        assert_eq!(
            err.to_string(),
            "malformed shapefile: file shorter than the 100-byte header"
        );

        let io = ScanError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(matches!(io, ScanError::Io(_)));
        assert!(std::error::Error::source(&io).is_some());
    }

    #[test]
    fn test_record_past_declared_length() {
        let bytes = file_with_records(&[vec![0u8; 8]], -2);
        let mut scanner = RecordScanner::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(scanner.next_record(), Err(ScanError::Malformed(_))));
    }

    #[test]
    fn test_stream_ends_early_on_boundary() {
        // Declared length promises one more record than present
        let bytes = file_with_records(&[vec![0u8; 4]], 6);
        let mut scanner = RecordScanner::new(Cursor::new(bytes)).unwrap();
        assert!(scanner.next_record().unwrap().is_some());
        assert!(scanner.next_record().unwrap().is_none());
    }
}
