//! Gzip object decoding into text lines.

use std::io::{BufRead, BufReader, Write};

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::error::{EtlError, EtlResult};

/// Decompress a gzip object and split it into lines.
///
/// Invalid UTF-8 is replaced rather than rejected, so one bad byte only
/// spoils its own line. Trailing `\r` is dropped.
pub fn gunzip_lines(key: &str, bytes: &[u8]) -> EtlResult<Vec<String>> {
    let reader = BufReader::with_capacity(256 * 1024, MultiGzDecoder::new(bytes));
    let mut lines = Vec::new();
    for line in reader.split(b'\n') {
        let line = line.map_err(|e| EtlError::Decode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let text = String::from_utf8_lossy(&line);
        lines.push(text.trim_end_matches('\r').to_string());
    }
    Ok(lines)
}

/// Gzip the given lines, newline-terminated. Used to build fixtures.
pub fn gzip_lines<S: AsRef<str>>(lines: &[S]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    for line in lines {
        encoder.write_all(line.as_ref().as_bytes())?;
        encoder.write_all(b"\n")?;
    }
    encoder.finish()
}
