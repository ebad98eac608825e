// /proc/<pid>/maps reader.
//
// Line format:
//   <start>-<end> <perms> <offset> <dev> <inode> [<path>]
// e.g.
//   7f1c2a000000-7f1c2a021000 rw-p 00000000 00:00 0          [heap]
//
// The path column is padded with spaces and may itself contain spaces.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use crate::error::PageprocError;
use crate::model::VirtualMapping;

/// Number of whitespace-separated columns before the optional path.
const FIXED_COLUMNS: usize = 5;

/// Lazy, single-pass reader over a maps stream.
///
/// Yields one `VirtualMapping` per well-formed line. Malformed lines are
/// skipped; read errors are passed through so the caller can stop.
pub struct MapsReader<R> {
    lines: io::Lines<R>,
}

impl MapsReader<BufReader<File>> {
    pub fn open(tid: u64) -> Result<Self, PageprocError> {
        let path = PathBuf::from(format!("/proc/{tid}/maps"));
        let file = File::open(&path)
            .map_err(|source| PageprocError::MapsUnavailable { path, source })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> MapsReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> Iterator for MapsReader<R> {
    type Item = io::Result<VirtualMapping>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            match parse_maps_line(&line) {
                Some(mapping) => return Some(Ok(mapping)),
                None => log::debug!("skipping malformed maps line: {line:?}"),
            }
        }
    }
}

/// Parse one maps line. Returns `None` when the address range or the
/// permission token cannot be read.
pub fn parse_maps_line(line: &str) -> Option<VirtualMapping> {
    let mut rest = line;
    let mut columns: [&str; FIXED_COLUMNS] = [""; FIXED_COLUMNS];
    let mut found = 0;
    while found < FIXED_COLUMNS {
        let (column, tail) = next_column(rest)?;
        columns[found] = column;
        found += 1;
        rest = tail;
        if rest.trim_start().is_empty() {
            break;
        }
    }

    let (start_hex, end_hex) = columns[0].split_once('-')?;
    let start = u64::from_str_radix(start_hex, 16).ok()?;
    let end = u64::from_str_radix(end_hex, 16).ok()?;
    if start >= end {
        return None;
    }

    let perms = columns[1];
    if perms.is_empty() {
        return None;
    }

    let label = if found == FIXED_COLUMNS {
        let path = rest.trim();
        (!path.is_empty()).then(|| path.to_string())
    } else {
        None
    };

    Some(VirtualMapping {
        start,
        end,
        perms: perms.to_string(),
        label,
    })
}

/// Split off the next whitespace-delimited column.
fn next_column(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}
