use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::PathBuf;

use byteorder::{NativeEndian, ReadBytesExt};

use crate::abi::PAGEMAP_ENTRY_SIZE;
use crate::error::PageprocError;

/// Pagemap entries buffered per read syscall.
const READ_AHEAD_ENTRIES: usize = 512;

/// Random-access reader over a `/proc/<pid>/pagemap` stream.
///
/// Callers seek once to the first page of a mapping and then read entries
/// sequentially; entries are contiguous by virtual page index.
pub struct PagemapReader<R> {
    inner: R,
}

impl PagemapReader<BufReader<File>> {
    pub fn open(tid: u64) -> Result<Self, PageprocError> {
        let path = PathBuf::from(format!("/proc/{tid}/pagemap"));
        let file = File::open(&path)
            .map_err(|source| PageprocError::PagemapUnavailable { path, source })?;
        let capacity = READ_AHEAD_ENTRIES * PAGEMAP_ENTRY_SIZE as usize;
        Ok(Self::new(BufReader::with_capacity(capacity, file)))
    }
}

impl<R: Read + Seek> PagemapReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Position the stream at the entry for virtual page `vpn`.
    pub fn seek_page(&mut self, vpn: u64) -> io::Result<()> {
        self.inner
            .seek(SeekFrom::Start(vpn * PAGEMAP_ENTRY_SIZE))
            .map(|_| ())
    }

    /// Read the next raw entry.
    ///
    /// `Ok(None)` marks end of stream or a short read. A zero word is a
    /// valid entry (page never faulted in), not an end marker.
    pub fn read_entry(&mut self) -> io::Result<Option<u64>> {
        match self.inner.read_u64::<NativeEndian>() {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }
}
