// System-wide physical frame tables.
//
// /proc/kpagecount and /proc/kpageflags hold one 64-bit entry per physical
// frame. Both need CAP_SYS_ADMIN; without it they fail to open and every
// statistic that depends on them is left out.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{NativeEndian, ReadBytesExt};

use crate::abi::{KPAGE_ENTRY_SIZE, KPAGECOUNT_PATH, KPAGEFLAGS_PATH, KpageFlags};
use crate::model::{Enrichment, FrameStats};

/// Random-access reader over one frame table, keyed by frame number.
pub struct FrameTable<R> {
    inner: R,
}

impl FrameTable<File> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        File::open(path).map(Self::new)
    }
}

impl<R: Read + Seek> FrameTable<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Entry for frame `pfn`, or `None` on a failed seek or short read.
    pub fn lookup(&mut self, pfn: u64) -> Option<u64> {
        let offset = pfn.checked_mul(KPAGE_ENTRY_SIZE)?;
        self.inner.seek(SeekFrom::Start(offset)).ok()?;
        self.inner.read_u64::<NativeEndian>().ok()
    }
}

/// Reference-count and flag tables, each optional.
///
/// Opened once per invocation and borrowed by the engine for every target.
pub struct FrameTables<R = File> {
    counts: Option<FrameTable<R>>,
    flags: Option<FrameTable<R>>,
}

impl FrameTables<File> {
    /// Open the kernel's frame tables, degrading to "unavailable" for any
    /// table that cannot be opened.
    pub fn open_system() -> Self {
        let counts = open_optional(KPAGECOUNT_PATH);
        let flags = open_optional(KPAGEFLAGS_PATH);
        let tables = Self { counts, flags };
        log::info!("frame tables: {:?}", tables.enrichment());
        tables
    }
}

fn open_optional(path: &str) -> Option<FrameTable<File>> {
    match FrameTable::open(path) {
        Ok(table) => Some(table),
        Err(e) => {
            log::warn!("{path} unavailable: {e}");
            None
        }
    }
}

impl<R: Read + Seek> FrameTables<R> {
    pub fn new(counts: Option<FrameTable<R>>, flags: Option<FrameTable<R>>) -> Self {
        Self { counts, flags }
    }

    pub fn unavailable() -> Self {
        Self {
            counts: None,
            flags: None,
        }
    }

    pub fn enrichment(&self) -> Enrichment {
        Enrichment {
            counts: self.counts.is_some(),
            flags: self.flags.is_some(),
        }
    }

    pub fn frame_stats(&mut self, pfn: u64) -> FrameStats {
        FrameStats {
            ref_count: self.counts.as_mut().and_then(|t| t.lookup(pfn)),
            flags: self
                .flags
                .as_mut()
                .and_then(|t| t.lookup(pfn))
                .map(KpageFlags::from_bits_retain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table(words: &[u64]) -> FrameTable<Cursor<Vec<u8>>> {
        FrameTable::new(Cursor::new(
            words.iter().flat_map(|w| w.to_ne_bytes()).collect(),
        ))
    }

    #[test]
    fn lookup_by_frame_number() {
        let mut t = table(&[5, 6, 7]);
        assert_eq!(t.lookup(2), Some(7));
        assert_eq!(t.lookup(0), Some(5));
    }

    #[test]
    fn lookup_past_end_is_unavailable() {
        let mut t = table(&[5]);
        assert_eq!(t.lookup(1), None);
        assert_eq!(t.lookup(u64::MAX), None);
    }

    #[test]
    fn missing_tables_yield_empty_stats() {
        let mut tables: FrameTables<Cursor<Vec<u8>>> = FrameTables::unavailable();
        assert_eq!(tables.enrichment(), Enrichment::NONE);
        assert_eq!(tables.frame_stats(0), FrameStats::default());
    }

    #[test]
    fn one_table_only() {
        let mut tables = FrameTables::new(Some(table(&[3, 1])), None);
        assert_eq!(
            tables.enrichment(),
            Enrichment {
                counts: true,
                flags: false
            }
        );
        let stats = tables.frame_stats(1);
        assert_eq!(stats.ref_count, Some(1));
        assert_eq!(stats.flags, None);
    }

    #[test]
    fn flags_are_decoded() {
        let raw = (KpageFlags::ANON | KpageFlags::THP).bits();
        let mut tables = FrameTables::new(None, Some(table(&[raw])));
        let stats = tables.frame_stats(0);
        assert_eq!(stats.flags, Some(KpageFlags::ANON | KpageFlags::THP));
    }
}
