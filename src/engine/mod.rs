//! Page residency and attribution engine.
//!
//! Walks every mapping of one target, decodes the pagemap entry of each page,
//! enriches present frames from the system frame tables and accumulates a
//! [`ResidencyStats`] per mapping section and per target.
//!
//! Rendering is kept out of the engine: everything a renderer needs is handed
//! to a [`PageObserver`] as the walk progresses.

pub mod absent;
pub mod compound;

use std::io::{self, Read, Seek};

use crate::abi::{KpageFlags, PageTableEntry};
use crate::error::PageprocError;
use crate::model::{FrameStats, ResidencyStats, VirtualMapping};
use crate::source::{FrameTables, PagemapReader};
use crate::system;

pub use absent::{AbsentRun, AbsentSpan};
pub use compound::CompoundState;

/// Explicit scan configuration, passed to the engine for each target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    pub page_size: u64,
    /// Skip mappings without write permission.
    pub writable_only: bool,
}

impl ScanConfig {
    pub fn new(page_size: u64, writable_only: bool) -> Self {
        Self {
            page_size,
            writable_only,
        }
    }

    /// Configuration using the platform page size.
    pub fn from_system(writable_only: bool) -> Self {
        Self::new(system::page_size(), writable_only)
    }
}

/// Receives the engine's progress for one target.
///
/// Only mappings that pass the write filter are reported. Every method has
/// a no-op default so renderers implement just what they print.
pub trait PageObserver {
    fn section_start(&mut self, _mapping: &VirtualMapping) -> Result<(), PageprocError> {
        Ok(())
    }

    /// Called once per page read from the pagemap, absent pages included.
    /// `frame` is the raw enrichment of this page, not its compound source.
    fn page(
        &mut self,
        _addr: u64,
        _entry: &PageTableEntry,
        _frame: &FrameStats,
    ) -> Result<(), PageprocError> {
        Ok(())
    }

    /// A run of absent pages ended.
    fn absent_span(&mut self, _span: AbsentSpan) -> Result<(), PageprocError> {
        Ok(())
    }

    /// The section's accumulator, handed over once.
    fn section_end(
        &mut self,
        _mapping: &VirtualMapping,
        _stats: ResidencyStats,
    ) -> Result<(), PageprocError> {
        Ok(())
    }
}

/// Observer that ignores everything; used when only totals are wanted.
impl PageObserver for () {}

/// Engine bound to one target's pagemap and the shared frame tables.
pub struct Engine<'a, P, K> {
    config: ScanConfig,
    pagemap: &'a mut PagemapReader<P>,
    frames: &'a mut FrameTables<K>,
}

impl<'a, P, K> Engine<'a, P, K>
where
    P: Read + Seek,
    K: Read + Seek,
{
    pub fn new(
        config: ScanConfig,
        pagemap: &'a mut PagemapReader<P>,
        frames: &'a mut FrameTables<K>,
    ) -> Self {
        Self {
            config,
            pagemap,
            frames,
        }
    }

    /// Scan every mapping yielded by `maps` and return the target total.
    ///
    /// A maps read error ends the scan early; the total gathered so far is
    /// still returned.
    pub fn scan<M, O>(&mut self, maps: M, observer: &mut O) -> Result<ResidencyStats, PageprocError>
    where
        M: IntoIterator<Item = io::Result<VirtualMapping>>,
        O: PageObserver + ?Sized,
    {
        let mut total = ResidencyStats::default();

        for mapping in maps {
            let mapping = match mapping {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("maps read error, stopping scan: {e}");
                    break;
                }
            };

            if self.config.writable_only && !mapping.is_writable() {
                log::trace!(
                    "skipping non-writable mapping {:x}-{:x}",
                    mapping.start,
                    mapping.end
                );
                continue;
            }

            observer.section_start(&mapping)?;
            let mut section = self.scan_mapping(&mapping, observer)?;
            total += section;
            observer.section_end(&mapping, section.take())?;
        }

        Ok(total)
    }

    /// Walk the pages of one mapping.
    ///
    /// A pagemap read failure stops this mapping only; pages already
    /// processed stay accounted.
    pub fn scan_mapping<O>(
        &mut self,
        mapping: &VirtualMapping,
        observer: &mut O,
    ) -> Result<ResidencyStats, PageprocError>
    where
        O: PageObserver + ?Sized,
    {
        let page_size = self.config.page_size;
        let mut stats = ResidencyStats {
            size: mapping.size(),
            ..Default::default()
        };
        let mut run = AbsentRun::default();
        let mut compound = CompoundState::default();

        if let Err(e) = self.pagemap.seek_page(mapping.start / page_size) {
            log::debug!("pagemap seek to {:x} failed: {e}", mapping.start);
            return Ok(stats);
        }

        let mut addr = mapping.start;
        while addr < mapping.end {
            let raw = match self.pagemap.read_entry() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    log::debug!("pagemap short read at {addr:x}");
                    break;
                }
                Err(e) => {
                    log::debug!("pagemap read error at {addr:x}: {e}");
                    break;
                }
            };
            let entry = PageTableEntry::decode(raw);

            if entry.is_absent() {
                run.extend(addr);
                observer.page(addr, &entry, &FrameStats::default())?;
                addr += page_size;
                continue;
            }

            if let Some(span) = run.close(addr) {
                observer.absent_span(span)?;
            }

            let mut frame = FrameStats::default();
            if let Some(pfn) = entry.pfn {
                stats.present += page_size;
                frame = self.frames.frame_stats(pfn);
                let source = compound.advance(frame);
                attribute(&mut stats, page_size, &frame, &source);
            } else {
                stats.swapped += page_size;
            }

            observer.page(addr, &entry, &frame)?;
            addr += page_size;
        }

        if let Some(span) = run.close(addr) {
            observer.absent_span(span)?;
        }

        Ok(stats)
    }
}

/// Account one present frame.
///
/// `frame` is what the tables returned for this page; `source` is the frame
/// it is attributed as (the compound head for tail pages). A statistic is
/// only touched when this page's own lookup succeeded.
fn attribute(stats: &mut ResidencyStats, page_size: u64, frame: &FrameStats, source: &FrameStats) {
    if frame.ref_count.is_some()
        && let Some(count) = source.ref_count
    {
        stats.add_ownership(page_size, count);
    }

    if frame.flags.is_some() {
        if source.has(KpageFlags::ANON) {
            stats.anon += page_size;
        }
        if source.has(KpageFlags::REFERENCED) {
            stats.referenced += page_size;
        }
        if source.has(KpageFlags::ANY_HUGE) {
            stats.huge += page_size;
        }
    }
}
