use std::io::Write;

use crate::abi::{KpageFlags, PageTableEntry};
use crate::engine::{AbsentSpan, PageObserver};
use crate::error::PageprocError;
use crate::model::{Enrichment, FrameStats, ResidencyStats, VirtualMapping};
use crate::output::format::{format_flags, format_size, kib, percent};

const SECTION_RULE: &str = "====================";

/// Which single-process detail views are active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetailOptions {
    pub verbose: bool,
    pub map: bool,
    pub summary: bool,
}

impl DetailOptions {
    fn wants_section_header(&self) -> bool {
        self.verbose || self.map || self.summary
    }

    /// Process totals are printed unless per-section or map output replaces them.
    pub fn wants_totals(&self) -> bool {
        !self.summary && !self.map
    }
}

/// Renders one target in the human-readable single-process layout.
pub struct PrettyObserver<W> {
    out: W,
    options: DetailOptions,
    page_size: u64,
    enrichment: Enrichment,
}

impl<W: Write> PrettyObserver<W> {
    pub fn new(out: W, options: DetailOptions, page_size: u64, enrichment: Enrichment) -> Self {
        Self {
            out,
            options,
            page_size,
            enrichment,
        }
    }

    /// Totals banner followed by the stats block.
    pub fn write_totals(&mut self, total: &ResidencyStats) -> Result<(), PageprocError> {
        writeln!(self.out, "============ Totals ============").map_err(PageprocError::Output)?;
        write_stats(&mut self.out, total, self.enrichment)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_page_line(
        &mut self,
        addr: u64,
        entry: &PageTableEntry,
        frame: &FrameStats,
    ) -> std::io::Result<()> {
        let w = &mut self.out;
        write!(w, "   {:016x}-{:016x}", addr, addr + self.page_size - 1)?;

        if let Some(pfn) = entry.pfn {
            write!(w, ", Present")?;
            if pfn != 0 {
                write!(w, " (pfn {pfn:016x})")?;
            }
            if let Some(count) = frame.ref_count {
                write!(w, ", RefCnt {count}")?;
            }
            if let Some(flags) = frame.flags {
                write!(w, ", Flags {}", format_flags(flags.bits()))?;
            }
        }

        if entry.swapped {
            match entry.swap {
                Some(loc) => write!(w, ", Swapped (seg {} offs {:016x})", loc.slot, loc.offset)?,
                None => write!(w, ", Swapped")?,
            }
        }

        writeln!(w)
    }
}

/// Status map character for one page.
pub fn map_marker(entry: &PageTableEntry, frame: &FrameStats) -> char {
    if entry.present {
        if entry.swapped || frame.has(KpageFlags::SWAPCACHE) {
            'B'
        } else {
            'P'
        }
    } else if entry.swapped {
        'S'
    } else {
        '.'
    }
}

impl<W: Write> PageObserver for PrettyObserver<W> {
    fn section_start(&mut self, mapping: &VirtualMapping) -> Result<(), PageprocError> {
        if !self.options.wants_section_header() {
            return Ok(());
        }
        writeln!(
            self.out,
            "{SECTION_RULE} {} [{}] {} {SECTION_RULE}",
            mapping.display_label(),
            mapping.perms,
            format_size(mapping.size())
        )
        .map_err(PageprocError::Output)
    }

    fn page(
        &mut self,
        addr: u64,
        entry: &PageTableEntry,
        frame: &FrameStats,
    ) -> Result<(), PageprocError> {
        if self.options.map {
            write!(self.out, "{}", map_marker(entry, frame)).map_err(PageprocError::Output)?;
        }
        if self.options.verbose && !entry.is_absent() {
            self.write_page_line(addr, entry, frame)
                .map_err(PageprocError::Output)?;
        }
        Ok(())
    }

    fn absent_span(&mut self, span: AbsentSpan) -> Result<(), PageprocError> {
        if !self.options.verbose {
            return Ok(());
        }
        writeln!(
            self.out,
            "   {:016x}-{:016x}, Not present {}",
            span.start,
            span.last(),
            format_size(span.len())
        )
        .map_err(PageprocError::Output)
    }

    fn section_end(
        &mut self,
        _mapping: &VirtualMapping,
        stats: ResidencyStats,
    ) -> Result<(), PageprocError> {
        if self.options.map {
            writeln!(self.out).map_err(PageprocError::Output)?;
        }
        if self.options.summary {
            write_stats(&mut self.out, &stats, self.enrichment)?;
        }
        Ok(())
    }
}

/// Write the multi-line stats block.
///
/// Ownership lines need the reference-count table, flag lines need the
/// flag table; both are skipped when nothing is present.
pub fn write_stats(
    w: &mut impl Write,
    stats: &ResidencyStats,
    enrichment: Enrichment,
) -> Result<(), PageprocError> {
    write_stats_inner(w, stats, enrichment).map_err(PageprocError::Output)
}

fn write_stats_inner(
    w: &mut impl Write,
    stats: &ResidencyStats,
    enrichment: Enrichment,
) -> std::io::Result<()> {
    let size = stats.size;
    let present = stats.present;

    writeln!(w, "Size:       {:>8} kB", kib(size))?;
    writeln!(
        w,
        "Present:    {:>8} kB ({:.1}%)",
        kib(present),
        percent(present, size)
    )?;

    if enrichment.counts && present > 0 {
        let proportional = stats.proportional();
        writeln!(
            w,
            "  Unique:   {:>8} kB ({:.1}%)",
            kib(stats.private),
            percent(stats.private, present)
        )?;
        writeln!(
            w,
            "  Average:  {:>8} kB ({:.1}%)",
            kib(proportional),
            percent(proportional, present)
        )?;
    }

    if enrichment.flags && present > 0 {
        writeln!(
            w,
            "  Anon:     {:>8} kB ({:.1}%)",
            kib(stats.anon),
            percent(stats.anon, present)
        )?;
        writeln!(
            w,
            "  Huge:     {:>8} kB ({:.1}%)",
            kib(stats.huge),
            percent(stats.huge, present)
        )?;
        writeln!(
            w,
            "Referenced: {:>8} kB ({:.1}%)",
            kib(stats.referenced),
            percent(stats.referenced, size)
        )?;
    }

    writeln!(
        w,
        "Swapped:    {:>8} kB ({:.1}%)",
        kib(stats.swapped),
        percent(stats.swapped, size)
    )?;

    Ok(())
}
