use std::io::Write;

use crate::error::PageprocError;
use crate::model::{Enrichment, ResidencyStats};
use crate::output::format::kib;
use crate::process::ScanTarget;
use crate::system::TerminalSize;

const ID_WIDTH: usize = 10;
const STAT_WIDTH: usize = 8;
/// Narrowest command column worth fitting to the terminal.
const MIN_COMMAND_WIDTH: usize = 10;

/// Column layout of the multi-target listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListLayout {
    pub threads: bool,
    pub enrichment: Enrichment,
    pub terminal: Option<TerminalSize>,
}

impl ListLayout {
    /// Characters used by everything left of the command column.
    fn stat_width(&self) -> usize {
        let column = 1 + STAT_WIDTH;
        let mut width = ID_WIDTH;
        if self.threads {
            width += 1 + ID_WIDTH;
        }
        width += 2 * column;
        if self.enrichment.counts {
            width += 2 * column;
        }
        if self.enrichment.flags {
            width += 3 * column;
        }
        width + column + 1
    }

    /// Bytes of command line that fit the terminal; 0 means no limit.
    pub fn command_width(&self) -> usize {
        let Some(term) = self.terminal else {
            return 0;
        };
        match term.width.checked_sub(self.stat_width()) {
            Some(w) if w >= MIN_COMMAND_WIDTH => w,
            _ => 0,
        }
    }

    /// Rows between repeated headings, when writing to a tall enough terminal.
    fn heading_interval(&self) -> Option<usize> {
        self.terminal
            .filter(|t| t.height > 2)
            .map(|t| t.height - 1)
    }

    pub fn write_heading(&self, w: &mut impl Write) -> std::io::Result<()> {
        write!(w, "====== PID")?;
        if self.threads {
            write!(w, "        TID")?;
        }
        write!(w, "     Size  Present")?;
        if self.enrichment.counts {
            write!(w, "  Private  Average")?;
        }
        if self.enrichment.flags {
            write!(w, "     Anon    Ref'd     Huge")?;
        }
        writeln!(w, "  Swapped Process ======")
    }

    /// One row. `pid` is `None` when it repeats the previous row's.
    pub fn write_row(
        &self,
        w: &mut impl Write,
        pid: Option<u64>,
        tid: u64,
        stats: &ResidencyStats,
        command: &str,
    ) -> std::io::Result<()> {
        match pid {
            Some(pid) => write!(w, "{pid:>ID_WIDTH$}")?,
            None => write!(w, "{:ID_WIDTH$}", "")?,
        }
        if self.threads {
            write!(w, " {tid:>ID_WIDTH$}")?;
        }
        write_stat(w, stats.size)?;
        write_stat(w, stats.present)?;
        if self.enrichment.counts {
            write_stat(w, stats.private)?;
            write_stat(w, stats.proportional())?;
        }
        if self.enrichment.flags {
            write_stat(w, stats.anon)?;
            write_stat(w, stats.referenced)?;
            write_stat(w, stats.huge)?;
        }
        write_stat(w, stats.swapped)?;
        writeln!(w, " {command}")
    }
}

fn write_stat(w: &mut impl Write, bytes: u64) -> std::io::Result<()> {
    write!(w, " {:>STAT_WIDTH$}", kib(bytes))
}

/// Streams listing rows, repeating the heading every screenful.
pub struct ListWriter<W> {
    out: W,
    layout: ListLayout,
    last_pid: Option<u64>,
    printed: usize,
    need_heading: bool,
}

impl<W: Write> ListWriter<W> {
    pub fn new(out: W, layout: ListLayout) -> Self {
        Self {
            out,
            layout,
            last_pid: None,
            printed: 0,
            need_heading: true,
        }
    }

    pub fn layout(&self) -> &ListLayout {
        &self.layout
    }

    pub fn write_target(
        &mut self,
        target: ScanTarget,
        stats: &ResidencyStats,
        command: &str,
    ) -> Result<(), PageprocError> {
        if self.need_heading {
            self.layout
                .write_heading(&mut self.out)
                .map_err(PageprocError::Output)?;
            self.need_heading = false;
        }

        let pid = (self.last_pid != Some(target.pid)).then_some(target.pid);
        self.last_pid = Some(target.pid);
        self.layout
            .write_row(&mut self.out, pid, target.tid, stats, command)
            .map_err(PageprocError::Output)?;

        self.printed += 1;
        if let Some(every) = self.layout.heading_interval()
            && self.printed % every == 0
        {
            self.need_heading = true;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
