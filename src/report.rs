// Report driver.
//
// Resolves the invocation's targets, scans each one with the engine and
// hands the results to the selected renderer. A single-process report fails
// when its streams cannot be opened; list reports skip such targets.

use std::fs::File;
use std::io::{Read, Seek, Write};

use crate::cli::{OutputFormat, ReportConfig, Target};
use crate::engine::{Engine, ScanConfig};
use crate::error::PageprocError;
use crate::model::ResidencyStats;
use crate::output::{
    DetailOptions, JsonCollector, ListLayout, ListWriter, PrettyObserver, ProcessRecord,
    StatsRecord, write_json,
};
use crate::process::{self, ScanTarget};
use crate::source::{FrameTables, TargetStreams};
use crate::system::TerminalSize;

pub struct Reporter<W, K = File> {
    config: ReportConfig,
    scan: ScanConfig,
    frames: FrameTables<K>,
    terminal: Option<TerminalSize>,
    out: W,
}

impl<W, K> Reporter<W, K>
where
    W: Write,
    K: Read + Seek,
{
    pub fn new(
        config: ReportConfig,
        scan: ScanConfig,
        frames: FrameTables<K>,
        terminal: Option<TerminalSize>,
        out: W,
    ) -> Self {
        Self {
            config,
            scan,
            frames,
            terminal,
            out,
        }
    }

    pub fn run(&mut self) -> Result<(), PageprocError> {
        log::info!(
            "report {:?} as {:?}, page size {}, writable only {}",
            self.config.target,
            self.config.format,
            self.scan.page_size,
            self.scan.writable_only
        );

        match self.config.target {
            Target::Process(pid) => self.report_process(pid),
            Target::AllProcesses => self.report_list(false),
            Target::Threads(_) => self.report_list(true),
        }
    }

    /// Flush buffered output.
    pub fn finish(&mut self) -> Result<(), PageprocError> {
        self.out.flush().map_err(PageprocError::Output)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn detail_options(&self) -> DetailOptions {
        DetailOptions {
            verbose: self.config.verbose,
            map: self.config.map,
            summary: self.config.summary,
        }
    }

    /// Detailed report for one process or thread.
    pub fn report_process(&mut self, pid: u64) -> Result<(), PageprocError> {
        let mut streams = TargetStreams::open(pid)?;
        let enrichment = self.frames.enrichment();
        let options = self.detail_options();
        let mut engine = Engine::new(self.scan, &mut streams.pagemap, &mut self.frames);

        match self.config.format {
            OutputFormat::Pretty => {
                let mut observer =
                    PrettyObserver::new(&mut self.out, options, self.scan.page_size, enrichment);
                let total = engine.scan(&mut streams.maps, &mut observer)?;
                if options.wants_totals() {
                    observer.write_totals(&total)?;
                }
            }
            OutputFormat::Json => {
                let mut collector = JsonCollector::new(enrichment, options.summary);
                let total = engine.scan(&mut streams.maps, &mut collector)?;
                let mut record = ProcessRecord::new(ScanTarget::process(pid));
                record.tid = Some(pid);
                record.sections = collector.into_sections();
                if options.wants_totals() {
                    record.totals = Some(StatsRecord::new(&total, enrichment));
                }
                write_json(&record, &mut self.out)?;
            }
        }
        Ok(())
    }

    /// One row per process, or per thread with `threads`.
    pub fn report_list(&mut self, threads: bool) -> Result<(), PageprocError> {
        let targets = list_targets(self.config.target)?;
        let enrichment = self.frames.enrichment();
        let layout = ListLayout {
            threads,
            enrichment,
            terminal: self.terminal,
        };
        let width = layout.command_width();
        log::debug!("{} list targets, command width {width}", targets.len());

        match self.config.format {
            OutputFormat::Pretty => {
                let mut writer = ListWriter::new(&mut self.out, layout);
                for target in targets {
                    let Some(total) = scan_target(self.scan, &mut self.frames, target)? else {
                        continue;
                    };
                    let command = process::read_command(target.tid, width);
                    writer.write_target(target, &total, &command)?;
                }
            }
            OutputFormat::Json => {
                let mut records = Vec::with_capacity(targets.len());
                for target in targets {
                    let Some(total) = scan_target(self.scan, &mut self.frames, target)? else {
                        continue;
                    };
                    let mut record = ProcessRecord::new(target);
                    record.tid = threads.then_some(target.tid);
                    record.command = Some(process::read_command(target.tid, 0));
                    record.totals = Some(StatsRecord::new(&total, enrichment));
                    records.push(record);
                }
                write_json(&records, &mut self.out)?;
            }
        }
        Ok(())
    }
}

/// Expand a list target into the ordered units to scan.
///
/// Enumerating the threads of an explicitly named process must succeed;
/// processes that vanish while listing every thread are skipped.
fn list_targets(target: Target) -> Result<Vec<ScanTarget>, PageprocError> {
    let targets = match target {
        Target::Process(pid) => vec![ScanTarget::process(pid)],
        Target::AllProcesses => process::list_processes()?
            .into_iter()
            .map(ScanTarget::process)
            .collect(),
        Target::Threads(Some(pid)) => threads_of(pid)?,
        Target::Threads(None) => {
            let mut targets = Vec::new();
            for pid in process::list_processes()? {
                match threads_of(pid) {
                    Ok(threads) => targets.extend(threads),
                    Err(e) => log::debug!("skipping threads of {pid}: {e}"),
                }
            }
            targets
        }
    };
    Ok(targets.into_iter().filter(|t| t.tid > 0).collect())
}

fn threads_of(pid: u64) -> Result<Vec<ScanTarget>, PageprocError> {
    Ok(process::list_threads(pid)?
        .into_iter()
        .map(|tid| ScanTarget { pid, tid })
        .collect())
}

/// Totals for one list target, or `None` when its streams cannot be opened.
fn scan_target<K: Read + Seek>(
    scan: ScanConfig,
    frames: &mut FrameTables<K>,
    target: ScanTarget,
) -> Result<Option<ResidencyStats>, PageprocError> {
    let mut streams = match TargetStreams::open(target.tid) {
        Ok(streams) => streams,
        Err(e) if e.is_target_unavailable() => {
            log::debug!("skipping {}/{}: {e}", target.pid, target.tid);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let mut engine = Engine::new(scan, &mut streams.pagemap, frames);
    engine.scan(&mut streams.maps, &mut ()).map(Some)
}
