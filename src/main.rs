use std::io::{self, BufWriter};

use clap::Parser;

use pageproc::cli::{Cli, ReportConfig};
use pageproc::engine::ScanConfig;
use pageproc::error::PageprocError;
use pageproc::report::Reporter;
use pageproc::source::FrameTables;
use pageproc::system;

/// Process exit status for each failure class.
fn exit_code(err: &PageprocError) -> i32 {
    match err {
        PageprocError::ProcScan { .. } => 7,
        PageprocError::PagemapUnavailable { .. } => 10,
        PageprocError::MapsUnavailable { .. } => 11,
        _ => 1,
    }
}

fn main() {
    env_logger::init();

    let config = Cli::parse().resolve().unwrap_or_else(|e| e.exit());

    if let Err(e) = run(config) {
        eprintln!("error: {e}");
        std::process::exit(exit_code(&e));
    }
}

fn run(config: ReportConfig) -> Result<(), PageprocError> {
    let scan = ScanConfig::from_system(config.writable_only);
    let frames = FrameTables::open_system();
    let terminal = system::terminal_size();
    log::debug!("terminal: {terminal:?}");

    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());

    let mut reporter = Reporter::new(config, scan, frames, terminal, out);
    reporter.run()?;
    reporter.finish()
}
