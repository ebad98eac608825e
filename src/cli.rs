use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::error::PageprocError;

#[derive(Parser, Debug)]
#[command(
    name = "pageproc",
    version,
    about = "Page residency and sharing report for Linux processes",
    long_about = "Reports how much of each process's virtual memory is resident, \
                  swapped, private or shared. Without --pid, every process is \
                  listed. Reference counts and page flags need read access to \
                  /proc/kpagecount and /proc/kpageflags (usually root)."
)]
pub struct Cli {
    /// Process or thread ID to report in detail ("self" for this process)
    #[arg(short, long, value_parser = parse_pid, conflicts_with = "threads")]
    pub pid: Option<u64>,

    /// List threads of every process, or only of PID
    #[arg(short, long, value_name = "PID", num_args = 0..=1, value_parser = parse_pid)]
    pub threads: Option<Option<u64>>,

    /// Print every resident or swapped page and every not-present range
    #[arg(short, long, requires = "pid", conflicts_with = "map")]
    pub verbose: bool,

    /// Print a status character per page of each section
    #[arg(short, long, requires = "pid")]
    pub map: bool,

    /// Print statistics per section instead of one total
    #[arg(short, long, requires = "pid")]
    pub summary: bool,

    /// Only process writable sections
    #[arg(short, long, requires = "pid")]
    pub writable: bool,

    /// Output format
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// What a single invocation reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Detailed report for one process or thread.
    Process(u64),
    /// One row per process.
    AllProcesses,
    /// One row per thread, of every process or of one.
    Threads(Option<u64>),
}

/// Flattened CLI configuration after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportConfig {
    pub target: Target,
    pub verbose: bool,
    pub map: bool,
    pub summary: bool,
    pub writable_only: bool,
    pub format: OutputFormat,
}

impl Cli {
    /// Check the combinations clap cannot express and flatten the result.
    pub fn resolve(self) -> Result<ReportConfig, clap::Error> {
        if self.format == OutputFormat::Json && (self.verbose || self.map) {
            return Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "--format json cannot be combined with --verbose or --map",
            ));
        }

        let target = match (self.pid, self.threads) {
            (Some(pid), _) => Target::Process(pid),
            (None, Some(pid)) => Target::Threads(pid),
            (None, None) => Target::AllProcesses,
        };

        Ok(ReportConfig {
            target,
            verbose: self.verbose,
            map: self.map,
            summary: self.summary,
            writable_only: self.writable,
            format: self.format,
        })
    }
}

/// Accepts a positive decimal ID or `self`.
fn parse_pid(s: &str) -> Result<u64, String> {
    if s == "self" {
        return Ok(u64::from(std::process::id()));
    }
    match s.parse::<u64>() {
        Ok(0) | Err(_) => Err(PageprocError::InvalidPid(s.to_string()).to_string()),
        Ok(pid) => Ok(pid),
    }
}
