// Process and thread enumeration over /proc.
//
// Candidates are the purely numeric subdirectories of /proc (processes) or
// /proc/<pid>/task (threads), returned in ascending numeric order.

mod cmdline;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PageprocError;

pub use cmdline::{DEFAULT_COMMAND_WIDTH, command_from_dir, read_command, tidy_command};

pub const PROC_ROOT: &str = "/proc";

/// One reporting unit: a thread `tid` belonging to process `pid`.
///
/// For process-level reports `tid == pid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanTarget {
    pub pid: u64,
    pub tid: u64,
}

impl ScanTarget {
    pub fn process(pid: u64) -> Self {
        Self { pid, tid: pid }
    }
}

/// All process IDs currently visible in /proc.
pub fn list_processes() -> Result<Vec<u64>, PageprocError> {
    list_ids(Path::new(PROC_ROOT))
}

/// All thread IDs of process `pid`.
pub fn list_threads(pid: u64) -> Result<Vec<u64>, PageprocError> {
    list_ids(&task_dir(pid))
}

fn task_dir(pid: u64) -> PathBuf {
    Path::new(PROC_ROOT).join(pid.to_string()).join("task")
}

/// Numeric subdirectory names of `dir`, sorted ascending.
pub fn list_ids(dir: &Path) -> Result<Vec<u64>, PageprocError> {
    let entries = fs::read_dir(dir).map_err(|source| PageprocError::ProcScan {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut ids: Vec<u64> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| parse_id(&entry.file_name().to_string_lossy()))
        .collect();
    ids.sort_unstable();
    Ok(ids)
}

/// Parse a directory name consisting only of ASCII digits.
fn parse_id(name: &str) -> Option<u64> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_names_only() {
        assert_eq!(parse_id("1234"), Some(1234));
        assert_eq!(parse_id("self"), None);
        assert_eq!(parse_id("12a"), None);
        assert_eq!(parse_id("+12"), None);
        assert_eq!(parse_id(""), None);
    }

    #[test]
    fn list_ids_sorts_and_filters() {
        let dir = std::env::temp_dir().join(format!("pageproc_ids_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        for name in ["300", "20", "1", "net", "sys"] {
            fs::create_dir_all(dir.join(name)).unwrap();
        }
        // numeric plain file must be ignored
        fs::write(dir.join("77"), b"").unwrap();

        let ids = list_ids(&dir).unwrap();
        assert_eq!(ids, vec![1, 20, 300]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_dir_is_scan_error() {
        let err = list_ids(Path::new("/nonexistent/pageproc")).unwrap_err();
        assert!(matches!(err, PageprocError::ProcScan { .. }));
    }
}
