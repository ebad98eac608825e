//! Live scans of this test process through /proc.
//!
//! Frame tables usually need CAP_SYS_ADMIN; these tests only rely on what
//! an unprivileged process can read about itself.
//!
//! Run with: `cargo test --test linux_integration`

#![cfg(target_os = "linux")]

use pageproc::engine::{Engine, PageObserver, ScanConfig};
use pageproc::error::PageprocError;
use pageproc::model::{ResidencyStats, VirtualMapping};
use pageproc::process;
use pageproc::source::{FrameTables, TargetStreams};
use pageproc::system;

fn own_pid() -> u64 {
    u64::from(std::process::id())
}

#[derive(Default)]
struct SectionSum {
    sections: usize,
    sum: ResidencyStats,
}

impl PageObserver for SectionSum {
    fn section_end(
        &mut self,
        _mapping: &VirtualMapping,
        stats: ResidencyStats,
    ) -> Result<(), PageprocError> {
        self.sections += 1;
        self.sum += stats;
        Ok(())
    }
}

fn scan_self(writable_only: bool) -> (ResidencyStats, SectionSum) {
    let mut streams = TargetStreams::open(own_pid()).expect("own streams readable");
    let mut frames = FrameTables::open_system();
    let mut observer = SectionSum::default();
    let mut engine = Engine::new(
        ScanConfig::from_system(writable_only),
        &mut streams.pagemap,
        &mut frames,
    );
    let total = engine.scan(&mut streams.maps, &mut observer).unwrap();
    (total, observer)
}

#[test]
fn own_address_space_is_partly_resident() {
    let (total, observer) = scan_self(false);
    assert!(observer.sections > 0);
    assert!(total.size > 0);
    assert!(total.present > 0);
    assert!(total.present <= total.size);
    assert!(total.private <= total.present);
    assert!(total.proportional() <= total.present);
    assert_eq!(observer.sum, total);
}

#[test]
fn writable_scan_is_a_subset() {
    let (all, _) = scan_self(false);
    let (writable, _) = scan_self(true);
    assert!(writable.size > 0);
    assert!(writable.size <= all.size);
}

#[test]
fn touched_heap_buffer_is_present() {
    let size = 64 * system::page_size() as usize;
    let mut buf = vec![0u8; size];
    for chunk in buf.chunks_mut(4096) {
        chunk[0] = 1;
    }

    let (total, _) = scan_self(true);
    assert!(total.present >= size as u64);
    assert!(buf.iter().step_by(4096).all(|&b| b == 1));
}

#[test]
fn process_listing_contains_self() {
    let pids = process::list_processes().unwrap();
    assert!(pids.contains(&own_pid()));
    assert!(pids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn thread_listing_contains_main_thread() {
    let tids = process::list_threads(own_pid()).unwrap();
    assert!(tids.contains(&own_pid()));
}

#[test]
fn own_command_line_is_readable() {
    let command = process::read_command(own_pid(), 0);
    assert_ne!(command, "<Unknown>");
    assert!(!command.is_empty());
}

#[test]
fn vanished_target_is_unavailable() {
    let err = TargetStreams::open(999_999_999).err().expect("no such process");
    assert!(err.is_target_unavailable());
    assert!(matches!(err, PageprocError::PagemapUnavailable { .. }));
}
