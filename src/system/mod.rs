// Platform queries that need libc: page size and terminal geometry.

pub mod terminal;

pub use terminal::{TerminalSize, terminal_size};

/// Page size assumed when sysconf cannot tell.
const FALLBACK_PAGE_SIZE: u64 = 4096;

/// The platform base page size in bytes.
pub fn page_size() -> u64 {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        log::warn!("sysconf(_SC_PAGESIZE) failed, assuming {FALLBACK_PAGE_SIZE}");
        FALLBACK_PAGE_SIZE
    }
}
