pub mod stats;

use crate::abi::KpageFlags;

pub use stats::ResidencyStats;

/// Label printed for mappings without a backing object.
pub const ANONYMOUS_LABEL: &str = "[Anonymous]";

/// One contiguous virtual range inside a process address space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualMapping {
    pub start: u64,
    /// Exclusive end address.
    pub end: u64,
    /// Permission token as exposed by the kernel, e.g. `rw-p`.
    pub perms: String,
    /// Backing object name. `None` for anonymous memory.
    pub label: Option<String>,
}

impl VirtualMapping {
    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_writable(&self) -> bool {
        self.perms.contains('w')
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(ANONYMOUS_LABEL)
    }
}

/// Per-frame data from the system-wide frame tables.
///
/// Either field is `None` when its table is not available or the lookup
/// came back short.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub ref_count: Option<u64>,
    pub flags: Option<KpageFlags>,
}

impl FrameStats {
    pub fn has(&self, flag: KpageFlags) -> bool {
        self.flags.is_some_and(|f| f.intersects(flag))
    }
}

/// Which frame tables could be opened for this invocation.
///
/// Output layouts drop the columns that depend on a missing table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub counts: bool,
    pub flags: bool,
}

impl Enrichment {
    pub const NONE: Self = Self {
        counts: false,
        flags: false,
    };

    pub const FULL: Self = Self {
        counts: true,
        flags: true,
    };
}
