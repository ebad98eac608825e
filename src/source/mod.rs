// Kernel stream readers.
//
// Per target:    /proc/<tid>/maps (text), /proc/<tid>/pagemap (binary)
// System-wide:   /proc/kpagecount, /proc/kpageflags (binary, optional)

pub mod kpage;
pub mod maps;
pub mod pagemap;

use std::fs::File;
use std::io::BufReader;

use crate::error::PageprocError;

pub use kpage::{FrameTable, FrameTables};
pub use maps::{MapsReader, parse_maps_line};
pub use pagemap::PagemapReader;

/// The two per-target streams, acquired together.
///
/// Dropping the value closes both files, so nothing opened for one target
/// outlives its scan.
pub struct TargetStreams {
    pub maps: MapsReader<BufReader<File>>,
    pub pagemap: PagemapReader<BufReader<File>>,
}

impl TargetStreams {
    pub fn open(tid: u64) -> Result<Self, PageprocError> {
        let pagemap = PagemapReader::open(tid)?;
        let maps = MapsReader::open(tid)?;
        Ok(Self { maps, pagemap })
    }
}
