// Renderers for scan results.
//
// pretty: single-target detail (sections, pages, status maps, totals)
// list:   one row per target in a fixed-width table
// json:   serde records for either shape

pub mod format;
pub mod json;
pub mod list;
pub mod pretty;

pub use format::{flag_names, format_flags, format_size};
pub use json::{JsonCollector, ProcessRecord, SectionRecord, StatsRecord, write_json};
pub use list::{ListLayout, ListWriter};
pub use pretty::{DetailOptions, PrettyObserver};
