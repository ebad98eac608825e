use std::io::Write;

use serde::Serialize;

use crate::engine::PageObserver;
use crate::error::PageprocError;
use crate::model::{Enrichment, ResidencyStats, VirtualMapping};
use crate::process::ScanTarget;

/// Statistics in bytes. Fields backed by an unavailable frame table are
/// left out rather than reported as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsRecord {
    pub size: u64,
    pub present: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proportional: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anon: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub huge: Option<u64>,
    pub swapped: u64,
}

impl StatsRecord {
    pub fn new(stats: &ResidencyStats, enrichment: Enrichment) -> Self {
        let counts = |v: u64| enrichment.counts.then_some(v);
        let flags = |v: u64| enrichment.flags.then_some(v);
        Self {
            size: stats.size,
            present: stats.present,
            private: counts(stats.private),
            proportional: counts(stats.proportional()),
            anon: flags(stats.anon),
            referenced: flags(stats.referenced),
            huge: flags(stats.huge),
            swapped: stats.swapped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRecord {
    pub start: String,
    pub end: String,
    pub perms: String,
    pub label: String,
    pub stats: StatsRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub pid: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<StatsRecord>,
}

impl ProcessRecord {
    pub fn new(target: ScanTarget) -> Self {
        Self {
            pid: target.pid,
            tid: None,
            command: None,
            sections: Vec::new(),
            totals: None,
        }
    }
}

/// Collects per-section records during a scan.
pub struct JsonCollector {
    enrichment: Enrichment,
    sections: Option<Vec<SectionRecord>>,
}

impl JsonCollector {
    /// With `per_section`, every scanned mapping becomes a [`SectionRecord`].
    pub fn new(enrichment: Enrichment, per_section: bool) -> Self {
        Self {
            enrichment,
            sections: per_section.then(Vec::new),
        }
    }

    pub fn into_sections(self) -> Vec<SectionRecord> {
        self.sections.unwrap_or_default()
    }
}

impl PageObserver for JsonCollector {
    fn section_end(
        &mut self,
        mapping: &VirtualMapping,
        stats: ResidencyStats,
    ) -> Result<(), PageprocError> {
        if let Some(sections) = &mut self.sections {
            sections.push(SectionRecord {
                start: format!("{:x}", mapping.start),
                end: format!("{:x}", mapping.end),
                perms: mapping.perms.clone(),
                label: mapping.display_label().to_string(),
                stats: StatsRecord::new(&stats, self.enrichment),
            });
        }
        Ok(())
    }
}

/// Write any record as pretty-printed JSON followed by a newline.
pub fn write_json<T: Serialize + ?Sized>(
    value: &T,
    writer: &mut impl Write,
) -> Result<(), PageprocError> {
    serde_json::to_writer_pretty(&mut *writer, value)
        .map_err(|e| PageprocError::Serialization(std::io::Error::other(e.to_string())))?;
    writeln!(writer).map_err(PageprocError::Output)
}
