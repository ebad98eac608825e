//! Renderer tests driven by real engine scans over synthetic streams.
//!
//! Run with: `cargo test --test output_integration`

use std::io::Cursor;

use pageproc::abi::KpageFlags;
use pageproc::engine::{Engine, ScanConfig};
use pageproc::model::{Enrichment, ResidencyStats};
use pageproc::output::{
    DetailOptions, JsonCollector, ListLayout, ListWriter, PrettyObserver, ProcessRecord,
    StatsRecord, write_json,
};
use pageproc::process::ScanTarget;
use pageproc::source::{FrameTable, FrameTables, MapsReader, PagemapReader};

const PAGE: u64 = 0x1000;
const PRESENT: u64 = 1 << 63;
const SWAPPED: u64 = 1 << 62;

type Stream = Cursor<Vec<u8>>;

const MAPS: &str = "00000000-00002000 r-xp 00000000 08:01 77 /usr/bin/demo\n\
                    00002000-00006000 rw-p 00000000 00:00 0 [heap]\n";

fn words(w: &[u64]) -> Stream {
    Cursor::new(w.iter().flat_map(|w| w.to_ne_bytes()).collect())
}

fn frames() -> FrameTables<Stream> {
    let anon = KpageFlags::ANON.bits();
    FrameTables::new(
        Some(FrameTable::new(words(&[0, 2, 1, 1]))),
        Some(FrameTable::new(words(&[0, 0, anon, anon]))),
    )
}

fn pagemap() -> PagemapReader<Stream> {
    // text: two shared pages; heap: two private pages, one swapped, one absent
    PagemapReader::new(words(&[
        PRESENT | 1,
        PRESENT | 1,
        PRESENT | 2,
        PRESENT | 3,
        SWAPPED | (5 << 5),
        0,
    ]))
}

fn render_pretty(options: DetailOptions, writable_only: bool) -> String {
    let mut pm = pagemap();
    let mut tables = frames();
    let enrichment = tables.enrichment();
    let mut observer = PrettyObserver::new(Vec::new(), options, PAGE, enrichment);
    let mut engine = Engine::new(ScanConfig::new(PAGE, writable_only), &mut pm, &mut tables);
    let total = engine
        .scan(MapsReader::new(Cursor::new(MAPS.as_bytes().to_vec())), &mut observer)
        .unwrap();
    if options.wants_totals() {
        observer.write_totals(&total).unwrap();
    }
    String::from_utf8(observer.into_inner()).unwrap()
}

fn scan_total() -> ResidencyStats {
    let mut pm = pagemap();
    let mut tables = frames();
    let mut engine = Engine::new(ScanConfig::new(PAGE, false), &mut pm, &mut tables);
    engine
        .scan(MapsReader::new(Cursor::new(MAPS.as_bytes().to_vec())), &mut ())
        .unwrap()
}

#[test]
fn totals_report() {
    let out = render_pretty(DetailOptions::default(), false);
    let expected = "\
============ Totals ============
Size:             24 kB
Present:          16 kB (66.7%)
  Unique:          8 kB (50.0%)
  Average:        12 kB (75.0%)
  Anon:            8 kB (50.0%)
  Huge:            0 kB (0.0%)
Referenced:        0 kB (0.0%)
Swapped:           4 kB (16.7%)
";
    assert_eq!(out, expected);
}

#[test]
fn summary_report_has_one_block_per_section() {
    let options = DetailOptions {
        summary: true,
        ..Default::default()
    };
    let out = render_pretty(options, false);
    assert!(out.contains("==================== /usr/bin/demo [r-xp] [   8 kB] ===================="));
    assert!(out.contains("==================== [heap] [rw-p] [  16 kB] ===================="));
    assert_eq!(out.matches("Size:").count(), 2);
    assert!(!out.contains("Totals"));
}

#[test]
fn writable_summary_omits_filtered_sections() {
    let options = DetailOptions {
        summary: true,
        ..Default::default()
    };
    let out = render_pretty(options, true);
    assert!(!out.contains("/usr/bin/demo"));
    assert!(out.contains("[heap]"));
    assert_eq!(out.matches("Size:").count(), 1);
}

#[test]
fn map_report() {
    let options = DetailOptions {
        map: true,
        ..Default::default()
    };
    let out = render_pretty(options, false);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[1], "PP");
    assert_eq!(lines[3], "PPS.");
    assert_eq!(lines.len(), 4);
}

#[test]
fn verbose_report_folds_trailing_absent_page() {
    let options = DetailOptions {
        verbose: true,
        ..Default::default()
    };
    let out = render_pretty(options, false);
    assert!(out.contains("   0000000000005000-0000000000005fff, Not present [   4 kB]\n"));
    assert!(out.contains(", Swapped (seg 0 offs 0000000000000005)\n"));
    assert!(out.contains(", RefCnt 2, Flags []\n"));
    assert!(out.contains("Totals"));
}

#[test]
fn list_row_from_scan() {
    let layout = ListLayout {
        threads: false,
        enrichment: Enrichment::FULL,
        terminal: None,
    };
    let mut writer = ListWriter::new(Vec::new(), layout);
    writer
        .write_target(ScanTarget::process(321), &scan_total(), "demo --flag")
        .unwrap();
    let out = String::from_utf8(writer.into_inner()).unwrap();
    let row = out.lines().nth(1).unwrap();
    assert_eq!(
        row,
        "       321       24       16        8       12        8        0        0        4 demo --flag"
    );
}

#[test]
fn json_list_records() {
    let total = scan_total();
    let mut record = ProcessRecord::new(ScanTarget::process(321));
    record.command = Some("demo".to_string());
    record.totals = Some(StatsRecord::new(&total, Enrichment::NONE));

    let mut buf = Vec::new();
    write_json(&vec![record], &mut buf).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    let first = &value[0];
    assert_eq!(first["pid"], 321);
    assert_eq!(first["command"], "demo");
    assert_eq!(first["totals"]["present"], 4 * PAGE);
    assert!(first["totals"].get("private").is_none());
}

#[test]
fn json_sections_from_scan() {
    let mut pm = pagemap();
    let mut tables = frames();
    let mut collector = JsonCollector::new(tables.enrichment(), true);
    let mut engine = Engine::new(ScanConfig::new(PAGE, false), &mut pm, &mut tables);
    engine
        .scan(MapsReader::new(Cursor::new(MAPS.as_bytes().to_vec())), &mut collector)
        .unwrap();

    let sections = collector.into_sections();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].label, "/usr/bin/demo");
    assert_eq!(sections[0].stats.proportional, Some(PAGE));
    assert_eq!(sections[1].start, "2000");
    assert_eq!(sections[1].stats.private, Some(2 * PAGE));
    assert_eq!(sections[1].stats.swapped, PAGE);
}
