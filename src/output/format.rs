use crate::abi::{KPF_UNSTABLE_FIRST_BIT, KpageFlags};

const SIZE_UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// Scale a byte count for display, e.g. `[   4 kB]`, `[8192 kB]`, `[ 128 MB]`.
///
/// The first step up happens above 1024, later steps above 8192, so up to
/// four significant digits are kept.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes;
    let mut unit = 0;
    while size > if unit == 0 { 1024 } else { 8192 } {
        size /= 1024;
        unit += 1;
    }
    let unit = SIZE_UNITS.get(unit).copied().unwrap_or("??");
    format!("[{size:>4} {unit:>2}]")
}

/// Symbolic names of every set bit in a kpageflags word.
///
/// Bits without a stable ABI get a `?` suffix; bits the kernel headers do
/// not name render as `<bit>`.
pub fn flag_names(flags: u64) -> Vec<String> {
    (0..u64::BITS)
        .filter(|bit| flags & (1 << bit) != 0)
        .map(|bit| match KpageFlags::bit_name(bit) {
            Some(name) if bit >= KPF_UNSTABLE_FIRST_BIT => format!("{name}?"),
            Some(name) => name.to_string(),
            None => format!("<{bit}>"),
        })
        .collect()
}

/// `[NAME NAME ...]`, or `[]` for no flags.
pub fn format_flags(flags: u64) -> String {
    format!("[{}]", flag_names(flags).join(" "))
}

/// Whole kibibytes.
pub fn kib(bytes: u64) -> u64 {
    bytes / 1024
}

/// `part` as a percentage of `whole`; 0 when `whole` is 0.
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
