use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::PROC_ROOT;

/// Bytes of command line read when no terminal width limits it.
pub const DEFAULT_COMMAND_WIDTH: usize = 200;

/// Label for process or thread `id`: its command line, else `[comm]`,
/// else `<Unknown>`. At most `width - 1` characters are kept.
pub fn read_command(id: u64, width: usize) -> String {
    command_from_dir(&Path::new(PROC_ROOT).join(id.to_string()), width)
}

/// Same as [`read_command`] for an explicit `/proc/<id>` directory.
pub fn command_from_dir(dir: &Path, width: usize) -> String {
    let width = if width == 0 { DEFAULT_COMMAND_WIDTH } else { width };

    if let Some(buf) = read_prefix(&dir.join("cmdline"), width) {
        tidy_command(&buf)
    } else if let Some(buf) = read_prefix(&dir.join("comm"), width) {
        format!("[{}]", tidy_command(&buf))
    } else {
        "<Unknown>".to_string()
    }
}

/// First `width` bytes of a file; `None` if unreadable or empty.
fn read_prefix(path: &Path, width: usize) -> Option<Vec<u8>> {
    let file = File::open(path).ok()?;
    let mut buf = Vec::with_capacity(width);
    file.take(width as u64).read_to_end(&mut buf).ok()?;
    (!buf.is_empty()).then_some(buf)
}

/// Turn a raw command buffer into a printable label.
///
/// The final byte (trailing NUL of cmdline, newline of comm) is dropped,
/// embedded NULs become spaces and other non-printables become `.`.
pub fn tidy_command(buf: &[u8]) -> String {
    let Some((_, body)) = buf.split_last() else {
        return String::new();
    };
    body.iter()
        .map(|&b| match b {
            0 => ' ',
            0x20..=0x7e => b as char,
            _ => '.',
        })
        .collect()
}
