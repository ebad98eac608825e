/// Character-cell dimensions of the controlling terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerminalSize {
    pub width: usize,
    pub height: usize,
}

/// Size of the terminal attached to stdout, or `None` when stdout is not a
/// terminal (pipe, file).
pub fn terminal_size() -> Option<TerminalSize> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let ret = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };
    if ret != 0 {
        return None;
    }
    Some(TerminalSize {
        width: ws.ws_col as usize,
        height: ws.ws_row as usize,
    })
}
