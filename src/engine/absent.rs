/// A consolidated run of pages that are neither present nor swapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbsentSpan {
    pub start: u64,
    /// Exclusive end address.
    pub end: u64,
}

impl AbsentSpan {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Last byte address covered by the span.
    pub fn last(&self) -> u64 {
        self.end - 1
    }
}

/// Folds consecutive absent pages into one span.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbsentRun {
    start: Option<u64>,
}

impl AbsentRun {
    /// Record an absent page at `addr`. Only the first page of a run is kept.
    pub fn extend(&mut self, addr: u64) {
        self.start.get_or_insert(addr);
    }

    /// Close the open run, if any, at `end` (exclusive).
    pub fn close(&mut self, end: u64) -> Option<AbsentSpan> {
        let start = self.start.take()?;
        Some(AbsentSpan { start, end })
    }

    pub fn is_open(&self) -> bool {
        self.start.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_to_close() {
        let mut run = AbsentRun::default();
        assert_eq!(run.close(0x5000), None);
    }

    #[test]
    fn consecutive_pages_fold() {
        let mut run = AbsentRun::default();
        run.extend(0x1000);
        run.extend(0x2000);
        run.extend(0x3000);
        let span = run.close(0x4000).unwrap();
        assert_eq!(span, AbsentSpan { start: 0x1000, end: 0x4000 });
        assert_eq!(span.len(), 0x3000);
        assert_eq!(span.last(), 0x3fff);
        assert!(!run.is_open());
    }

    #[test]
    fn runs_are_independent() {
        let mut run = AbsentRun::default();
        run.extend(0x1000);
        assert_eq!(run.close(0x2000).unwrap().start, 0x1000);
        run.extend(0x8000);
        assert_eq!(run.close(0x9000).unwrap().start, 0x8000);
    }
}
