//! The on-page sink: a bounded, collapsible list of recent entries.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{LogEntry, LogSink};

pub fn header_text(collapsed: bool) -> &'static str {
    if collapsed {
        "Debug Console (tap to expand)"
    } else {
        "Debug Console (tap to collapse)"
    }
}

#[derive(Debug)]
struct PageBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    collapsed: bool,
    /// Set on every write, cleared by whoever draws the list.
    scroll_pending: bool,
}

/// Shared handle; the console writes, the overlay reads.
#[derive(Debug, Clone)]
pub struct PageLog {
    inner: Arc<Mutex<PageBuffer>>,
}

impl PageLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PageBuffer {
                entries: VecDeque::with_capacity(capacity.max(1)),
                capacity: capacity.max(1),
                collapsed: false,
                scroll_pending: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageBuffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn is_collapsed(&self) -> bool {
        self.lock().collapsed
    }

    /// Flip collapsed/expanded and return the new header text.
    pub fn toggle(&self) -> &'static str {
        let mut page = self.lock();
        page.collapsed = !page.collapsed;
        header_text(page.collapsed)
    }

    pub fn header(&self) -> &'static str {
        header_text(self.is_collapsed())
    }

    /// Whether the view should jump to the newest entry; resets the flag.
    pub fn take_scroll_request(&self) -> bool {
        std::mem::take(&mut self.lock().scroll_pending)
    }
}

impl LogSink for PageLog {
    fn write(&self, entry: &LogEntry) {
        let mut page = self.lock();
        page.entries.push_back(entry.clone());
        while page.entries.len() > page.capacity {
            page.entries.pop_front();
        }
        page.scroll_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::LogLevel;

    fn entry(i: usize) -> LogEntry {
        LogEntry {
            level: LogLevel::Log,
            timestamp: "12:00:00".into(),
            message: format!("line {i}"),
        }
    }

    #[test]
    fn keeps_only_the_newest_entries() {
        let page = PageLog::new(50);
        for i in 0..120 {
            page.write(&entry(i));
        }
        let entries = page.entries();
        assert_eq!(entries.len(), 50);
        assert_eq!(entries[0].message, "line 70");
        assert_eq!(entries[49].message, "line 119");
    }

    #[test]
    fn toggling_swaps_the_header() {
        let page = PageLog::new(5);
        assert_eq!(page.header(), "Debug Console (tap to collapse)");
        assert_eq!(page.toggle(), "Debug Console (tap to expand)");
        assert!(page.is_collapsed());
        assert_eq!(page.toggle(), "Debug Console (tap to collapse)");
    }

    #[test]
    fn writes_request_a_scroll_once() {
        let page = PageLog::new(5);
        assert!(!page.take_scroll_request());
        page.write(&entry(0));
        assert!(page.take_scroll_request());
        assert!(!page.take_scroll_request());
    }
}
