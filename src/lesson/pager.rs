//! Linear page navigation

use log::debug;

/// Outcome of moving to the next page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTurn {
    pub moved: bool,
    /// The move landed on the final page
    pub reached_last: bool,
}

/// Tracks the current page of a lesson; no wrap-around in either direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    current: usize,
    total: usize,
}

impl Pager {
    pub fn new(total: usize) -> Self {
        Self {
            current: 0,
            total: total.max(1),
        }
    }

    /// Zero-based index of the current page
    pub fn index(&self) -> usize {
        self.current
    }

    /// One-based page number for display
    pub fn number(&self) -> usize {
        self.current + 1
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.total
    }

    pub fn next(&mut self) -> PageTurn {
        if self.is_last() {
            return PageTurn {
                moved: false,
                reached_last: false,
            };
        }
        self.current += 1;
        debug!("Page {}/{}", self.number(), self.total);
        PageTurn {
            moved: true,
            reached_last: self.is_last(),
        }
    }

    /// Move back a page; returns false on the first page
    pub fn previous(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        debug!("Page {}/{}", self.number(), self.total);
        true
    }
}
