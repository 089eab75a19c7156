//! Page navigation state for the run history.
//!
//! Navigation issues a [`PageRequest`] ticket; the caller performs the fetch and
//! hands the result back through [`HistoryPager::complete`]. Only the most
//! recently issued ticket may update state, so a slow response for a page the
//! user already left is dropped.

use serde::Serialize;

use crate::adapter::AdaptedPage;
use crate::api::PageQuery;
use crate::logging::{log_page_clamped, log_page_transition, log_stale_discard};

/// Invariant: `1 <= current_page <= total_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl PageState {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_pages: 1,
        }
    }

    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages.max(1))
    }

    pub fn can_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub ticket: u64,
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Result of applying a completed retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied {
        /// Page the state was moved off when the new page count was smaller.
        clamped_from: Option<u32>,
    },
    Stale,
}

#[derive(Debug, Clone)]
pub struct HistoryPager {
    state: PageState,
    last_ticket: u64,
}

impl HistoryPager {
    pub fn new(page_size: u32) -> Self {
        Self {
            state: PageState::new(page_size),
            last_ticket: 0,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    /// Clamp `n` into range, move there, and issue a retrieval.
    pub fn go_to_page(&mut self, n: u32) -> PageRequest {
        let target = self.state.clamp(n);
        if target != n {
            log_page_clamped(n, target, self.state.total_pages);
        }
        self.issue(target)
    }

    /// No-op on the last page.
    pub fn next(&mut self) -> Option<PageRequest> {
        if !self.state.can_next() {
            return None;
        }
        Some(self.go_to_page(self.state.current_page + 1))
    }

    /// No-op on the first page.
    pub fn prev(&mut self) -> Option<PageRequest> {
        if !self.state.can_prev() {
            return None;
        }
        Some(self.go_to_page(self.state.current_page - 1))
    }

    /// Re-fetch the current page without moving.
    pub fn on_refresh_signal(&mut self) -> PageRequest {
        self.issue(self.state.current_page)
    }

    fn issue(&mut self, page: u32) -> PageRequest {
        self.last_ticket += 1;
        log_page_transition(
            self.state.current_page,
            page,
            self.state.total_pages,
            self.last_ticket,
        );
        self.state.current_page = page;
        PageRequest {
            ticket: self.last_ticket,
            page,
            limit: self.state.page_size,
        }
    }

    pub fn is_current(&self, req: &PageRequest) -> bool {
        req.ticket == self.last_ticket
    }

    /// Apply a finished retrieval. Completions for superseded tickets are ignored.
    pub fn complete(&mut self, req: &PageRequest, page: &AdaptedPage) -> Completion {
        if !self.is_current(req) {
            log_stale_discard(req.ticket, req.page, self.last_ticket);
            return Completion::Stale;
        }
        self.state.total_pages = page.total_pages();
        let clamped = self.state.clamp(self.state.current_page);
        let clamped_from = if clamped != self.state.current_page {
            log_page_clamped(self.state.current_page, clamped, self.state.total_pages);
            let from = self.state.current_page;
            self.state.current_page = clamped;
            Some(from)
        } else {
            None
        };
        Completion::Applied { clamped_from }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_pages(n: u32) -> AdaptedPage {
        AdaptedPage {
            pages: Some(n),
            ..Default::default()
        }
    }

    fn pager_at(page: u32, total: u32) -> HistoryPager {
        let mut p = HistoryPager::new(10);
        let req = p.go_to_page(1);
        p.complete(&req, &with_pages(total));
        let req = p.go_to_page(page);
        p.complete(&req, &with_pages(total));
        p
    }

    #[test]
    fn test_prev_noop_on_first_page() {
        let mut p = pager_at(1, 3);
        assert!(p.prev().is_none());
        assert_eq!(p.state().current_page, 1);
    }

    #[test]
    fn test_next_noop_on_last_page() {
        let mut p = pager_at(3, 3);
        assert_eq!(p.state().current_page, 3);
        assert!(p.next().is_none());
        assert_eq!(p.state().current_page, 3);
    }

    #[test]
    fn test_go_to_page_clamps() {
        let mut p = pager_at(1, 3);
        let req = p.go_to_page(9);
        assert_eq!(req.page, 3);
        let req = p.go_to_page(0);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 10);
    }

    #[test]
    fn test_refresh_keeps_page() {
        let mut p = pager_at(2, 3);
        let req = p.on_refresh_signal();
        assert_eq!(req.page, 2);
        assert_eq!(p.state().current_page, 2);
    }

    #[test]
    fn test_stale_completion_discarded() {
        let mut p = pager_at(1, 5);
        let slow = p.next().unwrap();
        let fast = p.next().unwrap();
        assert_eq!(p.complete(&fast, &with_pages(5)), Completion::Applied { clamped_from: None });
        assert_eq!(p.complete(&slow, &with_pages(1)), Completion::Stale);
        assert_eq!(p.state().total_pages, 5);
        assert_eq!(p.state().current_page, 3);
    }

    #[test]
    fn test_shrinking_page_count_clamps() {
        let mut p = pager_at(4, 4);
        let req = p.on_refresh_signal();
        let outcome = p.complete(&req, &with_pages(2));
        assert_eq!(outcome, Completion::Applied { clamped_from: Some(4) });
        assert_eq!(p.state().current_page, 2);
        assert_eq!(p.state().total_pages, 2);
    }

    #[test]
    fn test_unreported_pages_default_to_one() {
        let mut p = pager_at(1, 3);
        let req = p.on_refresh_signal();
        p.complete(&req, &AdaptedPage::default());
        assert_eq!(p.state().total_pages, 1);
        assert!(!p.state().can_next());
    }

    #[test]
    fn test_invariant_holds_through_walk() {
        let mut p = pager_at(1, 4);
        for _ in 0..10 {
            if let Some(req) = p.next() {
                p.complete(&req, &with_pages(4));
            }
            let s = p.state();
            assert!(s.current_page >= 1 && s.current_page <= s.total_pages);
        }
        assert_eq!(p.state().current_page, 4);
    }
}
