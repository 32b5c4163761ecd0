use crate::api::{Book, BookPage};

/// Explicit states for the incrementally-grown book list, replacing the
/// usual tangle of `loading`/`loadingMore`/`hasMore` booleans. Only
/// `Idle` may start a fetch, which doubles as the overlapping-fetch
/// guard.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PagerState {
    Idle,
    Fetching(u32),
    Exhausted,
    Failed,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub search: String,
    pub page: u32,
}

/// Catalog pagination state machine. Driven by the view: scroll events
/// call `next_request`, the async fetch completion calls `apply_page`.
#[derive(Clone, Debug, PartialEq)]
pub struct BookPager {
    search: String,
    next_page: u32,
    pub books: Vec<Book>,
    pub state: PagerState,
}

impl BookPager {
    pub fn new() -> BookPager {
        BookPager {
            search: String::new(),
            next_page: 1,
            books: Vec::new(),
            state: PagerState::Idle,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn has_more(&self) -> bool {
        matches!(self.state, PagerState::Idle | PagerState::Fetching(_))
    }

    /// New search term: reset to page 1 and clear the list before the
    /// refetch. Returns false (and changes nothing) when the term is
    /// unchanged, so a debounce firing twice stays harmless.
    pub fn set_search(&mut self, term: String) -> bool {
        if term == self.search {
            return false;
        }
        self.search = term;
        self.next_page = 1;
        self.books.clear();
        self.state = PagerState::Idle;
        true
    }

    /// Hand out the next page to fetch, transitioning to `Fetching`.
    /// Any state but `Idle` yields nothing: a fetch is already running,
    /// the catalog is exhausted, or the last fetch failed.
    pub fn next_request(&mut self) -> Option<PageRequest> {
        match self.state {
            PagerState::Idle => {
                let page = self.next_page;
                self.state = PagerState::Fetching(page);
                Some(PageRequest {
                    search: self.search.clone(),
                    page,
                })
            }
            _ => None,
        }
    }

    /// A failed fetch parks the pager in `Failed`; an explicit retry
    /// (or a search change) is needed to resume.
    pub fn retry(&mut self) {
        if self.state == PagerState::Failed {
            self.state = PagerState::Idle;
        }
    }

    pub fn apply_page(&mut self, page: u32, result: Result<BookPage, ()>) {
        if self.state != PagerState::Fetching(page) {
            // stale completion, e.g. the search changed mid-flight
            tracing::debug!(page, state = ?self.state, "ignoring stale page result");
            return;
        }
        match result {
            Ok(fetched) => {
                let empty = fetched.results.is_empty();
                for book in fetched.results {
                    if !self.books.iter().any(|b| b.id == book.id) {
                        self.books.push(book);
                    }
                }
                self.state = match empty || fetched.next.is_none() {
                    true => PagerState::Exhausted,
                    false => {
                        self.next_page = page + 1;
                        PagerState::Idle
                    }
                };
            }
            Err(()) => self.state = PagerState::Failed,
        }
    }
}

impl Default for BookPager {
    fn default() -> BookPager {
        BookPager::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: u64, title: &str) -> Book {
        serde_json::from_str(&format!(
            r#"{{"id": {id}, "title": "{title}", "authors": []}}"#
        ))
        .unwrap()
    }

    fn page_of(ids: std::ops::Range<u64>, next: bool) -> BookPage {
        BookPage {
            results: ids.map(|i| book(i, "t")).collect(),
            next: next.then(|| String::from("https://catalog.example/?page=next")),
        }
    }

    #[test]
    fn search_then_scroll_then_exhaustion() {
        let mut p = BookPager::new();
        assert!(p.set_search(String::from("tolstoy")));

        let req = p.next_request().unwrap();
        assert_eq!(req, PageRequest { search: String::from("tolstoy"), page: 1 });
        p.apply_page(1, Ok(page_of(0..15, true)));
        assert_eq!(p.books.len(), 15);
        assert!(p.has_more());

        let req = p.next_request().unwrap();
        assert_eq!(req.page, 2);
        p.apply_page(2, Ok(page_of(0..0, false)));
        assert_eq!(p.state, PagerState::Exhausted);
        assert!(!p.has_more());
        assert_eq!(p.books.len(), 15, "empty page must not duplicate entries");
        assert!(p.next_request().is_none());
    }

    #[test]
    fn only_one_fetch_may_be_outstanding() {
        let mut p = BookPager::new();
        assert!(p.next_request().is_some());
        assert!(p.next_request().is_none());
        p.apply_page(1, Ok(page_of(0..5, true)));
        assert!(p.next_request().is_some());
    }

    #[test]
    fn search_change_resets_and_invalidates_in_flight_fetch() {
        let mut p = BookPager::new();
        p.next_request().unwrap();
        p.apply_page(1, Ok(page_of(0..10, true)));
        assert_eq!(p.books.len(), 10);

        p.set_search(String::from("austen"));
        assert!(p.books.is_empty());

        // the old term's page 2 completes after the reset: ignored
        p.apply_page(2, Ok(page_of(10..20, true)));
        assert!(p.books.is_empty());

        let req = p.next_request().unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.search, "austen");
    }

    #[test]
    fn unchanged_search_term_is_a_noop() {
        let mut p = BookPager::new();
        p.set_search(String::from("verne"));
        p.next_request().unwrap();
        p.apply_page(1, Ok(page_of(0..3, true)));
        assert!(!p.set_search(String::from("verne")));
        assert_eq!(p.books.len(), 3);
    }

    #[test]
    fn duplicate_ids_across_pages_are_skipped() {
        let mut p = BookPager::new();
        p.next_request().unwrap();
        p.apply_page(1, Ok(page_of(0..10, true)));
        p.next_request().unwrap();
        // overlapping window: 5..15 shares 5..10 with page 1
        p.apply_page(2, Ok(page_of(5..15, true)));
        assert_eq!(p.books.len(), 15);
    }

    #[test]
    fn failure_parks_until_retry() {
        let mut p = BookPager::new();
        p.next_request().unwrap();
        p.apply_page(1, Err(()));
        assert_eq!(p.state, PagerState::Failed);
        assert!(!p.has_more());
        assert!(p.next_request().is_none());
        p.retry();
        assert_eq!(p.next_request().unwrap().page, 1);
    }
}
