//! Page bookkeeping for infinite-scroll listings and locally paginated collections.

use crate::{MoviePage, MovieSummary};

/// Number of pages needed to show `total` items `per_page` at a time (at least one).
pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 1;
    }
    total.div_ceil(per_page).max(1)
}

/// Items on 1-based `page`, clamping out-of-range pages to the nearest valid one.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if per_page == 0 || items.is_empty() {
        return &[];
    }
    let page = page.clamp(1, page_count(items.len(), per_page));
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, PartialEq)]
/// Accumulates pages of one listing for infinite scroll.
///
/// Pages after the first must be applied in order; one that is not the next page (a late or
/// duplicate answer) is ignored. Items already shown are not repeated when
/// the remote listing shifts between page fetches.
pub struct PageAccumulator {
    items: Vec<MovieSummary>,
    loaded_pages: u32,
    total_pages: u32,
}

impl Default for PageAccumulator {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loaded_pages: 0,
            total_pages: 1,
        }
    }
}

impl PageAccumulator {
    /// Items accumulated so far.
    pub fn items(&self) -> &[MovieSummary] {
        &self.items
    }

    /// Page to request next.
    pub fn next_page(&self) -> u32 {
        self.loaded_pages + 1
    }

    /// Returns `true` while more pages remain.
    pub fn has_more(&self) -> bool {
        self.loaded_pages < self.total_pages
    }

    /// Appends `page`, returning `false` when it was not the expected next page. Page 1 always
    /// replaces what was accumulated.
    pub fn apply(&mut self, page: MoviePage) -> bool {
        if page.page <= 1 {
            self.reset();
        } else if page.page != self.next_page() {
            return false;
        }
        self.loaded_pages = page.page;
        self.total_pages = page.total_pages;
        for movie in page.results {
            if !self.items.iter().any(|seen| seen.id == movie.id) {
                self.items.push(movie);
            }
        }
        true
    }

    /// Forgets everything; the next request starts at page 1.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn page(number: u32, ids: &[u64], total_pages: u32) -> MoviePage {
        MoviePage {
            page: number,
            results: ids
                .iter()
                .map(|id| {
                    serde_json::from_value(serde_json::json!({"id": id, "title": id.to_string()}))
                        .expect("summary")
                })
                .collect(),
            total_pages,
            total_results: 0,
        }
    }

    fn ids(accumulator: &PageAccumulator) -> Vec<u64> {
        accumulator.items().iter().map(|movie| movie.id).collect()
    }

    #[test]
    fn pagination_clamps_and_slices() {
        let items: Vec<u32> = (1..=25).collect();
        assert_eq!(page_count(items.len(), 10), 3);
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(paginate(&items, 3, 10), &[21, 22, 23, 24, 25]);
        assert_eq!(paginate(&items, 9, 10), &[21, 22, 23, 24, 25]);
        assert_eq!(paginate(&items, 0, 10)[0], 1);
        assert!(paginate::<u32>(&[], 1, 10).is_empty());
    }

    #[test]
    fn accumulator_appends_in_order_and_skips_repeats() {
        let mut accumulator = PageAccumulator::default();
        assert_eq!(accumulator.next_page(), 1);
        assert!(accumulator.apply(page(1, &[1, 2, 3], 3)));
        assert!(!accumulator.apply(page(3, &[7], 3)));
        assert!(accumulator.apply(page(2, &[3, 4], 3)));
        assert!(!accumulator.apply(page(2, &[3, 4], 3)));

        assert_eq!(ids(&accumulator), vec![1, 2, 3, 4]);
        assert!(accumulator.has_more());
        assert!(accumulator.apply(page(3, &[5], 3)));
        assert!(!accumulator.has_more());
    }

    #[test]
    fn first_page_replaces_accumulated_items() {
        let mut accumulator = PageAccumulator::default();
        accumulator.apply(page(1, &[1, 2], 2));
        accumulator.apply(page(2, &[3], 2));
        assert!(accumulator.apply(page(1, &[8], 1)));
        assert_eq!(ids(&accumulator), vec![8]);
    }

    #[test]
    fn reset_starts_over() {
        let mut accumulator = PageAccumulator::default();
        accumulator.apply(page(1, &[9], 4));
        accumulator.reset();
        assert_eq!(accumulator.next_page(), 1);
        assert!(accumulator.items().is_empty());
        assert!(accumulator.has_more());
    }
}
