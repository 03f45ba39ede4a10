/// One page of a locally paginated list. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Slice `items` into pages of `per_page` and return page `page`.
/// Out-of-range pages are clamped; a `per_page` of 0 is treated as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);
    Page {
        items: items[start.min(total_items)..end].to_vec(),
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=25).collect();
        let first = paginate(&items, 1, 10);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = paginate(&items, 3, 10);
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);
        assert!(!last.has_next());
    }

    #[test]
    fn test_paginate_clamps() {
        let items = vec!['a', 'b', 'c'];
        assert_eq!(paginate(&items, 9, 2).page, 2);
        assert_eq!(paginate(&items, 0, 2).page, 1);
        assert_eq!(paginate(&items, 1, 0).items, vec!['a']);

        let empty: Vec<char> = Vec::new();
        let page = paginate(&empty, 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }
}
