use serde::Serialize;

/// One page of an in-memory list. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool { self.page < self.total_pages }
    pub fn has_prev(&self) -> bool { self.page > 1 && self.total_pages > 0 }
}

/// Slice `items` into page `page` of `per_page` entries. `page` and `per_page`
/// below 1 are treated as 1; a page past the end is empty.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page);
    let items = items.into_iter().skip(start).take(per_page).collect();
    Page { items, page, per_page, total, total_pages }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_requested_page() {
        let p = paginate((1..=25).collect::<Vec<_>>(), 3, 10);
        assert_eq!(p.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(p.total, 25);
        assert_eq!(p.total_pages, 3);
        assert!(!p.has_next());
        assert!(p.has_prev());
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let p = paginate(vec!['a', 'b'], 4, 10);
        assert!(p.items.is_empty());
        assert_eq!(p.total_pages, 1);
    }

    #[test]
    fn zero_inputs_are_clamped() {
        let p = paginate(vec![1, 2, 3], 0, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 1);
        assert_eq!(p.items, vec![1]);
        let empty = paginate(Vec::<u8>::new(), 1, 10);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next() && !empty.has_prev());
    }
}
