//! Offset pagination over id-ordered rows

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: usize = 10;
pub const MAX_PER_PAGE: usize = 100;

/// `?page=&per_page=` query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_page() -> usize {
    1
}
fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results plus bookkeeping
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub pages: usize,
    pub page: usize,
    pub per_page: usize,
}

/// Slice `rows` into the requested page. Page numbers are 1-based and
/// clamped into range; `per_page` is capped at [`MAX_PER_PAGE`].
pub fn paginate<T>(rows: Vec<T>, query: PageQuery) -> Page<T> {
    let per_page = query.per_page.clamp(1, MAX_PER_PAGE);
    let total = rows.len();
    let pages = total.div_ceil(per_page).max(1);
    let page = query.page.clamp(1, pages);

    let start = (page - 1) * per_page;
    let items: Vec<T> = rows
        .into_iter()
        .skip(start)
        .take(per_page)
        .collect();

    Page {
        items,
        total,
        pages,
        page,
        per_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_paging() {
        let rows: Vec<u32> = (0..100).collect();
        let page = paginate(rows, PageQuery { page: 1, per_page: 10 });
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total, 100);
        assert_eq!(page.pages, 10);
        assert_eq!(page.items[0], 0);
    }

    #[test]
    fn test_last_partial_page() {
        let rows: Vec<u32> = (0..25).collect();
        let page = paginate(rows, PageQuery { page: 3, per_page: 10 });
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0], 20);
    }

    #[test]
    fn test_out_of_range_page_clamped() {
        let rows: Vec<u32> = (0..5).collect();
        let page = paginate(rows, PageQuery { page: 99, per_page: 10 });
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn test_empty_rows() {
        let page = paginate(Vec::<u32>::new(), PageQuery::default());
        assert_eq!(page.total, 0);
        assert_eq!(page.pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_per_page_capped() {
        let rows: Vec<u32> = (0..500).collect();
        let page = paginate(rows, PageQuery { page: 1, per_page: 1000 });
        assert_eq!(page.items.len(), MAX_PER_PAGE);
    }
}
