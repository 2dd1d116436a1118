use std::ops::RangeInclusive;

/// Fixed-size page cursor over a result set of `total_rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: usize,
    pub page_size: usize,
    pub total_rows: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_rows: 0,
        }
    }

    /// `ceil(total_rows / page_size)`, never less than one.
    pub fn total_pages(&self) -> usize {
        self.total_rows.div_ceil(self.page_size).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn contains(&self, page: usize) -> bool {
        (1..=self.total_pages()).contains(&page)
    }

    /// 1-based row numbers shown on the current page, or `None` when the
    /// page is empty.
    pub fn row_range(&self) -> Option<RangeInclusive<usize>> {
        let first = self.offset() + 1;
        let last = (self.current_page * self.page_size).min(self.total_rows);
        if first > last {
            None
        } else {
            Some(first..=last)
        }
    }

    pub fn offset(&self) -> usize {
        (self.current_page - 1) * self.page_size
    }
}
