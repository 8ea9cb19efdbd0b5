//! Public types for the document store facade.

/// One bounded page of results plus the total hit count of the query.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedList<T> {
    pub first_row: usize,
    /// Zero means the request set no limit
    pub max_rows: usize,
    pub list: Vec<T>,
    /// Total hits for the whole query
    pub total: u64,
}

impl<T> PagedList<T> {
    /// Number of pages at `max_rows` per page.
    #[must_use]
    pub fn total_page_count(&self) -> u64 {
        if self.max_rows == 0 {
            return u64::from(self.total > 0);
        }
        self.total.div_ceil(self.max_rows as u64)
    }

    /// Zero-based index of this page.
    #[must_use]
    pub fn page_index(&self) -> usize {
        if self.max_rows == 0 {
            0
        } else {
            self.first_row / self.max_rows
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.max_rows > 0 && ((self.first_row + self.max_rows) as u64) < self.total
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.first_row > 0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
