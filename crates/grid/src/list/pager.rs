/// Render-layer pagination. A page size of zero shows everything on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page_size: usize,
    pub page: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page_size: 10,
            page: 0,
        }
    }
}

impl Pager {
    pub fn page_count(&self, total: usize) -> usize {
        if self.page_size == 0 || total == 0 {
            1
        } else {
            total.div_ceil(self.page_size)
        }
    }

    pub fn clamp(&mut self, total: usize) {
        let last = self.page_count(total) - 1;
        self.page = self.page.min(last);
    }

    /// Index range of the current page within `total` ordered rows.
    pub fn window(&self, total: usize) -> std::ops::Range<usize> {
        if self.page_size == 0 {
            return 0..total;
        }
        let start = (self.page * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }
}
