//! Filtering and pagination over a loaded row set
//!
//! The filtered index list is computed once per filter term; paging through it
//! never rescans the rows.

/// Rows of a loaded file matching a filter term
#[derive(Clone, Debug)]
pub struct RowView<'a> {
    rows: &'a [Vec<String>],
    matches: Vec<usize>,
}

/// One page of a [`RowView`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<'a> {
    /// 1-based page number, clamped to the available pages
    pub number: usize,
    /// Number of pages (at least 1, even when nothing matches)
    pub total_pages: usize,
    /// Rows on this page
    pub rows: Vec<&'a [String]>,
}

impl<'a> RowView<'a> {
    /// Select rows where any cell contains `filter`, case-insensitively
    ///
    /// An empty filter selects every row.
    pub fn new(rows: &'a [Vec<String>], filter: &str) -> Self {
        let needle = filter.to_lowercase();
        let matches = if needle.is_empty() {
            (0..rows.len()).collect()
        } else {
            rows.iter()
                .enumerate()
                .filter(|(_, row)| {
                    row.iter()
                        .any(|cell| !cell.is_empty() && cell.to_lowercase().contains(&needle))
                })
                .map(|(i, _)| i)
                .collect()
        };
        Self { rows, matches }
    }

    /// Number of matching rows
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether nothing matched
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Number of pages for `page_size` rows per page (at least 1)
    pub fn total_pages(&self, page_size: usize) -> usize {
        self.matches.len().div_ceil(page_size.max(1)).max(1)
    }

    /// Page `number` (1-based) with `page_size` rows per page
    ///
    /// Out-of-range page numbers are clamped to the first or last page.
    pub fn page(&self, number: usize, page_size: usize) -> Page<'a> {
        let page_size = page_size.max(1);
        let total_pages = self.total_pages(page_size);
        let number = number.clamp(1, total_pages);

        let rows = self
            .matches
            .iter()
            .skip((number - 1) * page_size)
            .take(page_size)
            .map(|&i| self.rows[i].as_slice())
            .collect();

        Page {
            number,
            total_pages,
            rows,
        }
    }
}
