use core::fmt;

use crate::address::{CellRef, Range, RangeParseError};
use crate::error::LayoutError;

/// A run of rows (or columns): `start` plus `len` consecutive indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub len: u32,
}

impl Span {
    pub const fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Last index covered, `None` when empty.
    pub fn last(&self) -> Option<u32> {
        self.len.checked_sub(1).map(|n| self.start + n)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last() {
            Some(last) => write!(f, "{}..={}", self.start + 1, last + 1),
            None => write!(f, "{}..(empty)", self.start + 1),
        }
    }
}

/// Rectangular region a layout component wrote, in absolute coordinates.
///
/// Unlike [`Range`] an extent can be empty, which still records *where* the
/// component would have written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Extent {
    rows: Span,
    cols: Span,
}

impl Extent {
    pub const fn new(rows: Span, cols: Span) -> Self {
        Self { rows, cols }
    }

    /// Zero-sized extent anchored at `origin`.
    pub const fn empty_at(origin: CellRef) -> Self {
        Self {
            rows: Span::new(origin.row, 0),
            cols: Span::new(origin.col, 0),
        }
    }

    pub const fn from_range(range: Range) -> Self {
        Self {
            rows: Span::new(range.start.row, range.height()),
            cols: Span::new(range.start.col, range.width()),
        }
    }

    pub fn from_a1(a1: &str) -> Result<Self, RangeParseError> {
        Range::from_a1(a1).map(Self::from_range)
    }

    pub const fn rows(&self) -> Span {
        self.rows
    }

    pub const fn cols(&self) -> Span {
        self.cols
    }

    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    pub fn range(&self) -> Option<Range> {
        let end_row = self.rows.last()?;
        let end_col = self.cols.last()?;
        Some(Range::new(
            CellRef::new(self.rows.start, self.cols.start),
            CellRef::new(end_row, end_col),
        ))
    }

    /// The slice of row `offset` (counted from the first row) across every
    /// column of the extent.
    pub fn row_range(&self, offset: u32) -> Option<Range> {
        if offset >= self.rows.len || self.cols.is_empty() {
            return None;
        }
        let row = self.rows.start + offset;
        let end_col = self.cols.last()?;
        Some(Range::new(
            CellRef::new(row, self.cols.start),
            CellRef::new(row, end_col),
        ))
    }

    /// First-column cell of row `offset`.
    pub fn cell_at(&self, offset: u32) -> Option<CellRef> {
        self.row_range(offset).map(|range| range.start)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range() {
            Some(range) => write!(f, "{range}"),
            None => write!(
                f,
                "empty@{}",
                CellRef::new(self.rows.start, self.cols.start)
            ),
        }
    }
}

/// Ordered set of column extents that cover the same rows, used as the
/// inputs of row-wise total formulas.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtentsCollection {
    rows: Option<Span>,
    extents: Vec<Extent>,
}

impl ExtentsCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection whose members must all cover `rows`, even while empty.
    pub fn spanning(rows: Span) -> Self {
        Self {
            rows: Some(rows),
            extents: Vec::new(),
        }
    }

    pub fn from_extents<I>(extents: I) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = Extent>,
    {
        let mut collection = Self::new();
        for extent in extents {
            collection.push(extent)?;
        }
        Ok(collection)
    }

    /// Add an extent. The first extent fixes the row span when none was given.
    pub fn push(&mut self, extent: Extent) -> Result<(), LayoutError> {
        match self.rows {
            Some(rows) if rows != extent.rows() => {
                return Err(LayoutError::MisalignedExtent {
                    extent: extent.to_string(),
                    expected: rows.to_string(),
                });
            }
            Some(_) => {}
            None => self.rows = Some(extent.rows()),
        }
        self.extents.push(extent);
        Ok(())
    }

    pub fn rows(&self) -> Option<Span> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.extents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Extent> {
        self.extents.iter()
    }

    /// Row `offset` of every member, in insertion order.
    pub fn row_ranges(&self, offset: u32) -> Vec<Range> {
        self.extents
            .iter()
            .filter_map(|extent| extent.row_range(offset))
            .collect()
    }

    /// Absolute row `row` of every member's columns.
    pub fn ranges_on_row(&self, row: u32) -> Vec<Range> {
        self.extents
            .iter()
            .filter_map(|extent| {
                let end_col = extent.cols().last()?;
                Some(Range::new(
                    CellRef::new(row, extent.cols().start),
                    CellRef::new(row, end_col),
                ))
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a ExtentsCollection {
    type Item = &'a Extent;
    type IntoIter = std::slice::Iter<'a, Extent>;

    fn into_iter(self) -> Self::IntoIter {
        self.extents.iter()
    }
}
