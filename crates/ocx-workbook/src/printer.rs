//! Relative-coordinate printing onto a worksheet.
//!
//! Layout components never compute absolute addresses. They receive a
//! [`WorksheetRangePrinter`], emit rows and cells relative to it, and open
//! nested ranges for sub-blocks. A nested range is placed after everything its
//! parent has printed so far (below it for [`Orientation::TopToBottom`], to
//! the right for [`Orientation::LeftToRight`]), and reports its [`Extent`]
//! back to the parent when it completes.

use log::{debug, trace};

use crate::address::{CellRef, Range};
use crate::error::LayoutError;
use crate::extents::Extent;
use crate::style::Style;
use crate::value::CellContent;

/// Destination of absolute cell writes: an in-memory grid or a real worksheet.
pub trait CellSink {
    fn write_cell(
        &mut self,
        at: CellRef,
        content: &CellContent,
        style: &Style,
    ) -> Result<(), LayoutError>;

    fn set_row_height(&mut self, row: u32, height: f64) -> Result<(), LayoutError>;

    fn set_column_width(&mut self, col: u32, width: f64) -> Result<(), LayoutError>;
}

/// Where nested ranges are placed relative to what is already printed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    TopToBottom,
    LeftToRight,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RowOptions {
    /// Row height in points.
    pub height: Option<f64>,
}

impl RowOptions {
    pub fn with_height(height: f64) -> Self {
        Self {
            height: Some(height),
        }
    }
}

#[derive(Debug)]
struct RangeState {
    name: String,
    origin: CellRef,
    orientation: Orientation,
    /// Current row relative to `origin`; `None` until the first row starts.
    row: Option<u32>,
    /// Next column relative to `origin` on the current row.
    col: u32,
    /// Absolute bounds of every cell printed here, nested ranges included.
    written: Option<Range>,
    range_style: Style,
    style: Style,
    error: Option<LayoutError>,
}

impl RangeState {
    fn new(name: &str, origin: CellRef, orientation: Orientation, style: Style) -> Self {
        Self {
            name: name.to_string(),
            origin,
            orientation,
            row: None,
            col: 0,
            written: None,
            range_style: style.clone(),
            style,
            error: None,
        }
    }

    fn current_row(&self) -> u32 {
        self.row.unwrap_or(0)
    }

    fn next_row(&mut self) {
        self.row = Some(self.row.map_or(0, |row| row + 1));
        self.col = 0;
    }

    fn relative(&self, rows: u32, cols: u32) -> Result<CellRef, LayoutError> {
        self.origin
            .offset(rows, cols)
            .ok_or_else(|| LayoutError::CellOutOfBounds {
                row: u64::from(self.origin.row) + u64::from(rows),
                col: u64::from(self.origin.col) + u64::from(cols),
            })
    }

    fn next_cell(&self) -> Result<CellRef, LayoutError> {
        self.relative(self.current_row(), self.col)
    }

    fn child_origin(&self) -> Result<CellRef, LayoutError> {
        match self.orientation {
            Orientation::TopToBottom => {
                let below = self
                    .written
                    .map_or(0, |w| w.end.row - self.origin.row + 1);
                self.relative(below.max(self.current_row()), 0)
            }
            Orientation::LeftToRight => {
                let right = self
                    .written
                    .map_or(0, |w| w.end.col - self.origin.col + 1);
                self.relative(self.current_row(), right.max(self.col))
            }
        }
    }

    fn cover(&mut self, range: Range) {
        self.written = Some(match self.written {
            Some(written) => written.union(range),
            None => range,
        });
    }

    fn mark(&mut self, cell: CellRef) {
        self.cover(Range::single(cell));
        self.row = Some(self.current_row());
        self.col += 1;
    }

    /// Fold a completed child into this range and move the cursor past it.
    fn absorb(&mut self, child: Extent) {
        let Some(range) = child.range() else {
            return;
        };
        self.cover(range);
        self.col = range.end.col - self.origin.col + 1;
        self.row = Some(match self.orientation {
            Orientation::TopToBottom => range.end.row - self.origin.row,
            Orientation::LeftToRight => self.current_row(),
        });
    }

    fn extent(&self) -> Extent {
        match self.written {
            Some(range) => Extent::from_range(range),
            None => Extent::empty_at(self.origin),
        }
    }

    /// Keep the first failure; later ones are usually consequences of it.
    fn latch(&mut self, err: LayoutError) {
        if self.error.is_none() {
            debug!("range {} failed: {err}", self.name);
            self.error = Some(err);
        }
    }

    fn record(&mut self, result: Result<(), LayoutError>) {
        if let Err(err) = result {
            self.latch(err);
        }
    }
}

/// Prints cells into a rectangular region of a [`CellSink`] using relative
/// coordinates.
///
/// Printing calls chain and never fail individually. The first sink error is
/// kept and returned by [`WorksheetRangePrinter::complete`]. A nested printer
/// dropped without `complete` still reports its extent, and any error, to its
/// parent.
pub struct WorksheetRangePrinter<'a> {
    sink: &'a mut dyn CellSink,
    parent: Option<&'a mut RangeState>,
    state: RangeState,
    completed: bool,
}

impl<'a> WorksheetRangePrinter<'a> {
    /// Root printer anchored at `A1`.
    pub fn new(sink: &'a mut dyn CellSink, orientation: Orientation) -> Self {
        Self::at(sink, CellRef::new(0, 0), orientation)
    }

    /// Root printer anchored at `origin`.
    pub fn at(sink: &'a mut dyn CellSink, origin: CellRef, orientation: Orientation) -> Self {
        Self {
            sink,
            parent: None,
            state: RangeState::new("worksheet", origin, orientation, Style::default()),
            completed: false,
        }
    }

    /// Open a child range after everything printed so far. The child inherits
    /// the current style.
    pub fn create_nested_range(
        &mut self,
        name: &str,
        orientation: Orientation,
    ) -> WorksheetRangePrinter<'_> {
        let state = match self.state.child_origin() {
            Ok(origin) => RangeState::new(name, origin, orientation, self.state.style.clone()),
            Err(err) => {
                let mut state =
                    RangeState::new(name, self.state.origin, orientation, self.state.style.clone());
                state.latch(err);
                state
            }
        };
        trace!(
            "range {} opens {} at {}",
            self.state.name,
            name,
            state.origin
        );
        WorksheetRangePrinter {
            sink: &mut *self.sink,
            parent: Some(&mut self.state),
            state,
            completed: false,
        }
    }

    pub fn origin(&self) -> CellRef {
        self.state.origin
    }

    /// Absolute address the next [`add_cell`](Self::add_cell) writes to.
    pub fn next_cell(&self) -> Result<CellRef, LayoutError> {
        self.state.next_cell()
    }

    /// Everything printed so far, nested ranges included.
    pub fn extent(&self) -> Extent {
        self.state.extent()
    }

    pub fn next_row(&mut self, options: RowOptions) -> &mut Self {
        self.state.next_row();
        if let Some(height) = options.height {
            let result = self
                .state
                .next_cell()
                .and_then(|cell| self.sink.set_row_height(cell.row, height));
            self.state.record(result);
        }
        self
    }

    /// Print `content` in the next column of the current row. `style` is
    /// layered over the range's current style.
    pub fn add_cell(&mut self, content: impl Into<CellContent>, style: Option<&Style>) -> &mut Self {
        if self.state.error.is_some() {
            return self;
        }
        let content = content.into();
        match self.state.next_cell() {
            Ok(cell) => {
                let style = self.state.style.merged_with(style);
                let result = self.sink.write_cell(cell, &content, &style);
                self.state.mark(cell);
                self.state.record(result);
            }
            Err(err) => self.state.latch(err),
        }
        self
    }

    pub fn add_blank_cell(&mut self) -> &mut Self {
        self.add_cell(CellContent::EMPTY, None)
    }

    pub fn add_blank_cells(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.add_blank_cell();
        }
        self
    }

    /// Start a styled run of cells; cells printed until
    /// [`range_complete`](Self::range_complete) get `style` as their base.
    pub fn create_range(&mut self, name: &str, style: Option<&Style>) -> &mut Self {
        trace!("range {} starts styled run {name}", self.state.name);
        self.state.style = self.state.range_style.merged_with(style);
        self
    }

    pub fn range_complete(&mut self) -> &mut Self {
        self.state.style = self.state.range_style.clone();
        self
    }

    /// Width of the column the next cell lands in.
    pub fn set_column_width(&mut self, width: f64) -> &mut Self {
        let result = self
            .state
            .next_cell()
            .and_then(|cell| self.sink.set_column_width(cell.col, width));
        self.state.record(result);
        self
    }

    /// Finish this range: report its extent to the parent and surface the
    /// first error seen while printing.
    pub fn complete(mut self) -> Result<Extent, LayoutError> {
        self.completed = true;
        let extent = self.state.extent();
        if let Some(parent) = self.parent.as_deref_mut() {
            parent.absorb(extent);
        }
        match self.state.error.take() {
            Some(err) => Err(err),
            None => Ok(extent),
        }
    }
}

impl Drop for WorksheetRangePrinter<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let extent = self.state.extent();
        if let Some(parent) = self.parent.as_deref_mut() {
            parent.absorb(extent);
            if let Some(err) = self.state.error.take() {
                parent.latch(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySheet;
    use crate::value::CellValue;

    #[test]
    fn rows_and_cells_are_relative_to_the_origin() {
        let mut sheet = MemorySheet::new();
        let mut printer =
            WorksheetRangePrinter::at(&mut sheet, CellRef::new(2, 1), Orientation::TopToBottom);
        printer.add_cell("a", None).add_cell(1.0, None);
        printer.next_row(RowOptions::default()).add_cell("b", None);
        let extent = printer.complete().unwrap();

        assert_eq!(extent, Extent::from_a1("B3:C4").unwrap());
        assert_eq!(sheet.value_a1("B3"), CellValue::from("a"));
        assert_eq!(sheet.value_a1("C3"), CellValue::Number(1.0));
        assert_eq!(sheet.value_a1("B4"), CellValue::from("b"));
    }

    #[test]
    fn left_to_right_children_sit_side_by_side() {
        let mut sheet = MemorySheet::new();
        let mut root = WorksheetRangePrinter::new(&mut sheet, Orientation::TopToBottom);
        root.add_cell("title", None);
        {
            let mut table = root.create_nested_range("table", Orientation::LeftToRight);
            let mut origins = Vec::new();
            for name in ["first", "second"] {
                let mut column = table.create_nested_range(name, Orientation::TopToBottom);
                origins.push(column.origin());
                column.add_cell(name, None);
                column.next_row(RowOptions::default()).add_cell(1.0, None);
                column.complete().unwrap();
            }
            assert_eq!(origins, [CellRef::new(1, 0), CellRef::new(1, 1)]);
            assert_eq!(table.complete().unwrap(), Extent::from_a1("A2:B3").unwrap());
        }
        root.next_row(RowOptions::default()).add_cell("footer", None);
        root.complete().unwrap();

        assert_eq!(sheet.value_a1("A2"), CellValue::from("first"));
        assert_eq!(sheet.value_a1("B2"), CellValue::from("second"));
        assert_eq!(sheet.value_a1("B3"), CellValue::Number(1.0));
        assert_eq!(sheet.value_a1("A4"), CellValue::from("footer"));
    }

    #[test]
    fn dropped_child_still_reports_its_extent() {
        let mut sheet = MemorySheet::new();
        let mut root = WorksheetRangePrinter::new(&mut sheet, Orientation::TopToBottom);
        {
            let mut child = root.create_nested_range("child", Orientation::TopToBottom);
            child.add_cell("x", None);
        }
        assert_eq!(root.extent(), Extent::from_a1("A1").unwrap());
        root.next_row(RowOptions::default()).add_cell("y", None);
        root.complete().unwrap();
        assert_eq!(sheet.value_a1("A2"), CellValue::from("y"));
    }

    #[test]
    fn empty_child_does_not_move_the_cursor() {
        let mut sheet = MemorySheet::new();
        let mut root = WorksheetRangePrinter::new(&mut sheet, Orientation::TopToBottom);
        root.add_cell("header", None);
        let empty = root
            .create_nested_range("data", Orientation::TopToBottom)
            .complete()
            .unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.rows().start, 1);
        root.next_row(RowOptions::default()).add_cell("after", None);
        root.complete().unwrap();
        assert_eq!(sheet.value_a1("A2"), CellValue::from("after"));
    }

    #[test]
    fn styled_runs_layer_over_the_range_style() {
        let bold = Style {
            font: Some(crate::style::Font {
                bold: true,
                ..Default::default()
            }),
            ..Style::default()
        };
        let mut sheet = MemorySheet::new();
        let mut root = WorksheetRangePrinter::new(&mut sheet, Orientation::TopToBottom);
        root.create_range("banner", Some(&bold))
            .add_cell("in", None)
            .range_complete()
            .add_cell("out", None);
        root.complete().unwrap();

        assert_eq!(sheet.cell_a1("A1").unwrap().style, bold);
        assert!(sheet.cell_a1("B1").unwrap().style.is_default());
    }

    #[test]
    fn row_heights_and_column_widths_reach_the_sink() {
        let mut sheet = MemorySheet::new();
        let mut root = WorksheetRangePrinter::at(&mut sheet, CellRef::new(0, 3), Orientation::TopToBottom);
        root.set_column_width(20.0);
        root.next_row(RowOptions::with_height(30.0)).add_cell("x", None);
        root.complete().unwrap();
        assert_eq!(sheet.column_width(3), Some(20.0));
        assert_eq!(sheet.row_height(0), Some(30.0));
    }

    #[test]
    fn printing_past_the_last_column_is_reported_on_complete() {
        let mut sheet = MemorySheet::new();
        let mut root = WorksheetRangePrinter::at(
            &mut sheet,
            CellRef::new(0, crate::address::EXCEL_MAX_COLS - 1),
            Orientation::TopToBottom,
        );
        root.add_cell("last", None).add_cell("overflow", None);
        let err = root.complete().unwrap_err();
        assert!(matches!(err, LayoutError::CellOutOfBounds { row: 0, col: 16_384 }));
    }
}
