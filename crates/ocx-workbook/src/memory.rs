use std::collections::BTreeMap;

use crate::address::{CellRef, Range};
use crate::cell::Cell;
use crate::error::LayoutError;
use crate::printer::CellSink;
use crate::style::Style;
use crate::value::{CellContent, CellValue};

/// Sparse in-memory worksheet.
///
/// Implements [`CellSink`] so layouts can be rendered and inspected without
/// producing a file. Cells that end up with no value, formula or style are
/// not stored.
#[derive(Clone, Debug, Default)]
pub struct MemorySheet {
    cells: BTreeMap<CellRef, Cell>,
    row_heights: BTreeMap<u32, f64>,
    column_widths: BTreeMap<u32, f64>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&at)
    }

    /// Cell at an A1 reference; `None` for empty cells and unparsable input.
    pub fn cell_a1(&self, a1: &str) -> Option<&Cell> {
        CellRef::from_a1(a1).ok().and_then(|at| self.cell(at))
    }

    pub fn value_a1(&self, a1: &str) -> CellValue {
        self.cell_a1(a1)
            .map(|cell| cell.value.clone())
            .unwrap_or_default()
    }

    /// Formula in display form (`=SUM(B2:B3)`).
    pub fn formula_a1(&self, a1: &str) -> Option<String> {
        self.cell_a1(a1).and_then(Cell::display_formula)
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> + '_ {
        self.cells.iter().map(|(at, cell)| (*at, cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bounding range of all stored cells.
    pub fn used_range(&self) -> Option<Range> {
        self.cells
            .keys()
            .map(|at| Range::single(*at))
            .reduce(Range::union)
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    pub fn column_width(&self, col: u32) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }
}

impl CellSink for MemorySheet {
    fn write_cell(
        &mut self,
        at: CellRef,
        content: &CellContent,
        style: &Style,
    ) -> Result<(), LayoutError> {
        let cell = Cell::new(content, style);
        if cell.is_truly_empty() {
            self.cells.remove(&at);
        } else {
            self.cells.insert(at, cell);
        }
        Ok(())
    }

    fn set_row_height(&mut self, row: u32, height: f64) -> Result<(), LayoutError> {
        self.row_heights.insert(row, height);
        Ok(())
    }

    fn set_column_width(&mut self, col: u32, width: f64) -> Result<(), LayoutError> {
        self.column_widths.insert(col, width);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_unstyled_writes_clear_the_cell() {
        let mut sheet = MemorySheet::new();
        let a1 = CellRef::new(0, 0);
        sheet
            .write_cell(a1, &CellContent::from(5.0), &Style::default())
            .unwrap();
        assert_eq!(sheet.value_a1("A1"), CellValue::Number(5.0));

        sheet
            .write_cell(a1, &CellContent::EMPTY, &Style::default())
            .unwrap();
        assert!(sheet.is_empty());
        assert_eq!(sheet.value_a1("A1"), CellValue::Empty);
    }

    #[test]
    fn formulas_are_reported_in_display_form() {
        let mut sheet = MemorySheet::new();
        sheet
            .write_cell(
                CellRef::new(3, 1),
                &CellContent::formula("=SUM(B2:B3)"),
                &Style::default(),
            )
            .unwrap();
        let cell = sheet.cell_a1("B4").unwrap();
        assert_eq!(cell.formula.as_deref(), Some("SUM(B2:B3)"));
        assert_eq!(sheet.formula_a1("B4").as_deref(), Some("=SUM(B2:B3)"));
        assert_eq!(sheet.used_range(), Some(Range::single(CellRef::new(3, 1))));
        assert_eq!(sheet.cell_a1("not a ref"), None);
    }
}
