//! Spreadsheet output for OCX cap tables.
//!
//! Layout components print through a [`WorksheetRangePrinter`] in relative
//! coordinates; a [`CellSink`] receives the absolute writes. [`MemorySheet`]
//! keeps them in memory, [`XlsxSheet`] forwards them to `rust_xlsxwriter`.

pub mod address;
mod cell;
mod error;
pub mod extents;
pub mod formula;
mod memory;
pub mod printer;
mod settings;
pub mod stakeholder_sheet;
pub mod style;
mod value;
mod xlsx;

pub use address::{CellRef, Range};
pub use cell::Cell;
pub use error::{LayoutError, ReportError};
pub use extents::{Extent, ExtentsCollection, Span};
pub use memory::MemorySheet;
pub use printer::{CellSink, Orientation, RowOptions, WorksheetRangePrinter};
pub use settings::ReportSettings;
pub use stakeholder_sheet::StakeholderSheet;
pub use style::Style;
pub use value::{CellContent, CellValue};
pub use xlsx::{write_workbook, XlsxSheet};
