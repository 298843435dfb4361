use chrono::NaiveDate;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

/// Errors raised while laying cells out on a worksheet.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("cell at row {row}, column {col} is outside the worksheet")]
    CellOutOfBounds { row: u64, col: u64 },
    #[error("extent {extent} does not cover the rows of its collection ({expected})")]
    MisalignedExtent { extent: String, expected: String },
    #[error("date {0} cannot be stored in a worksheet")]
    DateOutOfRange(NaiveDate),
    #[error("worksheet write failed: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Errors raised while producing a complete report workbook.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("workbook serialization failed: {0}")]
    Xlsx(#[from] XlsxError),
}
