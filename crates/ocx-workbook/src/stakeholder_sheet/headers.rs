use chrono::NaiveDate;

use crate::printer::{RowOptions, WorksheetRangePrinter};

use super::styles::SheetStyles;

/// Stakeholder and group columns to the left of the stock columns.
const LEADING_COLUMNS: usize = 2;
/// Value and percent columns of the three roll-ups.
const ROLLUP_COLUMNS: usize = 6;

pub const REPORT_TITLE: &str = "Capitalization by Stakeholder";

/// The banner above the holdings table: issuer name, report title and, when
/// known, the effective date, followed by one spacer row.
pub struct CapitalizationByStakeholderHeader<'s> {
    styles: &'s SheetStyles,
}

impl<'s> CapitalizationByStakeholderHeader<'s> {
    pub fn new(styles: &'s SheetStyles) -> Self {
        Self { styles }
    }

    /// Number of columns the banner spans for a table with
    /// `stock_column_count` class and plan columns.
    pub fn width(stock_column_count: usize) -> usize {
        LEADING_COLUMNS + stock_column_count + ROLLUP_COLUMNS
    }

    pub fn write(
        &self,
        sheet: &mut WorksheetRangePrinter<'_>,
        issuer_name: &str,
        as_of: Option<NaiveDate>,
        stock_column_count: usize,
    ) {
        let styles = self.styles;
        let width = Self::width(stock_column_count);

        sheet
            .next_row(RowOptions::with_height(styles.banner_row_height))
            .create_range("banner", Some(&styles.banner))
            .add_cell(issuer_name, Some(&styles.banner_title))
            .add_blank_cells(width - 1);

        sheet
            .next_row(RowOptions::default())
            .add_cell(REPORT_TITLE, Some(&styles.banner_subtitle))
            .add_blank_cells(width - 1);

        if let Some(date) = as_of {
            sheet
                .next_row(RowOptions::default())
                .add_cell("As of", None)
                .add_cell(date, Some(&styles.date))
                .add_blank_cells(width - 2);
        }

        sheet.range_complete();
        sheet.next_row(RowOptions::default()).add_blank_cell();
    }
}
