//! The "capitalization by stakeholder" worksheet.

mod headers;
mod holdings;
mod styles;

use log::debug;
use ocx_model::CapTable;

use crate::error::LayoutError;
use crate::extents::{Extent, ExtentsCollection};
use crate::printer::{CellSink, Orientation, WorksheetRangePrinter};
use crate::settings::ReportSettings;

pub use headers::{CapitalizationByStakeholderHeader, REPORT_TITLE};
pub use holdings::{
    as_converted_heading, outstanding_heading, ColumnExtents, FullyDilutedShares, RollupExtents,
    StakeholderColumn, StakeholderGroupColumn, StockClassAsConvertedColumn,
    StockClassOutstandingColumn, StockPlanColumn, TotalAsConverted, TotalOutstanding,
    OPTIONS_REMAINING_LABEL, TOTAL_LABEL,
};
pub use styles::SheetStyles;

/// Composes the banner and the holdings table for one cap table.
pub struct StakeholderSheet {
    styles: SheetStyles,
}

impl StakeholderSheet {
    pub fn new(settings: &ReportSettings) -> Self {
        Self::with_styles(SheetStyles::from_settings(settings))
    }

    pub fn with_styles(styles: SheetStyles) -> Self {
        Self { styles }
    }

    pub fn styles(&self) -> &SheetStyles {
        &self.styles
    }

    /// Render the sheet from `A1` and return the extent it covers.
    pub fn write<M>(&self, sink: &mut dyn CellSink, model: &M) -> Result<Extent, LayoutError>
    where
        M: CapTable + ?Sized,
    {
        let mut sheet = WorksheetRangePrinter::new(sink, Orientation::TopToBottom);

        CapitalizationByStakeholderHeader::new(&self.styles).write(
            &mut sheet,
            model.issuer_name(),
            model.as_of_date(),
            stock_column_count(model),
        );
        self.write_holdings_table(&mut sheet, model)?;

        let extent = sheet.complete()?;
        debug!(
            "stakeholder sheet for {} covers {extent}",
            model.issuer_name()
        );
        Ok(extent)
    }

    fn write_holdings_table<M>(
        &self,
        sheet: &mut WorksheetRangePrinter<'_>,
        model: &M,
    ) -> Result<Extent, LayoutError>
    where
        M: CapTable + ?Sized,
    {
        let styles = &self.styles;
        let mut table = sheet.create_nested_range("holdings", Orientation::LeftToRight);

        let stakeholders =
            StakeholderColumn::new(styles).write(&mut table, model.stakeholders())?;
        StakeholderGroupColumn::new(styles).write(&mut table, model.stakeholders())?;

        let rows = stakeholders.data.rows();
        let mut outstanding = ExtentsCollection::spanning(rows);
        let mut as_converted = ExtentsCollection::spanning(rows);
        let mut fully_diluted = ExtentsCollection::spanning(rows);

        for stock_class in model.stock_classes() {
            let outstanding_column =
                StockClassOutstandingColumn::new(styles).write(&mut table, stock_class, model)?;
            outstanding.push(outstanding_column.data)?;

            // A converting class counts once, at its converted size.
            let counted = if model.stock_class_converts(stock_class) {
                StockClassAsConvertedColumn::new(styles)
                    .write(&mut table, stock_class, &outstanding_column, model)?
                    .data
            } else {
                outstanding_column.data
            };
            as_converted.push(counted)?;
            fully_diluted.push(counted)?;
        }

        for stock_plan in model.stock_plans() {
            let plan_column = StockPlanColumn::new(styles).write(&mut table, stock_plan, model)?;
            fully_diluted.push(plan_column.data)?;
        }

        TotalOutstanding::new(styles).write(&mut table, &outstanding)?;
        TotalAsConverted::new(styles).write(&mut table, &as_converted)?;
        FullyDilutedShares::new(styles).write(&mut table, &fully_diluted)?;

        table.complete()
    }
}

/// Class columns (one or two each) plus plan columns.
fn stock_column_count<M>(model: &M) -> usize
where
    M: CapTable + ?Sized,
{
    let class_columns: usize = model
        .stock_classes()
        .iter()
        .map(|stock_class| if model.stock_class_converts(stock_class) { 2 } else { 1 })
        .sum();
    class_columns + model.stock_plans().len()
}
