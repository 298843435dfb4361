//! Column writers for the holdings table.
//!
//! Every column is a top-to-bottom range with the same row plan:
//!
//! ```text
//! header
//! one row per stakeholder      <- the column's data extent
//! (blank)
//! options remaining for issuance
//! (blank)
//! total
//! ```
//!
//! so columns written side by side line up without knowing their absolute
//! position.

use ocx_model::{CapTable, Stakeholder, StockClass, StockPlan};

use crate::address::{CellRef, Range};
use crate::error::LayoutError;
use crate::extents::{Extent, ExtentsCollection, Span};
use crate::formula;
use crate::printer::{Orientation, RowOptions, WorksheetRangePrinter};
use crate::style::Style;
use crate::value::CellContent;

use super::styles::SheetStyles;

pub const OPTIONS_REMAINING_LABEL: &str = "Options Remaining for Issuance";
pub const TOTAL_LABEL: &str = "Total";

/// Where the parts of a written column ended up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnExtents {
    pub header: CellRef,
    /// Stakeholder rows. Empty, but anchored below the header, when there are
    /// no stakeholders.
    pub data: Extent,
    pub options: CellRef,
    pub total: CellRef,
}

/// A value column and the percent-of-total column next to it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RollupExtents {
    pub value: ColumnExtents,
    pub percent: ColumnExtents,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ColumnKind {
    Label,
    Shares,
    Percent,
}

impl SheetStyles {
    fn data_style(&self, kind: ColumnKind) -> &Style {
        match kind {
            ColumnKind::Label => &self.label,
            ColumnKind::Shares => &self.shares,
            ColumnKind::Percent => &self.percent,
        }
    }

    fn total_style(&self, kind: ColumnKind) -> &Style {
        match kind {
            ColumnKind::Label => &self.total_label,
            ColumnKind::Shares => &self.total_shares,
            ColumnKind::Percent => &self.total_percent,
        }
    }

    fn column_width(&self, kind: ColumnKind) -> f64 {
        match kind {
            ColumnKind::Label => self.stakeholder_column_width,
            ColumnKind::Shares | ColumnKind::Percent => self.holdings_column_width,
        }
    }
}

/// Print one column with the fixed row plan.
///
/// `options` receives the data extent and the options cell itself; `total`
/// receives the data extent and the options cell.
#[allow(clippy::too_many_arguments)]
fn write_column<R, O, T>(
    table: &mut WorksheetRangePrinter<'_>,
    styles: &SheetStyles,
    kind: ColumnKind,
    name: &str,
    header: &str,
    rows: R,
    options: O,
    total: T,
) -> Result<ColumnExtents, LayoutError>
where
    R: IntoIterator<Item = CellContent>,
    O: FnOnce(&Extent, CellRef) -> CellContent,
    T: FnOnce(&Extent, CellRef) -> CellContent,
{
    let data_style = styles.data_style(kind);
    let mut column = table.create_nested_range(name, Orientation::TopToBottom);
    column.set_column_width(styles.column_width(kind));

    column.next_row(RowOptions::with_height(styles.header_row_height));
    let header_cell = column.next_cell()?;
    column.add_cell(header, Some(&styles.column_header));

    let data = {
        let mut data = column.create_nested_range("data", Orientation::TopToBottom);
        for content in rows {
            data.next_row(RowOptions::default())
                .add_cell(content, Some(data_style));
        }
        data.complete()?
    };
    // With no rows the data range still owns this column; roll-ups read the
    // options row through it.
    let data = if data.cols().is_empty() {
        Extent::new(data.rows(), Span::new(header_cell.col, 1))
    } else {
        data
    };

    column.next_row(RowOptions::default()).add_blank_cell();
    column.next_row(RowOptions::default());
    let options_cell = column.next_cell()?;
    column.add_cell(options(&data, options_cell), Some(data_style));

    column.next_row(RowOptions::default()).add_blank_cell();
    column.next_row(RowOptions::default());
    let total_cell = column.next_cell()?;
    column.add_cell(total(&data, options_cell), Some(styles.total_style(kind)));
    column.complete()?;

    Ok(ColumnExtents {
        header: header_cell,
        data,
        options: options_cell,
        total: total_cell,
    })
}

fn sum_or_zero(data: &Extent) -> CellContent {
    match data.range() {
        Some(range) => CellContent::formula(formula::sum_range(range)),
        None => CellContent::from(0.0),
    }
}

fn sum_refs_or_zero(refs: Vec<Range>) -> CellContent {
    if refs.is_empty() {
        CellContent::from(0.0)
    } else {
        CellContent::formula(formula::sum_of(refs))
    }
}

fn blank(_: &Extent, _: CellRef) -> CellContent {
    CellContent::EMPTY
}

/// `FOUNDER` -> `Founder`, `BOARD_MEMBER` -> `Board Member`.
fn relationship_label(relationship: &str) -> String {
    relationship
        .split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Heading of an outstanding column. Preferred classes show their conversion
/// ratio to four places.
pub fn outstanding_heading(stock_class: &StockClass, ratio: f64) -> String {
    if stock_class.is_preferred {
        format!("{}\n(outstanding) ({ratio:.4})", stock_class.display_name)
    } else {
        stock_class.display_name.clone()
    }
}

pub fn as_converted_heading(stock_class: &StockClass) -> String {
    format!("{}\n(as converted)", stock_class.display_name)
}

/// Stakeholder names, plus the labels of the options and total rows.
pub struct StakeholderColumn<'s> {
    styles: &'s SheetStyles,
}

impl<'s> StakeholderColumn<'s> {
    pub fn new(styles: &'s SheetStyles) -> Self {
        Self { styles }
    }

    pub fn write(
        &self,
        table: &mut WorksheetRangePrinter<'_>,
        stakeholders: &[Stakeholder],
    ) -> Result<ColumnExtents, LayoutError> {
        write_column(
            table,
            self.styles,
            ColumnKind::Label,
            "stakeholder",
            "Stakeholder",
            stakeholders
                .iter()
                .map(|stakeholder| CellContent::from(stakeholder.display_name.as_str())),
            |_, _| CellContent::from(OPTIONS_REMAINING_LABEL),
            |_, _| CellContent::from(TOTAL_LABEL),
        )
    }
}

/// Each stakeholder's relationship to the issuer.
pub struct StakeholderGroupColumn<'s> {
    styles: &'s SheetStyles,
}

impl<'s> StakeholderGroupColumn<'s> {
    pub fn new(styles: &'s SheetStyles) -> Self {
        Self { styles }
    }

    pub fn write(
        &self,
        table: &mut WorksheetRangePrinter<'_>,
        stakeholders: &[Stakeholder],
    ) -> Result<ColumnExtents, LayoutError> {
        write_column(
            table,
            self.styles,
            ColumnKind::Label,
            "stakeholder group",
            "Stakeholder Group",
            stakeholders.iter().map(|stakeholder| {
                stakeholder
                    .relationship
                    .as_deref()
                    .map_or(CellContent::EMPTY, |r| relationship_label(r).into())
            }),
            blank,
            blank,
        )
    }
}

/// Raw outstanding holdings of one stock class.
pub struct StockClassOutstandingColumn<'s> {
    styles: &'s SheetStyles,
}

impl<'s> StockClassOutstandingColumn<'s> {
    pub fn new(styles: &'s SheetStyles) -> Self {
        Self { styles }
    }

    pub fn write<M>(
        &self,
        table: &mut WorksheetRangePrinter<'_>,
        stock_class: &StockClass,
        model: &M,
    ) -> Result<ColumnExtents, LayoutError>
    where
        M: CapTable + ?Sized,
    {
        let ratio = model.stock_class_conversion_ratio(stock_class);
        write_column(
            table,
            self.styles,
            ColumnKind::Shares,
            &stock_class.id,
            &outstanding_heading(stock_class, ratio),
            model.stakeholders().iter().map(|stakeholder| {
                CellContent::from(model.stakeholder_stock_holdings(stakeholder, stock_class))
            }),
            blank,
            |data, _| sum_or_zero(data),
        )
    }
}

/// Outstanding holdings converted to common, one formula per stakeholder row
/// of the matching outstanding column.
pub struct StockClassAsConvertedColumn<'s> {
    styles: &'s SheetStyles,
}

impl<'s> StockClassAsConvertedColumn<'s> {
    pub fn new(styles: &'s SheetStyles) -> Self {
        Self { styles }
    }

    pub fn write<M>(
        &self,
        table: &mut WorksheetRangePrinter<'_>,
        stock_class: &StockClass,
        outstanding: &ColumnExtents,
        model: &M,
    ) -> Result<ColumnExtents, LayoutError>
    where
        M: CapTable + ?Sized,
    {
        let ratio = model.stock_class_conversion_ratio(stock_class);
        let source = outstanding.data;
        write_column(
            table,
            self.styles,
            ColumnKind::Shares,
            &format!("{} as converted", stock_class.id),
            &as_converted_heading(stock_class),
            (0..source.rows().len)
                .filter_map(|offset| source.cell_at(offset))
                .map(|cell| {
                    CellContent::formula(formula::as_converted(
                        cell,
                        ratio,
                        stock_class.rounding_type,
                    ))
                }),
            blank,
            |data, _| sum_or_zero(data),
        )
    }
}

/// Per-stakeholder holdings of one stock plan, with the plan's unissued
/// reserve on the options row.
pub struct StockPlanColumn<'s> {
    styles: &'s SheetStyles,
}

impl<'s> StockPlanColumn<'s> {
    pub fn new(styles: &'s SheetStyles) -> Self {
        Self { styles }
    }

    pub fn write<M>(
        &self,
        table: &mut WorksheetRangePrinter<'_>,
        stock_plan: &StockPlan,
        model: &M,
    ) -> Result<ColumnExtents, LayoutError>
    where
        M: CapTable + ?Sized,
    {
        write_column(
            table,
            self.styles,
            ColumnKind::Shares,
            &stock_plan.id,
            &stock_plan.plan_name,
            model.stakeholders().iter().map(|stakeholder| {
                CellContent::from(model.stakeholder_stock_plan_holdings(stakeholder, stock_plan))
            }),
            |_, _| CellContent::from(model.options_remaining_for_issuance(stock_plan)),
            |data, _| sum_or_zero(data),
        )
    }
}

struct Rollup<'a> {
    name: &'a str,
    header: &'a str,
    percent_header: &'a str,
    /// Whether the options row is part of the rolled-up quantity.
    include_options: bool,
}

impl Rollup<'_> {
    fn write(
        &self,
        table: &mut WorksheetRangePrinter<'_>,
        styles: &SheetStyles,
        sources: &ExtentsCollection,
    ) -> Result<RollupExtents, LayoutError> {
        let rows = sources.rows().map_or(0, |span| span.len);
        let include_options = self.include_options;

        let value = write_column(
            table,
            styles,
            ColumnKind::Shares,
            self.name,
            self.header,
            (0..rows).map(|offset| sum_refs_or_zero(sources.row_ranges(offset))),
            |_, cell| {
                if include_options {
                    sum_refs_or_zero(sources.ranges_on_row(cell.row))
                } else {
                    CellContent::EMPTY
                }
            },
            |data, options| {
                if include_options {
                    let first = CellRef::new(data.rows().start, options.col);
                    CellContent::formula(formula::sum_range(Range::new(first, options)))
                } else {
                    sum_or_zero(data)
                }
            },
        )?;

        let total = value.total;
        let percent = write_column(
            table,
            styles,
            ColumnKind::Percent,
            &format!("{} %", self.name),
            self.percent_header,
            (0..value.data.rows().len)
                .filter_map(|offset| value.data.cell_at(offset))
                .map(|cell| CellContent::formula(formula::share_of_total(cell, total))),
            |_, _| {
                if include_options {
                    CellContent::formula(formula::share_of_total(value.options, total))
                } else {
                    CellContent::EMPTY
                }
            },
            |_, _| CellContent::formula(formula::share_of_total(total, total)),
        )?;

        Ok(RollupExtents { value, percent })
    }
}

/// Sum of every outstanding column, row by row.
pub struct TotalOutstanding<'s> {
    styles: &'s SheetStyles,
}

impl<'s> TotalOutstanding<'s> {
    pub fn new(styles: &'s SheetStyles) -> Self {
        Self { styles }
    }

    pub fn write(
        &self,
        table: &mut WorksheetRangePrinter<'_>,
        sources: &ExtentsCollection,
    ) -> Result<RollupExtents, LayoutError> {
        Rollup {
            name: "total outstanding",
            header: "Total Stock\n(outstanding)",
            percent_header: "Total Stock %\n(outstanding)",
            include_options: false,
        }
        .write(table, self.styles, sources)
    }
}

/// Sum of the as-converted column of converting classes and the outstanding
/// column of the rest.
pub struct TotalAsConverted<'s> {
    styles: &'s SheetStyles,
}

impl<'s> TotalAsConverted<'s> {
    pub fn new(styles: &'s SheetStyles) -> Self {
        Self { styles }
    }

    pub fn write(
        &self,
        table: &mut WorksheetRangePrinter<'_>,
        sources: &ExtentsCollection,
    ) -> Result<RollupExtents, LayoutError> {
        Rollup {
            name: "total as converted",
            header: "Total Stock\n(as converted)",
            percent_header: "Total Stock %\n(as converted)",
            include_options: false,
        }
        .write(table, self.styles, sources)
    }
}

/// Fully diluted share count: every eligible class column plus every plan
/// column. Its options row sums the plans' unissued reserves and its total
/// includes that row.
pub struct FullyDilutedShares<'s> {
    styles: &'s SheetStyles,
}

impl<'s> FullyDilutedShares<'s> {
    pub fn new(styles: &'s SheetStyles) -> Self {
        Self { styles }
    }

    pub fn write(
        &self,
        table: &mut WorksheetRangePrinter<'_>,
        sources: &ExtentsCollection,
    ) -> Result<RollupExtents, LayoutError> {
        Rollup {
            name: "fully diluted",
            header: "Fully Diluted Shares**",
            percent_header: "Fully Diluted %",
            include_options: true,
        }
        .write(table, self.styles, sources)
    }
}
