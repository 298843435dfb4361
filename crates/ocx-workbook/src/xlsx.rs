use std::collections::HashMap;

use chrono::Datelike;
use log::debug;
use ocx_model::CapTable;
use rust_xlsxwriter::{
    Color as XlsxColor, ExcelDateTime, Format, FormatAlign, FormatBorder, Formula, Workbook,
    Worksheet,
};

use crate::address::CellRef;
use crate::error::{LayoutError, ReportError};
use crate::formula::display_formula_text;
use crate::printer::CellSink;
use crate::settings::ReportSettings;
use crate::stakeholder_sheet::StakeholderSheet;
use crate::style::{BorderStyle, HorizontalAlignment, Style, VerticalAlignment};
use crate::value::{CellContent, CellValue};

/// [`CellSink`] over a `rust_xlsxwriter` worksheet. Formats are built once
/// per distinct [`Style`].
pub struct XlsxSheet<'w> {
    worksheet: &'w mut Worksheet,
    formats: HashMap<Style, Format>,
}

impl<'w> XlsxSheet<'w> {
    pub fn new(worksheet: &'w mut Worksheet) -> Self {
        Self {
            worksheet,
            formats: HashMap::new(),
        }
    }

    fn format_for(&mut self, style: &Style) -> Format {
        self.formats
            .entry(style.clone())
            .or_insert_with(|| to_format(style))
            .clone()
    }
}

fn column_number(at: CellRef) -> Result<u16, LayoutError> {
    u16::try_from(at.col).map_err(|_| LayoutError::CellOutOfBounds {
        row: u64::from(at.row),
        col: u64::from(at.col),
    })
}

impl CellSink for XlsxSheet<'_> {
    fn write_cell(
        &mut self,
        at: CellRef,
        content: &CellContent,
        style: &Style,
    ) -> Result<(), LayoutError> {
        let format = self.format_for(style);
        let (row, col) = (at.row, column_number(at)?);
        let worksheet = &mut *self.worksheet;
        match content {
            CellContent::Value(CellValue::Empty) => {
                worksheet.write_blank(row, col, &format)?;
            }
            CellContent::Value(CellValue::Number(n)) => {
                worksheet.write_number_with_format(row, col, *n, &format)?;
            }
            CellContent::Value(CellValue::String(s)) => {
                worksheet.write_string_with_format(row, col, s, &format)?;
            }
            CellContent::Value(CellValue::Boolean(b)) => {
                worksheet.write_boolean_with_format(row, col, *b, &format)?;
            }
            CellContent::Value(CellValue::Date(date)) => {
                let year =
                    u16::try_from(date.year()).map_err(|_| LayoutError::DateOutOfRange(*date))?;
                // Month and day always fit in a u8.
                let datetime = ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8)?;
                worksheet.write_datetime_with_format(row, col, &datetime, &format)?;
            }
            CellContent::Formula(text) => {
                let formula = Formula::new(display_formula_text(text));
                worksheet.write_formula_with_format(row, col, formula, &format)?;
            }
        }
        Ok(())
    }

    fn set_row_height(&mut self, row: u32, height: f64) -> Result<(), LayoutError> {
        self.worksheet.set_row_height(row, height)?;
        Ok(())
    }

    fn set_column_width(&mut self, col: u32, width: f64) -> Result<(), LayoutError> {
        let col = column_number(CellRef::new(0, col))?;
        self.worksheet.set_column_width(col, width)?;
        Ok(())
    }
}

fn to_border(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::None => FormatBorder::None,
        BorderStyle::Thin => FormatBorder::Thin,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::Thick => FormatBorder::Thick,
    }
}

fn to_format(style: &Style) -> Format {
    let mut format = Format::new();

    if let Some(font) = &style.font {
        if let Some(name) = &font.name {
            format = format.set_font_name(name);
        }
        if let Some(size) = font.size_100pt {
            format = format.set_font_size(f64::from(size) / 100.0);
        }
        if font.bold {
            format = format.set_bold();
        }
        if font.italic {
            format = format.set_italic();
        }
        if let Some(color) = font.color {
            format = format.set_font_color(XlsxColor::RGB(color.rgb()));
        }
    }

    if let Some(background) = style.fill.as_ref().and_then(|fill| fill.background) {
        format = format.set_background_color(XlsxColor::RGB(background.rgb()));
    }

    if let Some(border) = &style.border {
        format = format
            .set_border_top(to_border(border.top))
            .set_border_bottom(to_border(border.bottom))
            .set_border_left(to_border(border.left))
            .set_border_right(to_border(border.right));
        if let Some(color) = border.color {
            format = format.set_border_color(XlsxColor::RGB(color.rgb()));
        }
    }

    if let Some(alignment) = &style.alignment {
        if let Some(horizontal) = alignment.horizontal {
            format = format.set_align(match horizontal {
                HorizontalAlignment::General => FormatAlign::General,
                HorizontalAlignment::Left => FormatAlign::Left,
                HorizontalAlignment::Center => FormatAlign::Center,
                HorizontalAlignment::Right => FormatAlign::Right,
            });
        }
        if let Some(vertical) = alignment.vertical {
            format = format.set_align(match vertical {
                VerticalAlignment::Top => FormatAlign::Top,
                VerticalAlignment::Center => FormatAlign::VerticalCenter,
                VerticalAlignment::Bottom => FormatAlign::Bottom,
            });
        }
        if alignment.wrap_text {
            format = format.set_text_wrap();
        }
    }

    if let Some(number_format) = &style.number_format {
        format = format.set_num_format(number_format);
    }

    format
}

/// Render the stakeholder report for `model` into a new workbook and return
/// the `.xlsx` bytes.
pub fn write_workbook<M>(model: &M, settings: &ReportSettings) -> Result<Vec<u8>, ReportError>
where
    M: CapTable + ?Sized,
{
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&settings.sheet_name)?;

    let extent = {
        let mut sheet = XlsxSheet::new(worksheet);
        StakeholderSheet::new(settings).write(&mut sheet, model)?
    };
    debug!("wrote sheet {:?} ({extent})", settings.sheet_name);

    Ok(workbook.save_to_buffer()?)
}
