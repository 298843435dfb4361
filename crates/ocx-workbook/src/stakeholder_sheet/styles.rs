use crate::settings::ReportSettings;
use crate::style::{
    Alignment, Border, BorderStyle, Fill, Font, HorizontalAlignment, Style, VerticalAlignment,
};

/// Resolved styles and dimensions for the stakeholder sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetStyles {
    pub banner: Style,
    pub banner_title: Style,
    pub banner_subtitle: Style,
    pub date: Style,
    pub column_header: Style,
    pub label: Style,
    pub shares: Style,
    pub percent: Style,
    pub total_label: Style,
    pub total_shares: Style,
    pub total_percent: Style,
    pub banner_row_height: f64,
    pub header_row_height: f64,
    pub stakeholder_column_width: f64,
    pub holdings_column_width: f64,
}

impl SheetStyles {
    pub fn from_settings(settings: &ReportSettings) -> Self {
        let banner = Style {
            fill: Some(Fill {
                background: Some(settings.banner_background),
            }),
            font: Some(Font {
                color: Some(settings.banner_font_color),
                ..Font::default()
            }),
            ..Style::default()
        };
        let banner_title = Style {
            font: Some(Font {
                bold: true,
                size_100pt: Some(1600),
                ..Font::default()
            }),
            alignment: Some(Alignment {
                vertical: Some(VerticalAlignment::Center),
                ..Alignment::default()
            }),
            ..Style::default()
        };
        let banner_subtitle = Style {
            font: Some(Font {
                size_100pt: Some(1200),
                ..Font::default()
            }),
            ..Style::default()
        };
        let column_header = Style {
            font: Some(Font {
                bold: true,
                ..Font::default()
            }),
            fill: Some(Fill {
                background: Some(settings.header_background),
            }),
            border: Some(Border {
                bottom: BorderStyle::Thin,
                ..Border::default()
            }),
            alignment: Some(Alignment {
                horizontal: Some(HorizontalAlignment::Center),
                vertical: Some(VerticalAlignment::Bottom),
                wrap_text: true,
            }),
            ..Style::default()
        };
        let shares = Style {
            number_format: Some(settings.share_number_format.clone()),
            ..Style::default()
        };
        let percent = Style {
            number_format: Some(settings.percent_number_format.clone()),
            ..Style::default()
        };
        let total_row = Style {
            font: Some(Font {
                bold: true,
                ..Font::default()
            }),
            border: Some(Border {
                top: BorderStyle::Thin,
                bottom: BorderStyle::Medium,
                ..Border::default()
            }),
            ..Style::default()
        };

        Self {
            banner,
            banner_title,
            banner_subtitle,
            date: Style {
                number_format: Some(settings.date_number_format.clone()),
                alignment: Some(Alignment {
                    horizontal: Some(HorizontalAlignment::Left),
                    ..Alignment::default()
                }),
                ..Style::default()
            },
            column_header,
            label: Style::default(),
            total_shares: total_row.merged_with(Some(&shares)),
            total_percent: total_row.merged_with(Some(&percent)),
            total_label: total_row,
            shares,
            percent,
            banner_row_height: settings.banner_row_height,
            header_row_height: settings.header_row_height,
            stakeholder_column_width: settings.stakeholder_column_width,
            holdings_column_width: settings.holdings_column_width,
        }
    }
}

impl Default for SheetStyles {
    fn default() -> Self {
        Self::from_settings(&ReportSettings::default())
    }
}
