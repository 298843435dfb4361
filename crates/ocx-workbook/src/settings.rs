use serde::{Deserialize, Serialize};

use crate::style::Color;

/// Presentation settings for the stakeholder report.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Name of the worksheet tab.
    pub sheet_name: String,
    /// Height, in points, of the issuer name row.
    pub banner_row_height: f64,
    /// Height, in points, of the column header row. Headers wrap onto two or
    /// three lines.
    pub header_row_height: f64,
    pub stakeholder_column_width: f64,
    pub holdings_column_width: f64,
    /// Excel number format for share counts.
    pub share_number_format: String,
    /// Excel number format for percentage columns.
    pub percent_number_format: String,
    /// Excel number format for the "As of" date.
    pub date_number_format: String,
    pub banner_background: Color,
    pub banner_font_color: Color,
    pub header_background: Color,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            sheet_name: "Stakeholder Ledger".to_string(),
            banner_row_height: 30.0,
            header_row_height: 48.0,
            stakeholder_column_width: 32.0,
            holdings_column_width: 18.0,
            share_number_format: "#,##0".to_string(),
            percent_number_format: "0.00%".to_string(),
            date_number_format: "mmmm d, yyyy".to_string(),
            banner_background: Color::new_argb(0xFF1F3864),
            banner_font_color: Color::white(),
            header_background: Color::new_argb(0xFFD9E1F2),
        }
    }
}

impl ReportSettings {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings =
            ReportSettings::from_json_str(r##"{"sheet_name": "Cap Table", "banner_background": "#FF000000"}"##)
                .unwrap();
        assert_eq!(settings.sheet_name, "Cap Table");
        assert_eq!(settings.banner_background, Color::new_argb(0xFF000000));
        assert_eq!(settings.share_number_format, "#,##0");
        assert_eq!(ReportSettings::from_json_str("{}").unwrap(), ReportSettings::default());
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(ReportSettings::from_json_str(r#"{"banner_row_height": "tall"}"#).is_err());
    }
}
