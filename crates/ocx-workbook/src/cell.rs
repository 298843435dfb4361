use serde::{Deserialize, Serialize};

use crate::formula::display_formula_text;
use crate::style::Style;
use crate::value::{CellContent, CellValue};

/// A cell as held by [`crate::MemorySheet`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub value: CellValue,
    /// Canonical formula text, if the cell contains a formula.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default)]
    pub style: Style,
}

impl Cell {
    pub fn new(content: &CellContent, style: &Style) -> Self {
        let (value, formula) = match content {
            CellContent::Value(value) => (value.clone(), None),
            CellContent::Formula(text) => (CellValue::Empty, Some(text.clone())),
        };
        Self {
            value,
            formula,
            style: style.clone(),
        }
    }

    /// Formula as a user would type it, e.g. `=SUM(B2:B3)`.
    pub fn display_formula(&self) -> Option<String> {
        self.formula.as_deref().map(display_formula_text)
    }

    /// No value, no formula, default style.
    pub fn is_truly_empty(&self) -> bool {
        self.value.is_empty() && self.formula.is_none() && self.style.is_default()
    }
}
