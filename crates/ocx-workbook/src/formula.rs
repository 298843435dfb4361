//! Formula text used by the report.
//!
//! Formulas are stored canonically: trimmed and **without** a leading `'='`.
//! [`display_formula_text`] produces the `=`-prefixed form a spreadsheet UI
//! shows.

use ocx_model::RoundingType;

use crate::address::{CellRef, Range};

/// Trim and strip a single leading `'='`.
pub fn normalize_formula_text(s: &str) -> String {
    let mut trimmed = s.trim();
    if let Some(rest) = trimmed.strip_prefix('=') {
        trimmed = rest.trim();
    }
    trimmed.to_string()
}

/// Empty for blank input, otherwise the text with exactly one leading `'='`.
pub fn display_formula_text(s: &str) -> String {
    let normalized = normalize_formula_text(s);
    if normalized.is_empty() {
        String::new()
    } else {
        format!("={normalized}")
    }
}

/// `SUM(B2:B3)`
pub fn sum_range(range: Range) -> String {
    format!("SUM({range})")
}

/// `SUM(X2,Y2)`, one argument per reference.
pub fn sum_of<I>(refs: I) -> String
where
    I: IntoIterator<Item = Range>,
{
    let args: Vec<String> = refs.into_iter().map(|r| r.to_string()).collect();
    format!("SUM({})", args.join(","))
}

/// Whole-share conversion of `cell` by `ratio`, rounded the way the stock
/// class asks for.
pub fn as_converted(cell: CellRef, ratio: f64, rounding: RoundingType) -> String {
    match rounding {
        RoundingType::Nearest => format!("ROUND({cell} * {ratio}, 0)"),
        RoundingType::Floor => format!("FLOOR({cell} * {ratio}, 1)"),
        RoundingType::Ceiling => format!("CEILING({cell} * {ratio}, 1)"),
    }
}

/// `A2 / $A$7`
pub fn share_of_total(cell: CellRef, total: CellRef) -> String {
    format!("{cell} / {}", total.to_absolute_a1())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_equals_and_trims() {
        assert_eq!(normalize_formula_text("  =  SUM(A1:A3)  "), "SUM(A1:A3)");
        assert_eq!(normalize_formula_text("SUM(A1:A3)"), "SUM(A1:A3)");
        assert_eq!(normalize_formula_text("="), "");
        assert_eq!(display_formula_text("   = 1+1 "), "=1+1");
        assert_eq!(display_formula_text("   "), "");
    }

    #[test]
    fn conversion_formulas_follow_rounding() {
        let a2 = CellRef::new(1, 0);
        assert_eq!(as_converted(a2, 0.7, RoundingType::Nearest), "ROUND(A2 * 0.7, 0)");
        assert_eq!(as_converted(a2, 0.7, RoundingType::Floor), "FLOOR(A2 * 0.7, 1)");
        assert_eq!(as_converted(a2, 0.7, RoundingType::Ceiling), "CEILING(A2 * 0.7, 1)");
        assert_eq!(as_converted(a2, 2.0, RoundingType::Nearest), "ROUND(A2 * 2, 0)");
    }

    #[test]
    fn sums_and_shares() {
        let x2 = Range::single(CellRef::new(1, 23));
        let y2 = Range::single(CellRef::new(1, 24));
        assert_eq!(sum_of([x2, y2]), "SUM(X2,Y2)");
        assert_eq!(
            sum_range(Range::new(CellRef::new(1, 1), CellRef::new(2, 1))),
            "SUM(B2:B3)"
        );
        assert_eq!(
            share_of_total(CellRef::new(1, 0), CellRef::new(6, 0)),
            "A2 / $A$7"
        );
    }
}
