use crate::data::cell_value::CellValue;
use std::cmp::Ordering;

/// Compare two cells for table sorting.
///
/// Blank cells (null or empty text) are the smallest value. When both cells
/// are numeric-parsable the comparison is numeric; the check is made per
/// pair, so a column mixing numbers and words still orders its numbers
/// numerically. Everything else compares by display text.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.is_blank(), b.is_blank()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }

    match (a, b) {
        (CellValue::String(x), CellValue::String(y)) => x.cmp(y),
        (CellValue::Boolean(x), CellValue::Boolean(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
