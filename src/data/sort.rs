use crate::data::cell_compare::compare_cells;
use crate::data::cell_value::{cell, Row};
use serde::{Deserialize, Serialize};

/// Direction of the active header sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
    None,
}

/// Which column (if any) the current page is sorted by, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<String>,
    pub order: SortOrder,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: None,
            order: SortOrder::None,
        }
    }
}

impl SortState {
    /// Advance the header-click cycle for `column`.
    ///
    /// The same column goes `None -> Ascending -> Descending -> None`; a
    /// different column always starts over at `Ascending`.
    pub fn cycle(&mut self, column: &str) {
        let same_column = self.column.as_deref() == Some(column);
        let next = if same_column {
            match self.order {
                SortOrder::None => SortOrder::Ascending,
                SortOrder::Ascending => SortOrder::Descending,
                SortOrder::Descending => SortOrder::None,
            }
        } else {
            SortOrder::Ascending
        };

        if next == SortOrder::None {
            self.clear();
        } else {
            self.column = Some(column.to_string());
            self.order = next;
        }
    }

    pub fn clear(&mut self) {
        self.column = None;
        self.order = SortOrder::None;
    }

    pub fn is_active(&self) -> bool {
        self.column.is_some() && self.order != SortOrder::None
    }

    /// Order for `column` if it is the active sort column.
    pub fn order_for(&self, column: &str) -> SortOrder {
        match &self.column {
            Some(active) if active == column => self.order,
            _ => SortOrder::None,
        }
    }
}

/// Indices into `rows` in display order for the given sort.
///
/// Only the rows handed in are sorted; the sort is stable so ties keep their
/// input order, and descending is the exact reverse of the ascending
/// comparison (blank cells therefore land last).
pub fn sorted_indices(rows: &[Row], sort: &SortState) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..rows.len()).collect();

    let column = match (&sort.column, sort.order) {
        (Some(column), SortOrder::Ascending | SortOrder::Descending) => column,
        _ => return indices,
    };

    indices.sort_by(|&a, &b| {
        let cmp = compare_cells(cell(&rows[a], column), cell(&rows[b], column));
        if sort.order == SortOrder::Descending {
            cmp.reverse()
        } else {
            cmp
        }
    });

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cell_value::CellValue;

    fn rows(values: &[CellValue]) -> Vec<Row> {
        values
            .iter()
            .map(|v| {
                let mut row = Row::new();
                row.insert("v".to_string(), v.clone());
                row
            })
            .collect()
    }

    fn sorted(rows: &[Row], sort: &SortState) -> Vec<CellValue> {
        sorted_indices(rows, sort)
            .into_iter()
            .map(|i| rows[i]["v"].clone())
            .collect()
    }

    #[test]
    fn test_three_clicks_clear_sort() {
        let mut sort = SortState::default();
        sort.cycle("a");
        assert_eq!(sort.column.as_deref(), Some("a"));
        assert_eq!(sort.order, SortOrder::Ascending);
        sort.cycle("a");
        assert_eq!(sort.order, SortOrder::Descending);
        sort.cycle("a");
        assert_eq!(sort, SortState::default());
    }

    #[test]
    fn test_other_column_resets_to_ascending() {
        let mut sort = SortState::default();
        sort.cycle("a");
        sort.cycle("a");
        sort.cycle("b");
        assert_eq!(sort.column.as_deref(), Some("b"));
        assert_eq!(sort.order, SortOrder::Ascending);
        assert_eq!(sort.order_for("a"), SortOrder::None);
    }

    #[test]
    fn test_ascending_numeric_coercion_nulls_first() {
        let data = rows(&["10".into(), "2".into(), CellValue::Null]);
        let sort = SortState {
            column: Some("v".to_string()),
            order: SortOrder::Ascending,
        };
        assert_eq!(
            sorted(&data, &sort),
            vec![CellValue::Null, "2".into(), "10".into()]
        );
    }

    #[test]
    fn test_descending_puts_nulls_last() {
        let data = rows(&[CellValue::Null, "2".into(), "10".into()]);
        let sort = SortState {
            column: Some("v".to_string()),
            order: SortOrder::Descending,
        };
        assert_eq!(
            sorted(&data, &sort),
            vec!["10".into(), "2".into(), CellValue::Null]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut data = rows(&[1i64.into(), 1i64.into(), 0i64.into()]);
        for (i, row) in data.iter_mut().enumerate() {
            row.insert("id".to_string(), CellValue::Integer(i as i64));
        }
        let sort = SortState {
            column: Some("v".to_string()),
            order: SortOrder::Descending,
        };
        assert_eq!(sorted_indices(&data, &sort), vec![0, 1, 2]);
    }

    #[test]
    fn test_no_sort_is_identity() {
        let data = rows(&["b".into(), "a".into()]);
        assert_eq!(sorted_indices(&data, &SortState::default()), vec![0, 1]);
    }
}
