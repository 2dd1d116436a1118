//! Backend-supplied per-column value distributions and the lookups the
//! charts need: totals, percentages, bin membership and top categories.

use crate::data::cell_value::{parse_number, CellValue};
use crate::error::RenderError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    Numeric,
    Categorical,
}

/// Labels and counts describing one column's value spread.
///
/// Numeric summaries carry ascending bin lower bounds as labels; categorical
/// ones carry the category values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    #[serde(rename = "type")]
    pub kind: DistributionKind,
    #[serde(default)]
    pub labels: Vec<CellValue>,
    #[serde(default)]
    pub counts: Vec<u64>,
}

/// One entry of a categorical top-K listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
}

impl DistributionSummary {
    pub fn numeric(labels: Vec<CellValue>, counts: Vec<u64>) -> Self {
        Self {
            kind: DistributionKind::Numeric,
            labels,
            counts,
        }
    }

    pub fn categorical(labels: Vec<CellValue>, counts: Vec<u64>) -> Self {
        Self {
            kind: DistributionKind::Categorical,
            labels,
            counts,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == DistributionKind::Numeric
    }

    /// Columns with no labels are skipped by the chart pass entirely.
    pub fn is_renderable(&self) -> bool {
        !self.labels.is_empty()
    }

    /// Reject summaries whose labels and counts disagree, or that have no
    /// labels at all (only reachable when building a chart directly).
    pub fn validate(&self, column: &str) -> Result<(), RenderError> {
        if self.labels.is_empty() {
            return Err(RenderError::EmptyDistribution(column.to_string()));
        }
        if self.labels.len() != self.counts.len() {
            return Err(RenderError::MismatchedDistribution {
                column: column.to_string(),
                labels: self.labels.len(),
                counts: self.counts.len(),
            });
        }
        Ok(())
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Share of the column total held by `count`, in percent.
    pub fn percentage(&self, count: u64) -> f64 {
        percentage_of(count, self.total())
    }

    /// Labels read as numeric bin lower bounds. Unparsable labels become NaN
    /// and therefore never match a value.
    pub fn bin_edges(&self) -> Vec<f64> {
        self.labels
            .iter()
            .map(|label| match label {
                CellValue::String(s) => parse_number(s).unwrap_or(f64::NAN),
                other => other.as_number().unwrap_or(f64::NAN),
            })
            .collect()
    }

    /// The `limit` largest categories, count descending; equal counts keep
    /// the backend's label order.
    pub fn top_categories(&self, limit: usize) -> Vec<CategoryCount> {
        let mut entries: Vec<CategoryCount> = self
            .labels
            .iter()
            .zip(self.counts.iter())
            .map(|(label, &count)| CategoryCount {
                label: label.to_string(),
                count,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(limit);
        entries
    }
}

pub fn percentage_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Find the bin `value` falls into, treating `edges` as ascending lower
/// bounds of half-open intervals `[edges[i], edges[i + 1])`. The last bin is
/// open-ended upward. Values below the first edge match nothing.
pub fn find_bin(edges: &[f64], value: f64) -> Option<usize> {
    let last = edges.len().checked_sub(1)?;
    for i in 0..last {
        if edges[i] <= value && value < edges[i + 1] {
            return Some(i);
        }
    }
    if value >= edges[last] {
        Some(last)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edges(values: &[f64]) -> Vec<f64> {
        values.to_vec()
    }

    #[test]
    fn test_find_bin() {
        let e = edges(&[0.0, 10.0, 20.0]);
        assert_eq!(find_bin(&e, 15.0), Some(1));
        assert_eq!(find_bin(&e, 25.0), Some(2));
        assert_eq!(find_bin(&e, -5.0), None);
        assert_eq!(find_bin(&e, 0.0), Some(0));
        assert_eq!(find_bin(&e, 10.0), Some(1));
        assert_eq!(find_bin(&[], 1.0), None);
    }

    #[test]
    fn test_find_bin_single_edge() {
        assert_eq!(find_bin(&[5.0], 5.0), Some(0));
        assert_eq!(find_bin(&[5.0], 4.9), None);
    }

    #[test]
    fn test_percentage() {
        let d = DistributionSummary::numeric(vec!["0".into(), "1".into()], vec![3, 1]);
        assert_eq!(d.total(), 4);
        assert_eq!(d.percentage(3), 75.0);
        assert_eq!(percentage_of(5, 0), 0.0);
    }

    #[test]
    fn test_deserialize_backend_shape() {
        let d: DistributionSummary = serde_json::from_value(json!({
            "type": "numeric",
            "labels": ["0", "10", "20"],
            "counts": [4, 5, 6]
        }))
        .unwrap();
        assert!(d.is_numeric());
        assert_eq!(d.bin_edges(), vec![0.0, 10.0, 20.0]);

        let c: DistributionSummary = serde_json::from_value(json!({
            "type": "categorical",
            "labels": ["a", null, 3],
            "counts": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(c.kind, DistributionKind::Categorical);
        assert_eq!(c.labels[1], CellValue::Null);
    }

    #[test]
    fn test_validate() {
        let bad = DistributionSummary::numeric(vec!["0".into()], vec![1, 2]);
        assert!(matches!(
            bad.validate("x"),
            Err(RenderError::MismatchedDistribution { labels: 1, counts: 2, .. })
        ));
        let empty = DistributionSummary::numeric(vec![], vec![]);
        assert!(!empty.is_renderable());
        assert!(matches!(
            empty.validate("x"),
            Err(RenderError::EmptyDistribution(_))
        ));
    }

    #[test]
    fn test_top_categories() {
        let d = DistributionSummary::categorical(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![1, 5, 3, 5],
        );
        let top = d.top_categories(3);
        let labels: Vec<&str> = top.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "d", "c"]);
    }
}
