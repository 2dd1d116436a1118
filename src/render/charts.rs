//! Distribution renderer: histogram charts for numeric columns, top-K
//! listings for categorical ones, and the cell-hover bar highlight.
//!
//! Chart instances live in a [`ChartRegistry`] keyed by column name. Every
//! rebuild disposes all existing charts first; nothing is diffed.

use crate::config::config::ThemeConfig;
use crate::data::cell_value::CellValue;
use crate::data::distribution::{find_bin, DistributionSummary};
use crate::error::RenderError;
use crate::render::format::{format_compact, format_count, format_percent};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Bar colors, injected once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub base: String,
    pub border: String,
    pub highlight: String,
}

impl From<&ThemeConfig> for Palette {
    fn from(theme: &ThemeConfig) -> Self {
        Self {
            base: theme.bar_color.clone(),
            border: theme.bar_border_color.clone(),
            highlight: theme.highlight_color.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAlign {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisTick {
    pub index: usize,
    pub label: String,
    pub align: TickAlign,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub count: u64,
    pub tooltip: String,
}

/// Recolor instruction for one chart. Hover updates are never animated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartUpdate {
    pub column: String,
    pub colors: Vec<String>,
    pub animate: bool,
}

/// A live histogram for one numeric column.
#[derive(Debug, Clone)]
pub struct NumericChart {
    column: String,
    bars: Vec<Bar>,
    ticks: Vec<AxisTick>,
    edges: Vec<f64>,
    border_color: String,
    highlight_color: String,
    original_colors: Vec<String>,
    colors: Vec<String>,
    highlighted: Option<usize>,
}

impl NumericChart {
    fn build(
        column: &str,
        summary: &DistributionSummary,
        palette: &Palette,
    ) -> Result<Self, RenderError> {
        summary.validate(column)?;

        let total = summary.total();
        let bars: Vec<Bar> = summary
            .labels
            .iter()
            .zip(summary.counts.iter())
            .map(|(label, &count)| Bar {
                label: label.to_string(),
                count,
                tooltip: bar_tooltip(count, total),
            })
            .collect();

        let original_colors = vec![palette.base.clone(); bars.len()];
        Ok(Self {
            column: column.to_string(),
            ticks: axis_ticks(&summary.labels),
            edges: summary.bin_edges(),
            border_color: palette.border.clone(),
            highlight_color: palette.highlight.clone(),
            colors: original_colors.clone(),
            original_colors,
            highlighted: None,
            bars,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn ticks(&self) -> &[AxisTick] {
        &self.ticks
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn border_color(&self) -> &str {
        &self.border_color
    }

    /// Index of the currently highlighted bar, if any.
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Recolor the bar `value` falls into. `None` when the value is below
    /// every bin, in which case any earlier highlight is cleared.
    pub fn highlight(&mut self, value: f64) -> Option<ChartUpdate> {
        let Some(bin) = find_bin(&self.edges, value) else {
            self.colors = self.original_colors.clone();
            self.highlighted = None;
            return None;
        };
        self.colors = self
            .original_colors
            .iter()
            .enumerate()
            .map(|(i, base)| {
                if i == bin {
                    self.highlight_color.clone()
                } else {
                    base.clone()
                }
            })
            .collect();
        self.highlighted = Some(bin);
        Some(self.update())
    }

    /// Put back the colors the chart was built with.
    pub fn restore(&mut self) -> ChartUpdate {
        self.colors = self.original_colors.clone();
        self.highlighted = None;
        self.update()
    }

    fn update(&self) -> ChartUpdate {
        ChartUpdate {
            column: self.column.clone(),
            colors: self.colors.clone(),
            animate: false,
        }
    }

    fn dispose(&mut self) {
        debug!(target: "render", "Disposing chart for '{}'", self.column);
        self.bars.clear();
        self.colors.clear();
        self.original_colors.clear();
        self.highlighted = None;
    }
}

/// Tooltip for one bar: raw count and share of the column total.
pub fn bar_tooltip(count: u64, total: u64) -> String {
    let percent = crate::data::distribution::percentage_of(count, total);
    format!("{} rows ({}%)", format_count(count), format_percent(percent))
}

fn tick_label(label: &CellValue) -> String {
    match label.as_number() {
        Some(n) => format_compact(n),
        None => label.to_string(),
    }
}

/// Only the first and last bin edges get a tick; a single bin gets one
/// centered tick.
fn axis_ticks(labels: &[CellValue]) -> Vec<AxisTick> {
    match labels.len() {
        0 => Vec::new(),
        1 => vec![AxisTick {
            index: 0,
            label: tick_label(&labels[0]),
            align: TickAlign::Center,
        }],
        n => vec![
            AxisTick {
                index: 0,
                label: tick_label(&labels[0]),
                align: TickAlign::Start,
            },
            AxisTick {
                index: n - 1,
                label: tick_label(&labels[n - 1]),
                align: TickAlign::End,
            },
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub label: String,
    /// `label: 12.5%`
    pub text: String,
    /// Full count, shown on inspection
    pub title: String,
}

/// Top categories listed under a categorical column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalSummary {
    pub column: String,
    pub entries: Vec<CategoryEntry>,
}

impl CategoricalSummary {
    fn build(
        column: &str,
        summary: &DistributionSummary,
        limit: usize,
    ) -> Result<Self, RenderError> {
        summary.validate(column)?;

        let entries = summary
            .top_categories(limit)
            .into_iter()
            .map(|category| {
                let percent = summary.percentage(category.count);
                CategoryEntry {
                    text: format!("{}: {}%", category.label, format_percent(percent)),
                    title: format!("{}: {} rows", category.label, format_count(category.count)),
                    label: category.label,
                }
            })
            .collect();

        Ok(Self {
            column: column.to_string(),
            entries,
        })
    }
}

/// What sits under one column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionView {
    /// Histogram; the instance itself lives in the registry
    Chart(String),
    Categories(CategoricalSummary),
}

/// Output of one rebuild pass, in column order.
#[derive(Debug, Default)]
pub struct DistributionPass {
    pub views: Vec<(String, DistributionView)>,
    pub errors: Vec<RenderError>,
}

impl DistributionPass {
    pub fn view_for(&self, column: &str) -> Option<&DistributionView> {
        self.views
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, view)| view)
    }
}

/// Owns every live chart, keyed by column name.
#[derive(Debug)]
pub struct ChartRegistry {
    palette: Palette,
    top_categories: usize,
    charts: HashMap<String, NumericChart>,
    disposed: usize,
}

impl ChartRegistry {
    pub fn new(palette: Palette, top_categories: usize) -> Self {
        Self {
            palette,
            top_categories,
            charts: HashMap::new(),
            disposed: 0,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn chart(&self, column: &str) -> Option<&NumericChart> {
        self.charts.get(column)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Total number of charts disposed over the registry's lifetime.
    pub fn disposed_count(&self) -> usize {
        self.disposed
    }

    /// Dispose of every chart.
    pub fn dispose(&mut self) {
        for (_, mut chart) in self.charts.drain() {
            chart.dispose();
            self.disposed += 1;
        }
    }

    /// Throw away all charts and build new ones for `columns`, in order.
    ///
    /// Columns without a distribution, or with no labels, are skipped. A
    /// malformed distribution only costs that column its chart.
    pub fn rebuild(
        &mut self,
        columns: &[String],
        distributions: &HashMap<String, DistributionSummary>,
    ) -> DistributionPass {
        self.dispose();

        let mut pass = DistributionPass::default();
        for column in columns {
            let Some(summary) = distributions.get(column) else {
                continue;
            };
            if !summary.is_renderable() {
                continue;
            }

            let built = if summary.is_numeric() {
                NumericChart::build(column, summary, &self.palette).map(|chart| {
                    self.charts.insert(column.clone(), chart);
                    DistributionView::Chart(column.clone())
                })
            } else {
                CategoricalSummary::build(column, summary, self.top_categories)
                    .map(DistributionView::Categories)
            };

            match built {
                Ok(view) => pass.views.push((column.clone(), view)),
                Err(e) => {
                    warn!(target: "render", "Error creating chart for column {}: {}", column, e);
                    pass.errors.push(e);
                }
            }
        }

        debug!(
            target: "render",
            "Rebuilt {} charts, {} distribution views, {} failures",
            self.charts.len(),
            pass.views.len(),
            pass.errors.len()
        );
        pass
    }

    /// Pointer entered a cell of `column` holding `value`.
    pub fn highlight(&mut self, column: &str, value: &CellValue) -> Option<ChartUpdate> {
        let number = value.as_number()?;
        self.charts.get_mut(column)?.highlight(number)
    }

    /// Pointer left a cell of `column`.
    pub fn restore(&mut self, column: &str) -> Option<ChartUpdate> {
        self.charts.get_mut(column).map(NumericChart::restore)
    }
}

impl Drop for ChartRegistry {
    fn drop(&mut self) {
        self.dispose();
    }
}
