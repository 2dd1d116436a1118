use crate::render::charts::{ChartRegistry, DistributionView, NumericChart, TickAlign};
use crate::render::table::{BodyRow, TableModel};
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use crossterm::style::Stylize;

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Draw the whole view for the REPL: table, distributions, pagination.
pub fn render_view(model: &TableModel, charts: &ChartRegistry) -> String {
    if model.is_empty() {
        let mut out = match &model.error {
            Some(error) => format!("{}", error.as_str().red()),
            None => format!("{}", "No dataset loaded.".yellow()),
        };
        if let Some(notice) = &model.notice {
            out.push('\n');
            out.push_str(&format!("{}", notice.as_str().yellow()));
        }
        return out;
    }

    let mut out = format!("{}\n", render_table(model));
    for line in distribution_lines(model, charts) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&status_line(model));
    out
}

pub fn render_table(model: &TableModel) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let headers: Vec<Cell> = model
        .headers
        .iter()
        .map(|h| {
            let title = if h.glyph.is_empty() {
                h.name.clone()
            } else {
                format!("{} {}", h.name, h.glyph)
            };
            Cell::new(title).add_attribute(Attribute::Bold)
        })
        .collect();
    table.set_header(headers);

    for row in &model.rows {
        table.add_row(body_cells(row));
    }
    table
}

fn body_cells(row: &BodyRow) -> Vec<Cell> {
    row.cells
        .iter()
        .map(|c| {
            let cell = Cell::new(&c.text);
            if c.hoverable {
                cell.set_alignment(CellAlignment::Right)
            } else {
                cell
            }
        })
        .collect()
}

/// One line per column with a distribution view, in column order.
pub fn distribution_lines(model: &TableModel, charts: &ChartRegistry) -> Vec<String> {
    model
        .headers
        .iter()
        .filter_map(|h| match h.distribution.as_ref()? {
            DistributionView::Chart(column) => charts
                .chart(column)
                .map(|chart| format!("{}: {}", h.name.as_str().bold(), sparkline(chart))),
            DistributionView::Categories(summary) => {
                let entries: Vec<&str> = summary.entries.iter().map(|e| e.text.as_str()).collect();
                Some(format!("{}: {}", h.name.as_str().bold(), entries.join(", ")))
            }
        })
        .collect()
}

/// Bars as block characters; the highlighted bar is drawn in red.
pub fn sparkline(chart: &NumericChart) -> String {
    let max = chart.bars().iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let mut line = String::new();
    for (i, bar) in chart.bars().iter().enumerate() {
        let level = (bar.count as f64 / max as f64 * (SPARK.len() - 1) as f64).round() as usize;
        let glyph = SPARK[level.min(SPARK.len() - 1)].to_string();
        if chart.highlighted() == Some(i) {
            line.push_str(&format!("{}", glyph.red()));
        } else {
            line.push_str(&glyph);
        }
    }

    let ticks: Vec<String> = chart
        .ticks()
        .iter()
        .map(|t| match t.align {
            TickAlign::Center => format!("[{}]", t.label),
            TickAlign::Start | TickAlign::End => t.label.clone(),
        })
        .collect();
    format!("{}  {}", line, ticks.join(" .. "))
}

pub fn status_line(model: &TableModel) -> String {
    let mut line = format!(
        "Page {}  {}",
        model.pagination.page_info(),
        model.pagination.range_summary()
    );
    if !model.pagination.prev_enabled {
        line.push_str("  (first page)");
    }
    if !model.pagination.next_enabled {
        line.push_str("  (last page)");
    }
    if model.loading {
        line.push_str("  loading...");
    }
    let mut out = format!("{}", line.green());
    if let Some(error) = &model.error {
        out.push('\n');
        out.push_str(&format!("{}", error.as_str().red()));
    }
    if let Some(notice) = &model.notice {
        out.push('\n');
        out.push_str(&format!("{}", notice.as_str().yellow()));
    }
    out
}
