//! HTML adapter for [`TableModel`]. Every piece of text, cell values and
//! column names included, goes through [`escape_html`].

use crate::render::charts::{CategoricalSummary, ChartRegistry, DistributionView, NumericChart};
use crate::render::format::escape_html;
use crate::render::table::{BodyRow, HeaderCell, PaginationView, TableModel};
use std::fmt::Write;

pub fn render_document(model: &TableModel, charts: &ChartRegistry) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"dataview\">\n");
    if let Some(error) = &model.error {
        let _ = writeln!(html, "<div class=\"error\">{}</div>", escape_html(error));
    }
    if let Some(notice) = &model.notice {
        let _ = writeln!(html, "<div class=\"notice\">{}</div>", escape_html(notice));
    }
    if model.loading {
        html.push_str("<div class=\"loading\">Loading...</div>\n");
    }
    html.push_str(&render_table(model, charts));
    html.push_str(&render_pagination(&model.pagination));
    html.push_str("</div>\n");
    html
}

pub fn render_table(model: &TableModel, charts: &ChartRegistry) -> String {
    let mut html = String::from("<table>\n<thead>\n<tr>\n");
    for header in &model.headers {
        html.push_str(&render_header(header, charts));
    }
    html.push_str("</tr>\n</thead>\n");
    html.push_str(&render_body(&model.rows));
    html.push_str("</table>\n");
    html
}

fn render_header(header: &HeaderCell, charts: &ChartRegistry) -> String {
    let name = escape_html(&header.name);
    let mut html = format!("<th data-column=\"{}\">\n", name);
    let _ = write!(html, "<div class=\"column-name\">{}", name);
    if !header.glyph.is_empty() {
        let _ = write!(
            html,
            " <span class=\"sort-indicator\">{}</span>",
            escape_html(&header.glyph)
        );
    }
    html.push_str("</div>\n");

    match &header.distribution {
        Some(DistributionView::Chart(column)) => {
            if let Some(chart) = charts.chart(column) {
                html.push_str(&render_chart(chart));
            }
        }
        Some(DistributionView::Categories(summary)) => {
            html.push_str(&render_categories(summary));
        }
        None => {}
    }
    html.push_str("</th>\n");
    html
}

/// `<tbody>` only; used on its own when a sort change re-renders the body.
pub fn render_body(rows: &[BodyRow]) -> String {
    let mut html = String::from("<tbody>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in &row.cells {
            if cell.hoverable {
                let _ = write!(
                    html,
                    "<td data-column=\"{}\" data-value=\"{}\">{}</td>",
                    escape_html(&cell.column),
                    escape_html(&cell.value.to_string()),
                    escape_html(&cell.text)
                );
            } else {
                let _ = write!(html, "<td>{}</td>", escape_html(&cell.text));
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n");
    html
}

fn render_chart(chart: &NumericChart) -> String {
    let max = chart.bars().iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let mut html = format!(
        "<div class=\"chart\" data-column=\"{}\">\n",
        escape_html(chart.column())
    );
    for (bar, color) in chart.bars().iter().zip(chart.colors()) {
        let height = bar.count as f64 / max as f64 * 100.0;
        let _ = writeln!(
            html,
            "<div class=\"bar\" style=\"height:{:.1}%;background:{};border-color:{}\" title=\"{}\"></div>",
            height,
            escape_html(color),
            escape_html(chart.border_color()),
            escape_html(&bar.tooltip)
        );
    }
    html.push_str("<div class=\"axis\">");
    for tick in chart.ticks() {
        let _ = write!(
            html,
            "<span class=\"tick tick-{:?}\">{}</span>",
            tick.align,
            escape_html(&tick.label)
        );
    }
    html.push_str("</div>\n</div>\n");
    html
}

fn render_categories(summary: &CategoricalSummary) -> String {
    let mut html = String::from("<div class=\"categorical-summary\">\n");
    for entry in &summary.entries {
        let _ = writeln!(
            html,
            "<div class=\"category-item\" title=\"{}\">{}</div>",
            escape_html(&entry.title),
            escape_html(&entry.text)
        );
    }
    html.push_str("</div>\n");
    html
}

pub fn render_pagination(view: &PaginationView) -> String {
    let disabled = |enabled: bool| if enabled { "" } else { " disabled" };
    format!(
        "<div class=\"pagination\">\n<button class=\"prev\"{}>Previous</button>\n<span class=\"page-info\">{}</span>\n<button class=\"next\"{}>Next</button>\n<span class=\"row-range\">{}</span>\n</div>\n",
        disabled(view.prev_enabled),
        escape_html(&view.page_info()),
        disabled(view.next_enabled),
        escape_html(&view.range_summary())
    )
}
