use anyhow::{Context, Result};
use crossterm::style::Stylize;
use parquet_dataview::api::{ApiClient, LoadSource};
use parquet_dataview::config::Config;
use parquet_dataview::render::export::export_page_csv;
use parquet_dataview::render::ChartUpdate;
use parquet_dataview::state::Completion;
use parquet_dataview::utils::app_paths::AppPaths;
use parquet_dataview::utils::logging::{init_tracing, LogRingBuffer};
use parquet_dataview::DataView;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::Path;

/// One parsed REPL line.
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Query(&'a str),
    Load(&'a str),
    Open(&'a str, &'a str),
    Url(&'a str),
    Page(usize),
    Next,
    Prev,
    Sort(&'a str),
    Hover(usize, &'a str),
    Leave(&'a str),
    Export(&'a str),
    Logs(usize),
    Show,
    Help,
    Quit,
    Usage(&'static str),
}

fn parse_command(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    if !trimmed.starts_with('\\') {
        return Command::Query(trimmed);
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).unwrap_or_default();
    let args: Vec<&str> = rest.split_whitespace().collect();

    match name {
        "\\load" if !rest.is_empty() => Command::Load(rest),
        "\\load" => Command::Usage("\\load <file>"),
        "\\open" if args.len() == 2 => Command::Open(args[0], args[1]),
        "\\open" => Command::Usage("\\open <bucket> <file>"),
        "\\url" if !rest.is_empty() => Command::Url(rest),
        "\\url" => Command::Usage("\\url <url>"),
        "\\page" => match rest.parse() {
            Ok(page) => Command::Page(page),
            Err(_) => Command::Usage("\\page <n>"),
        },
        "\\next" => Command::Next,
        "\\prev" => Command::Prev,
        "\\sort" if !rest.is_empty() => Command::Sort(rest),
        "\\sort" => Command::Usage("\\sort <column>"),
        "\\hover" => match args.split_first() {
            Some((row, column)) if !column.is_empty() => match row.parse::<usize>() {
                Ok(row) if row >= 1 => Command::Hover(row - 1, rest[row_end(rest)..].trim()),
                _ => Command::Usage("\\hover <row> <column>"),
            },
            _ => Command::Usage("\\hover <row> <column>"),
        },
        "\\leave" if !rest.is_empty() => Command::Leave(rest),
        "\\leave" => Command::Usage("\\leave <column>"),
        "\\export" if !rest.is_empty() => Command::Export(rest),
        "\\export" => Command::Usage("\\export <file.csv>"),
        "\\logs" => Command::Logs(rest.parse().unwrap_or(20)),
        "\\show" => Command::Show,
        "\\help" => Command::Help,
        "\\quit" | "\\q" => Command::Quit,
        _ => Command::Usage("unknown command, try \\help"),
    }
}

/// Byte offset just past the first word of `text`.
fn row_end(text: &str) -> usize {
    text.find(char::is_whitespace).unwrap_or(text.len())
}

fn print_help() {
    println!("{}", "Parquet DataView".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  dataview [--generate-config] [FILE.parquet]");
    println!();
    println!("{}", "Commands:".yellow());
    println!("  {}                - Run a query from page 1", "<query>".green());
    println!("  {}          - Upload a local file", "\\load <file>".green());
    println!("  {} - Open a stored dataset", "\\open <bucket> <file>".green());
    println!("  {}            - Open the dataset named by URL parameters", "\\url <url>".green());
    println!("  {}    - Go to page n", "\\page <n> | \\next | \\prev".green());
    println!("  {}        - Cycle sort on a column (asc, desc, off)", "\\sort <column>".green());
    println!("  {} - Highlight the histogram bin of a cell", "\\hover <row> <column>".green());
    println!("  {}       - Clear a highlight", "\\leave <column>".green());
    println!("  {}   - Export the current page to CSV", "\\export <file.csv>".green());
    println!("  {}            - Show recent log lines", "\\logs [n]".green());
    println!("  {}  - Redraw / help / exit", "\\show | \\help | \\quit".green());
    println!();
}

fn print_update(update: Option<ChartUpdate>, view: &DataView<ApiClient>) {
    match update {
        Some(update) => {
            if let Some(chart) = view.charts().chart(&update.column) {
                println!(
                    "{}: {}",
                    update.column.as_str().bold(),
                    parquet_dataview::render::terminal::sparkline(chart)
                );
            }
        }
        None => println!("{}", "No matching bin.".yellow()),
    }
}

fn print_logs(buffer: &LogRingBuffer, count: usize) {
    for entry in buffer.get_recent(count) {
        println!("{}", entry.format_for_display().dark_grey());
    }
}

fn report(result: parquet_dataview::Result<Completion>, view: &DataView<ApiClient>) {
    match result {
        Ok(Completion::Applied(_)) => println!("{}", view.render_terminal()),
        Ok(Completion::Discarded) => {}
        Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
    }
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("creating config directory")?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Configuration file created at: {}", path.display());
    Ok(())
}

fn upload(path: &str) -> parquet_dataview::Result<LoadSource> {
    Ok(LoadSource::upload_file(Path::new(path))?)
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--generate-config") {
        return generate_config();
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let log_buffer = init_tracing();
    let config = Config::load().context("loading configuration")?;
    let client = ApiClient::new(config.api.clone())?;
    println!("{}", format!("Backend: {}", client.base_url()).cyan());

    let mut view = DataView::new(config, client);

    if let Some(file) = args.iter().find(|a| !a.starts_with("--")) {
        let result = upload(file).and_then(|source| view.load_dataset(source));
        report(result, &view);
    }

    let history_file = AppPaths::history_file()?;
    let history = Box::new(
        FileBackedHistory::with_file(200, history_file).context("configuring history")?,
    );
    let mut line_editor = Reedline::create().with_history(history);
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("dataview".to_string()),
        DefaultPromptSegment::Empty,
    );

    loop {
        let buffer = match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => buffer,
            Signal::CtrlD | Signal::CtrlC => break,
        };
        if buffer.trim().is_empty() {
            continue;
        }

        match parse_command(&buffer) {
            Command::Query(text) => {
                let result = view.run_query(text);
                report(result, &view);
            }
            Command::Load(file) => {
                let result = upload(file).and_then(|source| view.load_dataset(source));
                report(result, &view);
            }
            Command::Open(bucket, file) => {
                let result = view.load_dataset(LoadSource::dataset(bucket, file));
                report(result, &view);
            }
            Command::Url(url) => {
                let result = LoadSource::from_url(url)
                    .map_err(Into::into)
                    .and_then(|source| view.load_dataset(source));
                report(result, &view);
            }
            Command::Page(page) => {
                let result = view.go_to_page(page);
                report(result, &view);
            }
            Command::Next => {
                let result = view.next_page();
                report(result, &view);
            }
            Command::Prev => {
                let result = view.prev_page();
                report(result, &view);
            }
            Command::Sort(column) => match view.set_sort(column) {
                Ok(_) => println!("{}", view.render_terminal()),
                Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
            },
            Command::Hover(row, column) => {
                let update = view.hover_cell(row, column);
                print_update(update, &view);
            }
            Command::Leave(column) => {
                let update = view.leave_cell(column);
                print_update(update, &view);
            }
            Command::Export(file) => {
                if let Err(e) = export_page_csv(&view.table_model(), Path::new(file)) {
                    eprintln!("{}", format!("Export error: {}", e).red());
                } else {
                    println!("{}", format!("Page exported to {}", file).green());
                }
            }
            Command::Logs(count) => print_logs(&log_buffer, count),
            Command::Show => println!("{}", view.render_terminal()),
            Command::Help => print_help(),
            Command::Quit => break,
            Command::Usage(usage) => eprintln!("{}", format!("Usage: {}", usage).red()),
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("SELECT * FROM data"), Command::Query("SELECT * FROM data"));
        assert_eq!(parse_command("\\open raw sales.parquet"), Command::Open("raw", "sales.parquet"));
        assert_eq!(parse_command("\\page 3"), Command::Page(3));
        assert_eq!(parse_command("\\sort birth year"), Command::Sort("birth year"));
        assert_eq!(parse_command("\\hover 2 total amount"), Command::Hover(1, "total amount"));
        assert_eq!(parse_command("\\logs"), Command::Logs(20));
        assert!(matches!(parse_command("\\page x"), Command::Usage(_)));
        assert!(matches!(parse_command("\\hover 0 a"), Command::Usage(_)));
        assert!(matches!(parse_command("\\bogus"), Command::Usage(_)));
    }
}
