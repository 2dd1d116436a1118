use crate::error::{Result, TransportError};
use crate::render::table::TableModel;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write the displayed page as CSV: rows in display order, raw values.
pub fn write_page_csv<W: Write>(model: &TableModel, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(model.headers.iter().map(|h| h.name.as_str()))
        .map_err(TransportError::from)?;
    for row in &model.rows {
        wtr.write_record(row.cells.iter().map(|c| c.value.to_string()))
            .map_err(TransportError::from)?;
    }
    wtr.flush().map_err(TransportError::from)?;
    Ok(())
}

pub fn export_page_csv(model: &TableModel, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(TransportError::from)?;
    write_page_csv(model, file)?;
    info!(target: "render", "Exported {} rows to {}", model.rows.len(), path.display());
    Ok(())
}
