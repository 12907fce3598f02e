//! Comma-separated sheets read with the `csv` crate.
//!
//! Quoted cells may contain commas. Cells are trimmed, rows may have any
//! number of cells and blank rows are ignored. The first row is always a
//! header.

use anyhow::{Result, bail};
use csv::{ReaderBuilder, Trim};

use inventario_inventory::{SheetRows, StockOutRow};

fn records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Item rows for a bulk import (`name,code,quantity`).
pub fn import_rows(text: &str) -> Result<SheetRows> {
    Ok(SheetRows::from_cells(records(text)?)?)
}

/// Stock-out rows (`item,quantity[,observation]`).
pub fn stock_out_rows(text: &str) -> Result<Vec<StockOutRow>> {
    let rows: Vec<StockOutRow> = records(text)?
        .into_iter()
        .skip(1)
        .map(|cells| StockOutRow::from_cells(cells))
        .collect();
    if rows.is_empty() {
        bail!("the sheet is empty or has no data rows");
    }
    Ok(rows)
}
