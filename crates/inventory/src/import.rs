//! Spreadsheet rows consumed by bulk import and sheet stock-outs.
//!
//! Decoding the file itself is the caller's job; this module only knows that a
//! sheet is a list of rows of text cells. Import rows are
//! `(name, code, quantity)`; stock-out rows are `(item, quantity, observation)`
//! where `item` is an id or a code.

use serde::{Deserialize, Serialize};

use inventario_core::{DomainError, DomainResult};

use crate::item::ItemDraft;

/// One data row of an import sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    pub name: String,
    pub code: String,
    pub quantity: String,
}

impl ImportRow {
    pub fn new(name: impl Into<String>, code: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            quantity: quantity.into(),
        }
    }

    /// Take the first three cells; missing cells read as empty text and extra
    /// cells are ignored.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells = cells.into_iter().map(Into::into);
        let mut next = || cells.next().unwrap_or_default();
        let name = next();
        let code = next();
        let quantity = next();
        Self { name, code, quantity }
    }

    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft::new(self.name.clone(), self.code.clone(), self.quantity.clone())
    }
}

/// One data row of a stock-out sheet, not yet resolved against the item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockOutRow {
    /// Item id or code.
    pub item: String,
    pub quantity: String,
    pub observation: Option<String>,
}

impl StockOutRow {
    pub fn new(item: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            quantity: quantity.into(),
            observation: None,
        }
    }

    pub fn with_observation(mut self, observation: impl Into<String>) -> Self {
        self.observation = Some(observation.into());
        self
    }

    /// First cell is the item, second the quantity, third (optional, blank
    /// means none) the observation.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells = cells.into_iter().map(Into::into);
        let item = cells.next().unwrap_or_default();
        let quantity = cells.next().unwrap_or_default();
        let observation = cells.next().filter(|o| !o.trim().is_empty());
        Self {
            item,
            quantity,
            observation,
        }
    }
}

/// Data rows of a sheet, header already removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRows(Vec<ImportRow>);

impl SheetRows {
    /// Build from the raw sheet, treating the first row as a header.
    ///
    /// A sheet with nothing after the header is rejected.
    pub fn from_cells<R, C, S>(rows: R) -> DomainResult<Self>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let data: Vec<ImportRow> = rows.into_iter().skip(1).map(|cells| ImportRow::from_cells(cells)).collect();
        if data.is_empty() {
            return Err(DomainError::validation("the sheet is empty or has no data rows"));
        }
        Ok(Self(data))
    }

    pub fn into_rows(self) -> Vec<ImportRow> {
        self.0
    }
}

/// Aggregate result of a batch operation (bulk import, multi-item stock-out).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub successes: usize,
    pub errors: usize,
}

impl BatchOutcome {
    pub fn record_success(&mut self) {
        self.successes += 1;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn total(&self) -> usize {
        self.successes + self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_are_padded_with_empty_cells() {
        let row = ImportRow::from_cells(["Martillo"]);
        assert_eq!(row, ImportRow::new("Martillo", "", ""));
    }

    #[test]
    fn extra_cells_are_ignored() {
        let row = ImportRow::from_cells(["A", "C1", "5", "bodega 2"]);
        assert_eq!(row, ImportRow::new("A", "C1", "5"));
    }

    #[test]
    fn header_row_is_skipped() {
        let sheet = SheetRows::from_cells(vec![
            vec!["Nombre", "Código", "Cantidad"],
            vec!["A", "C1", "5"],
        ])
        .unwrap();
        assert_eq!(sheet.into_rows(), vec![ImportRow::new("A", "C1", "5")]);
    }

    #[test]
    fn stock_out_row_treats_blank_observation_as_none() {
        let row = StockOutRow::from_cells(["TD-1", "2", "  "]);
        assert_eq!(row, StockOutRow::new("TD-1", "2"));

        let row = StockOutRow::from_cells(["TD-1", "2", "obra 12", "extra"]);
        assert_eq!(row.observation.as_deref(), Some("obra 12"));
    }

    #[test]
    fn header_only_sheet_is_rejected() {
        let err = SheetRows::from_cells(vec![vec!["Nombre", "Código", "Cantidad"]]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let empty: Vec<Vec<String>> = Vec::new();
        assert!(SheetRows::from_cells(empty).is_err());
    }
}
