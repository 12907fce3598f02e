use serde::{Deserialize, Serialize};

use inventario_core::{DomainError, DomainResult, Entity, ItemId, ValueObject};

/// Stock level of an item. Never negative.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Accepts any value `>= 0`.
    pub fn new(value: i64) -> DomainResult<Self> {
        if value < 0 {
            return Err(DomainError::validation(format!(
                "quantity cannot be negative (got {value})"
            )));
        }
        Ok(Self(value))
    }

    /// Accepts only values `> 0`.
    pub fn positive(value: i64) -> DomainResult<Self> {
        if value <= 0 {
            return Err(DomainError::validation(format!(
                "quantity must be a positive number (got {value})"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl ValueObject for Quantity {}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Parse user or spreadsheet text into an integer.
///
/// Reads an optional sign and the leading run of decimal digits, ignoring
/// whatever follows: `"12 uds"` is 12 and a sheet cell exported as `"5.0"` is
/// 5. Text that does not start with a digit is rejected.
pub fn parse_quantity(text: &str) -> DomainResult<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("quantity is required"));
    }

    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let sign_len = trimmed.len() - unsigned.len();
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(DomainError::validation(format!(
            "quantity must be an integer (got '{trimmed}')"
        )));
    }

    trimmed[..sign_len + digits]
        .parse::<i64>()
        .map_err(|_| DomainError::validation(format!("quantity is out of range (got '{trimmed}')")))
}

/// Quantity left after a stock-out of `exited` units from `current`.
///
/// Requires `0 < exited <= current`.
pub fn remaining_after_stock_out(current: i64, exited: i64) -> DomainResult<Quantity> {
    if exited <= 0 {
        return Err(DomainError::validation(format!(
            "exited quantity must be a positive number (got {exited})"
        )));
    }
    if exited > current {
        return Err(DomainError::validation(format!(
            "cannot take out {exited} units, only {current} in stock"
        )));
    }
    Quantity::new(current - exited)
}

/// An inventory stock-keeping unit as persisted by the item store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub code: String,
    pub quantity: Quantity,
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Raw, unvalidated input for a new item (form fields or a spreadsheet row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub code: String,
    pub quantity: String,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, code: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            quantity: quantity.into(),
        }
    }

    /// Check every creation precondition and produce the fields to persist.
    pub fn validate(&self) -> DomainResult<NewItem> {
        let name = self.name.trim();
        let code = self.code.trim();
        if name.is_empty() || code.is_empty() {
            return Err(DomainError::validation("name and code are required"));
        }
        let quantity = Quantity::positive(parse_quantity(&self.quantity)?)?;

        Ok(NewItem {
            name: name.to_string(),
            code: code.to_string(),
            quantity,
        })
    }
}

/// Validated fields for `ItemStore::create`; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub code: String,
    pub quantity: Quantity,
}

impl NewItem {
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            name: self.name,
            code: self.code,
            quantity: self.quantity,
        }
    }
}

/// Partial update for `ItemStore::update`. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub quantity: Option<Quantity>,
}

impl ItemPatch {
    pub fn quantity(quantity: Quantity) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(code) = &self.code {
            item.code = code.clone();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
    }
}
