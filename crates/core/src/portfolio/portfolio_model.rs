//! Portfolio and position domain models.

use chrono::{Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_DESCRIPTION_LENGTH, MAX_NOTES_LENGTH, MAX_PURCHASE_AGE_YEARS, MAX_PURCHASE_PRICE,
    MAX_SHARES,
};
use crate::symbols::normalize_symbol;
use crate::validation::validate_name;
use crate::{Error, Result};

/// A holding of one symbol inside a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub portfolio_id: String,
    pub symbol: String,
    pub shares: Decimal,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A named collection of positions owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: String,
    pub positions: Vec<Position>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Portfolio {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Distinct symbols held, in position order.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = Vec::new();
        for position in &self.positions {
            if !symbols.contains(&position.symbol) {
                symbols.push(position.symbol.clone());
            }
        }
        symbols
    }
}

/// Input model for creating a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub name: String,
    pub description: Option<String>,
}

impl NewPortfolio {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name, "Portfolio")?;
        validate_description(self.description.as_deref())
    }
}

/// Input model for renaming or re-describing a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    pub name: String,
    pub description: Option<String>,
}

impl PortfolioUpdate {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name, "Portfolio")?;
        validate_description(self.description.as_deref())
    }
}

/// Input model for adding a position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPosition {
    pub symbol: String,
    pub shares: Decimal,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    pub notes: Option<String>,
}

impl NewPosition {
    /// Validates against `today` and returns the input with a normalized
    /// symbol and trimmed notes.
    pub fn validated(self, today: NaiveDate) -> Result<Self> {
        let symbol = normalize_symbol(&self.symbol)?;
        validate_shares(self.shares)?;
        validate_purchase_price(self.purchase_price)?;
        validate_purchase_date(self.purchase_date, today)?;
        let notes = clean_notes(self.notes)?;
        Ok(Self {
            symbol,
            notes,
            ..self
        })
    }
}

/// Partial update of a position. The symbol is fixed at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    pub shares: Option<Decimal>,
    pub purchase_price: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl PositionUpdate {
    pub fn validated(self, today: NaiveDate) -> Result<Self> {
        if let Some(shares) = self.shares {
            validate_shares(shares)?;
        }
        if let Some(price) = self.purchase_price {
            validate_purchase_price(price)?;
        }
        if let Some(date) = self.purchase_date {
            validate_purchase_date(date, today)?;
        }
        let notes = match self.notes {
            Some(notes) => clean_notes(Some(notes))?.or(Some(String::new())),
            None => None,
        };
        Ok(Self { notes, ..self })
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_none()
            && self.purchase_price.is_none()
            && self.purchase_date.is_none()
            && self.notes.is_none()
    }

    /// Applies the update on top of an existing position.
    ///
    /// An empty `notes` string clears the notes.
    pub fn apply_to(&self, position: &mut Position) {
        if let Some(shares) = self.shares {
            position.shares = shares;
        }
        if let Some(price) = self.purchase_price {
            position.purchase_price = price;
        }
        if let Some(date) = self.purchase_date {
            position.purchase_date = date;
        }
        if let Some(notes) = &self.notes {
            position.notes = if notes.is_empty() {
                None
            } else {
                Some(notes.clone())
            };
        }
    }
}

// === Field validators ===

fn validate_description(description: Option<&str>) -> Result<()> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LENGTH => Err(Error::invalid_input(format!(
            "Description cannot exceed {} characters",
            MAX_DESCRIPTION_LENGTH
        ))),
        _ => Ok(()),
    }
}

fn validate_shares(shares: Decimal) -> Result<()> {
    if shares <= Decimal::ZERO {
        return Err(Error::invalid_input("Shares must be greater than 0"));
    }
    if shares > Decimal::from(MAX_SHARES) {
        return Err(Error::invalid_input(format!(
            "Shares cannot exceed {}",
            MAX_SHARES
        )));
    }
    Ok(())
}

fn validate_purchase_price(price: Decimal) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(Error::invalid_input("Purchase price must be greater than 0"));
    }
    if price > Decimal::from(MAX_PURCHASE_PRICE) {
        return Err(Error::invalid_input(format!(
            "Purchase price cannot exceed {}",
            MAX_PURCHASE_PRICE
        )));
    }
    Ok(())
}

/// Purchase date must lie within `[today - 50y, today]`.
fn validate_purchase_date(date: NaiveDate, today: NaiveDate) -> Result<()> {
    if date > today {
        return Err(Error::invalid_input("Purchase date cannot be in the future"));
    }
    let earliest = today
        .checked_sub_months(Months::new(MAX_PURCHASE_AGE_YEARS as u32 * 12))
        .unwrap_or(NaiveDate::MIN);
    if date < earliest {
        return Err(Error::invalid_input(format!(
            "Purchase date cannot be more than {} years ago",
            MAX_PURCHASE_AGE_YEARS
        )));
    }
    Ok(())
}

fn clean_notes(notes: Option<String>) -> Result<Option<String>> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    let trimmed = notes.trim();
    if trimmed.chars().count() > MAX_NOTES_LENGTH {
        return Err(Error::invalid_input(format!(
            "Notes cannot exceed {} characters",
            MAX_NOTES_LENGTH
        )));
    }
    Ok(if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    })
}
