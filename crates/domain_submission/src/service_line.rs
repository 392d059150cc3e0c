//! Claim service lines
//!
//! Each line bills a service code over a date range for one provider.
//! `total_amount` is never set directly: it is recomputed from
//! `quantity * unit_price` whenever either side changes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{Currency, DateRange, Money, ServiceLineId};
use crate::error::SubmissionError;

/// A billed service on a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct ServiceLine {
    id: ServiceLineId,
    #[validate(length(min = 1))]
    code: String,
    #[validate(length(min = 1))]
    description: String,
    #[validate(range(min = 1))]
    quantity: u32,
    unit_price: Money,
    total_amount: Money,
    date_range: DateRange,
    #[validate(length(min = 1))]
    provider_id: String,
    #[validate(length(min = 1))]
    provider_name: String,
}

/// Input for a service line as entered on the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLineDraft {
    pub code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub date_range: DateRange,
    pub provider_id: String,
    pub provider_name: String,
}

/// A single edit applied to a service line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceLineEdit {
    Code(String),
    Description(String),
    Quantity(u32),
    UnitPrice(Decimal),
    DateRange(DateRange),
    Provider { id: String, name: String },
}

impl ServiceLine {
    /// Creates an empty line for a single service date, as the form does
    /// when the user clicks "add line"
    pub fn blank(currency: Currency, service_date: NaiveDate) -> Self {
        Self {
            id: ServiceLineId::new_v7(),
            code: String::new(),
            description: String::new(),
            quantity: 1,
            unit_price: Money::zero(currency),
            total_amount: Money::zero(currency),
            date_range: DateRange::single(service_date),
            provider_id: String::new(),
            provider_name: String::new(),
        }
    }

    /// Builds a line from form input
    ///
    /// # Errors
    ///
    /// Returns a validation error for a negative price and `Money::Overflow`
    /// if the total cannot be represented.
    pub fn from_draft(draft: ServiceLineDraft, currency: Currency) -> Result<Self, SubmissionError> {
        let unit_price = non_negative_price(draft.unit_price, currency)?;
        let total_amount = unit_price.times(draft.quantity)?;

        Ok(Self {
            id: ServiceLineId::new_v7(),
            code: draft.code,
            description: draft.description,
            quantity: draft.quantity,
            unit_price,
            total_amount,
            date_range: draft.date_range,
            provider_id: draft.provider_id,
            provider_name: draft.provider_name,
        })
    }

    pub fn id(&self) -> ServiceLineId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn date_range(&self) -> &DateRange {
        &self.date_range
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), SubmissionError> {
        self.total_amount = self.unit_price.times(quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    pub fn set_unit_price(&mut self, unit_price: Decimal) -> Result<(), SubmissionError> {
        let price = non_negative_price(unit_price, self.unit_price.currency())?;
        self.total_amount = price.times(self.quantity)?;
        self.unit_price = price;
        Ok(())
    }

    /// Applies an edit, keeping the total consistent
    pub fn apply(&mut self, edit: ServiceLineEdit) -> Result<(), SubmissionError> {
        match edit {
            ServiceLineEdit::Code(code) => self.code = code,
            ServiceLineEdit::Description(description) => self.description = description,
            ServiceLineEdit::Quantity(quantity) => self.set_quantity(quantity)?,
            ServiceLineEdit::UnitPrice(price) => self.set_unit_price(price)?,
            ServiceLineEdit::DateRange(range) => self.date_range = range,
            ServiceLineEdit::Provider { id, name } => {
                self.provider_id = id;
                self.provider_name = name;
            }
        }
        Ok(())
    }

    /// Names of the fields that stop this line from being complete
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing: Vec<String> = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors.field_errors().keys().map(|k| k.to_string()).collect(),
        };

        for (name, value) in [
            ("code", &self.code),
            ("description", &self.description),
            ("provider_id", &self.provider_id),
            ("provider_name", &self.provider_name),
        ] {
            if value.trim().is_empty() && !missing.iter().any(|m| m == name) {
                missing.push(name.to_string());
            }
        }
        if !self.unit_price.is_positive() {
            missing.push("unit_price".to_string());
        }

        missing.sort();
        missing
    }

    pub fn is_fully_populated(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

fn non_negative_price(amount: Decimal, currency: Currency) -> Result<Money, SubmissionError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(SubmissionError::validation(format!(
            "Unit price cannot be negative: {amount}"
        )));
    }
    Ok(Money::new(amount, currency))
}

/// The service lines of one claim form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceLines {
    currency: Currency,
    lines: Vec<ServiceLine>,
}

impl ServiceLines {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            lines: Vec::new(),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Appends a line
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::Money` if the line is priced in another currency.
    pub fn add(&mut self, line: ServiceLine) -> Result<ServiceLineId, SubmissionError> {
        if line.unit_price.currency() != self.currency {
            return Err(
                core_kernel::MoneyError::CurrencyMismatch(self.currency, line.unit_price.currency()).into(),
            );
        }
        let id = line.id;
        self.lines.push(line);
        Ok(id)
    }

    /// Adds an empty line for the given service date
    pub fn add_blank(&mut self, service_date: NaiveDate) -> ServiceLineId {
        let line = ServiceLine::blank(self.currency, service_date);
        let id = line.id;
        self.lines.push(line);
        id
    }

    pub fn add_draft(&mut self, draft: ServiceLineDraft) -> Result<ServiceLineId, SubmissionError> {
        let line = ServiceLine::from_draft(draft, self.currency)?;
        self.add(line)
    }

    pub fn remove(&mut self, id: ServiceLineId) -> Result<ServiceLine, SubmissionError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| SubmissionError::ServiceLineNotFound(id.to_string()))?;
        Ok(self.lines.remove(index))
    }

    pub fn edit(&mut self, id: ServiceLineId, edit: ServiceLineEdit) -> Result<&ServiceLine, SubmissionError> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| SubmissionError::ServiceLineNotFound(id.to_string()))?;
        line.apply(edit)?;
        Ok(line)
    }

    pub fn get(&self, id: ServiceLineId) -> Option<&ServiceLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceLine> {
        self.lines.iter()
    }

    pub fn as_slice(&self) -> &[ServiceLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of every line's total
    pub fn grand_total(&self) -> Result<Money, SubmissionError> {
        Ok(Money::sum(self.currency, self.lines.iter().map(|l| &l.total_amount))?)
    }
}
