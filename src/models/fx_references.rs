//! Currency reference models.
//!
//! UF, UTM and IMM values anchor every CLP-denominated cap and bracket used by
//! the engine. These types describe what a caller asks for and what the
//! resolver hands back.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Largest accepted UF, UTM or IMM value, one billion CLP.
pub const MAX_REFERENCE_CLP: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// A request for currency references. Explicit values pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FxReferenceRequest {
    /// Explicit UF value in CLP.
    pub uf_value: Option<Decimal>,
    /// Date whose UF value should be used.
    pub uf_date: Option<NaiveDate>,
    /// Explicit UTM value in CLP.
    pub utm_value: Option<Decimal>,
    /// Month (`YYYY-MM`) whose UTM value should be used.
    pub utm_month: Option<String>,
}

/// Resolved currency conversion anchors for one computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FxReferences {
    /// UF value in CLP.
    pub uf_clp: Decimal,
    /// Date the UF value belongs to, when known.
    pub uf_date: Option<NaiveDate>,
    /// UTM value in CLP.
    pub utm_clp: Decimal,
    /// Month the UTM value belongs to, when known.
    pub utm_month: Option<String>,
    /// Monthly minimum wage (IMM) in CLP.
    pub imm_clp: Decimal,
}

impl FxReferences {
    /// Rejects references that are not positive or exceed [`MAX_REFERENCE_CLP`].
    pub fn validate(&self) -> EngineResult<()> {
        ensure_reference_value("uf_clp", self.uf_clp)?;
        ensure_reference_value("utm_clp", self.utm_clp)?;
        ensure_reference_value("imm_clp", self.imm_clp)
    }
}

pub(crate) fn ensure_reference_value(field: &str, value: Decimal) -> EngineResult<()> {
    if value <= Decimal::ZERO {
        return Err(EngineError::invalid_input(field, "must be greater than zero"));
    }
    if value > MAX_REFERENCE_CLP {
        return Err(EngineError::invalid_input(
            field,
            format!("must not exceed {}", MAX_REFERENCE_CLP),
        ));
    }
    Ok(())
}

/// Parses a `YYYY-MM` month into its first day.
///
/// # Examples
///
/// ```
/// use payroll_cost_engine::models::parse_year_month;
/// use chrono::NaiveDate;
///
/// assert_eq!(parse_year_month("2025-07"), NaiveDate::from_ymd_opt(2025, 7, 1));
/// assert_eq!(parse_year_month("2025-13"), None);
/// assert_eq!(parse_year_month("July 2025"), None);
/// ```
pub fn parse_year_month(month: &str) -> Option<NaiveDate> {
    let (year, month) = month.trim().split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// Formats the month of `date` as `YYYY-MM`.
pub fn format_year_month(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
