//! Progressive income tax calculation.
//!
//! This module implements the monthly second-category income tax
//! (Ley sobre Impuesto a la Renta, article 43) as a marginal schedule: each
//! bracket's rate applies only to the slice of income inside that bracket.
//!
//! Published schedules also list a rebate per bracket ("cantidad a rebajar"),
//! which is the closed form of the same computation: `base * rate - rebate`
//! for the bracket containing `base`. The engine computes slice by slice and
//! never subtracts the rebate, so rebates cannot be applied cumulatively by
//! mistake; [`implied_rebates`] lets configuration loading check a published
//! rebate column against the schedule.

use rust_decimal::Decimal;

use crate::config::TaxBracket;
use crate::models::AuditStep;

use super::rounding::{money_str, rate_str};

/// Legal reference for the monthly income tax.
pub const INCOME_TAX_CLAUSE: &str = "LIR art. 43 N°1";

/// Computes the progressive tax on `taxable_base`.
///
/// `brackets` must be expressed in the same unit as `taxable_base`, ordered by
/// ascending upper bound, with only the last bracket unbounded. A base at or
/// below zero owes nothing. Income beyond the last bounded bracket is untaxed.
///
/// An amount exactly on a bracket's upper bound belongs to that bracket (the
/// bound is inclusive, the next bracket starts strictly above it). Because
/// the schedule is marginal the total is continuous, so the tie-break only
/// decides which marginal rate is reported.
///
/// # Examples
///
/// ```
/// use payroll_cost_engine::calculation::calculate_tax;
/// use payroll_cost_engine::config::TaxBracket;
/// use rust_decimal::Decimal;
///
/// let brackets = vec![
///     TaxBracket {
///         upper_bound: Some(Decimal::new(100, 0)),
///         rate: Decimal::ZERO,
///         rebate: Decimal::ZERO,
///     },
///     TaxBracket {
///         upper_bound: None,
///         rate: Decimal::new(10, 2),
///         rebate: Decimal::new(10, 0),
///     },
/// ];
/// assert_eq!(calculate_tax(Decimal::new(150, 0), &brackets), Decimal::new(5, 0));
/// assert_eq!(calculate_tax(Decimal::new(-10, 0), &brackets), Decimal::ZERO);
/// ```
pub fn calculate_tax(taxable_base: Decimal, brackets: &[TaxBracket]) -> Decimal {
    if taxable_base <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;
    for bracket in brackets {
        let upper = match bracket.upper_bound {
            Some(bound) => bound.min(taxable_base),
            None => taxable_base,
        };
        if upper > lower {
            tax += (upper - lower) * bracket.rate;
        }
        match bracket.upper_bound {
            Some(bound) if bound < taxable_base => lower = bound,
            _ => break,
        }
    }
    tax
}

/// Returns the index of the bracket containing `taxable_base`.
///
/// `None` when the base is above every bounded bracket of a schedule without
/// an unbounded top bracket.
pub fn bracket_index(taxable_base: Decimal, brackets: &[TaxBracket]) -> Option<usize> {
    brackets.iter().position(|bracket| match bracket.upper_bound {
        Some(bound) => taxable_base <= bound,
        None => true,
    })
}

/// Converts a schedule into another unit (e.g., UTM to CLP).
pub fn scale_brackets(brackets: &[TaxBracket], unit_value: Decimal) -> Vec<TaxBracket> {
    brackets
        .iter()
        .map(|bracket| TaxBracket {
            upper_bound: bracket.upper_bound.map(|bound| bound * unit_value),
            rate: bracket.rate,
            rebate: bracket.rebate * unit_value,
        })
        .collect()
}

/// Returns the rebate each bracket must publish for `base * rate - rebate`
/// to equal the marginal computation.
pub fn implied_rebates(brackets: &[TaxBracket]) -> Vec<Decimal> {
    let mut lower = Decimal::ZERO;
    brackets
        .iter()
        .map(|bracket| {
            let rebate = lower * bracket.rate - calculate_tax(lower, brackets);
            if let Some(bound) = bracket.upper_bound {
                lower = bound;
            }
            rebate
        })
        .collect()
}

/// The result of the monthly income tax step.
#[derive(Debug, Clone)]
pub struct IncomeTaxResult {
    /// Tax owed, unrounded.
    pub tax: Decimal,
    /// Zero-based index of the bracket containing the base.
    pub bracket_index: Option<usize>,
    /// Marginal rate of that bracket (zero when none applies).
    pub marginal_rate: Decimal,
    /// True when the base exceeds the last bounded bracket.
    pub brackets_exhausted: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the monthly income tax on a CLP base with a UTM schedule.
///
/// # Arguments
///
/// * `taxable_base` - Taxable income in CLP
/// * `brackets_utm` - Schedule with bounds and rebates in UTM
/// * `utm_clp` - UTM value in CLP used to convert the schedule
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_income_tax(
    taxable_base: Decimal,
    brackets_utm: &[TaxBracket],
    utm_clp: Decimal,
    step_number: u32,
) -> IncomeTaxResult {
    let brackets = scale_brackets(brackets_utm, utm_clp);
    let tax = calculate_tax(taxable_base, &brackets);
    let index = bracket_index(taxable_base, &brackets);
    let marginal_rate = index.map_or(Decimal::ZERO, |i| brackets[i].rate);
    let brackets_exhausted = taxable_base > Decimal::ZERO && index.is_none();
    let base_utm = taxable_base
        .checked_div(utm_clp)
        .map(|utm| utm.round_dp(2).to_string());

    let reasoning = match index {
        _ if taxable_base <= Decimal::ZERO => {
            format!("Taxable base ${} is not positive, no tax due", money_str(taxable_base))
        }
        Some(i) => format!(
            "Taxable base ${} ({} UTM) falls in bracket {} at {} marginal, tax ${}",
            money_str(taxable_base),
            base_utm.clone().unwrap_or_default(),
            i + 1,
            rate_str(marginal_rate),
            money_str(tax)
        ),
        None => format!(
            "Taxable base ${} exceeds the last bracket, income above it untaxed, tax ${}",
            money_str(taxable_base),
            money_str(tax)
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax".to_string(),
        rule_name: "Monthly Income Tax".to_string(),
        clause_ref: INCOME_TAX_CLAUSE.to_string(),
        input: serde_json::json!({
            "taxable_base": money_str(taxable_base),
            "taxable_base_utm": base_utm,
            "utm_clp": money_str(utm_clp),
            "brackets": brackets_utm.len()
        }),
        output: serde_json::json!({
            "tax": money_str(tax),
            "bracket": index.map(|i| i + 1),
            "marginal_rate": rate_str(marginal_rate)
        }),
        reasoning,
    };

    IncomeTaxResult {
        tax,
        bracket_index: index,
        marginal_rate,
        brackets_exhausted,
        audit_step,
    }
}
