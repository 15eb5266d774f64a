//! Worker deductions and net salary estimate.
//!
//! Informational only: the worker's pension, health and unemployment
//! contributions plus the monthly income tax, used to project take-home pay.
//! None of these amounts are part of the employer cost.

use rust_decimal::Decimal;

use crate::config::TaxBracket;
use crate::models::AuditStep;

use super::rounding::{money_str, rate_str};
use super::tax::{IncomeTaxResult, calculate_income_tax};

/// Legal references for the worker's social security deductions.
pub const WORKER_DEDUCTIONS_CLAUSE: &str = "DL 3.500 art. 17; DL 3.500 art. 84; Ley 19.728 art. 5";

/// Rates applied to the worker's contribution bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerContributionRates {
    /// Mandatory pension rate plus the AFP commission.
    pub afp_rate: Decimal,
    /// Health deduction rate.
    pub health_rate: Decimal,
    /// Worker unemployment insurance rate for the contract type.
    pub afc_rate: Decimal,
}

/// The result of the worker deductions step.
#[derive(Debug, Clone)]
pub struct WorkerDeductionsResult {
    /// Base salary plus gratification.
    pub gross_income: Decimal,
    /// Capped pension base.
    pub imponible_pension: Decimal,
    /// Capped unemployment insurance base.
    pub imponible_afc: Decimal,
    /// Rates applied.
    pub rates: WorkerContributionRates,
    /// Pension contribution.
    pub afp: Decimal,
    /// Health deduction.
    pub health: Decimal,
    /// Unemployment insurance contribution.
    pub afc: Decimal,
    /// Gross income minus social security deductions.
    pub taxable_base: Decimal,
    /// Income tax computed on the taxable base.
    pub income_tax: IncomeTaxResult,
    /// Social security deductions plus tax.
    pub total_deductions: Decimal,
    /// Gross income minus every deduction.
    pub net_salary_estimate: Decimal,
    /// The audit step for the social security deductions.
    ///
    /// The tax step lives in `income_tax.audit_step` and is numbered
    /// `step_number + 1`.
    pub audit_step: AuditStep,
}

/// Estimates the worker's deductions and net salary.
///
/// # Arguments
///
/// * `gross_income` - Base salary plus gratification in CLP
/// * `imponible_pension` - Pension base after the cap
/// * `imponible_afc` - Unemployment insurance base after the cap
/// * `rates` - Worker contribution rates
/// * `tax_brackets_utm` - Income tax schedule in UTM
/// * `utm_clp` - UTM value in CLP
/// * `step_number` - Step number of the deductions step; tax takes the next
pub fn calculate_worker_deductions(
    gross_income: Decimal,
    imponible_pension: Decimal,
    imponible_afc: Decimal,
    rates: WorkerContributionRates,
    tax_brackets_utm: &[TaxBracket],
    utm_clp: Decimal,
    step_number: u32,
) -> WorkerDeductionsResult {
    let afp = imponible_pension * rates.afp_rate;
    let health = imponible_pension * rates.health_rate;
    let afc = imponible_afc * rates.afc_rate;
    let taxable_base = gross_income - afp - health - afc;

    let income_tax = calculate_income_tax(taxable_base, tax_brackets_utm, utm_clp, step_number + 1);

    let total_deductions = afp + health + afc + income_tax.tax;
    let net_salary_estimate = gross_income - total_deductions;

    let audit_step = AuditStep {
        step_number,
        rule_id: "worker_deductions".to_string(),
        rule_name: "Worker Social Security Deductions".to_string(),
        clause_ref: WORKER_DEDUCTIONS_CLAUSE.to_string(),
        input: serde_json::json!({
            "gross_income": money_str(gross_income),
            "imponible_pension": money_str(imponible_pension),
            "imponible_afc": money_str(imponible_afc),
            "afp_rate": rate_str(rates.afp_rate),
            "health_rate": rate_str(rates.health_rate),
            "afc_rate": rate_str(rates.afc_rate)
        }),
        output: serde_json::json!({
            "afp": money_str(afp),
            "health": money_str(health),
            "afc": money_str(afc),
            "taxable_base": money_str(taxable_base)
        }),
        reasoning: format!(
            "AFP ${} + health ${} + AFC ${} deducted from ${}, taxable base ${}",
            money_str(afp),
            money_str(health),
            money_str(afc),
            money_str(gross_income),
            money_str(taxable_base)
        ),
    };

    WorkerDeductionsResult {
        gross_income,
        imponible_pension,
        imponible_afc,
        rates,
        afp,
        health,
        afc,
        taxable_base,
        income_tax,
        total_deductions,
        net_salary_estimate,
        audit_step,
    }
}
