//! Legal gratification calculation.
//!
//! This module computes the monthly legal gratification under the 25% regime
//! of article 50 of the Código del Trabajo: a quarter of the base salary,
//! capped at 4.75 monthly minimum wages per year.

use rust_decimal::Decimal;

use crate::config::MonthlyGratificationRule;
use crate::models::AuditStep;

use super::rounding::{money_str, rate_str};

/// Legal reference for the monthly gratification.
pub const GRATIFICATION_CLAUSE: &str = "CT art. 50";

/// The result of the gratification step.
#[derive(Debug, Clone)]
pub struct GratificationResult {
    /// Uncapped monthly gratification (`base_salary * monthly_rate`).
    pub monthly_gratification: Decimal,
    /// Monthly share of the annual cap.
    pub monthly_cap: Decimal,
    /// Gratification actually paid.
    pub gratification: Decimal,
    /// True when the cap limited the payment.
    pub capped: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the monthly gratification for a base salary.
///
/// When `enabled` is false the gratification is zero, but the audit step
/// still records the cap that would have applied.
///
/// # Arguments
///
/// * `base_salary` - Monthly base salary in CLP
/// * `rule` - The 25% monthly regime parameters
/// * `imm_clp` - Monthly minimum wage in CLP
/// * `enabled` - Whether gratification is part of the cost
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use payroll_cost_engine::calculation::calculate_gratification;
/// use payroll_cost_engine::config::MonthlyGratificationRule;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rule = MonthlyGratificationRule {
///     monthly_rate: Decimal::from_str("0.25").unwrap(),
///     annual_cap_imm_multiple: Decimal::from_str("4.75").unwrap(),
/// };
/// let result =
///     calculate_gratification(Decimal::from(600_000), &rule, Decimal::from(500_000), true, 1);
/// assert_eq!(result.gratification, Decimal::from(150_000));
/// assert!(!result.capped);
/// ```
pub fn calculate_gratification(
    base_salary: Decimal,
    rule: &MonthlyGratificationRule,
    imm_clp: Decimal,
    enabled: bool,
    step_number: u32,
) -> GratificationResult {
    let monthly_gratification = base_salary * rule.monthly_rate;
    let monthly_cap = imm_clp * rule.annual_cap_imm_multiple / Decimal::from(12);

    let (gratification, capped, reasoning) = if !enabled {
        (
            Decimal::ZERO,
            false,
            "Gratification excluded by assumptions".to_string(),
        )
    } else if monthly_gratification > monthly_cap {
        (
            monthly_cap,
            true,
            format!(
                "${} x {} = ${} exceeds cap ${} x {} / 12 = ${}, capped",
                money_str(base_salary),
                rate_str(rule.monthly_rate),
                money_str(monthly_gratification),
                money_str(imm_clp),
                rate_str(rule.annual_cap_imm_multiple),
                money_str(monthly_cap)
            ),
        )
    } else {
        (
            monthly_gratification,
            false,
            format!(
                "${} x {} = ${}, within cap ${}",
                money_str(base_salary),
                rate_str(rule.monthly_rate),
                money_str(monthly_gratification),
                money_str(monthly_cap)
            ),
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "gratification".to_string(),
        rule_name: "Legal Gratification".to_string(),
        clause_ref: GRATIFICATION_CLAUSE.to_string(),
        input: serde_json::json!({
            "base_salary": money_str(base_salary),
            "monthly_rate": rate_str(rule.monthly_rate),
            "imm_clp": money_str(imm_clp),
            "annual_cap_imm_multiple": rate_str(rule.annual_cap_imm_multiple),
            "enabled": enabled
        }),
        output: serde_json::json!({
            "monthly_gratification": money_str(monthly_gratification),
            "monthly_cap": money_str(monthly_cap),
            "gratification": money_str(gratification),
            "capped": capped
        }),
        reasoning,
    };

    GratificationResult {
        monthly_gratification,
        monthly_cap,
        gratification,
        capped,
        audit_step,
    }
}
