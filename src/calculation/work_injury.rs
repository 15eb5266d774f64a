//! Work-injury insurance calculation.
//!
//! This module resolves the employer's work-injury insurance rate under
//! Ley 16.744 and applies it to the pension base. The rate is resolved in
//! priority order:
//!
//! 1. a caller-supplied total rate;
//! 2. caller-supplied component rates (basic + additional + extra);
//! 3. the parameter version's base rate, then its risk-level table, then the
//!    engine's fallback rate.

use rust_decimal::Decimal;

use crate::config::WorkInjuryParameters;
use crate::models::{AuditStep, RiskLevel, WorkInjuryOverride, WorkInjuryRateSource};

use super::rounding::{money_str, rate_str};

/// Legal reference for work-injury insurance.
pub const WORK_INJURY_CLAUSE: &str = "Ley 16.744 art. 15";

/// A resolved work-injury rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkInjuryRate {
    /// Basic component.
    pub base_rate: Decimal,
    /// Everything above the basic component.
    pub additional_rate: Decimal,
    /// Rate actually charged.
    pub total_rate: Decimal,
    /// Resolution path that produced the rate.
    pub source: WorkInjuryRateSource,
}

/// Resolves the work-injury rate for a computation.
///
/// Without a component override, the reported base rate is the version's
/// base rate (or `fallback_rate` when it has none) and the additional rate is
/// whatever the total adds on top of it.
///
/// # Examples
///
/// ```
/// use payroll_cost_engine::calculation::resolve_work_injury_rate;
/// use payroll_cost_engine::config::WorkInjuryParameters;
/// use payroll_cost_engine::models::{RiskLevel, WorkInjuryOverride, WorkInjuryRateSource};
/// use rust_decimal::Decimal;
///
/// let params = WorkInjuryParameters {
///     base_rate: Some(Decimal::new(93, 4)),
///     ..Default::default()
/// };
/// let total = WorkInjuryOverride::total(Decimal::new(264, 4));
/// let fallback = Decimal::new(93, 4);
/// let rate = resolve_work_injury_rate(&params, RiskLevel::High, Some(&total), fallback);
///
/// assert_eq!(rate.total_rate, Decimal::new(264, 4));
/// assert_eq!(rate.additional_rate, Decimal::new(171, 4));
/// assert_eq!(rate.source, WorkInjuryRateSource::OverrideTotal);
/// ```
pub fn resolve_work_injury_rate(
    params: &WorkInjuryParameters,
    risk: RiskLevel,
    work_injury_override: Option<&WorkInjuryOverride>,
    fallback_rate: Decimal,
) -> WorkInjuryRate {
    let parameter_base = params.base_rate.unwrap_or(fallback_rate);
    let table_rate = params.risk_levels.rate_for(risk);
    let (default_total, default_source) = match (params.base_rate, table_rate) {
        (Some(base), _) => (base, WorkInjuryRateSource::ParameterBaseRate),
        (None, Some(rate)) => (rate, WorkInjuryRateSource::RiskLevelTable),
        (None, None) => (fallback_rate, WorkInjuryRateSource::Fallback),
    };

    match work_injury_override {
        Some(WorkInjuryOverride::TotalRate(o)) => WorkInjuryRate {
            base_rate: parameter_base,
            additional_rate: o.total_rate - parameter_base,
            total_rate: o.total_rate,
            source: WorkInjuryRateSource::OverrideTotal,
        },
        Some(WorkInjuryOverride::ComponentRates(o)) => {
            let base_rate = o.basic_rate.unwrap_or(default_total);
            let additional_rate =
                o.additional_rate.unwrap_or(Decimal::ZERO) + o.extra_rate.unwrap_or(Decimal::ZERO);
            WorkInjuryRate {
                base_rate,
                additional_rate,
                total_rate: base_rate + additional_rate,
                source: WorkInjuryRateSource::OverrideComponents,
            }
        }
        None => WorkInjuryRate {
            base_rate: parameter_base,
            additional_rate: default_total - parameter_base,
            total_rate: default_total,
            source: default_source,
        },
    }
}

/// The result of the work-injury step.
#[derive(Debug, Clone)]
pub struct WorkInjuryResult {
    /// The resolved rate.
    pub rate: WorkInjuryRate,
    /// Employer contribution.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Resolves the rate and computes the employer work-injury contribution.
///
/// # Arguments
///
/// * `imponible_base` - Pension base in CLP
/// * `params` - The version's work-injury parameters
/// * `risk` - Risk level of the activity
/// * `work_injury_override` - Caller-supplied rate, if any
/// * `fallback_rate` - Rate used when the parameters carry none
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_work_injury(
    imponible_base: Decimal,
    params: &WorkInjuryParameters,
    risk: RiskLevel,
    work_injury_override: Option<&WorkInjuryOverride>,
    fallback_rate: Decimal,
    step_number: u32,
) -> WorkInjuryResult {
    let rate = resolve_work_injury_rate(params, risk, work_injury_override, fallback_rate);
    let amount = imponible_base * rate.total_rate;

    let source = match rate.source {
        WorkInjuryRateSource::OverrideTotal => "override total rate".to_string(),
        WorkInjuryRateSource::OverrideComponents => "override component rates".to_string(),
        WorkInjuryRateSource::ParameterBaseRate => "parameter base rate".to_string(),
        WorkInjuryRateSource::RiskLevelTable => format!("{} risk table rate", risk.as_str()),
        WorkInjuryRateSource::Fallback => "fallback rate".to_string(),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "work_injury_employer".to_string(),
        rule_name: "Work Injury Insurance".to_string(),
        clause_ref: WORK_INJURY_CLAUSE.to_string(),
        input: serde_json::json!({
            "imponible_base": money_str(imponible_base),
            "work_injury_risk": risk.as_str(),
            "override": work_injury_override.is_some()
        }),
        output: serde_json::json!({
            "base_rate": rate_str(rate.base_rate),
            "additional_rate": rate_str(rate.additional_rate),
            "total_rate": rate_str(rate.total_rate),
            "amount": money_str(amount)
        }),
        reasoning: format!(
            "Using {}: ${} x {} = ${}",
            source,
            money_str(imponible_base),
            rate_str(rate.total_rate),
            money_str(amount)
        ),
    };

    WorkInjuryResult {
        rate,
        amount,
        audit_step,
    }
}
