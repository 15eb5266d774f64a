//! Employer cost result models.
//!
//! This module contains the [`EmployerCostOutput`] type and its associated
//! structures: the itemized employer contributions, provisions, the worker
//! net salary estimate and the audit trace.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ParametersSnapshot, ResolvedAssumptions};

/// Contribution ceilings converted to CLP for this computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsClp {
    /// Pension ceiling in CLP.
    pub pension_cap: Decimal,
    /// Unemployment insurance ceiling in CLP.
    pub afc_cap: Decimal,
}

/// Employer unemployment insurance contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfcEmployerBreakdown {
    /// Individual account rate.
    pub cic_rate: Decimal,
    /// Solidarity fund rate.
    pub fcs_rate: Decimal,
    /// Individual account contribution.
    pub cic: Decimal,
    /// Solidarity fund contribution.
    pub fcs: Decimal,
    /// Sum of both contributions.
    pub total: Decimal,
}

/// Where the work-injury rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkInjuryRateSource {
    /// A caller-supplied total rate.
    OverrideTotal,
    /// Caller-supplied component rates.
    OverrideComponents,
    /// The parameter version's base rate.
    ParameterBaseRate,
    /// The parameter version's risk-level table.
    RiskLevelTable,
    /// The engine's fallback rate.
    Fallback,
}

/// Employer work-injury insurance contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInjuryBreakdown {
    /// Basic component of the rate.
    pub base_rate: Decimal,
    /// Everything above the basic component.
    pub additional_rate: Decimal,
    /// Rate actually charged.
    pub total_rate: Decimal,
    /// Resolution path that produced the rate.
    pub source: WorkInjuryRateSource,
    /// Contribution amount.
    pub amount: Decimal,
}

/// Allowances the engine does not model yet.
///
/// Every field is always zero. They are part of the output contract so
/// consumers can bind to them before the allowances are implemented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherAllowances {
    /// Overtime pay.
    pub overtime: Decimal,
    /// Transport allowance (movilización).
    pub transport_allowance: Decimal,
    /// Meal allowance (colación).
    pub meal_allowance: Decimal,
    /// Family allowance (asignación familiar).
    pub family_allowance: Decimal,
}

/// Estimate of the worker's deductions and take-home pay.
///
/// Informational only: none of these amounts are part of the employer cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerBreakdownEstimate {
    /// Base salary plus gratification.
    pub gross_income: Decimal,
    /// Pension base after the cap.
    pub imponible_pension: Decimal,
    /// Unemployment insurance base after the cap.
    pub imponible_afc: Decimal,
    /// Mandatory pension rate plus AFP commission.
    pub afp_rate: Decimal,
    /// Pension contribution.
    pub afp: Decimal,
    /// Health deduction rate.
    pub health_rate: Decimal,
    /// Health deduction.
    pub health: Decimal,
    /// Worker unemployment insurance rate.
    pub afc_rate: Decimal,
    /// Worker unemployment insurance contribution.
    pub afc: Decimal,
    /// Income subject to the monthly income tax.
    pub taxable_base: Decimal,
    /// Monthly income tax.
    pub tax: Decimal,
    /// Sum of all deductions.
    pub total_deductions: Decimal,
    /// Gross income minus deductions.
    pub net_salary_estimate: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the legal provision for this rule.
    pub clause_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag results that are valid but worth a second look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// The complete result of an employer cost computation.
///
/// Every monetary figure (the fields listed by [`monetary_fields`]) is rounded
/// to two decimal places. Rates are exempt from that rule and are reported
/// exactly as resolved: `afc_employer.cic_rate` and `fcs_rate`, the three
/// `work_injury_employer` rates, the worker `afp_rate`, `health_rate` and
/// `afc_rate`, and every rate in `parameters_snapshot`. A rate such as
/// `0.1127` keeps its four decimals.
///
/// [`monetary_fields`]: EmployerCostOutput::monetary_fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerCostOutput {
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Monthly legal gratification after the cap.
    pub gratification: Decimal,
    /// Base salary plus gratification.
    pub total_imponible: Decimal,
    /// Contribution ceilings in CLP.
    pub caps: CapsClp,
    /// Base for SIS and work-injury insurance.
    pub imponible_base: Decimal,
    /// Base for unemployment insurance.
    pub afc_base: Decimal,
    /// Employer unemployment insurance.
    pub afc_employer: AfcEmployerBreakdown,
    /// Employer SIS contribution.
    pub sis_employer: Decimal,
    /// Employer work-injury insurance.
    pub work_injury_employer: WorkInjuryBreakdown,
    /// Allowances not modelled yet, always zero.
    pub other_allowances: OtherAllowances,
    /// Wages plus employer contributions.
    pub direct_cost: Decimal,
    /// Vacation provision.
    pub vacation_provision: Decimal,
    /// Severance provision.
    pub severance_provision: Decimal,
    /// Total monthly employer cost.
    pub total_cost: Decimal,
    /// Worker deductions and net salary estimate.
    pub worker_breakdown_estimate: WorkerBreakdownEstimate,
    /// Total cost as a percentage of the net salary.
    ///
    /// `None` when the net salary estimate is zero or negative, where a ratio
    /// would be meaningless.
    pub cost_to_net_ratio: Option<Decimal>,
    /// Assumptions after defaults were applied.
    pub assumptions_applied: ResolvedAssumptions,
    /// Parameter version and references used.
    pub parameters_snapshot: ParametersSnapshot,
    /// Calculation steps and warnings.
    pub audit_trace: AuditTrace,
    /// Version of the engine that produced the result.
    pub engine_version: String,
    /// When the computation ran.
    pub computed_at: DateTime<Utc>,
}

impl EmployerCostOutput {
    /// Returns every monetary figure of the output, labelled by field path.
    pub fn monetary_fields(&self) -> Vec<(&'static str, Decimal)> {
        let worker = &self.worker_breakdown_estimate;
        let allowances = &self.other_allowances;
        vec![
            ("base_salary", self.base_salary),
            ("gratification", self.gratification),
            ("total_imponible", self.total_imponible),
            ("caps.pension_cap", self.caps.pension_cap),
            ("caps.afc_cap", self.caps.afc_cap),
            ("imponible_base", self.imponible_base),
            ("afc_base", self.afc_base),
            ("afc_employer.cic", self.afc_employer.cic),
            ("afc_employer.fcs", self.afc_employer.fcs),
            ("afc_employer.total", self.afc_employer.total),
            ("sis_employer", self.sis_employer),
            ("work_injury_employer.amount", self.work_injury_employer.amount),
            ("other_allowances.overtime", allowances.overtime),
            ("other_allowances.transport_allowance", allowances.transport_allowance),
            ("other_allowances.meal_allowance", allowances.meal_allowance),
            ("other_allowances.family_allowance", allowances.family_allowance),
            ("direct_cost", self.direct_cost),
            ("vacation_provision", self.vacation_provision),
            ("severance_provision", self.severance_provision),
            ("total_cost", self.total_cost),
            ("worker.gross_income", worker.gross_income),
            ("worker.imponible_pension", worker.imponible_pension),
            ("worker.imponible_afc", worker.imponible_afc),
            ("worker.afp", worker.afp),
            ("worker.health", worker.health),
            ("worker.afc", worker.afc),
            ("worker.taxable_base", worker.taxable_base),
            ("worker.tax", worker.tax),
            ("worker.total_deductions", worker.total_deductions),
            ("worker.net_salary_estimate", worker.net_salary_estimate),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_source_serialization() {
        let json = serde_json::to_string(&WorkInjuryRateSource::OverrideTotal).unwrap();
        assert_eq!(json, "\"override_total\"");

        let json = serde_json::to_string(&WorkInjuryRateSource::RiskLevelTable).unwrap();
        assert_eq!(json, "\"risk_level_table\"");
    }

    #[test]
    fn test_other_allowances_default_to_zero() {
        let allowances = OtherAllowances::default();
        assert!(allowances.overtime.is_zero());
        assert!(allowances.transport_allowance.is_zero());
        assert!(allowances.meal_allowance.is_zero());
        assert!(allowances.family_allowance.is_zero());
    }

    #[test]
    fn test_audit_warning_serialization() {
        let warning = AuditWarning {
            code: "NET_SALARY_NOT_POSITIVE".to_string(),
            message: "Net salary estimate is 0".to_string(),
            severity: "high".to_string(),
        };

        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"code\":\"NET_SALARY_NOT_POSITIVE\""));
        assert!(json.contains("\"severity\":\"high\""));
    }

    #[test]
    fn test_audit_trace_serialization() {
        let trace = AuditTrace {
            steps: vec![AuditStep {
                step_number: 1,
                rule_id: "gratification".to_string(),
                rule_name: "Legal Gratification".to_string(),
                clause_ref: "CT art. 50".to_string(),
                input: serde_json::json!({}),
                output: serde_json::json!({}),
                reasoning: "Test reasoning".to_string(),
            }],
            warnings: vec![],
        };

        let json = serde_json::to_string(&trace).unwrap();
        assert!(json.contains("\"steps\":["));
        assert!(json.contains("\"step_number\":1"));
        assert!(json.contains("\"warnings\":[]"));
    }
}
