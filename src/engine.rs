//! The employer cost engine.
//!
//! [`calculate_employer_cost`] is the synchronous core: given a request, a
//! parameter version and resolved currency references it runs every step of
//! the computation and assembles the rounded result. [`EmployerCostEngine`]
//! wraps it with the two asynchronous lookups that come first.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::calculation::{
    WorkerContributionRates, calculate_contribution_bases, calculate_employer_afc,
    calculate_gratification, calculate_provisions, calculate_sis, calculate_work_injury,
    calculate_worker_deductions, round_money,
};
use crate::config::{EngineDefaults, ParameterVersion};
use crate::error::EngineResult;
use crate::models::{
    AfcEmployerBreakdown, AuditTrace, AuditWarning, CapsClp, EmployerCostInput,
    EmployerCostOutput, FxReferences, OtherAllowances, ResolvedAssumptions, WorkInjuryBreakdown,
    WorkerBreakdownEstimate, create_parameters_snapshot,
};
use crate::resolution::{ParameterProvider, ReferenceResolver};

/// Warning code for a net salary estimate at or below zero.
pub const NET_SALARY_NOT_POSITIVE: &str = "NET_SALARY_NOT_POSITIVE";

/// Warning code for a taxable base above the last bounded tax bracket.
pub const TAX_BRACKETS_EXHAUSTED: &str = "TAX_BRACKETS_EXHAUSTED";

/// Computes the monthly employer cost for `input`.
///
/// Deterministic: the same arguments always produce the same output. Every
/// intermediate amount keeps full precision; monetary fields are rounded to
/// two decimals only when the output is assembled.
///
/// # Errors
///
/// - `InvalidInput` when the request or the references fail validation
/// - `UnknownAfpProvider` when the worker's AFP has no commission entry
pub fn calculate_employer_cost(
    input: &EmployerCostInput,
    version: &ParameterVersion,
    references: &FxReferences,
    defaults: &EngineDefaults,
    computed_at: DateTime<Utc>,
) -> EngineResult<EmployerCostOutput> {
    input.validate()?;
    references.validate()?;

    let params = &version.data;
    let assumptions = ResolvedAssumptions::resolve(input, defaults);
    let commission = params.afp.commission_for(&assumptions.afp_name)?;
    let afc_rates = params.afc.for_contract(input.contract_type);
    let base_salary = input.base_salary_clp;

    let mut steps = Vec::new();
    let mut warnings = Vec::new();
    let mut step_number: u32 = 1;

    let gratification = calculate_gratification(
        base_salary,
        &params.gratification.regime_25_monthly,
        references.imm_clp,
        assumptions.include_gratification,
        step_number,
    );
    steps.push(gratification.audit_step);
    step_number += 1;

    let bases = calculate_contribution_bases(
        base_salary,
        gratification.gratification,
        &params.caps,
        references.uf_clp,
        step_number,
    );
    steps.push(bases.audit_step);
    step_number += 1;

    let afc = calculate_employer_afc(
        bases.afc_base,
        &afc_rates.employer,
        input.contract_type,
        step_number,
    );
    steps.push(afc.audit_step);
    step_number += 1;

    let sis = calculate_sis(bases.imponible_base, &params.sis, step_number);
    steps.push(sis.audit_step);
    step_number += 1;

    let work_injury = calculate_work_injury(
        bases.imponible_base,
        &params.work_injury,
        assumptions.work_injury_risk,
        assumptions.work_injury_override.as_ref(),
        defaults.fallback_work_injury_rate,
        step_number,
    );
    steps.push(work_injury.audit_step);
    step_number += 1;

    let direct_cost =
        base_salary + gratification.gratification + sis.amount + afc.total + work_injury.amount;

    let provisions = calculate_provisions(
        direct_cost,
        assumptions.include_vacation_provision,
        assumptions.vacation_provision_pct,
        assumptions.include_severance_provision,
        assumptions.severance_provision_pct,
        step_number,
    );
    steps.push(provisions.audit_step);
    step_number += 1;

    let worker = calculate_worker_deductions(
        bases.total_imponible,
        bases.imponible_base,
        bases.afc_base,
        WorkerContributionRates {
            afp_rate: defaults.pension_worker_rate + commission.commission_rate,
            health_rate: assumptions.health_rate,
            afc_rate: afc_rates.worker.total_rate,
        },
        &params.tax_brackets,
        references.utm_clp,
        step_number,
    );
    steps.push(worker.audit_step);
    steps.push(worker.income_tax.audit_step);

    if worker.income_tax.brackets_exhausted {
        warnings.push(AuditWarning {
            code: TAX_BRACKETS_EXHAUSTED.to_string(),
            message: format!(
                "Taxable base ${} exceeds the last bounded tax bracket; income above it is untaxed",
                round_money(worker.taxable_base)
            ),
            severity: "medium".to_string(),
        });
    }

    let net_salary = round_money(worker.net_salary_estimate);
    let cost_to_net_ratio = if net_salary > Decimal::ZERO {
        Some(round_money(
            provisions.total_cost / worker.net_salary_estimate * Decimal::ONE_HUNDRED,
        ))
    } else {
        warnings.push(AuditWarning {
            code: NET_SALARY_NOT_POSITIVE.to_string(),
            message: format!(
                "Net salary estimate ${} is not positive; cost to net ratio is undefined",
                net_salary
            ),
            severity: "high".to_string(),
        });
        None
    };

    let parameters_snapshot = create_parameters_snapshot(
        &version.id,
        &params.version_metadata.name,
        version.effective_from,
        version.effective_until,
        params,
        references,
    );

    Ok(EmployerCostOutput {
        base_salary: round_money(base_salary),
        gratification: round_money(gratification.gratification),
        total_imponible: round_money(bases.total_imponible),
        caps: CapsClp {
            pension_cap: round_money(bases.pension_cap),
            afc_cap: round_money(bases.afc_cap),
        },
        imponible_base: round_money(bases.imponible_base),
        afc_base: round_money(bases.afc_base),
        afc_employer: AfcEmployerBreakdown {
            cic_rate: afc.cic_rate,
            fcs_rate: afc.fcs_rate,
            cic: round_money(afc.cic),
            fcs: round_money(afc.fcs),
            total: round_money(afc.total),
        },
        sis_employer: round_money(sis.amount),
        work_injury_employer: WorkInjuryBreakdown {
            base_rate: work_injury.rate.base_rate,
            additional_rate: work_injury.rate.additional_rate,
            total_rate: work_injury.rate.total_rate,
            source: work_injury.rate.source,
            amount: round_money(work_injury.amount),
        },
        other_allowances: OtherAllowances::default(),
        direct_cost: round_money(direct_cost),
        vacation_provision: round_money(provisions.vacation_provision),
        severance_provision: round_money(provisions.severance_provision),
        total_cost: round_money(provisions.total_cost),
        worker_breakdown_estimate: WorkerBreakdownEstimate {
            gross_income: round_money(worker.gross_income),
            imponible_pension: round_money(worker.imponible_pension),
            imponible_afc: round_money(worker.imponible_afc),
            afp_rate: worker.rates.afp_rate,
            afp: round_money(worker.afp),
            health_rate: worker.rates.health_rate,
            health: round_money(worker.health),
            afc_rate: worker.rates.afc_rate,
            afc: round_money(worker.afc),
            taxable_base: round_money(worker.taxable_base),
            tax: round_money(worker.income_tax.tax),
            total_deductions: round_money(worker.total_deductions),
            net_salary_estimate: net_salary,
        },
        cost_to_net_ratio,
        assumptions_applied: assumptions,
        parameters_snapshot,
        audit_trace: AuditTrace { steps, warnings },
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        computed_at,
    })
}

/// Resolves parameters and references, then computes the employer cost.
///
/// The engine holds no mutable state of its own and can be shared freely
/// between tasks. Resolution failures propagate unchanged; there are no
/// retries or timeouts here.
///
/// # Example
///
/// ```no_run
/// use payroll_cost_engine::config::ConfigLoader;
/// use payroll_cost_engine::models::{ContractType, EmployerCostInput};
/// use rust_decimal::Decimal;
///
/// # async fn run() -> payroll_cost_engine::error::EngineResult<()> {
/// let engine = ConfigLoader::load("./config/cl")?.engine()?;
/// let input = EmployerCostInput::new(Decimal::from(1_000_000), ContractType::Indefinite);
///
/// let output = engine.compute_employer_cost(&input).await?;
/// println!("Total cost: {}", output.total_cost);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EmployerCostEngine {
    parameters: Arc<dyn ParameterProvider>,
    references: Arc<dyn ReferenceResolver>,
    defaults: EngineDefaults,
}

impl EmployerCostEngine {
    /// Creates an engine with the statutory defaults.
    pub fn new(
        parameters: Arc<dyn ParameterProvider>,
        references: Arc<dyn ReferenceResolver>,
    ) -> Self {
        Self::with_defaults(parameters, references, EngineDefaults::default())
    }

    /// Creates an engine with explicit defaults.
    pub fn with_defaults(
        parameters: Arc<dyn ParameterProvider>,
        references: Arc<dyn ReferenceResolver>,
        defaults: EngineDefaults,
    ) -> Self {
        Self {
            parameters,
            references,
            defaults,
        }
    }

    /// Returns the defaults applied to open request fields.
    pub fn defaults(&self) -> &EngineDefaults {
        &self.defaults
    }

    /// Returns the parameter provider.
    pub fn parameters(&self) -> &Arc<dyn ParameterProvider> {
        &self.parameters
    }

    /// Computes the employer cost for `input`.
    ///
    /// Uses the version pinned by `params_version_id`, or the active version
    /// when none is pinned.
    pub async fn compute_employer_cost(
        &self,
        input: &EmployerCostInput,
    ) -> EngineResult<EmployerCostOutput> {
        input.validate()?;

        let version = match &input.params_version_id {
            Some(id) => self.parameters.load_parameters_by_id(id).await?,
            None => self.parameters.load_active_parameters().await?,
        };
        let references = self
            .references
            .resolve_fx_references(&input.fx_request())
            .await?;
        debug!(
            version_id = %version.id,
            uf_clp = %references.uf_clp,
            utm_clp = %references.utm_clp,
            imm_clp = %references.imm_clp,
            "Resolved parameters and references"
        );

        let start_time = Instant::now();
        let output =
            calculate_employer_cost(input, &version, &references, &self.defaults, Utc::now())
                .inspect_err(|err| {
                    warn!(
                        version_id = %version.id,
                        error = %err,
                        "Employer cost computation failed"
                    )
                })?;

        info!(
            version_id = %version.id,
            total_cost = %output.total_cost,
            warnings = output.audit_trace.warnings.len(),
            duration_us = start_time.elapsed().as_micros() as u64,
            "Employer cost computed"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AfcContractRates, AfcEmployerRates, AfcParameters, AfcWorkerRates, AfpCommission,
        AfpParameters, ContributionCaps, GratificationParameters, MonthlyGratificationRule,
        PayrollParameters, SisParameters, TaxBracket, VersionMetadata, WorkInjuryParameters,
    };
    use crate::error::EngineError;
    use crate::models::{ContractType, MAX_REFERENCE_CLP, MAX_SALARY_CLP, WorkInjuryRateSource};
    use chrono::{NaiveDate, TimeZone};
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn brackets() -> Vec<TaxBracket> {
        [
            (Some("13.5"), "0", "0"),
            (Some("30"), "0.04", "0.54"),
            (Some("50"), "0.08", "1.74"),
            (Some("70"), "0.135", "4.49"),
            (Some("90"), "0.23", "11.14"),
            (Some("120"), "0.304", "17.8"),
            (Some("310"), "0.35", "23.32"),
            (None, "0.40", "38.82"),
        ]
        .into_iter()
        .map(|(upper, rate, rebate)| TaxBracket {
            upper_bound: upper.map(dec),
            rate: dec(rate),
            rebate: dec(rebate),
        })
        .collect()
    }

    fn version() -> ParameterVersion {
        let mut commissions = BTreeMap::new();
        commissions.insert(
            "habitat".to_string(),
            AfpCommission {
                commission_rate: dec("0.0127"),
            },
        );
        commissions.insert(
            "modelo".to_string(),
            AfpCommission {
                commission_rate: dec("0.0058"),
            },
        );

        ParameterVersion {
            id: "cl-test".to_string(),
            effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            effective_until: None,
            data: PayrollParameters {
                caps: ContributionCaps {
                    pension_uf: dec("87.8"),
                    afc_uf: dec("131.9"),
                },
                afp: AfpParameters { commissions },
                gratification: GratificationParameters {
                    regime_25_monthly: MonthlyGratificationRule {
                        monthly_rate: dec("0.25"),
                        annual_cap_imm_multiple: dec("4.75"),
                    },
                },
                sis: SisParameters {
                    employer_rate: dec("0.0149"),
                },
                work_injury: WorkInjuryParameters {
                    base_rate: Some(dec("0.0093")),
                    ..Default::default()
                },
                afc: AfcParameters {
                    indefinite: AfcContractRates {
                        employer: AfcEmployerRates {
                            cic_rate: dec("0.024"),
                            fcs_rate: dec("0.008"),
                        },
                        worker: AfcWorkerRates {
                            total_rate: dec("0.006"),
                        },
                    },
                    fixed_term: AfcContractRates {
                        employer: AfcEmployerRates {
                            cic_rate: dec("0.028"),
                            fcs_rate: dec("0.002"),
                        },
                        worker: AfcWorkerRates {
                            total_rate: Decimal::ZERO,
                        },
                    },
                },
                tax_brackets: brackets(),
                version_metadata: VersionMetadata {
                    name: "Test parameters".to_string(),
                    source: None,
                },
            },
        }
    }

    fn references() -> FxReferences {
        FxReferences {
            uf_clp: dec("37000"),
            uf_date: NaiveDate::from_ymd_opt(2025, 1, 15),
            utm_clp: dec("68000"),
            utm_month: None,
            imm_clp: dec("500000"),
        }
    }

    fn computed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn compute(input: &EmployerCostInput) -> EngineResult<EmployerCostOutput> {
        calculate_employer_cost(
            input,
            &version(),
            &references(),
            &EngineDefaults::default(),
            computed_at(),
        )
    }

    fn base_input(salary: &str) -> EmployerCostInput {
        EmployerCostInput::new(dec(salary), ContractType::Indefinite)
    }

    #[test]
    fn test_canonical_scenario() {
        let output = compute(&base_input("1000000")).unwrap();

        assert_eq!(output.gratification, dec("197916.67"));
        assert_eq!(output.total_imponible, dec("1197916.67"));
        assert_eq!(output.caps.pension_cap, dec("3248600"));
        assert_eq!(output.caps.afc_cap, dec("4880300"));
        assert_eq!(output.imponible_base, dec("1197916.67"));
        assert_eq!(output.afc_employer.cic, dec("28750.00"));
        assert_eq!(output.afc_employer.fcs, dec("9583.33"));
        assert_eq!(output.afc_employer.total, dec("38333.33"));
        assert_eq!(output.sis_employer, dec("17848.96"));
        assert_eq!(output.work_injury_employer.amount, dec("11140.63"));
        assert_eq!(output.direct_cost, dec("1265239.58"));
        assert_eq!(output.vacation_provision, dec("105394.46"));
        assert_eq!(output.severance_provision, dec("52709.88"));
        assert_eq!(output.total_cost, dec("1423343.92"));
    }

    #[test]
    fn test_canonical_worker_estimate() {
        let output = compute(&base_input("1000000")).unwrap();
        let worker = &output.worker_breakdown_estimate;

        assert_eq!(worker.afp_rate, dec("0.1127"));
        assert_eq!(worker.afp, dec("135005.21"));
        assert_eq!(worker.health, dec("83854.17"));
        assert_eq!(worker.afc, dec("7187.50"));
        assert_eq!(worker.taxable_base, dec("971869.79"));
        assert_eq!(worker.tax, dec("2154.79"));
        assert_eq!(worker.total_deductions, dec("228201.67"));
        assert_eq!(worker.net_salary_estimate, dec("969715.00"));
        assert_eq!(output.cost_to_net_ratio, Some(dec("146.78")));
    }

    #[test]
    fn test_audit_steps_are_numbered_in_order() {
        let output = compute(&base_input("1000000")).unwrap();

        let rule_ids: Vec<&str> = output
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            rule_ids,
            vec![
                "gratification",
                "contribution_bases",
                "afc_employer",
                "sis_employer",
                "work_injury_employer",
                "provisions",
                "worker_deductions",
                "income_tax"
            ]
        );
        for (index, step) in output.audit_trace.steps.iter().enumerate() {
            assert_eq!(step.step_number, index as u32 + 1);
        }
        assert!(output.audit_trace.warnings.is_empty());
    }

    #[test]
    fn test_zero_salary_costs_nothing() {
        let output = compute(&base_input("0")).unwrap();

        assert_eq!(output.gratification, Decimal::ZERO);
        assert_eq!(output.afc_employer.total, Decimal::ZERO);
        assert_eq!(output.sis_employer, Decimal::ZERO);
        assert_eq!(output.work_injury_employer.amount, Decimal::ZERO);
        assert_eq!(output.total_cost, Decimal::ZERO);
        assert_eq!(output.worker_breakdown_estimate.tax, Decimal::ZERO);
        assert_eq!(output.worker_breakdown_estimate.net_salary_estimate, Decimal::ZERO);
        assert_eq!(output.cost_to_net_ratio, None);
        assert_eq!(output.audit_trace.warnings[0].code, NET_SALARY_NOT_POSITIVE);
    }

    #[test]
    fn test_unknown_afp_is_fatal() {
        let mut input = base_input("1000000");
        input.afp_name = Some("futura".to_string());

        assert_eq!(
            compute(&input).unwrap_err(),
            EngineError::UnknownAfpProvider {
                name: "futura".to_string()
            }
        );
    }

    #[test]
    fn test_afp_name_is_case_insensitive() {
        let mut input = base_input("1000000");
        input.afp_name = Some(" Modelo ".to_string());

        let output = compute(&input).unwrap();
        assert_eq!(output.assumptions_applied.afp_name, "modelo");
        assert_eq!(output.worker_breakdown_estimate.afp_rate, dec("0.1058"));
    }

    #[test]
    fn test_negative_salary_is_rejected() {
        assert!(matches!(
            compute(&base_input("-1")),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_salary_above_ceiling_is_rejected() {
        let mut input = base_input("0");
        input.base_salary_clp = Decimal::MAX;

        assert!(matches!(
            compute(&input),
            Err(EngineError::InvalidInput { field, .. }) if field == "base_salary_clp"
        ));
    }

    #[test]
    fn test_oversized_uf_reference_is_rejected() {
        let mut fx = references();
        fx.uf_clp = Decimal::MAX / Decimal::TEN;

        let result = calculate_employer_cost(
            &base_input("1000000"),
            &version(),
            &fx,
            &EngineDefaults::default(),
            computed_at(),
        );

        assert!(matches!(
            result,
            Err(EngineError::InvalidInput { field, .. }) if field == "uf_clp"
        ));
    }

    #[test]
    fn test_largest_accepted_inputs_compute() {
        let mut input = base_input("0");
        input.base_salary_clp = MAX_SALARY_CLP;
        let fx = FxReferences {
            uf_clp: MAX_REFERENCE_CLP,
            uf_date: None,
            utm_clp: MAX_REFERENCE_CLP,
            utm_month: None,
            imm_clp: MAX_REFERENCE_CLP,
        };

        let output = calculate_employer_cost(
            &input,
            &version(),
            &fx,
            &EngineDefaults::default(),
            computed_at(),
        )
        .unwrap();

        assert_eq!(output.base_salary, MAX_SALARY_CLP);
        assert_eq!(output.caps.pension_cap, dec("87800000000"));
        assert!(output.total_cost > output.base_salary);
    }

    #[test]
    fn test_fixed_term_uses_fixed_term_afc() {
        let mut input = base_input("1000000");
        input.contract_type = ContractType::FixedTerm;
        input.assumptions.include_gratification = Some(false);

        let output = compute(&input).unwrap();
        assert_eq!(output.afc_employer.total, dec("30000.00"));
        assert_eq!(output.worker_breakdown_estimate.afc, Decimal::ZERO);
    }

    #[test]
    fn test_top_bracket_income_is_taxed_without_warning() {
        let output = compute(&base_input("40000000")).unwrap();

        assert_eq!(output.imponible_base, output.caps.pension_cap);
        assert_eq!(output.afc_base, output.caps.afc_cap);
        assert!(output.audit_trace.warnings.is_empty());
        assert!(output.worker_breakdown_estimate.tax > Decimal::ZERO);
    }

    #[test]
    fn test_exhausted_brackets_warn() {
        let mut version = version();
        version.data.tax_brackets.pop();

        let output = calculate_employer_cost(
            &base_input("40000000"),
            &version,
            &references(),
            &EngineDefaults::default(),
            computed_at(),
        )
        .unwrap();

        assert_eq!(output.audit_trace.warnings[0].code, TAX_BRACKETS_EXHAUSTED);
    }

    #[test]
    fn test_injected_fallback_rate_is_used() {
        let mut version = version();
        version.data.work_injury = WorkInjuryParameters::default();
        let defaults = EngineDefaults {
            fallback_work_injury_rate: dec("0.01"),
            ..EngineDefaults::default()
        };

        let output = calculate_employer_cost(
            &base_input("1000000"),
            &version,
            &references(),
            &defaults,
            computed_at(),
        )
        .unwrap();

        assert_eq!(output.work_injury_employer.total_rate, dec("0.01"));
        assert_eq!(output.work_injury_employer.source, WorkInjuryRateSource::Fallback);
    }

    #[test]
    fn test_snapshot_records_version_and_references() {
        let output = compute(&base_input("1000000")).unwrap();
        let snapshot = &output.parameters_snapshot;

        assert_eq!(snapshot.version_id, "cl-test");
        assert_eq!(snapshot.version_name, "Test parameters");
        assert_eq!(snapshot.parameters, version().data);
        assert_eq!(snapshot.fx_references_used, references());
        assert_eq!(output.computed_at, computed_at());
        assert_eq!(output.engine_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_same_arguments_give_identical_output() {
        let first = compute(&base_input("1234567")).unwrap();
        let second = compute(&base_input("1234567")).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
