//! Employer unemployment insurance (AFC) calculation.
//!
//! The employer pays into the worker's individual account (CIC) and into the
//! solidarity fund (FCS) at rates set by contract type under Ley 19.728.

use rust_decimal::Decimal;

use crate::config::AfcEmployerRates;
use crate::models::{AuditStep, ContractType};

use super::rounding::{money_str, rate_str};

/// Legal reference for unemployment insurance.
pub const AFC_CLAUSE: &str = "Ley 19.728 art. 5";

/// The result of the employer AFC step.
#[derive(Debug, Clone)]
pub struct EmployerAfcResult {
    /// Individual account rate applied.
    pub cic_rate: Decimal,
    /// Solidarity fund rate applied.
    pub fcs_rate: Decimal,
    /// Individual account contribution.
    pub cic: Decimal,
    /// Solidarity fund contribution.
    pub fcs: Decimal,
    /// Sum of both contributions.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the employer AFC contribution on the capped AFC base.
///
/// `rates` must be the employer table selected for `contract_type`; the
/// contract type is recorded in the audit step.
pub fn calculate_employer_afc(
    afc_base: Decimal,
    rates: &AfcEmployerRates,
    contract_type: ContractType,
    step_number: u32,
) -> EmployerAfcResult {
    let cic = afc_base * rates.cic_rate;
    let fcs = afc_base * rates.fcs_rate;
    let total = cic + fcs;

    let audit_step = AuditStep {
        step_number,
        rule_id: "afc_employer".to_string(),
        rule_name: "Employer Unemployment Insurance".to_string(),
        clause_ref: AFC_CLAUSE.to_string(),
        input: serde_json::json!({
            "afc_base": money_str(afc_base),
            "contract_type": contract_type.as_str(),
            "cic_rate": rate_str(rates.cic_rate),
            "fcs_rate": rate_str(rates.fcs_rate)
        }),
        output: serde_json::json!({
            "cic": money_str(cic),
            "fcs": money_str(fcs),
            "total": money_str(total)
        }),
        reasoning: format!(
            "{} contract: ${} x ({} + {}) = ${}",
            contract_type.as_str(),
            money_str(afc_base),
            rate_str(rates.cic_rate),
            rate_str(rates.fcs_rate),
            money_str(total)
        ),
    };

    EmployerAfcResult {
        cic_rate: rates.cic_rate,
        fcs_rate: rates.fcs_rate,
        cic,
        fcs,
        total,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn indefinite() -> AfcEmployerRates {
        AfcEmployerRates {
            cic_rate: dec("0.024"),
            fcs_rate: dec("0.008"),
        }
    }

    fn fixed_term() -> AfcEmployerRates {
        AfcEmployerRates {
            cic_rate: dec("0.028"),
            fcs_rate: dec("0.002"),
        }
    }

    #[test]
    fn test_indefinite_contract_rates() {
        let result = calculate_employer_afc(
            dec("1000000"),
            &indefinite(),
            ContractType::Indefinite,
            3,
        );

        assert_eq!(result.cic, dec("24000"));
        assert_eq!(result.fcs, dec("8000"));
        assert_eq!(result.total, dec("32000"));
        assert_eq!(result.audit_step.step_number, 3);
        assert_eq!(
            result.audit_step.input["contract_type"].as_str().unwrap(),
            "indefinite"
        );
    }

    #[test]
    fn test_fixed_term_contract_rates() {
        let result = calculate_employer_afc(
            dec("1000000"),
            &fixed_term(),
            ContractType::FixedTerm,
            3,
        );

        assert_eq!(result.cic, dec("28000"));
        assert_eq!(result.fcs, dec("2000"));
        assert_eq!(result.total, dec("30000"));
        assert!(result.audit_step.reasoning.starts_with("fixed_term contract"));
    }

    #[test]
    fn test_zero_base_has_zero_contribution() {
        let result = calculate_employer_afc(
            Decimal::ZERO,
            &indefinite(),
            ContractType::Indefinite,
            1,
        );
        assert_eq!(result.total, Decimal::ZERO);
    }

    #[test]
    fn test_audit_output_is_rounded() {
        let result = calculate_employer_afc(
            dec("1197916.6667"),
            &indefinite(),
            ContractType::Indefinite,
            1,
        );
        assert_eq!(result.audit_step.output["fcs"].as_str().unwrap(), "9583.33");
    }
}
