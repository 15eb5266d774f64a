//! Contribution base and cap calculation.
//!
//! Pension and unemployment insurance contributions are charged on the
//! taxable remuneration up to a ceiling expressed in UF (DL 3.500 art. 16,
//! Ley 19.728 art. 6). The ceilings are converted with the UF value resolved
//! for the computation, since the UF changes daily.

use rust_decimal::Decimal;

use crate::config::ContributionCaps;
use crate::models::AuditStep;

use super::rounding::{money_str, rate_str};

/// Legal references for the contribution ceilings.
pub const CONTRIBUTION_CAP_CLAUSE: &str = "DL 3.500 art. 16; Ley 19.728 art. 6";

/// The result of the contribution base step.
#[derive(Debug, Clone)]
pub struct ContributionBaseResult {
    /// Pension ceiling in CLP.
    pub pension_cap: Decimal,
    /// Unemployment insurance ceiling in CLP.
    pub afc_cap: Decimal,
    /// Base salary plus gratification.
    pub total_imponible: Decimal,
    /// Base for pension, health, SIS and work-injury insurance.
    pub imponible_base: Decimal,
    /// Base for unemployment insurance.
    pub afc_base: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the capped contribution bases.
///
/// # Arguments
///
/// * `base_salary` - Monthly base salary in CLP
/// * `gratification` - Monthly gratification in CLP
/// * `caps` - Ceilings in UF
/// * `uf_clp` - UF value in CLP
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_contribution_bases(
    base_salary: Decimal,
    gratification: Decimal,
    caps: &ContributionCaps,
    uf_clp: Decimal,
    step_number: u32,
) -> ContributionBaseResult {
    let pension_cap = caps.pension_uf * uf_clp;
    let afc_cap = caps.afc_uf * uf_clp;
    let total_imponible = base_salary + gratification;
    let imponible_base = total_imponible.min(pension_cap);
    let afc_base = total_imponible.min(afc_cap);

    let describe = |base: Decimal, cap: Decimal| {
        if total_imponible > cap {
            format!("capped at ${}", money_str(cap))
        } else {
            format!("${}", money_str(base))
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "contribution_bases".to_string(),
        rule_name: "Contribution Bases".to_string(),
        clause_ref: CONTRIBUTION_CAP_CLAUSE.to_string(),
        input: serde_json::json!({
            "base_salary": money_str(base_salary),
            "gratification": money_str(gratification),
            "pension_cap_uf": rate_str(caps.pension_uf),
            "afc_cap_uf": rate_str(caps.afc_uf),
            "uf_clp": money_str(uf_clp)
        }),
        output: serde_json::json!({
            "total_imponible": money_str(total_imponible),
            "pension_cap": money_str(pension_cap),
            "afc_cap": money_str(afc_cap),
            "imponible_base": money_str(imponible_base),
            "afc_base": money_str(afc_base)
        }),
        reasoning: format!(
            "Imponible ${}: pension base {}, AFC base {}",
            money_str(total_imponible),
            describe(imponible_base, pension_cap),
            describe(afc_base, afc_cap)
        ),
    };

    ContributionBaseResult {
        pension_cap,
        afc_cap,
        total_imponible,
        imponible_base,
        afc_base,
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

    fn caps() -> ContributionCaps {
        ContributionCaps {
            pension_uf: dec("87.8"),
            afc_uf: dec("131.9"),
        }
    }

    #[test]
    fn test_caps_converted_with_uf() {
        let result = calculate_contribution_bases(
            dec("1000000"),
            dec("0"),
            &caps(),
            dec("37000"),
            2,
        );

        assert_eq!(result.pension_cap, dec("3248600"));
        assert_eq!(result.afc_cap, dec("4880300"));
        assert_eq!(result.audit_step.step_number, 2);
    }

    #[test]
    fn test_bases_below_caps_equal_imponible() {
        let result = calculate_contribution_bases(
            dec("1000000"),
            dec("197916.67"),
            &caps(),
            dec("37000"),
            1,
        );

        assert_eq!(result.total_imponible, dec("1197916.67"));
        assert_eq!(result.imponible_base, dec("1197916.67"));
        assert_eq!(result.afc_base, dec("1197916.67"));
    }

    #[test]
    fn test_bases_between_caps() {
        let result = calculate_contribution_bases(
            dec("4000000"),
            dec("0"),
            &caps(),
            dec("37000"),
            1,
        );

        assert_eq!(result.imponible_base, dec("3248600"));
        assert_eq!(result.afc_base, dec("4000000"));
        assert!(result.audit_step.reasoning.contains("pension base capped at $3248600.00"));
        assert!(result.audit_step.reasoning.contains("AFC base $4000000.00"));
    }

    #[test]
    fn test_bases_far_above_both_caps_equal_caps() {
        let result = calculate_contribution_bases(
            dec("400000000"),
            dec("197916.67"),
            &caps(),
            dec("37000"),
            1,
        );

        assert_eq!(result.imponible_base, result.pension_cap);
        assert_eq!(result.afc_base, result.afc_cap);
    }

    #[test]
    fn test_zero_salary_has_zero_bases() {
        let result = calculate_contribution_bases(
            Decimal::ZERO,
            Decimal::ZERO,
            &caps(),
            dec("37000"),
            1,
        );
        assert_eq!(result.imponible_base, Decimal::ZERO);
        assert_eq!(result.afc_base, Decimal::ZERO);
    }
}
