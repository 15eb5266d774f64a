//! Vacation and severance provisions.
//!
//! Provisions accrue a monthly share of future liabilities. Both are charged
//! on the direct cost (wages plus employer contributions), not on the base
//! salary alone.

use rust_decimal::Decimal;

use crate::models::AuditStep;

use super::rounding::{money_str, rate_str};

/// Legal references for the accrued liabilities.
pub const PROVISIONS_CLAUSE: &str = "CT art. 67; CT art. 163";

/// The result of the provisions step.
#[derive(Debug, Clone)]
pub struct ProvisionsResult {
    /// Vacation provision, zero when disabled.
    pub vacation_provision: Decimal,
    /// Severance provision, zero when disabled.
    pub severance_provision: Decimal,
    /// Direct cost plus both provisions.
    pub total_cost: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Accrues the monthly provisions and totals the employer cost.
///
/// # Arguments
///
/// * `direct_cost` - Wages plus employer contributions in CLP
/// * `include_vacation` - Whether to accrue the vacation provision
/// * `vacation_pct` - Vacation fraction of direct cost
/// * `include_severance` - Whether to accrue the severance provision
/// * `severance_pct` - Severance fraction of direct cost
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_provisions(
    direct_cost: Decimal,
    include_vacation: bool,
    vacation_pct: Decimal,
    include_severance: bool,
    severance_pct: Decimal,
    step_number: u32,
) -> ProvisionsResult {
    let vacation_provision = if include_vacation {
        direct_cost * vacation_pct
    } else {
        Decimal::ZERO
    };
    let severance_provision = if include_severance {
        direct_cost * severance_pct
    } else {
        Decimal::ZERO
    };
    let total_cost = direct_cost + vacation_provision + severance_provision;

    let describe = |label: &str, included: bool, pct: Decimal, amount: Decimal| {
        if included {
            format!("{} {} = ${}", label, rate_str(pct), money_str(amount))
        } else {
            format!("{} disabled", label)
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "provisions".to_string(),
        rule_name: "Vacation and Severance Provisions".to_string(),
        clause_ref: PROVISIONS_CLAUSE.to_string(),
        input: serde_json::json!({
            "direct_cost": money_str(direct_cost),
            "include_vacation_provision": include_vacation,
            "vacation_provision_pct": rate_str(vacation_pct),
            "include_severance_provision": include_severance,
            "severance_provision_pct": rate_str(severance_pct)
        }),
        output: serde_json::json!({
            "vacation_provision": money_str(vacation_provision),
            "severance_provision": money_str(severance_provision),
            "total_cost": money_str(total_cost)
        }),
        reasoning: format!(
            "Direct cost ${}: {}, {}",
            money_str(direct_cost),
            describe("vacation", include_vacation, vacation_pct, vacation_provision),
            describe("severance", include_severance, severance_pct, severance_provision)
        ),
    };

    ProvisionsResult {
        vacation_provision,
        severance_provision,
        total_cost,
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

    #[test]
    fn test_provisions_on_direct_cost() {
        let result = calculate_provisions(
            dec("1000000"),
            true,
            dec("0.0833"),
            true,
            dec("0.04166"),
            7,
        );

        assert_eq!(result.vacation_provision, dec("83300"));
        assert_eq!(result.severance_provision, dec("41660"));
        assert_eq!(result.total_cost, dec("1124960"));
        assert_eq!(result.audit_step.step_number, 7);
    }

    #[test]
    fn test_disabled_provisions_leave_direct_cost() {
        let result = calculate_provisions(
            dec("1265239.58"),
            false,
            dec("0.0833"),
            false,
            dec("0.04166"),
            7,
        );

        assert_eq!(result.vacation_provision, Decimal::ZERO);
        assert_eq!(result.severance_provision, Decimal::ZERO);
        assert_eq!(result.total_cost, dec("1265239.58"));
        assert!(result.audit_step.reasoning.contains("vacation disabled"));
        assert!(result.audit_step.reasoning.contains("severance disabled"));
    }

    #[test]
    fn test_custom_vacation_pct() {
        let result = calculate_provisions(
            dec("1000000"),
            true,
            dec("0.10"),
            false,
            dec("0.04166"),
            1,
        );

        assert_eq!(result.vacation_provision, dec("100000"));
        assert_eq!(result.total_cost, dec("1100000"));
    }
}
