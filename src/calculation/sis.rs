//! Disability and survivors insurance (SIS) calculation.

use rust_decimal::Decimal;

use crate::config::SisParameters;
use crate::models::AuditStep;

use super::rounding::{money_str, rate_str};

/// Legal reference for the SIS contribution.
pub const SIS_CLAUSE: &str = "DL 3.500 art. 59";

/// The result of the SIS step.
#[derive(Debug, Clone)]
pub struct SisResult {
    /// Employer rate applied.
    pub rate: Decimal,
    /// Employer contribution.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the employer-paid SIS premium on the pension base.
pub fn calculate_sis(imponible_base: Decimal, sis: &SisParameters, step_number: u32) -> SisResult {
    let amount = imponible_base * sis.employer_rate;

    let audit_step = AuditStep {
        step_number,
        rule_id: "sis_employer".to_string(),
        rule_name: "Disability and Survivors Insurance".to_string(),
        clause_ref: SIS_CLAUSE.to_string(),
        input: serde_json::json!({
            "imponible_base": money_str(imponible_base),
            "employer_rate": rate_str(sis.employer_rate)
        }),
        output: serde_json::json!({
            "amount": money_str(amount)
        }),
        reasoning: format!(
            "${} x {} = ${}",
            money_str(imponible_base),
            rate_str(sis.employer_rate),
            money_str(amount)
        ),
    };

    SisResult {
        rate: sis.employer_rate,
        amount,
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
    fn test_sis_on_pension_base() {
        let sis = SisParameters {
            employer_rate: dec("0.0149"),
        };
        let result = calculate_sis(dec("1000000"), &sis, 4);

        assert_eq!(result.amount, dec("14900"));
        assert_eq!(result.rate, dec("0.0149"));
        assert_eq!(result.audit_step.rule_id, "sis_employer");
        assert_eq!(result.audit_step.reasoning, "$1000000.00 x 0.0149 = $14900.00");
    }

    #[test]
    fn test_sis_at_pension_cap() {
        let sis = SisParameters {
            employer_rate: dec("0.0149"),
        };
        let result = calculate_sis(dec("3248600"), &sis, 4);
        assert_eq!(result.amount, dec("48404.14"));
    }
}
