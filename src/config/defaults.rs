//! Engine defaults.
//!
//! Every value the engine falls back to when a request leaves a field open
//! lives here, so tests and deployments can override each one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{HealthSystem, RiskLevel};

/// Injectable defaults for the employer cost engine.
///
/// Deserializes from the `engine_defaults` section of `payroll.yaml`; any
/// field omitted there keeps its statutory default.
///
/// # Example
///
/// ```
/// use payroll_cost_engine::config::EngineDefaults;
/// use rust_decimal::Decimal;
///
/// let defaults: EngineDefaults = serde_yaml::from_str("default_afp_name: modelo").unwrap();
/// assert_eq!(defaults.default_afp_name, "modelo");
/// assert_eq!(defaults.pension_worker_rate, Decimal::new(10, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineDefaults {
    /// AFP charged when the request names none.
    pub default_afp_name: String,
    /// Health system assumed when the request names none.
    pub default_health_system: HealthSystem,
    /// Statutory Fonasa deduction rate.
    pub fonasa_rate: Decimal,
    /// Isapre plan rate assumed when no plan percentage is given.
    pub default_health_plan_pct: Decimal,
    /// Risk level assumed for work-injury insurance.
    pub default_work_injury_risk: RiskLevel,
    /// Work-injury rate used when the parameters carry none (0.93%).
    pub fallback_work_injury_rate: Decimal,
    /// Mandatory worker pension contribution, before AFP commission.
    pub pension_worker_rate: Decimal,
    /// Vacation provision as a fraction of direct cost (about 1/12).
    pub vacation_provision_pct: Decimal,
    /// Severance provision as a fraction of direct cost (about 1/24).
    pub severance_provision_pct: Decimal,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            default_afp_name: "habitat".to_string(),
            default_health_system: HealthSystem::Fonasa,
            fonasa_rate: Decimal::new(7, 2),
            default_health_plan_pct: Decimal::new(7, 2),
            default_work_injury_risk: RiskLevel::Medium,
            fallback_work_injury_rate: Decimal::new(93, 4),
            pension_worker_rate: Decimal::new(10, 2),
            vacation_provision_pct: Decimal::new(833, 4),
            severance_provision_pct: Decimal::new(4166, 5),
        }
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
    fn test_statutory_defaults() {
        let defaults = EngineDefaults::default();
        assert_eq!(defaults.default_afp_name, "habitat");
        assert_eq!(defaults.default_health_system, HealthSystem::Fonasa);
        assert_eq!(defaults.fonasa_rate, dec("0.07"));
        assert_eq!(defaults.default_health_plan_pct, dec("0.07"));
        assert_eq!(defaults.default_work_injury_risk, RiskLevel::Medium);
        assert_eq!(defaults.fallback_work_injury_rate, dec("0.0093"));
        assert_eq!(defaults.pension_worker_rate, dec("0.10"));
        assert_eq!(defaults.vacation_provision_pct, dec("0.0833"));
        assert_eq!(defaults.severance_provision_pct, dec("0.04166"));
    }

    #[test]
    fn test_partial_yaml_keeps_remaining_defaults() {
        let yaml = "fallback_work_injury_rate: 0.0095\ndefault_work_injury_risk: high\n";
        let defaults: EngineDefaults = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(defaults.fallback_work_injury_rate, dec("0.0095"));
        assert_eq!(defaults.default_work_injury_risk, RiskLevel::High);
        assert_eq!(defaults.default_afp_name, "habitat");
        assert_eq!(defaults.vacation_provision_pct, dec("0.0833"));
    }
}
