//! Employer cost request model and related types.
//!
//! This module defines the [`EmployerCostInput`] accepted by the engine, the
//! closed enums for contract type, health system and work-injury risk, and
//! the [`ResolvedAssumptions`] produced once every default has been applied.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineDefaults;
use crate::error::{EngineError, EngineResult};

use super::fx_references::{FxReferenceRequest, ensure_reference_value, parse_year_month};

/// Largest accepted monthly base salary, one quadrillion CLP.
///
/// Keeps every product and sum in the cost chain inside `Decimal` range.
pub const MAX_SALARY_CLP: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// The duration of the employment contract.
///
/// The contract type selects which unemployment insurance (AFC) rate table
/// applies, for both the employer and the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    /// Open-ended contract (contrato indefinido).
    Indefinite,
    /// Fixed-term or per-project contract (plazo fijo / por obra).
    FixedTerm,
}

impl ContractType {
    /// Returns the snake_case name used in configuration and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Indefinite => "indefinite",
            ContractType::FixedTerm => "fixed_term",
        }
    }
}

/// The health insurance system the worker contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthSystem {
    /// The public health fund, charged at the statutory flat rate.
    Fonasa,
    /// A private plan, charged at the worker's plan percentage.
    #[serde(alias = "private")]
    Isapre,
}

/// Work-injury risk classification of the employer's activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Low-risk activity.
    Low,
    /// Medium-risk activity.
    Medium,
    /// High-risk activity.
    High,
}

impl RiskLevel {
    /// Returns the snake_case name used in configuration and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Work-injury override carrying a single total rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalRateOverride {
    /// The total insurance rate to apply.
    pub total_rate: Decimal,
}

/// Work-injury override expressed as separate rate components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentRatesOverride {
    /// The basic rate; when absent the parameter-derived rate is used.
    #[serde(default)]
    pub basic_rate: Option<Decimal>,
    /// The risk-differentiated additional rate.
    #[serde(default)]
    pub additional_rate: Option<Decimal>,
    /// The extraordinary rate.
    #[serde(default)]
    pub extra_rate: Option<Decimal>,
}

/// An explicit work-injury rate supplied by the caller.
///
/// A total rate always takes precedence: an object carrying `total_rate`
/// deserializes as [`WorkInjuryOverride::TotalRate`] even when component
/// fields are also present.
///
/// # Example
///
/// ```
/// use payroll_cost_engine::models::WorkInjuryOverride;
///
/// let parsed: WorkInjuryOverride =
///     serde_json::from_str(r#"{"total_rate": "0.0210", "basic_rate": "0.009"}"#).unwrap();
/// assert!(matches!(parsed, WorkInjuryOverride::TotalRate(_)));
///
/// let parsed: WorkInjuryOverride =
///     serde_json::from_str(r#"{"additional_rate": "0.017"}"#).unwrap();
/// assert!(matches!(parsed, WorkInjuryOverride::ComponentRates(_)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkInjuryOverride {
    /// Use this total rate directly.
    TotalRate(TotalRateOverride),
    /// Build the total from a basic rate plus additional and extra components.
    ComponentRates(ComponentRatesOverride),
}

impl WorkInjuryOverride {
    /// Creates a total-rate override.
    pub fn total(total_rate: Decimal) -> Self {
        WorkInjuryOverride::TotalRate(TotalRateOverride { total_rate })
    }

    /// Creates a component-rates override.
    pub fn components(
        basic_rate: Option<Decimal>,
        additional_rate: Option<Decimal>,
        extra_rate: Option<Decimal>,
    ) -> Self {
        WorkInjuryOverride::ComponentRates(ComponentRatesOverride {
            basic_rate,
            additional_rate,
            extra_rate,
        })
    }

    fn rates(&self) -> Vec<(&'static str, Decimal)> {
        match self {
            WorkInjuryOverride::TotalRate(o) => vec![("total_rate", o.total_rate)],
            WorkInjuryOverride::ComponentRates(o) => [
                ("basic_rate", o.basic_rate),
                ("additional_rate", o.additional_rate),
                ("extra_rate", o.extra_rate),
            ]
            .into_iter()
            .filter_map(|(name, rate)| rate.map(|r| (name, r)))
            .collect(),
        }
    }
}

/// Optional costing assumptions. Every flag defaults to enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostAssumptions {
    /// Include the legal monthly gratification.
    #[serde(default)]
    pub include_gratification: Option<bool>,
    /// Accrue a monthly vacation provision.
    #[serde(default)]
    pub include_vacation_provision: Option<bool>,
    /// Vacation provision as a fraction of direct cost.
    #[serde(default)]
    pub vacation_provision_pct: Option<Decimal>,
    /// Accrue a monthly severance provision.
    #[serde(default)]
    pub include_severance_provision: Option<bool>,
    /// Severance provision as a fraction of direct cost.
    #[serde(default)]
    pub severance_provision_pct: Option<Decimal>,
    /// Explicit work-injury rate.
    #[serde(default)]
    pub work_injury_override: Option<WorkInjuryOverride>,
}

/// A request to compute the monthly employer cost of a worker.
///
/// # Example
///
/// ```
/// use payroll_cost_engine::models::{ContractType, EmployerCostInput};
/// use rust_decimal::Decimal;
///
/// let input = EmployerCostInput::new(Decimal::new(1_000_000, 0), ContractType::Indefinite);
/// assert!(input.validate().is_ok());
/// assert!(input.afp_name.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerCostInput {
    /// Monthly base salary in CLP.
    pub base_salary_clp: Decimal,
    /// The contract duration.
    pub contract_type: ContractType,
    /// The worker's AFP; defaults to the configured provider.
    #[serde(default)]
    pub afp_name: Option<String>,
    /// The worker's health system; defaults to Fonasa.
    #[serde(default)]
    pub health_system: Option<HealthSystem>,
    /// Private plan percentage, used only for Isapre.
    #[serde(default)]
    pub health_plan_pct: Option<Decimal>,
    /// Work-injury risk classification; defaults to medium.
    #[serde(default)]
    pub work_injury_risk: Option<RiskLevel>,
    /// Pin a specific parameter version instead of the active one.
    #[serde(default)]
    pub params_version_id: Option<String>,
    /// Explicit UF value in CLP.
    #[serde(default)]
    pub uf_value: Option<Decimal>,
    /// Date of the UF value to use.
    #[serde(default)]
    pub uf_date: Option<NaiveDate>,
    /// Explicit UTM value in CLP.
    #[serde(default)]
    pub utm_value: Option<Decimal>,
    /// Month of the UTM value to use, formatted `YYYY-MM`.
    #[serde(default)]
    pub utm_month: Option<String>,
    /// Costing assumptions.
    #[serde(default)]
    pub assumptions: CostAssumptions,
}

impl EmployerCostInput {
    /// Creates a request with every optional field left to its default.
    pub fn new(base_salary_clp: Decimal, contract_type: ContractType) -> Self {
        Self {
            base_salary_clp,
            contract_type,
            afp_name: None,
            health_system: None,
            health_plan_pct: None,
            work_injury_risk: None,
            params_version_id: None,
            uf_value: None,
            uf_date: None,
            utm_value: None,
            utm_month: None,
            assumptions: CostAssumptions::default(),
        }
    }

    /// Rejects requests that cannot be costed.
    ///
    /// Contract type, health system and risk level are closed enums, so an
    /// unknown string never reaches this point.
    pub fn validate(&self) -> EngineResult<()> {
        if self.base_salary_clp < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "base_salary_clp",
                "must not be negative",
            ));
        }
        if self.base_salary_clp > MAX_SALARY_CLP {
            return Err(EngineError::invalid_input(
                "base_salary_clp",
                format!("must not exceed {}", MAX_SALARY_CLP),
            ));
        }

        if let Some(name) = &self.afp_name {
            if name.trim().is_empty() {
                return Err(EngineError::invalid_input("afp_name", "must not be empty"));
            }
        }

        if let Some(pct) = self.health_plan_pct {
            ensure_fraction("health_plan_pct", pct)?;
        }
        if let Some(pct) = self.assumptions.vacation_provision_pct {
            ensure_fraction("assumptions.vacation_provision_pct", pct)?;
        }
        if let Some(pct) = self.assumptions.severance_provision_pct {
            ensure_fraction("assumptions.severance_provision_pct", pct)?;
        }
        if let Some(work_injury) = &self.assumptions.work_injury_override {
            for (name, rate) in work_injury.rates() {
                ensure_fraction(&format!("assumptions.work_injury_override.{}", name), rate)?;
            }
        }

        if let Some(uf) = self.uf_value {
            ensure_reference_value("uf_value", uf)?;
        }
        if let Some(utm) = self.utm_value {
            ensure_reference_value("utm_value", utm)?;
        }
        if let Some(month) = &self.utm_month {
            if parse_year_month(month).is_none() {
                return Err(EngineError::invalid_input(
                    "utm_month",
                    format!("'{}' is not a YYYY-MM month", month),
                ));
            }
        }

        Ok(())
    }

    /// Returns the currency reference lookup implied by this request.
    pub fn fx_request(&self) -> FxReferenceRequest {
        FxReferenceRequest {
            uf_value: self.uf_value,
            uf_date: self.uf_date,
            utm_value: self.utm_value,
            utm_month: self.utm_month.clone(),
        }
    }
}

fn ensure_fraction(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(EngineError::invalid_input(
            field,
            format!("{} is outside the range 0..=1", value),
        ));
    }
    Ok(())
}

/// The assumptions actually applied to a computation, after defaults.
///
/// Recorded in the output so a quote can be reproduced without knowing the
/// engine defaults that were in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAssumptions {
    /// AFP whose commission was charged.
    pub afp_name: String,
    /// Health system used for the worker deduction.
    pub health_system: HealthSystem,
    /// Health deduction rate applied to the pension base.
    pub health_rate: Decimal,
    /// Risk level used when resolving the work-injury rate.
    pub work_injury_risk: RiskLevel,
    /// Whether gratification was included.
    pub include_gratification: bool,
    /// Whether a vacation provision was accrued.
    pub include_vacation_provision: bool,
    /// Vacation provision fraction.
    pub vacation_provision_pct: Decimal,
    /// Whether a severance provision was accrued.
    pub include_severance_provision: bool,
    /// Severance provision fraction.
    pub severance_provision_pct: Decimal,
    /// Work-injury override, if one was supplied.
    pub work_injury_override: Option<WorkInjuryOverride>,
}

impl ResolvedAssumptions {
    /// Applies `defaults` to every field the request leaves open.
    pub fn resolve(input: &EmployerCostInput, defaults: &EngineDefaults) -> Self {
        let assumptions = &input.assumptions;
        let health_system = input
            .health_system
            .unwrap_or(defaults.default_health_system);
        let health_rate = match health_system {
            HealthSystem::Fonasa => defaults.fonasa_rate,
            HealthSystem::Isapre => input
                .health_plan_pct
                .unwrap_or(defaults.default_health_plan_pct),
        };

        Self {
            afp_name: input
                .afp_name
                .as_deref()
                .map(|name| name.trim().to_lowercase())
                .unwrap_or_else(|| defaults.default_afp_name.clone()),
            health_system,
            health_rate,
            work_injury_risk: input
                .work_injury_risk
                .unwrap_or(defaults.default_work_injury_risk),
            include_gratification: assumptions.include_gratification.unwrap_or(true),
            include_vacation_provision: assumptions.include_vacation_provision.unwrap_or(true),
            vacation_provision_pct: assumptions
                .vacation_provision_pct
                .unwrap_or(defaults.vacation_provision_pct),
            include_severance_provision: assumptions.include_severance_provision.unwrap_or(true),
            severance_provision_pct: assumptions
                .severance_provision_pct
                .unwrap_or(defaults.severance_provision_pct),
            work_injury_override: assumptions.work_injury_override,
        }
    }
}
