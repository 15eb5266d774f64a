//! Configuration types for payroll cost computation.
//!
//! This module contains the strongly-typed structures that are deserialized
//! from the YAML parameter files: the versioned [`PayrollParameters`] and the
//! currency reference series.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::models::{ContractType, RiskLevel};

use super::defaults::EngineDefaults;

/// Monthly contribution ceilings expressed in UF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionCaps {
    /// Ceiling for pension, health, SIS and work-injury contributions.
    pub pension_uf: Decimal,
    /// Ceiling for unemployment insurance contributions.
    pub afc_uf: Decimal,
}

/// Commission charged by one AFP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfpCommission {
    /// Worker-paid commission on top of the mandatory pension rate.
    pub commission_rate: Decimal,
}

/// AFP parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfpParameters {
    /// Map of lowercase AFP name to its commission.
    pub commissions: BTreeMap<String, AfpCommission>,
}

impl AfpParameters {
    /// Looks up an AFP commission, ignoring case.
    ///
    /// A named AFP without an entry is an error: charging it as zero would
    /// understate the worker's deductions.
    pub fn commission_for(&self, name: &str) -> EngineResult<&AfpCommission> {
        let wanted = name.trim();
        self.commissions
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(wanted))
            .map(|(_, commission)| commission)
            .ok_or_else(|| EngineError::UnknownAfpProvider {
                name: wanted.to_string(),
            })
    }
}

/// The 25%-of-salary monthly gratification regime (article 50).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyGratificationRule {
    /// Fraction of base salary paid as gratification.
    pub monthly_rate: Decimal,
    /// Annual cap as a multiple of the monthly minimum wage.
    pub annual_cap_imm_multiple: Decimal,
}

/// Gratification parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GratificationParameters {
    /// The monthly 25% regime.
    pub regime_25_monthly: MonthlyGratificationRule,
}

/// Disability and survivors insurance parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SisParameters {
    /// Employer-paid rate over the pension base.
    pub employer_rate: Decimal,
}

/// Work-injury rates by risk classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLevelRates {
    /// Rate for low-risk activities.
    #[serde(default)]
    pub low: Option<Decimal>,
    /// Rate for medium-risk activities.
    #[serde(default)]
    pub medium: Option<Decimal>,
    /// Rate for high-risk activities.
    #[serde(default)]
    pub high: Option<Decimal>,
}

impl RiskLevelRates {
    /// Returns the configured rate for `level`, if any.
    pub fn rate_for(&self, level: RiskLevel) -> Option<Decimal> {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }
}

/// Work-injury insurance parameters (Ley 16.744).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInjuryParameters {
    /// Base rate applied to every employer.
    #[serde(default)]
    pub base_rate: Option<Decimal>,
    /// Fallback table consulted when no base rate is configured.
    #[serde(default)]
    pub risk_levels: RiskLevelRates,
}

/// Employer-side unemployment insurance rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfcEmployerRates {
    /// Contribution to the worker's individual account.
    pub cic_rate: Decimal,
    /// Contribution to the solidarity fund.
    pub fcs_rate: Decimal,
}

/// Worker-side unemployment insurance rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfcWorkerRates {
    /// Total worker-paid rate.
    pub total_rate: Decimal,
}

/// Unemployment insurance rates for one contract type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfcContractRates {
    /// Rates paid by the employer.
    pub employer: AfcEmployerRates,
    /// Rates paid by the worker.
    pub worker: AfcWorkerRates,
}

/// Unemployment insurance (AFC) parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfcParameters {
    /// Rates for open-ended contracts.
    pub indefinite: AfcContractRates,
    /// Rates for fixed-term contracts.
    pub fixed_term: AfcContractRates,
}

impl AfcParameters {
    /// Selects the rate table for `contract_type`.
    pub fn for_contract(&self, contract_type: ContractType) -> &AfcContractRates {
        match contract_type {
            ContractType::Indefinite => &self.indefinite,
            ContractType::FixedTerm => &self.fixed_term,
        }
    }
}

/// One bracket of a progressive tax schedule.
///
/// Bounds and rebates are expressed in whatever unit the schedule uses (UTM
/// in parameter files, CLP once scaled). A bracket covers the income above
/// the previous bracket's upper bound up to and including its own; `None`
/// marks the unbounded top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive upper bound, or `None` for the top bracket.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Marginal rate applied to the slice inside this bracket.
    pub rate: Decimal,
    /// Published amount to subtract from `base * rate`.
    #[serde(default)]
    pub rebate: Decimal,
}

/// Descriptive metadata of a parameter version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    /// Human-readable version label.
    pub name: String,
    /// Where the values were taken from.
    #[serde(default)]
    pub source: Option<String>,
}

/// The complete set of regulatory parameters for one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollParameters {
    /// Contribution ceilings.
    pub caps: ContributionCaps,
    /// AFP commissions.
    pub afp: AfpParameters,
    /// Gratification rules.
    pub gratification: GratificationParameters,
    /// SIS rate.
    pub sis: SisParameters,
    /// Work-injury rates.
    #[serde(default)]
    pub work_injury: WorkInjuryParameters,
    /// AFC rates by contract type.
    pub afc: AfcParameters,
    /// Monthly income tax schedule, in UTM.
    pub tax_brackets: Vec<TaxBracket>,
    /// Version metadata.
    pub version_metadata: VersionMetadata,
}

/// A parameter version together with its validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterVersion {
    /// Stable version identifier (e.g., "cl-2025-07").
    pub id: String,
    /// The regulatory parameters.
    pub data: PayrollParameters,
    /// First day the version applies.
    pub effective_from: NaiveDate,
    /// Last day the version applies, if superseded.
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
}

impl ParameterVersion {
    /// Checks the structural invariants the calculators rely on.
    ///
    /// Brackets must be non-empty with strictly ascending bounds, and only
    /// the last one may be unbounded. Every rate must lie in `0..=1`.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidParameters {
            version_id: self.id.clone(),
            message,
        };

        if let Some(until) = self.effective_until {
            if until < self.effective_from {
                return Err(invalid(format!(
                    "effective_until {} precedes effective_from {}",
                    until, self.effective_from
                )));
            }
        }

        let data = &self.data;
        if data.caps.pension_uf <= Decimal::ZERO || data.caps.afc_uf <= Decimal::ZERO {
            return Err(invalid("contribution caps must be positive".to_string()));
        }

        let brackets = &data.tax_brackets;
        if brackets.is_empty() {
            return Err(invalid("tax schedule has no brackets".to_string()));
        }
        let mut previous = Decimal::ZERO;
        for (index, bracket) in brackets.iter().enumerate() {
            match bracket.upper_bound {
                Some(bound) => {
                    if bound <= previous {
                        return Err(invalid(format!(
                            "tax bracket {} upper bound {} is not above {}",
                            index + 1,
                            bound,
                            previous
                        )));
                    }
                    previous = bound;
                }
                None if index + 1 != brackets.len() => {
                    return Err(invalid(format!(
                        "tax bracket {} is unbounded but is not the last bracket",
                        index + 1
                    )));
                }
                None => {}
            }
        }

        let mut rates: Vec<(String, Decimal)> = vec![
            ("sis.employer_rate".to_string(), data.sis.employer_rate),
            (
                "gratification.regime_25_monthly.monthly_rate".to_string(),
                data.gratification.regime_25_monthly.monthly_rate,
            ),
        ];
        for (name, commission) in &data.afp.commissions {
            rates.push((format!("afp.commissions.{}", name), commission.commission_rate));
        }
        for contract in [ContractType::Indefinite, ContractType::FixedTerm] {
            let afc = data.afc.for_contract(contract);
            let prefix = format!("afc.{}", contract.as_str());
            rates.push((format!("{}.employer.cic_rate", prefix), afc.employer.cic_rate));
            rates.push((format!("{}.employer.fcs_rate", prefix), afc.employer.fcs_rate));
            rates.push((format!("{}.worker.total_rate", prefix), afc.worker.total_rate));
        }
        for (index, bracket) in brackets.iter().enumerate() {
            rates.push((format!("tax_brackets[{}].rate", index), bracket.rate));
        }
        if let Some(base) = data.work_injury.base_rate {
            rates.push(("work_injury.base_rate".to_string(), base));
        }

        if let Some((name, rate)) = rates
            .iter()
            .find(|(_, rate)| *rate < Decimal::ZERO || *rate > Decimal::ONE)
        {
            return Err(invalid(format!("{} = {} is outside 0..=1", name, rate)));
        }

        Ok(())
    }
}

/// Top-level payroll configuration from `payroll.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollMetadata {
    /// ISO country code the parameters apply to.
    pub country: String,
    /// Currency the engine computes in.
    pub currency: String,
    /// Id of the version used when a request does not pin one.
    #[serde(default)]
    pub active_version: Option<String>,
    /// Engine defaults.
    #[serde(default)]
    pub engine_defaults: EngineDefaults,
}

/// A published daily UF value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UfEntry {
    /// The day the value applies to.
    pub date: NaiveDate,
    /// UF value in CLP.
    pub value: Decimal,
}

/// A published monthly UTM value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmEntry {
    /// The month the value applies to, formatted `YYYY-MM`.
    pub month: String,
    /// UTM value in CLP.
    pub value: Decimal,
}

/// A monthly minimum wage with the date it took effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImmEntry {
    /// First day the minimum wage applies.
    pub effective_from: NaiveDate,
    /// Minimum wage in CLP.
    pub value: Decimal,
}

/// Currency reference series from `references.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSeries {
    /// Daily UF values.
    #[serde(default)]
    pub uf: Vec<UfEntry>,
    /// Monthly UTM values.
    #[serde(default)]
    pub utm: Vec<UtmEntry>,
    /// Minimum wage history.
    #[serde(default)]
    pub imm: Vec<ImmEntry>,
}
