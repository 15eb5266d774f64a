//! Core data models for the payroll cost engine.
//!
//! This module contains the request, currency reference, snapshot and result
//! types used throughout the engine.

mod cost_request;
mod cost_result;
mod fx_references;
mod snapshot;

pub use cost_request::{
    ComponentRatesOverride, ContractType, CostAssumptions, EmployerCostInput, HealthSystem,
    MAX_SALARY_CLP, ResolvedAssumptions, RiskLevel, TotalRateOverride, WorkInjuryOverride,
};
pub use cost_result::{
    AfcEmployerBreakdown, AuditStep, AuditTrace, AuditWarning, CapsClp, EmployerCostOutput,
    OtherAllowances, WorkInjuryBreakdown, WorkInjuryRateSource, WorkerBreakdownEstimate,
};
pub use fx_references::{
    FxReferenceRequest, FxReferences, MAX_REFERENCE_CLP, format_year_month, parse_year_month,
};
pub use snapshot::{ParametersSnapshot, create_parameters_snapshot};
