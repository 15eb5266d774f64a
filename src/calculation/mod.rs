//! Calculation logic for the payroll cost engine.
//!
//! This module contains one function per step of the employer cost
//! computation: legal gratification, contribution bases and caps, employer
//! unemployment insurance, SIS, work-injury insurance, provisions, worker
//! deductions and the progressive income tax. Each step returns its amounts
//! at full precision together with the [`AuditStep`](crate::models::AuditStep)
//! describing it; rounding is left to result assembly.

mod afc;
mod contribution_base;
mod gratification;
mod provisions;
mod rounding;
mod sis;
mod tax;
mod work_injury;
mod worker_deductions;

pub use afc::{AFC_CLAUSE, EmployerAfcResult, calculate_employer_afc};
pub use contribution_base::{
    CONTRIBUTION_CAP_CLAUSE, ContributionBaseResult, calculate_contribution_bases,
};
pub use gratification::{GRATIFICATION_CLAUSE, GratificationResult, calculate_gratification};
pub use provisions::{PROVISIONS_CLAUSE, ProvisionsResult, calculate_provisions};
pub use rounding::round_money;
pub use sis::{SIS_CLAUSE, SisResult, calculate_sis};
pub use tax::{
    INCOME_TAX_CLAUSE, IncomeTaxResult, bracket_index, calculate_income_tax, calculate_tax,
    implied_rebates, scale_brackets,
};
pub use work_injury::{
    WORK_INJURY_CLAUSE, WorkInjuryRate, WorkInjuryResult, calculate_work_injury,
    resolve_work_injury_rate,
};
pub use worker_deductions::{
    WORKER_DEDUCTIONS_CLAUSE, WorkerContributionRates, WorkerDeductionsResult,
    calculate_worker_deductions,
};
