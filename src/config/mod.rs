//! Configuration loading and management for the payroll cost engine.
//!
//! This module loads versioned payroll parameters, currency reference series
//! and engine defaults from a directory of YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_cost_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/cl").unwrap();
//! println!("Active version: {:?}", config.metadata().active_version);
//! ```

mod defaults;
mod loader;
mod types;

pub use defaults::EngineDefaults;
pub use loader::ConfigLoader;
pub use types::{
    AfcContractRates, AfcEmployerRates, AfcParameters, AfcWorkerRates, AfpCommission,
    AfpParameters, ContributionCaps, GratificationParameters, ImmEntry, MonthlyGratificationRule,
    ParameterVersion, PayrollMetadata, PayrollParameters, ReferenceSeries, RiskLevelRates,
    SisParameters, TaxBracket, UfEntry, UtmEntry, VersionMetadata, WorkInjuryParameters,
};
