//! Parameter snapshots attached to every computation.
//!
//! A snapshot records exactly which parameter version and currency
//! references were used, so a result can be audited and reproduced after
//! the active version has moved on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::PayrollParameters;

use super::FxReferences;

/// An immutable record of the inputs a computation was resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParametersSnapshot {
    /// Id of the parameter version used.
    pub version_id: String,
    /// Human-readable name of the version.
    pub version_name: String,
    /// First day the version applies.
    pub effective_from: NaiveDate,
    /// Last day the version applies, if superseded.
    pub effective_until: Option<NaiveDate>,
    /// The full parameter set.
    pub parameters: PayrollParameters,
    /// Currency references used.
    pub fx_references_used: FxReferences,
}

/// Builds a [`ParametersSnapshot`]. Pure formatting, no I/O.
pub fn create_parameters_snapshot(
    version_id: &str,
    version_name: &str,
    effective_from: NaiveDate,
    effective_until: Option<NaiveDate>,
    parameters: &PayrollParameters,
    references: &FxReferences,
) -> ParametersSnapshot {
    ParametersSnapshot {
        version_id: version_id.to_string(),
        version_name: version_name.to_string(),
        effective_from,
        effective_until,
        parameters: parameters.clone(),
        fx_references_used: references.clone(),
    }
}
