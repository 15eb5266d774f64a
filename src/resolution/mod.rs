//! Parameter and currency reference resolution.
//!
//! The engine performs two lookups before computing: the parameter version
//! (pinned or active) and the currency references (UF, UTM, IMM). Both sit
//! behind async traits so callers can back them with any store or cache;
//! [`ParameterStore`] and [`ReferenceTable`] are the in-memory
//! implementations built from the YAML configuration.

mod references;
mod store;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ParameterVersion;
use crate::error::EngineResult;
use crate::models::{FxReferenceRequest, FxReferences};

pub use references::ReferenceTable;
pub use store::ParameterStore;

/// Source of versioned payroll parameters.
#[async_trait]
pub trait ParameterProvider: Send + Sync {
    /// Returns the version currently flagged active.
    ///
    /// Fails with `NoActiveParameterVersion` when none is.
    async fn load_active_parameters(&self) -> EngineResult<Arc<ParameterVersion>>;

    /// Returns the version with the given id.
    ///
    /// Fails with `ParameterVersionNotFound` for an unknown id.
    async fn load_parameters_by_id(&self, id: &str) -> EngineResult<Arc<ParameterVersion>>;
}

/// Source of UF, UTM and IMM values.
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    /// Resolves the references for a computation.
    ///
    /// Explicit values in `request` pass through; anything omitted is filled
    /// from the resolver's data. Fails with `ReferenceNotFound` when no value
    /// is known.
    async fn resolve_fx_references(&self, request: &FxReferenceRequest)
    -> EngineResult<FxReferences>;
}
