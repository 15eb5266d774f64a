//! Application state for the payroll cost engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::engine::EmployerCostEngine;

/// Shared application state.
///
/// Contains resources that are shared across all request handlers,
/// such as the employer cost engine and its resolvers.
#[derive(Clone)]
pub struct AppState {
    /// The employer cost engine.
    engine: Arc<EmployerCostEngine>,
}

impl AppState {
    /// Creates a new application state around the given engine.
    pub fn new(engine: EmployerCostEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Returns a reference to the engine.
    pub fn engine(&self) -> &EmployerCostEngine {
        &self.engine
    }
}
