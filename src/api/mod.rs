//! HTTP API module for the payroll cost engine.
//!
//! This module provides the REST API endpoints for computing employer
//! costs and inspecting the active parameter version.

mod handlers;
mod response;
mod state;

pub use handlers::create_router;
pub use response::{ActiveParametersResponse, ApiError};
pub use state::AppState;
