//! Employer Cost Engine for Chilean Payroll
//!
//! This crate computes the fully loaded monthly cost of employing a worker in
//! Chile: legal gratification, capped contribution bases, employer
//! unemployment, disability and work-injury insurance, vacation and
//! severance provisions, and an estimate of the worker's net salary. Every
//! result carries an audit trace and a snapshot of the parameter version it
//! was computed with.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod resolution;
