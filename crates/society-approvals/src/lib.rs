//! Approval workflow for student society applications: registration, annual
//! renewal, and event permission requests moving through role-specific stages.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
