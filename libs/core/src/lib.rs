//! Shared support code for the sedb workspace.

pub mod build_info;
pub mod telemetry;
