//! Core domain models for npmup
//!
//! This module contains the fundamental types used throughout the application:
//! - Version parsing and ordering
//! - Managed tool descriptors
//! - Per-tool check results
//! - The run report

mod check_result;
mod report;
mod tool;
mod version;

pub use check_result::{CheckResult, CheckStatus, InstalledVersion};
pub use report::{Report, ReportSummary};
pub use tool::{default_packages, default_tools, ToolKind, ToolSpec, NPM_PACKAGE};
pub use version::{compare, Version};
