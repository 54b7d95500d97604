//! Vault Projection - deposit revenue projections for DeFi staking packages
//!
//! This library provides:
//! - Daily principal / interest / total series for a deposit package
//! - Elapsed-period marker and claimable-region annotation for charts
//! - Package loading from CSV and parallel batch projections
//! - Typed role table and dashboard telemetry boundary

pub mod package;
pub mod projection;
pub mod scenario;
pub mod format;
pub mod roles;
pub mod telemetry;

// Re-export commonly used types
pub use package::{DepositPackage, BaseCurrency};
pub use projection::{project, ProjectionEngine, ProjectionConfig, ProjectionInput, ProjectionOutput, ProjectionError};
pub use roles::Role;
pub use scenario::ScenarioRunner;
