//! Deposit package data structures and CSV loading

mod data;
pub mod loader;

pub use data::{BaseCurrency, DepositPackage};
pub use loader::{load_packages, load_packages_from_reader, LoadError};
