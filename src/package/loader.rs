//! Load deposit packages from CSV

use super::{BaseCurrency, DepositPackage};
use chrono::NaiveDate;
use csv::Reader;
use std::path::Path;
use thiserror::Error;

/// Date format of the StartDate column
const START_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Package {package_id}: invalid StartDate '{value}': {source}")]
    StartDate {
        package_id: u32,
        value: String,
        source: chrono::ParseError,
    },
    #[error("Package {package_id}: {message}")]
    UnknownCurrency { package_id: u32, message: String },
}

/// Raw CSV row matching the package export columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "PackageID")]
    package_id: u32,
    #[serde(rename = "DisplayName")]
    display_name: String,
    #[serde(rename = "StartDate")]
    start_date: String,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "InterestRate")]
    interest_rate: f64,
    #[serde(rename = "DurationInDays")]
    duration_in_days: u32,
    #[serde(rename = "PrincipalDelayInDays")]
    principal_delay_in_days: u32,
    #[serde(rename = "BaseCurrency")]
    base_currency: String,
}

impl CsvRow {
    fn into_package(self) -> Result<DepositPackage, LoadError> {
        let start_date = NaiveDate::parse_from_str(self.start_date.trim(), START_DATE_FORMAT)
            .map_err(|source| LoadError::StartDate {
                package_id: self.package_id,
                value: self.start_date.clone(),
                source,
            })?;

        let base_currency = self
            .base_currency
            .trim()
            .parse::<BaseCurrency>()
            .map_err(|message| LoadError::UnknownCurrency {
                package_id: self.package_id,
                message,
            })?;

        Ok(DepositPackage {
            package_id: self.package_id,
            display_name: self.display_name,
            start_date,
            amount: self.amount,
            interest_rate: self.interest_rate,
            duration_in_days: self.duration_in_days,
            principal_delay_in_days: self.principal_delay_in_days,
            base_currency,
        })
    }
}

/// Load all packages from a CSV file
pub fn load_packages<P: AsRef<Path>>(path: P) -> Result<Vec<DepositPackage>, LoadError> {
    let path = path.as_ref();
    let packages = read_packages(Reader::from_path(path)?)?;
    log::info!("loaded {} packages from {}", packages.len(), path.display());
    Ok(packages)
}

/// Load packages from any reader (e.g., string buffer, request body)
pub fn load_packages_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<DepositPackage>, LoadError> {
    read_packages(Reader::from_reader(reader))
}

fn read_packages<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<DepositPackage>, LoadError> {
    let mut packages = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        packages.push(row.into_package()?);
    }

    Ok(packages)
}
