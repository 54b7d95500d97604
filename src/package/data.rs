//! Deposit package data structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::projection::ProjectionInput;

/// Currency a fund is denominated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BaseCurrency {
    ETH,
    #[default]
    USDT,
    USDC,
    DAI,
}

impl BaseCurrency {
    pub fn symbol(&self) -> &'static str {
        match self {
            BaseCurrency::ETH => "ETH",
            BaseCurrency::USDT => "USDT",
            BaseCurrency::USDC => "USDC",
            BaseCurrency::DAI => "DAI",
        }
    }
}

impl fmt::Display for BaseCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for BaseCurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ETH" => Ok(BaseCurrency::ETH),
            "USDT" => Ok(BaseCurrency::USDT),
            "USDC" => Ok(BaseCurrency::USDC),
            "DAI" => Ok(BaseCurrency::DAI),
            other => Err(format!("Unknown BaseCurrency: {}", other)),
        }
    }
}

/// A staking package offered by a fund vault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositPackage {
    pub package_id: u32,
    pub display_name: String,

    /// Day the deposit starts accruing
    pub start_date: NaiveDate,

    /// Deposit principal
    pub amount: f64,

    /// Annual nominal yield
    pub interest_rate: f64,

    /// Lock-up term
    pub duration_in_days: u32,

    /// Cliff before principal can be withdrawn
    pub principal_delay_in_days: u32,

    pub base_currency: BaseCurrency,
}

impl DepositPackage {
    /// Projection parameters for this package
    pub fn to_input(&self) -> ProjectionInput {
        ProjectionInput::new(
            self.start_date,
            self.amount,
            self.interest_rate,
            self.duration_in_days,
            self.principal_delay_in_days,
        )
    }

    /// Same package with a different yield
    pub fn with_interest_rate(&self, interest_rate: f64) -> Self {
        Self {
            interest_rate,
            ..self.clone()
        }
    }
}
