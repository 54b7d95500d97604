//! Core projection engine for daily deposit revenue series

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;

use crate::package::DepositPackage;
use super::clock::{Clock, SystemClock};
use super::error::ProjectionError;
use super::series::ProjectionOutput;

/// Days in the fixed projection year
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Default chart label format for category dates
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest accepted projection horizon (100 years)
pub const MAX_DURATION_IN_DAYS: u32 = 36_500;

/// Day-count convention used to turn elapsed days into a year fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DayCount {
    /// Every year is 365 days
    #[default]
    Fixed365,
    /// Every year is 360 days
    Actual360,
    /// Each elapsed day counts 1/365 or 1/366 depending on its calendar year
    ActualActual,
}

/// How the principal becomes repayable over the projection window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalSchedule {
    /// Full amount unlocks on the first day after the delay
    #[default]
    Cliff,
    /// Amount unlocks evenly from the delay to the end of the window
    Linear,
}

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Interest day-count convention
    pub day_count: DayCount,

    /// Principal unlock policy
    pub principal_schedule: PrincipalSchedule,

    /// chrono format string for category labels
    pub date_format: String,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            day_count: DayCount::Fixed365,
            principal_schedule: PrincipalSchedule::Cliff,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ProjectionConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reject label formats chrono cannot render for a calendar date
    ///
    /// Time specifiers such as `%H` parse but fail to render on a date,
    /// so the format is rendered once against a sample day.
    pub fn validate(&self) -> Result<(), ProjectionError> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ProjectionError::invalid(
                "date_format",
                format!("'{}' is not a valid strftime format", self.date_format),
            ));
        }
        let mut label = String::new();
        write_label(&mut label, NaiveDate::default(), &self.date_format)?;
        Ok(())
    }

    /// Load a config from a JSON file
    pub fn from_json_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(config)
    }
}

/// Parameters of a single deposit to project
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInput {
    /// First accruing calendar day
    pub start_date: NaiveDate,

    /// Principal in the fund's base currency
    pub amount: f64,

    /// Annual nominal rate (0.08 = 8%)
    pub interest_rate: f64,

    /// Projection horizon in days
    pub duration_in_days: u32,

    /// Lock-up before principal becomes repayable
    pub principal_delay_in_days: u32,
}

impl ProjectionInput {
    pub fn new(
        start_date: NaiveDate,
        amount: f64,
        interest_rate: f64,
        duration_in_days: u32,
        principal_delay_in_days: u32,
    ) -> Self {
        Self {
            start_date,
            amount,
            interest_rate,
            duration_in_days,
            principal_delay_in_days,
        }
    }

    /// Reject anything outside the documented input domain
    pub fn validate(&self) -> Result<(), ProjectionError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ProjectionError::invalid(
                "amount",
                format!("must be a finite non-negative number, got {}", self.amount),
            ));
        }
        if !self.interest_rate.is_finite() || self.interest_rate < 0.0 {
            return Err(ProjectionError::invalid(
                "interest_rate",
                format!("must be a finite non-negative number, got {}", self.interest_rate),
            ));
        }
        if self.duration_in_days == 0 {
            return Err(ProjectionError::invalid("duration_in_days", "must be positive"));
        }
        if self.duration_in_days > MAX_DURATION_IN_DAYS {
            return Err(ProjectionError::invalid(
                "duration_in_days",
                format!(
                    "{} exceeds the maximum horizon of {} days",
                    self.duration_in_days, MAX_DURATION_IN_DAYS
                ),
            ));
        }
        if self.principal_delay_in_days > self.duration_in_days {
            return Err(ProjectionError::invalid(
                "principal_delay_in_days",
                format!(
                    "{} exceeds duration of {} days",
                    self.principal_delay_in_days, self.duration_in_days
                ),
            ));
        }
        if self.end_date().is_none() {
            return Err(ProjectionError::invalid(
                "start_date",
                format!(
                    "{} plus {} days is outside the supported calendar",
                    self.start_date, self.duration_in_days
                ),
            ));
        }
        Ok(())
    }

    /// Exclusive end of the projection window
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.start_date
            .checked_add_days(Days::new(u64::from(self.duration_in_days)))
    }
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine<C: Clock = SystemClock> {
    config: ProjectionConfig,
    clock: C,
}

impl ProjectionEngine<SystemClock> {
    /// Create an engine that reads the host clock for the elapsed marker
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            config,
            clock: SystemClock,
        }
    }
}

impl Default for ProjectionEngine<SystemClock> {
    fn default() -> Self {
        Self::new(ProjectionConfig::default())
    }
}

impl<C: Clock> ProjectionEngine<C> {
    /// Create an engine with an injected clock
    pub fn with_clock(config: ProjectionConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project a deposit package
    pub fn project_package(&self, package: &DepositPackage) -> Result<ProjectionOutput, ProjectionError> {
        self.project(&package.to_input())
    }

    /// Run the projection for a single deposit
    pub fn project(&self, input: &ProjectionInput) -> Result<ProjectionOutput, ProjectionError> {
        self.config.validate()?;
        input.validate()?;

        let days = input.duration_in_days as usize;
        let delay = input.principal_delay_in_days as usize;

        let mut categories = Vec::with_capacity(days);
        let mut principal_series = Vec::with_capacity(days);
        let mut interest_series = Vec::with_capacity(days);
        let mut total_series = Vec::with_capacity(days);

        // Running year fraction, only used by the actual/actual convention
        let mut accrued_years = 0.0;

        for (i, date) in input.start_date.iter_days().take(days).enumerate() {
            let elapsed_days = (i + 1) as f64;

            let interest = match self.config.day_count {
                DayCount::Fixed365 => {
                    input.amount * input.interest_rate * elapsed_days / DAYS_PER_YEAR
                }
                DayCount::Actual360 => input.amount * input.interest_rate * elapsed_days / 360.0,
                DayCount::ActualActual => {
                    accrued_years += 1.0 / days_in_year(date);
                    input.amount * input.interest_rate * accrued_years
                }
            };

            let principal = principal_at(self.config.principal_schedule, input.amount, i, delay, days);

            let mut label = String::new();
            write_label(&mut label, date, &self.config.date_format)?;
            categories.push(label);
            principal_series.push(principal);
            interest_series.push(interest);
            total_series.push(principal + interest);
        }

        let elapsed_index = elapsed_index(input.start_date, self.clock.today(), days);

        log::debug!(
            "projected {} days from {} (amount={}, rate={}, delay={}, elapsed={})",
            days,
            input.start_date,
            input.amount,
            input.interest_rate,
            delay,
            elapsed_index
        );

        Ok(ProjectionOutput {
            categories,
            principal_series,
            interest_series,
            total_series,
            elapsed_index,
        })
    }
}

/// Project with the default config and the host clock
pub fn project(
    start_date: NaiveDate,
    amount: f64,
    interest_rate: f64,
    duration_in_days: u32,
    principal_delay_in_days: u32,
) -> Result<ProjectionOutput, ProjectionError> {
    ProjectionEngine::default().project(&ProjectionInput::new(
        start_date,
        amount,
        interest_rate,
        duration_in_days,
        principal_delay_in_days,
    ))
}

/// Repayable principal on day index `i`
fn principal_at(schedule: PrincipalSchedule, amount: f64, i: usize, delay: usize, days: usize) -> f64 {
    if i < delay {
        return 0.0;
    }
    match schedule {
        PrincipalSchedule::Cliff => amount,
        PrincipalSchedule::Linear => {
            // i >= delay implies days > delay
            let unlocked = (i - delay + 1) as f64;
            amount * unlocked / (days - delay) as f64
        }
    }
}

/// Count of window days falling on or before `today`
fn elapsed_index(start: NaiveDate, today: NaiveDate, days: usize) -> usize {
    let since_start = today.signed_duration_since(start).num_days();
    if since_start < 0 {
        0
    } else {
        usize::try_from(since_start + 1).map_or(days, |n| n.min(days))
    }
}

/// Render a category label without panicking on unrenderable formats
fn write_label(out: &mut String, date: NaiveDate, format: &str) -> Result<(), ProjectionError> {
    write!(out, "{}", date.format(format)).map_err(|_| {
        ProjectionError::invalid(
            "date_format",
            format!("'{}' cannot be rendered for a calendar date", format),
        )
    })
}

fn days_in_year(date: NaiveDate) -> f64 {
    let year = date.year();
    if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
        366.0
    } else {
        365.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::FixedClock;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine_at(today: NaiveDate) -> ProjectionEngine<FixedClock> {
        ProjectionEngine::with_clock(ProjectionConfig::default(), FixedClock(today))
    }

    fn scenario_a() -> ProjectionInput {
        ProjectionInput::new(date(2024, 1, 1), 1000.0, 0.10, 10, 5)
    }

    #[test]
    fn test_series_lengths_match_duration() {
        let out = engine_at(date(2024, 1, 3)).project(&scenario_a()).unwrap();
        assert_eq!(out.categories.len(), 10);
        assert_eq!(out.principal_series.len(), 10);
        assert_eq!(out.interest_series.len(), 10);
        assert_eq!(out.total_series.len(), 10);
        assert_eq!(out.categories[0], "2024-01-01");
        assert_eq!(out.categories[9], "2024-01-10");
    }

    #[test]
    fn test_scenario_a_values() {
        let out = engine_at(date(2024, 1, 3)).project(&scenario_a()).unwrap();

        assert_abs_diff_eq!(out.interest_series[9], 1000.0 * 0.10 * 10.0 / 365.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.interest_series[9], 2.739726, epsilon = 1e-6);
        assert_eq!(out.principal_series[4], 0.0);
        assert_eq!(out.principal_series[5], 1000.0);
    }

    #[test]
    fn test_total_is_principal_plus_interest() {
        let out = engine_at(date(2024, 1, 3)).project(&scenario_a()).unwrap();
        for i in 0..out.len() {
            assert_abs_diff_eq!(
                out.total_series[i],
                out.principal_series[i] + out.interest_series[i],
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_interest_monotone_and_principal_cliff() {
        let input = ProjectionInput::new(date(2024, 3, 1), 25_000.0, 0.08, 180, 90);
        let out = engine_at(date(2024, 4, 1)).project(&input).unwrap();

        assert!(out.interest_series.windows(2).all(|w| w[1] >= w[0]));
        assert_abs_diff_eq!(
            out.interest_series[179],
            25_000.0 * 0.08 * 180.0 / 365.0,
            epsilon = 1e-9
        );
        for (i, p) in out.principal_series.iter().enumerate() {
            if i < 90 {
                assert_eq!(*p, 0.0);
            } else {
                assert_eq!(*p, 25_000.0);
            }
        }
    }

    #[test]
    fn test_zero_amount_gives_zero_series() {
        let input = ProjectionInput::new(date(2024, 1, 1), 0.0, 0.10, 30, 5);
        let out = engine_at(date(2024, 1, 1)).project(&input).unwrap();
        assert_eq!(out.len(), 30);
        assert!(out.principal_series.iter().all(|v| *v == 0.0));
        assert!(out.interest_series.iter().all(|v| *v == 0.0));
        assert!(out.total_series.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_delay_equal_to_duration_never_unlocks() {
        let input = ProjectionInput::new(date(2024, 1, 1), 500.0, 0.05, 14, 14);
        let out = engine_at(date(2024, 1, 1)).project(&input).unwrap();
        assert!(out.principal_series.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_zero_delay_unlocks_from_first_day() {
        let input = ProjectionInput::new(date(2024, 1, 1), 500.0, 0.05, 14, 0);
        let out = engine_at(date(2024, 1, 1)).project(&input).unwrap();
        assert!(out.principal_series.iter().all(|v| *v == 500.0));
    }

    #[test]
    fn test_elapsed_index_clamped() {
        let input = scenario_a();

        let before = engine_at(date(2023, 12, 1)).project(&input).unwrap();
        assert_eq!(before.elapsed_index, 0);

        let day_before = engine_at(date(2023, 12, 31)).project(&input).unwrap();
        assert_eq!(day_before.elapsed_index, 0);

        let first_day = engine_at(date(2024, 1, 1)).project(&input).unwrap();
        assert_eq!(first_day.elapsed_index, 1);

        let during = engine_at(date(2024, 1, 4)).project(&input).unwrap();
        assert_eq!(during.elapsed_index, 4);

        let last_day = engine_at(date(2024, 1, 10)).project(&input).unwrap();
        assert_eq!(last_day.elapsed_index, 10);

        let after = engine_at(date(2030, 6, 1)).project(&input).unwrap();
        assert_eq!(after.elapsed_index, 10);
    }

    #[test]
    fn test_idempotent_with_fixed_clock() {
        let engine = engine_at(date(2024, 1, 6));
        let a = engine.project(&scenario_a()).unwrap();
        let b = engine.project(&scenario_a()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_rejects_invalid_input() {
        let engine = engine_at(date(2024, 1, 1));
        let base = scenario_a();

        let cases = [
            (ProjectionInput { amount: -1.0, ..base }, "amount"),
            (ProjectionInput { amount: f64::NAN, ..base }, "amount"),
            (ProjectionInput { interest_rate: -0.01, ..base }, "interest_rate"),
            (ProjectionInput { interest_rate: f64::INFINITY, ..base }, "interest_rate"),
            (ProjectionInput { duration_in_days: 0, principal_delay_in_days: 0, ..base }, "duration_in_days"),
            (ProjectionInput { principal_delay_in_days: 11, ..base }, "principal_delay_in_days"),
            (ProjectionInput { start_date: NaiveDate::MAX, ..base }, "start_date"),
        ];

        for (input, field) in cases {
            let err = engine.project(&input).unwrap_err();
            assert_eq!(err.field(), field);
        }
    }

    #[test]
    fn test_actual_360_accrues_faster() {
        let config = ProjectionConfig {
            day_count: DayCount::Actual360,
            ..Default::default()
        };
        let engine = ProjectionEngine::with_clock(config, FixedClock(date(2024, 1, 1)));
        let out = engine.project(&scenario_a()).unwrap();
        assert_abs_diff_eq!(out.interest_series[9], 1000.0 * 0.10 * 10.0 / 360.0, epsilon = 1e-9);
    }

    #[test]
    fn test_actual_actual_uses_leap_year_length() {
        let config = ProjectionConfig {
            day_count: DayCount::ActualActual,
            ..Default::default()
        };
        let engine = ProjectionEngine::with_clock(config, FixedClock(date(2024, 1, 1)));

        // All of 2024 is a leap year: one full year accrues exactly one year of interest
        let input = ProjectionInput::new(date(2024, 1, 1), 1000.0, 0.10, 366, 0);
        let out = engine.project(&input).unwrap();
        assert_abs_diff_eq!(out.interest_series[365], 100.0, epsilon = 1e-9);

        // Window straddling the year end mixes 1/366 and 1/365 days
        let input = ProjectionInput::new(date(2024, 12, 31), 1000.0, 0.10, 2, 0);
        let out = engine.project(&input).unwrap();
        assert_abs_diff_eq!(
            out.interest_series[1],
            100.0 * (1.0 / 366.0 + 1.0 / 365.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_linear_principal_schedule() {
        let config = ProjectionConfig {
            principal_schedule: PrincipalSchedule::Linear,
            ..Default::default()
        };
        let engine = ProjectionEngine::with_clock(config, FixedClock(date(2024, 1, 1)));
        let out = engine.project(&scenario_a()).unwrap();

        assert_eq!(out.principal_series[4], 0.0);
        assert_abs_diff_eq!(out.principal_series[5], 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out.principal_series[9], 1000.0, epsilon = 1e-9);
        assert!(out.principal_series.windows(2).all(|w| w[1] >= w[0]));
        assert!(out.principal_series.iter().all(|p| *p <= 1000.0));
    }

    #[test]
    fn test_custom_date_format() {
        let config = ProjectionConfig {
            date_format: "%d %b".to_string(),
            ..Default::default()
        };
        let engine = ProjectionEngine::with_clock(config, FixedClock(date(2024, 1, 1)));
        let out = engine.project(&scenario_a()).unwrap();
        assert_eq!(out.categories[0], "01 Jan");
    }

    #[test]
    fn test_rejects_bad_date_format() {
        let config = ProjectionConfig {
            date_format: "%Y-%Q".to_string(),
            ..Default::default()
        };
        let engine = ProjectionEngine::with_clock(config, FixedClock(date(2024, 1, 1)));
        let err = engine.project(&scenario_a()).unwrap_err();
        assert_eq!(err.field(), "date_format");
    }

    #[test]
    fn test_rejects_time_only_date_format() {
        let config = ProjectionConfig {
            date_format: "%H:%M".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), "date_format");

        let engine = ProjectionEngine::with_clock(config, FixedClock(date(2024, 1, 1)));
        let err = engine.project(&scenario_a()).unwrap_err();
        assert_eq!(err.field(), "date_format");
    }

    #[test]
    fn test_rejects_horizon_beyond_maximum() {
        let engine = engine_at(date(2024, 1, 1));
        let too_long = ProjectionInput::new(date(2024, 1, 1), 1000.0, 0.10, MAX_DURATION_IN_DAYS + 1, 0);
        assert_eq!(engine.project(&too_long).unwrap_err().field(), "duration_in_days");

        let longest = ProjectionInput::new(date(2024, 1, 1), 1000.0, 0.10, MAX_DURATION_IN_DAYS, 0);
        assert_eq!(engine.project(&longest).unwrap().len(), MAX_DURATION_IN_DAYS as usize);
    }

    #[test]
    fn test_config_from_json_defaults() {
        let config = ProjectionConfig::from_json_str(r#"{"day_count": "actual_actual"}"#).unwrap();
        assert_eq!(config.day_count, DayCount::ActualActual);
        assert_eq!(config.principal_schedule, PrincipalSchedule::Cliff);
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);

        assert_eq!(ProjectionConfig::from_json_str("{}").unwrap(), ProjectionConfig::default());
    }

    #[test]
    fn test_free_function_matches_engine() {
        let out = project(date(2024, 1, 1), 1000.0, 0.10, 10, 5).unwrap();
        let fixed = engine_at(date(2024, 1, 1)).project(&scenario_a()).unwrap();
        assert_eq!(out.principal_series, fixed.principal_series);
        assert_eq!(out.interest_series, fixed.interest_series);
        assert_eq!(out.categories, fixed.categories);
        assert!(out.elapsed_index <= 10);
    }
}
