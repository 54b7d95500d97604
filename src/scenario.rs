//! Scenario runner for batch projections
//!
//! Holds one config and clock, then projects many packages or many yield
//! variants of a package against them.

use rayon::prelude::*;

use crate::package::DepositPackage;
use crate::projection::{Clock, ProjectionConfig, ProjectionEngine, ProjectionError, ProjectionOutput, SystemClock};

/// Pre-configured runner for batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(ProjectionConfig::default());
///
/// for result in runner.run_rate_scenarios(&package, &[0.06, 0.08, 0.10]) {
///     println!("{:?}", result?.summary());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner<C: Clock = SystemClock> {
    engine: ProjectionEngine<C>,
}

impl ScenarioRunner<SystemClock> {
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
        }
    }
}

impl Default for ScenarioRunner<SystemClock> {
    fn default() -> Self {
        Self::new(ProjectionConfig::default())
    }
}

impl<C: Clock> ScenarioRunner<C> {
    pub fn with_clock(config: ProjectionConfig, clock: C) -> Self {
        Self {
            engine: ProjectionEngine::with_clock(config, clock),
        }
    }

    /// Project a single package
    pub fn run(&self, package: &DepositPackage) -> Result<ProjectionOutput, ProjectionError> {
        self.engine.project_package(package)
    }

    /// Project many packages in parallel; results keep input order
    pub fn run_batch(&self, packages: &[DepositPackage]) -> Vec<Result<ProjectionOutput, ProjectionError>> {
        packages
            .par_iter()
            .map(|package| self.engine.project_package(package))
            .collect()
    }

    /// Project one package under several annual rates
    pub fn run_rate_scenarios(
        &self,
        package: &DepositPackage,
        rates: &[f64],
    ) -> Vec<Result<ProjectionOutput, ProjectionError>> {
        rates
            .iter()
            .map(|&rate| self.engine.project_package(&package.with_interest_rate(rate)))
            .collect()
    }

    pub fn config(&self) -> &ProjectionConfig {
        self.engine.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::BaseCurrency;
    use crate::projection::FixedClock;
    use chrono::NaiveDate;

    fn test_package(package_id: u32, amount: f64) -> DepositPackage {
        DepositPackage {
            package_id,
            display_name: format!("Package {}", package_id),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount,
            interest_rate: 0.08,
            duration_in_days: 90,
            principal_delay_in_days: 30,
            base_currency: BaseCurrency::USDT,
        }
    }

    fn runner() -> ScenarioRunner<FixedClock> {
        ScenarioRunner::with_clock(
            ProjectionConfig::default(),
            FixedClock(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
        )
    }

    #[test]
    fn test_rate_scenarios_order_by_yield() {
        let results = runner().run_rate_scenarios(&test_package(1, 10_000.0), &[0.03, 0.06, 0.09]);
        assert_eq!(results.len(), 3);

        let finals: Vec<f64> = results
            .into_iter()
            .map(|r| r.unwrap().summary().final_interest)
            .collect();
        assert!(finals[0] < finals[1] && finals[1] < finals[2]);
    }

    #[test]
    fn test_batch_keeps_order_and_reports_invalid_packages() {
        let mut bad = test_package(3, 500.0);
        bad.principal_delay_in_days = 120;

        let packages = vec![test_package(1, 1_000.0), test_package(2, 2_000.0), bad];
        let results = runner().run_batch(&packages);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().summary().final_principal, 1_000.0);
        assert_eq!(results[1].as_ref().unwrap().summary().final_principal, 2_000.0);
        assert!(results[2].is_err());
        assert_eq!(results[0].as_ref().unwrap().elapsed_index, 32);
    }
}
