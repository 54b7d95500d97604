//! Projection output consumed by the revenue chart

use serde::{Deserialize, Serialize};

use super::error::ProjectionError;

/// Label shown over the elapsed region once more than one day has passed
pub const CLAIM_LABEL: &str = "Available Claim";

/// Index-aligned daily series for one deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionOutput {
    /// Date label per projection day
    pub categories: Vec<String>,

    /// Repayable principal per day
    pub principal_series: Vec<f64>,

    /// Accrued simple interest per day
    pub interest_series: Vec<f64>,

    /// principal + interest per day
    pub total_series: Vec<f64>,

    /// Number of categories on or before "today"
    pub elapsed_index: usize,
}

/// One named series as handed to the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<f64>,
}

/// Shaded x-axis range covering the elapsed part of the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimAnnotation {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Headline figures for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_days: usize,
    pub elapsed_days: usize,
    pub final_principal: f64,
    pub final_interest: f64,
    pub final_total: f64,
    /// Principal repayable as of the elapsed marker
    pub claimable_principal: f64,
    /// Interest accrued as of the elapsed marker
    pub claimable_interest: f64,
}

impl ProjectionOutput {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Series in chart order: Total, Principal, Interest
    pub fn chart_series(&self) -> Vec<ChartSeries> {
        vec![
            ChartSeries { name: "Total".to_string(), data: self.total_series.clone() },
            ChartSeries { name: "Principal".to_string(), data: self.principal_series.clone() },
            ChartSeries { name: "Interest".to_string(), data: self.interest_series.clone() },
        ]
    }

    /// Range to shade as already elapsed, if any day has passed
    pub fn claim_annotation(&self) -> Option<ClaimAnnotation> {
        if self.elapsed_index == 0 || self.is_empty() {
            return None;
        }
        let last = self.elapsed_index.min(self.len()) - 1;
        Some(ClaimAnnotation {
            from: self.categories[0].clone(),
            to: self.categories[last].clone(),
            label: (self.elapsed_index > 1).then(|| CLAIM_LABEL.to_string()),
        })
    }

    pub fn summary(&self) -> ProjectionSummary {
        let last = |series: &[f64]| series.last().copied().unwrap_or(0.0);
        let at_elapsed = |series: &[f64]| {
            self.elapsed_index
                .checked_sub(1)
                .and_then(|i| series.get(i))
                .copied()
                .unwrap_or(0.0)
        };

        ProjectionSummary {
            total_days: self.len(),
            elapsed_days: self.elapsed_index,
            final_principal: last(&self.principal_series),
            final_interest: last(&self.interest_series),
            final_total: last(&self.total_series),
            claimable_principal: at_elapsed(&self.principal_series),
            claimable_interest: at_elapsed(&self.interest_series),
        }
    }

    /// Periodic view keeping every `step_days`-th day plus the final day
    ///
    /// The elapsed marker is recomputed as the number of kept points that
    /// fall inside the elapsed region.
    pub fn sample_every(&self, step_days: usize) -> Result<ProjectionOutput, ProjectionError> {
        if step_days == 0 {
            return Err(ProjectionError::invalid("step_days", "must be positive"));
        }

        let n = self.len();
        let mut indices: Vec<usize> = (step_days - 1..n).step_by(step_days).collect();
        if n > 0 && indices.last() != Some(&(n - 1)) {
            indices.push(n - 1);
        }

        let pick = |series: &[f64]| indices.iter().map(|&i| series[i]).collect::<Vec<_>>();

        Ok(ProjectionOutput {
            categories: indices.iter().map(|&i| self.categories[i].clone()).collect(),
            principal_series: pick(&self.principal_series),
            interest_series: pick(&self.interest_series),
            total_series: pick(&self.total_series),
            elapsed_index: indices.iter().filter(|&&i| i < self.elapsed_index).count(),
        })
    }
}
