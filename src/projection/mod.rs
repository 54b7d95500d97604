//! Deposit revenue projection engine

mod clock;
mod engine;
mod error;
mod series;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{
    project, DayCount, PrincipalSchedule, ProjectionConfig, ProjectionEngine, ProjectionInput,
    DAYS_PER_YEAR, DEFAULT_DATE_FORMAT, MAX_DURATION_IN_DAYS,
};
pub use error::ProjectionError;
pub use series::{ChartSeries, ClaimAnnotation, ProjectionOutput, ProjectionSummary, CLAIM_LABEL};
