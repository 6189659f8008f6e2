pub mod monitor;
pub mod planner;
pub mod recurrence;
pub mod suitability;

pub use monitor::{AlertSink, JsonLinesSink, MonitorReport, WeatherMonitor};
pub use planner::{plan_schedule, OccurrencePlan, PlanWindow, PlannedAction};
pub use recurrence::{
    apply_exceptions, generate_occurrences, get_next_occurrence, validate_recurrence_pattern,
    GenerateOptions, MAX_UNBOUNDED_OCCURRENCES,
};
pub use suitability::{
    determine_severity, evaluate, evaluate_named, ConstraintViolation, SuitabilityVerdict,
};
