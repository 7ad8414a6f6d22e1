pub mod aggregator;
pub mod reconciler;
pub mod salary;

pub use aggregator::{aggregate, QueryAggregates};
pub use reconciler::{AnalyticsReconciler, ReconcileOutcome};
