pub mod chart;
pub mod summary;

pub use chart::{fibonacci_levels, ChartBuilder, Figure};
pub use summary::SignalSummary;
