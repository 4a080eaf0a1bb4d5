pub mod indicators;
pub mod signals;

pub use indicators::IndicatorEngine;
pub use signals::{RowValues, SignalGenerator};
