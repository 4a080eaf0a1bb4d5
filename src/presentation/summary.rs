use crate::{
    error::{Result, TechSignalError},
    types::{RowSignals, SignalCounts, SignalSet},
};
use std::fmt;

/// Signals of the most recent row with their tally.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSummary {
    pub date: Option<String>,
    pub signals: SignalSet,
    pub counts: SignalCounts,
}

impl SignalSummary {
    pub fn new(signals: SignalSet) -> Self {
        Self {
            date: None,
            counts: signals.counts(),
            signals,
        }
    }

    pub fn from_latest(rows: &[RowSignals]) -> Result<Self> {
        match rows.last() {
            Some(RowSignals::Signals(set)) => Ok(Self::new(*set)),
            Some(RowSignals::NoData { missing }) => Err(TechSignalError::Validation(format!(
                "Latest row has undefined indicators: {}",
                missing.join(", ")
            ))),
            None => Err(TechSignalError::Validation(
                "No rows to summarize".to_string(),
            )),
        }
    }

    pub fn on(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

impl fmt::Display for SignalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.date {
            Some(date) => writeln!(f, "Signals as of {}", date)?,
            None => writeln!(f, "Latest signals")?,
        }
        writeln!(f, "{:<10} | {}", "Indicator", "Signal")?;
        writeln!(f, "{:-<10}-+-{:-<7}", "", "")?;
        for (family, signal) in self.signals.iter() {
            writeln!(f, "{:<10} | {}", family.name(), signal)?;
        }
        writeln!(f)?;
        write!(
            f,
            "Buy: {}  Sell: {}  Neutral: {}",
            self.counts.buy, self.counts.sell, self.counts.neutral
        )
    }
}
