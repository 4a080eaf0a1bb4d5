use serde::{Deserialize, Serialize};
use std::fmt;

/// Value scale information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleType {
    Price,              // Follows price (SMA, BB, VWAP)
    Oscillator0_100,    // 0-100 bounded (RSI, Stochastic, CRSI)
    OscillatorCentered, // Zero-centered (MACD, Momentum)
    Volatility,         // Price-unit ranges (ATR)
}

/// Canonical column names of the analysis table.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const OPEN: &str = "Open";
    pub const HIGH: &str = "High";
    pub const LOW: &str = "Low";
    pub const CLOSE: &str = "Close";
    pub const VOLUME: &str = "Volume";

    pub const VIX: &str = "VIX";
    pub const SP500: &str = "SP500";
    pub const NASDAQ: &str = "NASDAQ";
    pub const DOW: &str = "DOW";

    pub const SMA20: &str = "SMA20";
    pub const SMA50: &str = "SMA50";
    pub const MACD: &str = "MACD";
    pub const MACD_SIGNAL: &str = "MACD_Signal";
    pub const RSI: &str = "RSI";
    pub const BB_UPPER: &str = "BB_Upper";
    pub const BB_MIDDLE: &str = "BB_Middle";
    pub const BB_LOWER: &str = "BB_Lower";
    pub const ATR: &str = "ATR";
    pub const STOCH_K: &str = "Stoch_K";
    pub const STOCH_D: &str = "Stoch_D";
    pub const MOMENTUM: &str = "Momentum";
    pub const VWAP: &str = "VWAP";
    pub const CRSI: &str = "CRSI";
}

/// Discrete trading signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Neutral => "Neutral",
        }
    }

    /// Marker value used on the signal chart panel.
    pub fn score(&self) -> i8 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
            Self::Neutral => 0,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator families that each carry one signal per row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalFamily {
    Sma,
    Macd,
    Rsi,
    Bb,
    Stoch,
    Momentum,
    Crsi,
    Vwap,
}

impl SignalFamily {
    pub const COUNT: usize = 8;

    pub const ALL: [SignalFamily; Self::COUNT] = [
        Self::Sma,
        Self::Macd,
        Self::Rsi,
        Self::Bb,
        Self::Stoch,
        Self::Momentum,
        Self::Crsi,
        Self::Vwap,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sma => "SMA",
            Self::Macd => "MACD",
            Self::Rsi => "RSI",
            Self::Bb => "BB",
            Self::Stoch => "Stoch",
            Self::Momentum => "Momentum",
            Self::Crsi => "CRSI",
            Self::Vwap => "VWAP",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Signals this family is able to emit. Crossover-style families have no neutral state.
    pub fn allowed(&self) -> &'static [Signal] {
        match self {
            Self::Macd | Self::Momentum | Self::Vwap => &[Signal::Buy, Signal::Sell],
            _ => &[Signal::Buy, Signal::Sell, Signal::Neutral],
        }
    }
}

impl fmt::Display for SignalFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One signal per family for a single row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    signals: [Signal; SignalFamily::COUNT],
}

impl SignalSet {
    pub fn new(signals: [Signal; SignalFamily::COUNT]) -> Self {
        Self { signals }
    }

    pub fn get(&self, family: SignalFamily) -> Signal {
        self.signals[family.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SignalFamily, Signal)> + '_ {
        SignalFamily::ALL.iter().map(move |f| (*f, self.get(*f)))
    }

    pub fn counts(&self) -> SignalCounts {
        let mut counts = SignalCounts::default();
        for signal in self.signals.iter() {
            match signal {
                Signal::Buy => counts.buy += 1,
                Signal::Sell => counts.sell += 1,
                Signal::Neutral => counts.neutral += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub buy: usize,
    pub sell: usize,
    pub neutral: usize,
}

/// Per-row outcome of signal generation, aligned one-to-one with the table rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowSignals {
    Signals(SignalSet),
    /// At least one required value was undefined; `missing` names those columns.
    NoData { missing: Vec<String> },
}

impl RowSignals {
    pub fn signals(&self) -> Option<&SignalSet> {
        match self {
            Self::Signals(set) => Some(set),
            Self::NoData { .. } => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}
