use crate::types::columns;

/// Required OHLCV columns for market data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredColumn {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl RequiredColumn {
    /// Canonical name used throughout the analysis table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => columns::DATE,
            Self::Open => columns::OPEN,
            Self::High => columns::HIGH,
            Self::Low => columns::LOW,
            Self::Close => columns::CLOSE,
            Self::Volume => columns::VOLUME,
        }
    }

    /// Price and volume columns; the date index is validated separately.
    pub fn ohlcv() -> Vec<Self> {
        vec![
            Self::Open,
            Self::High,
            Self::Low,
            Self::Close,
            Self::Volume,
        ]
    }

    pub fn all() -> Vec<Self> {
        let mut all = vec![Self::Date];
        all.extend(Self::ohlcv());
        all
    }

    /// Common alternative column names
    pub fn aliases(&self) -> Vec<&'static str> {
        match self {
            Self::Date => vec!["Date", "date", "DATE", "Datetime", "datetime", "time", "timestamp", "Timestamp"],
            Self::Open => vec!["Open", "open", "OPEN", "o"],
            Self::High => vec!["High", "high", "HIGH", "h"],
            Self::Low => vec!["Low", "low", "LOW", "l"],
            Self::Close => vec!["Close", "close", "CLOSE", "c"],
            Self::Volume => vec!["Volume", "volume", "VOLUME", "vol", "Vol", "v"],
        }
    }
}
