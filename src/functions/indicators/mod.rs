pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use trend::{SMA, MACD, BollingerBands};
pub use momentum::{RSI, CRSI, Stochastic, ROC};
pub use volatility::ATR;
pub use volume::VWAP;
