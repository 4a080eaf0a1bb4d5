pub mod connectors;
pub mod preparation;
pub mod source;

pub use connectors::{CsvConnector, DataValidator, RequiredColumn};
pub use preparation::DataPreparer;
pub use source::{CsvMarketData, DateWindow, MarketDataSource, StaticMarketData};
