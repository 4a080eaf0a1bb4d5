pub mod traits;
pub mod data;
pub mod indicators;
pub mod output;
pub mod copier;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use data::{DataConfig, ReferenceSymbols};
pub use indicators::IndicatorConfig;
pub use output::{ChartFormat, OutputConfig};
pub use copier::CopierConfig;
pub use traits::ConfigSection;
