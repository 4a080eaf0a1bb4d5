pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod functions;
pub mod pipeline;
pub mod presentation;
pub mod types;
pub mod utils;

pub use error::{Result, TechSignalError};
pub use pipeline::{AnalysisPipeline, AnalysisReport};
