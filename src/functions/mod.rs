pub mod indicators;
pub mod primitives;
pub mod registry;
pub mod traits;

pub use registry::FunctionRegistry;
pub use traits::{Indicator, VectorizedIndicator};
