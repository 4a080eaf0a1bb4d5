use anyhow::{bail, Result};
use polars::prelude::Expr;
use crate::types::ScaleType;

/// Base trait for all indicators
pub trait Indicator: Send + Sync {
    /// Display name
    fn ui_name(&self) -> &'static str;

    /// Short name used for registry lookups and log lines
    fn alias(&self) -> &'static str;

    /// Semantic scale type
    fn scale_type(&self) -> ScaleType;

    /// Expected value range
    fn value_range(&self) -> Option<(f64, f64)>;

    /// Table columns consumed, in argument order
    fn inputs(&self) -> Vec<&'static str>;

    /// Table columns produced
    fn outputs(&self) -> Vec<&'static str>;

    /// Number of leading rows left undefined
    fn warmup(&self) -> usize;
}

/// Trait for indicators expressed as Polars expressions
pub trait VectorizedIndicator: Indicator {
    /// One expression per output column, each aliased to its column name
    fn calculate_vectorized(&self, args: &[Expr]) -> Result<Vec<Expr>>;
}

/// Fetch the series argument at `index`, failing with the indicator alias on arity mismatch.
pub fn series_arg(args: &[Expr], index: usize, alias: &str) -> Result<Expr> {
    match args.get(index) {
        Some(expr) => Ok(expr.clone()),
        None => bail!("{}: missing series argument {}", alias, index),
    }
}
