//! af-forces: force-history parsing and convergence averaging.

pub mod parse;
pub mod series;

pub use parse::{parse, parse_str, ForceRecord, ForceSeries};
pub use series::{wind_axis, ForceAverage, WindForces};
