//! Market data aggregate: symbols, info records and `{x, y}` series.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
