//! Chart aggregate: configuration handed to drawing surfaces, zoom window and hit-testing.

pub mod entities;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use services::*;
pub use value_objects::*;
