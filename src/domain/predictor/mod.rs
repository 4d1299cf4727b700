//! View state of the predictor page: run generations, fetched artifacts, subscriptions.

pub mod resource;
pub mod state;

pub use resource::{ResourceFactory, ResourceHandle};
pub use state::*;
